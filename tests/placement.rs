// SPDX-License-Identifier: Apache-2.0

mod common;

use bbox_phy::{Axis, Error, PortList, PortSpec, Rect, Side};
use common::{ports, rect_of, run};
use rstest::rstest;

#[rstest]
#[case("min_pitch")]
#[case("distributed")]
fn inputs_pack_on_left_side(#[case] spacing: &str) {
    let view = run(&ports(4, 0), &format!("pin_spacing = \"{spacing}\"")).unwrap();

    let lows: Vec<i64> = (0..4)
        .map(|i| rect_of(&view, &format!("in{i}")).min_y)
        .collect();
    assert_eq!(lows, vec![0, 300, 600, 900]);
    assert_eq!(rect_of(&view, "in0"), Rect::new(0, 0, 1000, 100));
    assert!(view.boundary.internal_box.height() >= 1000);
    assert_eq!(view.sides[Side::Left], vec!["in0", "in1", "in2", "in3"]);
    assert_eq!(view.n_inputs, 4);
}

#[test]
fn pinned_pin_splits_its_side() {
    let view = run(
        &ports(0, 4),
        r#"
        y_width = 10.0

        [pins.out0]
        center = 5.0
        "#,
    )
    .unwrap();

    let pinned = rect_of(&view, "out0");
    assert_eq!(pinned.span(Axis::Y), (4950, 5050));
    assert_eq!(pinned.span(Axis::X), (400, 1400));

    // Keep one pitch clear on both sides of the pinned pin.
    for name in ["out1", "out2", "out3"] {
        let (lo, hi) = rect_of(&view, name).span(Axis::Y);
        assert!(hi <= 4750 || lo >= 5250, "{name} at {lo}..{hi}");
    }
    assert_eq!(rect_of(&view, "out1").min_y, 0);
    assert_eq!(rect_of(&view, "out3").min_y, 600);
    assert_eq!(
        view.sides[Side::Right],
        vec!["out1", "out2", "out3", "out0"]
    );
}

#[rstest]
#[case("y_width = 10.0", 5000, 10000)]
#[case("x_width = 5.0", 5000, 10000)]
fn aspect_ratio_derives_missing_width(
    #[case] width: &str,
    #[case] expected_x: i64,
    #[case] expected_y: i64,
) {
    let view = run(&ports(4, 4), &format!("aspect_ratio = [1.0, 2.0]\n{width}")).unwrap();
    assert_eq!(view.boundary.internal_box.width(), expected_x);
    assert_eq!(view.boundary.internal_box.height(), expected_y);
}

#[test]
fn strict_dimension_too_small() {
    let err = run(
        &ports(10, 0),
        r#"
        y_width = 1.0
        y_strictness = "strict"
        "#,
    )
    .unwrap_err();
    assert!(err.is_configuration_error());
    match err {
        Error::StrictDimension {
            axis,
            given_um,
            required_um,
        } => {
            assert_eq!(axis, Axis::Y);
            assert_eq!(given_um, 1.0);
            assert_eq!(required_um, 2.8);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn flexible_width_grows_to_fit() {
    let view = run(&ports(6, 0), "y_width = 1.0").unwrap();
    assert_eq!(view.boundary.internal_box.height(), 1600);
}

#[test]
fn unplaced_pins_trigger_a_resize() {
    let view = run(
        &ports(0, 4),
        r#"
        [pins.out0]
        center = 0.5
        "#,
    )
    .unwrap();
    assert_eq!(view.boundary.internal_box.height(), 1300);
    assert_eq!(rect_of(&view, "out1").min_y, 0);
    assert_eq!(rect_of(&view, "out2").min_y, 750);
    assert_eq!(rect_of(&view, "out3").min_y, 1050);
}

#[rstest]
#[case("y_width = 1.0\ny_strictness = \"strict\"", "cannot grow")]
#[case("auto_resize = false", "automatic resizing is disabled")]
#[case("max_attempts = 1", "retry limit of 1 reached")]
fn resize_refused(#[case] settings: &str, #[case] reason: &str) {
    let err = run(
        &ports(0, 4),
        &format!("{settings}\n\n[pins.out0]\ncenter = 0.5\n"),
    )
    .unwrap_err();
    match err {
        Error::Infeasible {
            attempts,
            reason: message,
            unplaced,
        } => {
            assert_eq!(attempts, 1);
            assert!(message.contains(reason), "{message}");
            assert_eq!(unplaced, vec!["out3"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn side_and_layer_overrides() {
    let ports = PortList::new("bb")
        .with_port(PortSpec::input("clk"))
        .with_port(PortSpec::input("d").with_bus(3, 0))
        .with_port(PortSpec::output("q"));
    let view = run(
        &ports,
        r#"
        input_side = "bottom"

        [pins.clk]
        side = "top"

        [pins.q]
        layer = "M4"
        "#,
    )
    .unwrap();

    let clk = view.pin("clk").unwrap();
    assert_eq!(clk.side, Side::Top);
    assert_eq!(clk.layer, "M3");
    for i in 0..4 {
        let bit = view.pin(&format!("d[{i}]")).unwrap();
        assert_eq!(bit.side, Side::Bottom);
        assert_eq!(bit.layer, "M3");
    }
    assert_eq!(
        view.sides[Side::Bottom],
        vec!["d[0]", "d[1]", "d[2]", "d[3]"]
    );
    let q = view.pin("q").unwrap();
    assert_eq!(q.side, Side::Right);
    assert_eq!(q.layer, "M4");
    assert_eq!(q.rects[0].height(), 200);
}

#[test]
fn unknown_layer_names_its_key() {
    let err = run(&ports(1, 0), "[pins.in0]\nlayer = \"M9\"\n").unwrap_err();
    assert_eq!(
        format!("{err}"),
        "layer 'M9' used by 'pins.in0.layer' is not defined in the stackup"
    );
}

#[test]
fn duplicate_pin_names_are_rejected() {
    let ports = PortList::new("bb")
        .with_port(PortSpec::input("a"))
        .with_port(PortSpec::output("a"));
    assert!(matches!(
        run(&ports, ""),
        Err(Error::DuplicatePin(name)) if name == "a"
    ));
}

#[test]
fn small_power_pins_default_to_top() {
    let view = run(&ports(1, 1), "").unwrap();
    let vdd = view.pin("VDD").unwrap();
    let vss = view.pin("VSS").unwrap();
    assert_eq!(vdd.side, Side::Top);
    assert_eq!(vdd.pin_use.as_lef_str(), "POWER");
    assert_eq!(vss.pin_use.as_lef_str(), "GROUND");
    assert!(view.straps.is_empty());
    assert_eq!(view.sides[Side::Top], vec!["VDD", "VSS"]);
}

#[test]
fn blockages_skip_excluded_layers() {
    let view = run(&ports(2, 2), "exclude_layers = [\"M1\", \"M4\"]").unwrap();
    let layers: Vec<&str> = view.blockages.iter().map(|b| b.layer.as_str()).collect();
    assert_eq!(layers, vec!["M2", "M3"]);
    for blockage in &view.blockages {
        assert_eq!(blockage.rect, view.boundary.internal_box);
    }
}

#[test]
fn pin_margin_insets_free_span() {
    let view = run(&ports(2, 0), "pin_margin = true").unwrap();
    // Half of the M2 pitch at each end of the left side.
    assert_eq!(rect_of(&view, "in0").min_y, 100);
    assert_eq!(rect_of(&view, "in1").min_y, 400);
    assert_eq!(view.boundary.internal_box.height(), 600);
}

#[test]
fn origin_shifts_bound_box() {
    let view = run(&ports(1, 1), "origin = [0.5, 0.25]").unwrap();
    let design = view.boundary.design_boundary;
    assert_eq!(
        view.boundary.bound_box,
        design.translate(-500, -250)
    );
}

#[rstest]
#[case("[pins.in0]\ncenter = 0.0", "pins.in0.center")]
#[case("[pins.in0]\ncenter = 1.0\n\n[pins.in1]\ncenter = 1.0", "pins.in1.center")]
#[case("[pins.in2]\ncenter = 1.0\n\n[pins.in0]\ncenter = 1.25", "pins.in2.center")]
fn bad_pinned_centers_name_their_key(#[case] toml: &str, #[case] expected_key: &str) {
    let err = run(&ports(4, 0), toml).unwrap_err();
    assert!(err.is_configuration_error(), "{err}");
    assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == expected_key));
}

#[test]
fn pinned_pins_one_pitch_apart() {
    let view = run(
        &ports(2, 0),
        r#"
        [pins.in0]
        center = 0.05

        [pins.in1]
        center = 0.35
        "#,
    )
    .unwrap();
    assert_eq!(rect_of(&view, "in0").span(Axis::Y), (0, 100));
    assert_eq!(rect_of(&view, "in1").span(Axis::Y), (300, 400));
}
