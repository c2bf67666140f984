// SPDX-License-Identifier: Apache-2.0

mod common;

use bbox_phy::{AbstractView, Axis, Error, Side};
use common::{ports, rect_of, run};
use rstest::rstest;

fn spans(view: &AbstractView, name: &str, axis: Axis) -> Vec<(i64, i64)> {
    view.pin(name)
        .unwrap()
        .rects
        .iter()
        .map(|r| r.span(axis))
        .collect()
}

#[test]
fn strap_pair_splits_busier_side() {
    let view = run(
        &ports(4, 4),
        r#"
        [pg_pins]
        pg_pin_placement = "straps"
        "#,
    )
    .unwrap();

    // The pair needs 0.6 um more than the packed pins, so the box grows once.
    assert_eq!(view.boundary.internal_box.height(), 1600);
    assert_eq!(spans(&view, "VDD", Axis::Y), vec![(600, 700)]);
    assert_eq!(spans(&view, "VSS", Axis::Y), vec![(900, 1000)]);
    assert_eq!(
        view.pin("VDD").unwrap().rects[0].span(Axis::X),
        view.boundary.design_boundary.span(Axis::X)
    );

    let lows: Vec<i64> = (0..4)
        .map(|i| rect_of(&view, &format!("in{i}")).min_y)
        .collect();
    assert_eq!(lows, vec![0, 300, 1200, 1500]);
    let lows: Vec<i64> = (0..4)
        .map(|i| rect_of(&view, &format!("out{i}")).min_y)
        .collect();
    assert_eq!(lows, vec![0, 300, 1200, 1500]);

    assert_eq!(
        view.sides[Side::Left],
        vec!["in0", "in1", "VDD", "VSS", "in2", "in3"]
    );
    // Straps only block the opposite side.
    assert_eq!(
        view.sides[Side::Right],
        vec!["out0", "out1", "out2", "out3"]
    );
    assert!(view.pins.iter().all(|p| p.name != "VDD" && p.name != "VSS"));
    assert_eq!(view.straps.len(), 2);
}

#[test]
fn interlaced_pairs_follow_each_group() {
    let view = run(
        &ports(4, 4),
        r#"
        [pg_pins]
        pg_pin_placement = "interlaced"
        interlace_interval = 2
        "#,
    )
    .unwrap();

    assert_eq!(view.boundary.internal_box.height(), 2200);
    assert_eq!(spans(&view, "VDD", Axis::Y), vec![(600, 700), (1800, 1900)]);
    assert_eq!(spans(&view, "VSS", Axis::Y), vec![(900, 1000), (2100, 2200)]);
    let lows: Vec<i64> = (0..4)
        .map(|i| rect_of(&view, &format!("in{i}")).min_y)
        .collect();
    assert_eq!(lows, vec![0, 300, 1200, 1500]);
    assert_eq!(
        view.sides[Side::Left],
        vec!["in0", "in1", "VDD", "VSS", "in2", "in3"]
    );
}

#[test]
fn vertical_straps_cross_bottom_and_top() {
    let view = run(
        &ports(2, 2),
        r#"
        input_side = "bottom"
        output_side = "top"

        [pg_pins]
        pg_pin_placement = "straps"
        strap_orientation = "vertical"
        "#,
    )
    .unwrap();

    assert_eq!(view.boundary.internal_box.width(), 1000);
    let vdd = view.pin("VDD").unwrap();
    assert_eq!(vdd.layer, "M3");
    assert_eq!(vdd.side, Side::Bottom);
    assert_eq!(spans(&view, "VDD", Axis::X), vec![(300, 400)]);
    assert_eq!(spans(&view, "VSS", Axis::X), vec![(600, 700)]);
    assert_eq!(rect_of(&view, "in0").min_x, 0);
    assert_eq!(rect_of(&view, "in1").min_x, 900);
    assert_eq!(view.sides[Side::Bottom], vec!["in0", "VDD", "VSS", "in1"]);
    assert_eq!(view.sides[Side::Top], vec!["out0", "out1"]);
}

#[test]
fn pinned_power_strap() {
    let view = run(
        &ports(4, 0),
        r#"
        [pg_pins]
        pg_pin_placement = "straps"

        [pg_pins.pwr_pin]
        center = 2.0
        "#,
    )
    .unwrap();

    assert_eq!(view.boundary.internal_box.height(), 2350);
    assert_eq!(spans(&view, "VDD", Axis::Y), vec![(1950, 2050)]);
    assert_eq!(spans(&view, "VSS", Axis::Y), vec![(2250, 2350)]);
    assert_eq!(rect_of(&view, "in3").min_y, 900);
}

#[test]
fn strap_width_and_spacing_overrides() {
    let view = run(
        &ports(2, 0),
        r#"
        [pg_pins]
        pg_pin_placement = "straps"
        strap_width = 0.2
        strap_spacing = 0.4
        "#,
    )
    .unwrap();

    assert_eq!(spans(&view, "VDD", Axis::Y), vec![(300, 500)]);
    assert_eq!(spans(&view, "VSS", Axis::Y), vec![(900, 1100)]);
    assert_eq!(rect_of(&view, "in1").min_y, 1300);
    assert_eq!(view.boundary.internal_box.height(), 1400);
}

#[test]
fn strap_spacing_below_pitch() {
    let err = run(
        &ports(2, 0),
        r#"
        [pg_pins]
        pg_pin_placement = "straps"
        strap_spacing = 0.1
        "#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidValue { ref key, .. } if key == "pg_pins.strap_spacing"
    ));
}

#[rstest]
#[case("straps")]
#[case("interlaced")]
fn straps_respect_strict_height(#[case] placement: &str) {
    let err = run(
        &ports(4, 4),
        &format!(
            r#"
            y_width = 1.0
            y_strictness = "strict"

            [pg_pins]
            pg_pin_placement = "{placement}"
            "#
        ),
    )
    .unwrap_err();
    match err {
        Error::Infeasible {
            attempts, unplaced, ..
        } => {
            assert_eq!(attempts, 1);
            assert!(unplaced.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn strap_pair_steps_over_pinned_pin() {
    let view = run(
        &ports(4, 0),
        r#"
        [pg_pins]
        pg_pin_placement = "straps"

        [pins.in1]
        center = 0.65
        "#,
    )
    .unwrap();

    assert_eq!(rect_of(&view, "in1").span(Axis::Y), (600, 700));
    // The pair would start at 0.6 um; it moves one pitch past in1.
    assert_eq!(spans(&view, "VDD", Axis::Y), vec![(900, 1000)]);
    assert_eq!(spans(&view, "VSS", Axis::Y), vec![(1200, 1300)]);
    assert_eq!(view.boundary.internal_box.height(), 1600);
    assert_eq!(rect_of(&view, "in0").min_y, 0);
    assert_eq!(rect_of(&view, "in2").min_y, 300);
    assert_eq!(rect_of(&view, "in3").min_y, 1500);
    assert_eq!(
        view.sides[Side::Left],
        vec!["in0", "in2", "in1", "VDD", "VSS", "in3"]
    );
}

#[rstest]
#[case::straps_pinned_on_primary(
    0,
    "pg_pin_placement = \"straps\"",
    "[pins.in1]\ncenter = 0.65",
    1600,
    vec![(900, 1000)],
    vec![(1200, 1300)]
)]
#[case::straps_pinned_on_opposite(
    1,
    "pg_pin_placement = \"straps\"",
    "[pins.out0]\ncenter = 0.65",
    1900,
    vec![(900, 1000)],
    vec![(1200, 1300)]
)]
#[case::interlaced_pinned_on_primary(
    0,
    "pg_pin_placement = \"interlaced\"\ninterlace_interval = 2",
    "[pins.in1]\ncenter = 0.65",
    2200,
    vec![(900, 1000), (1800, 1900)],
    vec![(1200, 1300), (2100, 2200)]
)]
#[case::interlaced_pinned_on_opposite(
    1,
    "pg_pin_placement = \"interlaced\"\ninterlace_interval = 2",
    "[pins.out0]\ncenter = 0.65",
    2500,
    vec![(900, 1000), (2100, 2200)],
    vec![(1200, 1300), (2400, 2500)]
)]
fn straps_clear_pinned_pins(
    #[case] n_out: usize,
    #[case] placement: &str,
    #[case] pinned: &str,
    #[case] height: i64,
    #[case] vdd: Vec<(i64, i64)>,
    #[case] vss: Vec<(i64, i64)>,
) {
    let view = run(&ports(4, n_out), &format!("[pg_pins]\n{placement}\n\n{pinned}\n")).unwrap();

    assert_eq!(view.boundary.internal_box.height(), height);
    assert_eq!(spans(&view, "VDD", Axis::Y), vdd);
    assert_eq!(spans(&view, "VSS", Axis::Y), vss);
    assert_eq!(rect_of(&view, "in3").min_y, 1500);
}

#[test]
fn pinned_power_strap_on_pinned_pin() {
    let err = run(
        &ports(4, 0),
        r#"
        [pg_pins]
        pg_pin_placement = "straps"

        [pg_pins.pwr_pin]
        center = 0.8

        [pins.in1]
        center = 0.65
        "#,
    )
    .unwrap_err();
    assert!(err.is_configuration_error());
    assert!(matches!(
        err,
        Error::InvalidValue { ref key, .. } if key == "pg_pins.pwr_pin.center"
    ));
}
