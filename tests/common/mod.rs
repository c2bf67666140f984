// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use bbox_phy::{AbstractView, PlacementSpec, PortList, PortSpec, Rect, Result, Technology};
use tempfile::TempDir;

pub const TECH_JSON: &str = r#"{
    "name": "toy",
    "grid_unit": "0.001",
    "stackups": [
        {
            "name": "toy_stackup",
            "metals": [
                {"name": "M1", "index": 1, "direction": "vertical",
                 "min_width": 0.05, "pitch": 0.1},
                {"name": "M2", "index": 2, "direction": "horizontal",
                 "min_width": 0.1, "pitch": 0.2},
                {"name": "M3", "index": 3, "direction": "vertical",
                 "min_width": 0.1, "pitch": 0.2},
                {"name": "M4", "index": 4, "direction": "horizontal",
                 "min_width": 0.2, "pitch": 0.4}
            ]
        }
    ]
}"#;

pub fn tech() -> Technology {
    Technology::from_json_str(TECH_JSON).unwrap()
}

pub fn spec(toml: &str) -> PlacementSpec {
    PlacementSpec::builder()
        .toml_str(toml)
        .unwrap()
        .build()
        .unwrap()
}

/// Module with `n_in` single-bit inputs and `n_out` single-bit outputs.
pub fn ports(n_in: usize, n_out: usize) -> PortList {
    let mut list = PortList::new("bb");
    for i in 0..n_in {
        list = list.with_port(PortSpec::input(format!("in{i}")));
    }
    for i in 0..n_out {
        list = list.with_port(PortSpec::output(format!("out{i}")));
    }
    list
}

pub fn run(ports: &PortList, toml: &str) -> Result<AbstractView> {
    bbox_phy::generate(&tech(), ports, &spec(toml))
}

pub fn rect_of(view: &AbstractView, name: &str) -> Rect {
    view.pin(name)
        .unwrap_or_else(|| panic!("pin {name} not found"))
        .rects[0]
}

/// Writes `contents` to `name` inside `dir` and returns the path.
pub fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}
