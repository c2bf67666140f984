// SPDX-License-Identifier: Apache-2.0

//! Geometric checks run on every produced view.

pub mod contained;
pub mod overlap;

use crate::error::Result;
use crate::geometry::Rect;
use crate::model::AbstractView;
use crate::tech::LayerRules;

/// Verifies that pins and straps keep their pitch and stay inside the
/// outline, and that blockages stay inside the internal box.
pub fn check_view(view: &AbstractView, rules: &LayerRules) -> Result<()> {
    overlap::check_view(view, rules)?;

    let shapes: Vec<(String, Vec<Rect>)> = view
        .pins
        .iter()
        .chain(view.straps.iter())
        .map(|p| (p.name.clone(), p.rects.clone()))
        .collect();
    contained::check("design boundary", &view.boundary.design_boundary, &shapes)?;

    let blockages: Vec<(String, Vec<Rect>)> = view
        .blockages
        .iter()
        .map(|b| (format!("blockage on {}", b.layer), vec![b.rect]))
        .collect();
    contained::check("internal box", &view.boundary.internal_box, &blockages)
}
