// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use rstar::{AABB, RTree, RTreeObject};

use crate::error::{Error, Result};
use crate::geometry::{Rect, Side};
use crate::model::AbstractView;
use crate::tech::LayerRules;

struct BBoxWrapper {
    index: usize,
    envelope: AABB<[i64; 2]>,
}

impl RTreeObject for BBoxWrapper {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Checks that no two shapes in `shapes` overlap. Abutting shapes are
/// allowed.
pub fn check(side: Side, layer: &str, shapes: &[(String, Rect)]) -> Result<()> {
    if shapes.len() < 2 {
        return Ok(());
    }

    let aabbs = shapes
        .iter()
        .map(|(_, r)| AABB::from_corners([r.min_x, r.min_y], [r.max_x, r.max_y]))
        .collect::<Vec<_>>();

    let rtree = RTree::bulk_load(
        aabbs
            .iter()
            .enumerate()
            .map(|(index, aabb)| BBoxWrapper {
                index,
                envelope: *aabb,
            })
            .collect::<Vec<_>>(),
    );

    for (i, aabb) in aabbs.iter().enumerate() {
        for candidate in rtree.locate_in_envelope_intersecting(aabb) {
            let j = candidate.index;
            // each pair is reported once, from its lower index
            if j <= i {
                continue;
            }
            // the rtree counts abutted boxes as intersecting
            if !shapes[i].1.intersects(&shapes[j].1) {
                continue;
            }
            return Err(Error::Overlap {
                side,
                layer: layer.to_string(),
                first: shapes[i].0.clone(),
                second: shapes[j].0.clone(),
            });
        }
    }
    Ok(())
}

/// Groups the shapes of `view` by side and layer, expands each by half the
/// layer pitch along its side, and checks every group. Straps take part on
/// both sides they cross.
pub fn check_view(view: &AbstractView, rules: &LayerRules) -> Result<()> {
    let mut groups: IndexMap<(Side, String), Vec<(String, Rect)>> = IndexMap::new();

    let mut add = |side: Side, layer: &str, name: &str, rect: &Rect| {
        let half_pitch = rules.pitch_of(layer) / 2;
        groups
            .entry((side, layer.to_string()))
            .or_default()
            .push((name.to_string(), rect.expand(side.free_axis(), half_pitch)));
    };

    for pin in &view.pins {
        for rect in &pin.rects {
            add(pin.side, &pin.layer, &pin.name, rect);
        }
    }
    for strap in &view.straps {
        for rect in &strap.rects {
            add(strap.side, &strap.layer, &strap.name, rect);
            add(strap.side.opposite(), &strap.layer, &strap.name, rect);
        }
    }

    for ((side, layer), shapes) in &groups {
        check(*side, layer, shapes)?;
    }
    Ok(())
}
