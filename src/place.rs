// SPDX-License-Identifier: Apache-2.0

//! The pin placement engine.

mod fixed;
mod free;
mod sizing;
mod subpartition;

pub use free::{Distributed, MinPitch, SpacingStrategy};
pub use sizing::{Demand, Layout};
pub use subpartition::{split_interval, subpartition};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::catalog::{Catalog, Pin};
use crate::config::{PlacementSpec, Strictness};
use crate::error::{Error, Result};
use crate::geometry::{Axis, Interval, Rect, SideMap};
use crate::model::{AbstractView, Blockage, PlacedPin};
use crate::tech::LayerRules;
use crate::validate;

use fixed::FixedOutcome;

/// Whether a side occupant belongs to the side or only blocks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The side owns the shape.
    Real,
    /// A strap owned by the opposite side, seen here as a keepout.
    KeepoutOnly,
}

/// A shape that blocks part of a side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideOccupant {
    pub pin: String,
    pub rect: Rect,
    pub layer: String,
    pub pitch: i64,
    pub presence: Presence,
}

/// Rectangle for `pin` starting at `lo` along its side, flush against the
/// side's edge of `outline`.
pub(crate) fn flush_rect(outline: &Rect, pin: &Pin, lo: i64) -> Rect {
    let axis = pin.side.free_axis();
    let (edge_lo, edge_hi) = outline.span(axis.other());
    let across = if pin.side.is_low() {
        (edge_lo, edge_lo + pin.across())
    } else {
        (edge_hi - pin.across(), edge_hi)
    };
    Rect::from_spans(axis, (lo, lo + pin.along()), across)
}

/// Mutable state of one placement attempt.
#[derive(Debug, Clone)]
pub(crate) struct Attempt {
    pub(crate) layout: Layout,
    /// Pins with an explicit center.
    pub(crate) fixed: Vec<Pin>,
    pub(crate) straps: Vec<Pin>,
    /// Pins waiting for free placement, per side, in catalog order.
    pub(crate) queues: SideMap<Vec<Pin>>,
    pub(crate) occupants: SideMap<Vec<SideOccupant>>,
}

impl Attempt {
    fn new(layout: Layout, catalog: &Catalog) -> Attempt {
        let mut fixed = Vec::new();
        let mut queues: SideMap<Vec<Pin>> = SideMap::default();
        for pin in &catalog.pins {
            if pin.center.is_some() {
                fixed.push(pin.clone());
            } else {
                queues[pin.side].push(pin.clone());
            }
        }
        Attempt {
            layout,
            fixed,
            straps: catalog.straps.clone(),
            queues,
            occupants: SideMap::default(),
        }
    }

    fn unplaced(&self) -> impl Iterator<Item = &Pin> {
        self.queues.values().flatten().filter(|p| !p.is_placed())
    }
}

/// Floors to apply before sizing again.
#[derive(Debug, Clone)]
struct Growth {
    floors: Vec<(Axis, i64)>,
    reason: String,
    unplaced: Vec<String>,
}

#[derive(Debug)]
enum State {
    Sizing,
    FixedPlacement(Attempt),
    Subpartition(Attempt),
    FreePlacement(Attempt, SideMap<Vec<Interval>>),
    Check(Attempt),
    Resize(Growth),
    Done(Attempt),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Sizing => "sizing",
            State::FixedPlacement(_) => "fixed placement",
            State::Subpartition(_) => "subpartition",
            State::FreePlacement(..) => "free placement",
            State::Check(_) => "check",
            State::Resize(_) => "resize",
            State::Done(_) => "done",
        }
    }
}

/// Drives sizing, fixed placement, subpartitioning and free placement,
/// growing the boundary until every pin fits.
pub struct PinPlacer<'a> {
    catalog: &'a Catalog,
    spec: &'a PlacementSpec,
    rules: &'a LayerRules,
}

impl<'a> PinPlacer<'a> {
    pub fn new(catalog: &'a Catalog, spec: &'a PlacementSpec, rules: &'a LayerRules) -> Self {
        PinPlacer {
            catalog,
            spec,
            rules,
        }
    }

    fn growable(&self, axis: Axis) -> bool {
        !(self.spec.explicit_width(axis).is_some()
            && self.spec.strictness(axis) == Strictness::Strict)
    }

    /// Floors that make room for the pins left in the queues, or `None` when
    /// every pin was placed.
    fn growth_for(&self, attempt: &Attempt) -> Option<Growth> {
        let unplaced: Vec<&Pin> = attempt.unplaced().collect();
        if unplaced.is_empty() {
            return None;
        }
        let mut extra: SideMap<i64> = SideMap::default();
        for pin in &unplaced {
            warn!("Unplaced pin {} on the {} side", pin.name, pin.side);
            extra[pin.side] += pin.along() + pin.pitch;
        }
        let floors = [Axis::X, Axis::Y]
            .into_iter()
            .filter_map(|axis| {
                extra
                    .iter()
                    .filter(|(side, _)| side.free_axis() == axis)
                    .map(|(_, extra)| *extra)
                    .max()
                    .filter(|&extra| extra > 0)
                    .map(|extra| (axis, attempt.layout.internal_extent(axis) + extra))
            })
            .collect();
        Some(Growth {
            floors,
            reason: format!("{} pin(s) did not fit", unplaced.len()),
            unplaced: unplaced.iter().map(|p| p.name.clone()).collect(),
        })
    }

    pub fn run(&self) -> Result<AbstractView> {
        let mut demand = Demand::default();
        let mut attempts = 0;
        let mut state = State::Sizing;

        loop {
            debug!("Placement attempt {attempts}: {}", state.name());
            state = match state {
                State::Sizing => {
                    attempts += 1;
                    let layout =
                        sizing::size_boundary(&self.catalog.pins, self.spec, self.rules, &demand)?;
                    State::FixedPlacement(Attempt::new(layout, self.catalog))
                }
                State::FixedPlacement(mut attempt) => {
                    fixed::place_pinned(&mut attempt);
                    match fixed::place_straps(&mut attempt, self.spec)? {
                        FixedOutcome::Placed => State::Subpartition(attempt),
                        FixedOutcome::Resize { axis, floor } => State::Resize(Growth {
                            floors: vec![(axis, floor)],
                            reason: format!("straps do not fit along {axis}"),
                            unplaced: Vec::new(),
                        }),
                    }
                }
                State::Subpartition(attempt) => {
                    let intervals = attempt.occupants.map(|side, occupants| {
                        subpartition(attempt.layout.free_span(side), occupants, side.free_axis())
                    });
                    State::FreePlacement(attempt, intervals)
                }
                State::FreePlacement(mut attempt, intervals) => {
                    let strategy = free::strategy(self.spec.pin_spacing);
                    let outline = *attempt.layout.outline();
                    for (side, queue) in attempt.queues.iter_mut() {
                        let mut rest: &mut [Pin] = queue;
                        for interval in &intervals[side] {
                            if rest.is_empty() {
                                break;
                            }
                            rest = strategy.fill(*interval, &outline, std::mem::take(&mut rest));
                        }
                    }
                    State::Check(attempt)
                }
                State::Check(attempt) => match self.growth_for(&attempt) {
                    None => State::Done(attempt),
                    Some(growth) => State::Resize(growth),
                },
                State::Resize(growth) => {
                    let infeasible = |reason: String| Error::Infeasible {
                        attempts,
                        reason,
                        unplaced: growth.unplaced.clone(),
                    };
                    if !self.spec.auto_resize {
                        return Err(infeasible(format!(
                            "{}; automatic resizing is disabled",
                            growth.reason
                        )));
                    }
                    let fixed_axis = growth.floors.iter().find(|(axis, _)| !self.growable(*axis));
                    if let Some((axis, _)) = fixed_axis {
                        return Err(infeasible(format!(
                            "{}; the strict {axis} width cannot grow",
                            growth.reason
                        )));
                    }
                    if attempts >= self.spec.max_attempts {
                        return Err(infeasible(format!(
                            "{}; retry limit of {} reached",
                            growth.reason, self.spec.max_attempts
                        )));
                    }
                    for (axis, floor) in &growth.floors {
                        debug!(
                            "Growing {axis} to at least {} um",
                            self.spec.grid.to_microns(*floor)
                        );
                        demand.raise(*axis, *floor);
                    }
                    State::Sizing
                }
                State::Done(attempt) => return self.finish(attempt, attempts),
            };
        }
    }

    fn finish(&self, attempt: Attempt, attempts: usize) -> Result<AbstractView> {
        let Attempt {
            layout,
            fixed,
            straps,
            queues,
            mut occupants,
        } = attempt;

        let mut pins: Vec<Pin> = fixed;
        for (_, queue) in queues.iter() {
            for pin in queue {
                if let Some(&rect) = pin.rects.first() {
                    occupants[pin.side].push(SideOccupant {
                        pin: pin.name.clone(),
                        rect,
                        layer: pin.layer.clone(),
                        pitch: pin.pitch,
                        presence: Presence::Real,
                    });
                }
            }
            pins.extend(queue.iter().cloned());
        }
        pins.sort_by_key(|p| p.index);

        let sides: SideMap<Vec<String>> = occupants.map(|side, occupants| {
            occupants
                .iter()
                .filter(|o| o.presence == Presence::Real)
                .sorted_by_key(|o| o.rect.span(side.free_axis()).0)
                .map(|o| o.pin.clone())
                .unique()
                .collect()
        });

        let internal_box = layout.boundary.internal_box;
        let blockages = self
            .rules
            .iter()
            .filter(|rule| !self.spec.exclude_layers.contains(&rule.name))
            .map(|rule| Blockage {
                layer: rule.name.clone(),
                rect: internal_box,
            })
            .collect();

        let view = AbstractView {
            name: self.catalog.name.clone(),
            grid: self.spec.grid,
            symmetry: self.spec.symmetry.clone(),
            site: self.spec.site.clone(),
            boundary: layout.boundary,
            pins: pins.iter().map(PlacedPin::from_pin).collect(),
            straps: straps
                .iter()
                .filter(|s| s.is_placed())
                .map(PlacedPin::from_pin)
                .collect(),
            blockages,
            sides,
            n_inputs: self.catalog.n_inputs,
            n_outputs: self.catalog.n_outputs,
        };
        validate::check_view(&view, self.rules)?;

        let (width, height) = view.size_microns();
        info!(
            "Placed {} pin(s) and {} strap net(s) for {}",
            view.pins.len(),
            view.straps.len(),
            view.name
        );
        info!("Outline is {width} x {height} um after {attempts} attempt(s)");
        Ok(view)
    }
}
