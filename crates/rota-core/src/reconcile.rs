//! Effective assignment view: server truth with pending operations on top.
//!
//! [`compute_effective_view`] is a pure function of its inputs. It rebuilds
//! the whole view on every call, so a volunteer can never be left in two
//! slots (or none) by a stale partial update.
//!
//! # Placement rules
//!
//! 1. Server records are read in fetch order. Each is resolved to a
//!    volunteer through its form id; unresolvable records are skipped, and
//!    only the first record per volunteer counts.
//! 2. Pending operations are replayed in key (creation) order. `Add` moves
//!    the volunteer to its slot. `Remove` vacates the slot it names, if the
//!    volunteer is still there.
//! 3. Whatever is left without a valid slot is unassigned.
//!
//! Every catalog volunteer therefore lands in exactly one place: one
//! position's general list, one hall list, or the unassigned list.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::YearCatalog;
use crate::model::{Assignment, Hall, Position, Slot, Volunteer, VolunteerId};
use crate::pending::{OperationKind, PendingOperations};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HallView {
    pub hall: Hall,
    pub volunteers: Vec<Volunteer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionView {
    pub position: Position,
    /// Volunteers placed on the position without a hall.
    pub general: Vec<Volunteer>,
    /// One entry per year hall when the position has halls, otherwise empty.
    pub halls: Vec<HallView>,
}

impl PositionView {
    /// General plus hall assignments.
    #[must_use]
    pub fn total_assigned(&self) -> usize {
        self.general.len() + self.halls.iter().map(|h| h.volunteers.len()).sum::<usize>()
    }
}

/// Where a volunteer appears in an [`EffectiveView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Location {
    Slot { slot: Slot },
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EffectiveView {
    pub positions: Vec<PositionView>,
    pub unassigned: Vec<Volunteer>,
}

impl EffectiveView {
    /// Locate a volunteer; `None` if it is not part of the view at all.
    #[must_use]
    pub fn location_of(&self, volunteer: VolunteerId) -> Option<Location> {
        if self.unassigned.iter().any(|v| v.id == volunteer) {
            return Some(Location::Unassigned);
        }
        self.slot_of(volunteer).map(|slot| Location::Slot { slot })
    }

    /// The slot a volunteer occupies, `None` when unassigned or absent.
    #[must_use]
    pub fn slot_of(&self, volunteer: VolunteerId) -> Option<Slot> {
        for pv in &self.positions {
            if pv.general.iter().any(|v| v.id == volunteer) {
                return Some(Slot::general(pv.position.id));
            }
            for hv in &pv.halls {
                if hv.volunteers.iter().any(|v| v.id == volunteer) {
                    return Some(Slot::hall(pv.position.id, hv.hall.id));
                }
            }
        }
        None
    }

    /// Volunteers in `slot`, or `None` if the view has no such slot.
    #[must_use]
    pub fn volunteers_in(&self, slot: Slot) -> Option<&[Volunteer]> {
        let pv = self.positions.iter().find(|p| p.position.id == slot.position)?;
        match slot.hall {
            None => Some(&pv.general),
            Some(hall) => pv
                .halls
                .iter()
                .find(|h| h.hall.id == hall)
                .map(|h| h.volunteers.as_slice()),
        }
    }

    #[must_use]
    pub fn total_assigned(&self) -> usize {
        self.positions.iter().map(PositionView::total_assigned).sum()
    }
}

/// Resolve where a server record places its volunteer.
///
/// A hall the position cannot hold falls back to the position's general
/// list; an unknown position yields no slot.
fn server_slot(assignment: &Assignment, catalog: &YearCatalog) -> Option<Slot> {
    let position_id = assignment.position_id?;
    let Some(position) = catalog.position(position_id) else {
        warn!(
            assignment_id = %assignment.id,
            position_id = %position_id,
            "assignment names a position outside the catalog; showing volunteer as unassigned"
        );
        return None;
    };

    match assignment.hall_id {
        Some(hall) if position.has_halls && catalog.hall(hall).is_some() => {
            Some(Slot::hall(position.id, hall))
        }
        Some(hall) => {
            warn!(
                assignment_id = %assignment.id,
                position_id = %position.id,
                hall_id = %hall,
                "assignment hall is not valid for its position; using the general list"
            );
            Some(Slot::general(position.id))
        }
        None => Some(Slot::general(position.id)),
    }
}

/// Build the effective view from server assignments, pending operations and
/// the year catalog.
#[must_use]
pub fn compute_effective_view(
    assignments: &[Assignment],
    pending: &PendingOperations,
    catalog: &YearCatalog,
) -> EffectiveView {
    let mut placement: HashMap<VolunteerId, Option<Slot>> = HashMap::new();

    for assignment in assignments {
        let Some(volunteer) = catalog.volunteer_by_form(assignment.form_id) else {
            warn!(
                assignment_id = %assignment.id,
                form_id = %assignment.form_id,
                "assignment references an unknown registration form; dropping it from the view"
            );
            continue;
        };
        if placement.contains_key(&volunteer.id) {
            warn!(
                assignment_id = %assignment.id,
                volunteer_id = %volunteer.id,
                "duplicate assignment for volunteer on this day; keeping the first"
            );
            continue;
        }
        placement.insert(volunteer.id, server_slot(assignment, catalog));
    }

    for (key, op) in pending.iter() {
        if catalog.volunteer(op.volunteer).is_none() {
            debug!(%key, volunteer_id = %op.volunteer, "pending operation for unknown volunteer ignored");
            continue;
        }
        let current = placement.entry(op.volunteer).or_insert(None);
        match op.kind {
            OperationKind::Add => *current = Some(op.slot),
            OperationKind::Remove => {
                if *current == Some(op.slot) {
                    *current = None;
                }
            }
        }
    }

    let mut buckets: HashMap<Slot, Vec<Volunteer>> = HashMap::new();
    let mut unassigned = Vec::new();

    for volunteer in catalog.volunteers() {
        match placement.get(&volunteer.id).copied().flatten() {
            Some(slot) if catalog.slot_is_valid(slot) => {
                buckets.entry(slot).or_default().push(volunteer.clone());
            }
            Some(slot) => {
                warn!(volunteer_id = %volunteer.id, %slot, "pending slot is not on the board; showing volunteer as unassigned");
                unassigned.push(volunteer.clone());
            }
            None => unassigned.push(volunteer.clone()),
        }
    }

    let positions = catalog
        .positions()
        .iter()
        .map(|position| {
            let general = buckets
                .remove(&Slot::general(position.id))
                .unwrap_or_default();
            let halls = if position.has_halls {
                catalog
                    .halls()
                    .iter()
                    .map(|hall| HallView {
                        hall: hall.clone(),
                        volunteers: buckets
                            .remove(&Slot::hall(position.id, hall.id))
                            .unwrap_or_default(),
                    })
                    .collect()
            } else {
                Vec::new()
            };
            PositionView {
                position: position.clone(),
                general,
                halls,
            }
        })
        .collect();

    EffectiveView {
        positions,
        unassigned,
    }
}
