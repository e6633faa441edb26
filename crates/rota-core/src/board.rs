//! One day's assignment board: server records, pending operations, and the
//! translation of drops into backend mutations.
//!
//! A drop is handled in two halves so the caller never has to block the
//! view on the network:
//!
//! ```ignore
//! let ticket = board.plan_drop(volunteer, target)?;   // view already updated
//! let result = gateway.send(&ticket.mutation);         // may happen later
//! board.settle(ticket, result, &reporter);             // always resolves
//! ```
//!
//! [`DayBoard::on_drop`] does all three in one call.

use tracing::{debug, info, warn};

use crate::catalog::YearCatalog;
use crate::config::BoardConfig;
use crate::error::RotaError;
use crate::gateway::{ErrorReporter, GatewayError, Mutation, MutationGateway, NewAssignment};
use crate::model::{Assignment, Attendance, DayId, DropTarget, VolunteerId};
use crate::pending::{OperationKey, PendingOperations};
use crate::reconcile::{EffectiveView, compute_effective_view};
use crate::select::ClickSelection;

/// A drop that has been applied optimistically and still needs its
/// mutation sent and settled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a ticket must be settled or its optimistic change stays on the board"]
pub struct DropTicket {
    /// Pending operation backing the optimistic change. `None` when the
    /// volunteer was not shown in any slot, so there was nothing to hide.
    pub key: Option<OperationKey>,
    pub volunteer: VolunteerId,
    pub mutation: Mutation,
}

#[derive(Debug, Clone)]
pub struct DayBoard {
    day: DayId,
    catalog: YearCatalog,
    assignments: Vec<Assignment>,
    pending: PendingOperations,
    config: BoardConfig,
}

impl DayBoard {
    #[must_use]
    pub fn new(
        day: DayId,
        catalog: YearCatalog,
        assignments: Vec<Assignment>,
        config: BoardConfig,
    ) -> Self {
        let assignments = keep_day(day, assignments);
        Self {
            day,
            catalog,
            assignments,
            pending: PendingOperations::new(),
            config,
        }
    }

    #[must_use]
    pub const fn day(&self) -> DayId {
        self.day
    }

    #[must_use]
    pub const fn catalog(&self) -> &YearCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    #[must_use]
    pub const fn pending(&self) -> &PendingOperations {
        &self.pending
    }

    /// Replace the server records after a refetch.
    ///
    /// Records for other days are dropped here, as in [`DayBoard::new`].
    pub fn refresh(&mut self, assignments: Vec<Assignment>) {
        self.assignments = keep_day(self.day, assignments);
        debug!(day = %self.day, count = self.assignments.len(), "refreshed day assignments");
    }

    /// Current derived view for rendering.
    #[must_use]
    pub fn effective_view(&self) -> EffectiveView {
        compute_effective_view(&self.assignments, &self.pending, &self.catalog)
    }

    /// The persisted record for `volunteer` on this day, if any.
    ///
    /// Pending operations are never consulted: an update or delete needs the
    /// record the server actually holds. If the backend holds more than one,
    /// the first in fetch order is used.
    #[must_use]
    pub fn existing_assignment(&self, volunteer: VolunteerId) -> Option<&Assignment> {
        let form = self.catalog.volunteer(volunteer)?.form_id;
        let mut matches = self
            .assignments
            .iter()
            .filter(|a| a.form_id == form);
        let first = matches.next();
        if first.is_some() && matches.next().is_some() {
            warn!(
                day = %self.day,
                volunteer_id = %volunteer,
                "several assignments for one volunteer on this day; using the first"
            );
        }
        first
    }

    /// Apply a drop optimistically and return the mutation to send.
    ///
    /// Returns `Ok(None)` when the drop changes nothing: the volunteer is
    /// already shown in the target slot, or is dropped on the unassigned
    /// area without a persisted record to delete.
    ///
    /// A record that is not shown anywhere (no position, or a position
    /// missing from the catalog) is still deleted; only the optimistic
    /// removal is skipped.
    ///
    /// # Errors
    ///
    /// - [`RotaError::UnknownVolunteer`] if the volunteer has no form this year.
    /// - [`RotaError::UnknownPosition`], [`RotaError::UnknownHall`] or
    ///   [`RotaError::HallNotAllowed`] for an invalid target.
    /// - [`RotaError::VolunteerBusy`] if a previous drop of the same volunteer
    ///   is still in flight and overlapping drags are disabled.
    pub fn plan_drop(
        &mut self,
        volunteer: VolunteerId,
        target: DropTarget,
    ) -> Result<Option<DropTicket>, RotaError> {
        let form_id = self
            .catalog
            .volunteer(volunteer)
            .ok_or(RotaError::UnknownVolunteer(volunteer))?
            .form_id;

        if let Some(slot) = target.slot() {
            self.catalog.check_slot(slot)?;
        }

        if !self.config.allow_overlapping_drags && self.pending.has_pending_for(volunteer) {
            return Err(RotaError::VolunteerBusy(volunteer));
        }

        let existing = self.existing_assignment(volunteer).map(|a| a.id);
        let current = self.effective_view().slot_of(volunteer);

        let (key, mutation) = match target.slot() {
            None => {
                let Some(assignment_id) = existing else {
                    debug!(%volunteer, "drop on unassigned area changes nothing");
                    return Ok(None);
                };
                let key = current
                    .map(|slot| self.pending.begin_remove(volunteer, slot.position, slot.hall));
                (key, Mutation::Delete { assignment_id })
            }
            Some(slot) if current == Some(slot) => {
                debug!(%volunteer, %slot, "drop on current slot changes nothing");
                return Ok(None);
            }
            Some(slot) => {
                let mutation = match existing {
                    Some(assignment_id) => Mutation::Update {
                        assignment_id,
                        position_id: slot.position,
                        hall_id: slot.hall,
                    },
                    None => Mutation::Create(NewAssignment {
                        application_form_id: form_id,
                        day_id: self.day,
                        position_id: slot.position,
                        hall_id: slot.hall,
                        information: String::new(),
                        attendance: Attendance::Unknown,
                    }),
                };
                let key = self.pending.begin_add(volunteer, slot.position, slot.hall);
                (Some(key), mutation)
            }
        };

        info!(
            day = %self.day,
            %volunteer,
            key = ?key,
            operation = mutation.operation_name(),
            "planned assignment change"
        );
        Ok(Some(DropTicket {
            key,
            volunteer,
            mutation,
        }))
    }

    /// Finish a ticket once its mutation has been answered.
    ///
    /// The pending operation is resolved whatever the outcome. A failure is
    /// handed to `reporter`, which owns surfacing it; the view then falls
    /// back to the server records.
    pub fn settle(
        &mut self,
        ticket: DropTicket,
        result: Result<(), GatewayError>,
        reporter: &dyn ErrorReporter,
    ) {
        if let Some(key) = ticket.key {
            self.pending.resolve(key);
        }
        let operation = ticket.mutation.operation_name();
        match result {
            Ok(()) => debug!(
                key = ?ticket.key,
                volunteer_id = %ticket.volunteer,
                operation,
                "assignment change accepted"
            ),
            Err(err) => {
                debug!(
                    key = ?ticket.key,
                    volunteer_id = %ticket.volunteer,
                    operation,
                    "assignment change reverted to server state"
                );
                reporter.report(operation, &err);
            }
        }
    }

    /// Plan a drop, send its mutation through `gateway`, and settle it.
    ///
    /// Returns whether a mutation was sent. A failed mutation is not an
    /// error here; it goes to `reporter`.
    ///
    /// # Errors
    ///
    /// Same as [`DayBoard::plan_drop`].
    pub fn on_drop<G: MutationGateway + ?Sized>(
        &mut self,
        volunteer: VolunteerId,
        target: DropTarget,
        gateway: &G,
        reporter: &dyn ErrorReporter,
    ) -> Result<bool, RotaError> {
        let Some(ticket) = self.plan_drop(volunteer, target)? else {
            return Ok(false);
        };
        let result = gateway.send(&ticket.mutation);
        self.settle(ticket, result, reporter);
        Ok(true)
    }

    /// Place the click-selected volunteer, if any, on `target`.
    ///
    /// The selection is cleared whether or not the placement succeeds.
    ///
    /// # Errors
    ///
    /// Same as [`DayBoard::plan_drop`].
    pub fn place_selected(
        &mut self,
        selection: &mut ClickSelection,
        target: DropTarget,
    ) -> Result<Option<DropTicket>, RotaError> {
        match selection.take() {
            Some(volunteer) => self.plan_drop(volunteer, target),
            None => Ok(None),
        }
    }
}

fn keep_day(day: DayId, mut assignments: Vec<Assignment>) -> Vec<Assignment> {
    let before = assignments.len();
    assignments.retain(|a| a.day_id == day);
    let dropped = before - assignments.len();
    if dropped > 0 {
        warn!(%day, dropped, "ignoring assignments for other days");
    }
    assignments
}
