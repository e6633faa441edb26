//! Year-scoped read-only catalogs: positions, halls and volunteers.
//!
//! Halls belong to the year, not to a position: every hall of the year is
//! offered under every position flagged `has_halls`.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::error::RotaError;
use crate::model::{
    FormId, Hall, HallId, Position, PositionId, RegistrationForm, Slot, Volunteer, VolunteerId,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct YearCatalog {
    positions: Vec<Position>,
    halls: Vec<Hall>,
    volunteers: Vec<Volunteer>,
    #[serde(skip)]
    by_volunteer: HashMap<VolunteerId, usize>,
    #[serde(skip)]
    by_form: HashMap<FormId, usize>,
}

impl YearCatalog {
    /// Build a catalog from the three year fetches.
    ///
    /// Forms are projected through [`Volunteer::from_form`]. A form whose
    /// volunteer or form id repeats an earlier one is dropped.
    #[must_use]
    pub fn new(positions: Vec<Position>, halls: Vec<Hall>, forms: &[RegistrationForm]) -> Self {
        let mut volunteers = Vec::with_capacity(forms.len());
        let mut by_volunteer = HashMap::with_capacity(forms.len());
        let mut by_form = HashMap::with_capacity(forms.len());

        for form in forms {
            if by_volunteer.contains_key(&form.user_id) || by_form.contains_key(&form.form_id) {
                warn!(
                    form_id = %form.form_id,
                    volunteer_id = %form.user_id,
                    "duplicate registration form in catalog; keeping the first"
                );
                continue;
            }
            let idx = volunteers.len();
            by_volunteer.insert(form.user_id, idx);
            by_form.insert(form.form_id, idx);
            volunteers.push(Volunteer::from_form(form));
        }

        Self {
            positions,
            halls,
            volunteers,
            by_volunteer,
            by_form,
        }
    }

    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    #[must_use]
    pub fn halls(&self) -> &[Hall] {
        &self.halls
    }

    /// Volunteers in registration-form order.
    #[must_use]
    pub fn volunteers(&self) -> &[Volunteer] {
        &self.volunteers
    }

    #[must_use]
    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn hall(&self, id: HallId) -> Option<&Hall> {
        self.halls.iter().find(|h| h.id == id)
    }

    #[must_use]
    pub fn volunteer(&self, id: VolunteerId) -> Option<&Volunteer> {
        self.by_volunteer.get(&id).map(|&idx| &self.volunteers[idx])
    }

    #[must_use]
    pub fn volunteer_by_form(&self, form: FormId) -> Option<&Volunteer> {
        self.by_form.get(&form).map(|&idx| &self.volunteers[idx])
    }

    /// Check that `slot` can hold volunteers.
    ///
    /// # Errors
    ///
    /// Returns the first reason the slot is not a valid target: unknown
    /// position, hall on a position without halls, or unknown hall.
    pub fn check_slot(&self, slot: Slot) -> Result<(), RotaError> {
        let position = self
            .position(slot.position)
            .ok_or(RotaError::UnknownPosition(slot.position))?;

        if let Some(hall) = slot.hall {
            if !position.has_halls {
                return Err(RotaError::HallNotAllowed {
                    position: position.id,
                    hall,
                });
            }
            if self.hall(hall).is_none() {
                return Err(RotaError::UnknownHall(hall));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn slot_is_valid(&self, slot: Slot) -> bool {
        self.check_slot(slot).is_ok()
    }
}
