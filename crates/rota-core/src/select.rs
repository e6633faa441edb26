//! Click-to-place: pick a volunteer card, then click the slot to put it in.

use crate::model::VolunteerId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickSelection {
    selected: Option<VolunteerId>,
}

impl ClickSelection {
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Select `volunteer`, or deselect it if it is already selected.
    pub fn toggle(&mut self, volunteer: VolunteerId) {
        if self.selected == Some(volunteer) {
            self.selected = None;
        } else {
            self.selected = Some(volunteer);
        }
    }

    #[must_use]
    pub const fn selected(&self) -> Option<VolunteerId> {
        self.selected
    }

    #[must_use]
    pub fn is_selected(&self, volunteer: VolunteerId) -> bool {
        self.selected == Some(volunteer)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Hand out the selected volunteer and clear the selection.
    pub fn take(&mut self) -> Option<VolunteerId> {
        self.selected.take()
    }
}
