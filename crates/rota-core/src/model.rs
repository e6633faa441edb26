//! Core records of a day rota: volunteers, positions, halls and assignments.
//!
//! Wire-facing types keep the field names the volunteers API uses
//! (`position_id`, `hall_id`, `form_id`, ...) so the HTTP client can decode
//! straight into them. Everything else in the crate works with the
//! [`Volunteer`] projection and the [`Slot`] / [`DropTarget`] vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value as used on the wire.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Identifies a person (the API's `user_id`).
    VolunteerId
);
id_newtype!(
    /// Identifies a year-scoped registration form.
    FormId
);
id_newtype!(PositionId);
id_newtype!(HallId);
id_newtype!(
    /// Identifies a persisted day assignment (the API's `user_day_id`).
    AssignmentId
);
id_newtype!(DayId);
id_newtype!(YearId);

/// Attendance mark carried by every assignment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
    Late,
    Sick,
    #[default]
    Unknown,
}

impl Attendance {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Late => "late",
            Self::Sick => "sick",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position reference as embedded in registration forms and assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRef {
    pub position_id: PositionId,
    pub name: String,
}

/// An assignment target for a day, optionally subdivided into halls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "position_id")]
    pub id: PositionId,
    pub name: String,
    #[serde(default)]
    pub has_halls: bool,
}

/// A sub-target of a hall-subdivided position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    #[serde(rename = "hall_id")]
    pub id: HallId,
    pub year_id: YearId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A registration-form item exactly as the admin API lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub form_id: FormId,
    pub user_id: VolunteerId,
    pub first_name_ru: String,
    pub last_name_ru: String,
    #[serde(default)]
    pub patronymic_ru: Option<String>,
    #[serde(default)]
    pub full_name_en: String,
    #[serde(default)]
    pub isu_id: Option<u64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telegram_username: Option<String>,
    #[serde(default)]
    pub itmo_group: Option<String>,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub desired_positions: Vec<PositionRef>,
}

impl RegistrationForm {
    /// Form with only the identifying fields set.
    #[must_use]
    pub fn new(
        form_id: FormId,
        user_id: VolunteerId,
        first_name_ru: impl Into<String>,
        last_name_ru: impl Into<String>,
    ) -> Self {
        Self {
            form_id,
            user_id,
            first_name_ru: first_name_ru.into(),
            last_name_ru: last_name_ru.into(),
            patronymic_ru: None,
            full_name_en: String::new(),
            isu_id: None,
            phone: None,
            email: None,
            telegram_username: None,
            itmo_group: None,
            comments: String::new(),
            desired_positions: Vec::new(),
        }
    }
}

/// A person eligible for assignment, projected from their registration form.
///
/// [`Volunteer::from_form`] is the only place a form turns into a volunteer;
/// the catalog, the reconciliation and the CLI all go through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub form_id: FormId,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub full_name_en: String,
    pub telegram_username: Option<String>,
    pub desired_positions: Vec<PositionRef>,
}

impl Volunteer {
    #[must_use]
    pub fn from_form(form: &RegistrationForm) -> Self {
        Self {
            id: form.user_id,
            form_id: form.form_id,
            first_name: form.first_name_ru.clone(),
            last_name: form.last_name_ru.clone(),
            patronymic: form
                .patronymic_ru
                .clone()
                .filter(|p| !p.trim().is_empty()),
            full_name_en: form.full_name_en.clone(),
            telegram_username: form.telegram_username.clone(),
            desired_positions: form.desired_positions.clone(),
        }
    }

    /// `"<last> <first> <patronymic>"`, or `"<last> <first>"` without a patronymic.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.patronymic {
            Some(patronymic) => format!("{} {} {patronymic}", self.last_name, self.first_name),
            None => format!("{} {}", self.last_name, self.first_name),
        }
    }
}

/// The authoritative server record binding a volunteer's form to a day.
///
/// `position_id` is optional because the backend can hold a day record that
/// was never placed; such a volunteer is shown as unassigned but the record
/// still counts as "existing" when deciding between create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub day_id: DayId,
    pub form_id: FormId,
    pub position_id: Option<PositionId>,
    pub hall_id: Option<HallId>,
}

/// One cell of the board: a position's general list or one of its halls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub position: PositionId,
    pub hall: Option<HallId>,
}

impl Slot {
    #[must_use]
    pub const fn general(position: PositionId) -> Self {
        Self {
            position,
            hall: None,
        }
    }

    #[must_use]
    pub const fn hall(position: PositionId, hall: HallId) -> Self {
        Self {
            position,
            hall: Some(hall),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hall {
            Some(hall) => write!(f, "position {} / hall {hall}", self.position),
            None => write!(f, "position {}", self.position),
        }
    }
}

/// Where a volunteer was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DropTarget {
    Position { position: PositionId },
    Hall { position: PositionId, hall: HallId },
    Unassigned,
}

impl DropTarget {
    /// The slot this target names, `None` for the unassigned area.
    #[must_use]
    pub const fn slot(self) -> Option<Slot> {
        match self {
            Self::Position { position } => Some(Slot::general(position)),
            Self::Hall { position, hall } => Some(Slot::hall(position, hall)),
            Self::Unassigned => None,
        }
    }
}

impl From<Slot> for DropTarget {
    fn from(slot: Slot) -> Self {
        match slot.hall {
            Some(hall) => Self::Hall {
                position: slot.position,
                hall,
            },
            None => Self::Position {
                position: slot.position,
            },
        }
    }
}
