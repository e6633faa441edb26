use std::fmt;

use crate::model::{HallId, PositionId, VolunteerId};

/// Machine-readable error codes for callers that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    VolunteerNotFound,
    PositionNotFound,
    HallNotFound,
    HallNotAllowed,
    VolunteerBusy,
    MutationFailed,
    Unauthenticated,
    ApiUnavailable,
    RequestRejected,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::VolunteerNotFound => "E2001",
            Self::PositionNotFound => "E2002",
            Self::HallNotFound => "E2003",
            Self::HallNotAllowed => "E2004",
            Self::VolunteerBusy => "E3001",
            Self::MutationFailed => "E5001",
            Self::Unauthenticated => "E5002",
            Self::ApiUnavailable => "E5003",
            Self::RequestRejected => "E5004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::VolunteerNotFound => "Volunteer not found",
            Self::PositionNotFound => "Position not found",
            Self::HallNotFound => "Hall not found",
            Self::HallNotAllowed => "Position has no halls",
            Self::VolunteerBusy => "Volunteer has an operation in flight",
            Self::MutationFailed => "Assignment change rejected",
            Self::Unauthenticated => "Not logged in",
            Self::ApiUnavailable => "Volunteers API unreachable",
            Self::RequestRejected => "Volunteers API rejected the request",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .rota/config.toml and retry."),
            Self::VolunteerNotFound => {
                Some("Only volunteers with a registration form for this year can be placed.")
            }
            Self::PositionNotFound | Self::HallNotFound => {
                Some("Run `rota board` to list the positions and halls of the year.")
            }
            Self::HallNotAllowed => Some("Drop onto the position itself instead of a hall."),
            Self::VolunteerBusy => Some("Wait for the previous change to settle, then retry."),
            Self::MutationFailed => Some("The board shows server state again; repeat the move."),
            Self::Unauthenticated => Some("Run `rota login` or pass --token."),
            Self::ApiUnavailable => {
                Some("Check [api] base_url in .rota/config.toml, ROTA_API_URL or --api-url.")
            }
            Self::RequestRejected => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while translating a drop into a mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RotaError {
    #[error("volunteer {0} has no registration form this year")]
    UnknownVolunteer(VolunteerId),

    #[error("position {0} is not in the year's catalog")]
    UnknownPosition(PositionId),

    #[error("hall {0} is not in the year's catalog")]
    UnknownHall(HallId),

    #[error("position {position} is not divided into halls (hall {hall})")]
    HallNotAllowed { position: PositionId, hall: HallId },

    #[error("volunteer {0} is still being moved")]
    VolunteerBusy(VolunteerId),
}

impl RotaError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownVolunteer(_) => ErrorCode::VolunteerNotFound,
            Self::UnknownPosition(_) => ErrorCode::PositionNotFound,
            Self::UnknownHall(_) => ErrorCode::HallNotFound,
            Self::HallNotAllowed { .. } => ErrorCode::HallNotAllowed,
            Self::VolunteerBusy(_) => ErrorCode::VolunteerBusy,
        }
    }

    /// Remediation hint, falling back to the code's summary.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or(code.message()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::VolunteerNotFound,
            ErrorCode::PositionNotFound,
            ErrorCode::HallNotFound,
            ErrorCode::HallNotAllowed,
            ErrorCode::VolunteerBusy,
            ErrorCode::MutationFailed,
            ErrorCode::Unauthenticated,
            ErrorCode::ApiUnavailable,
            ErrorCode::RequestRejected,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::HallNotAllowed.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn errors_map_to_codes() {
        let err = RotaError::HallNotAllowed {
            position: PositionId(1),
            hall: HallId(2),
        };
        assert_eq!(err.error_code(), ErrorCode::HallNotAllowed);
        assert!(err.to_string().contains("hall 2"));
        assert_eq!(
            RotaError::VolunteerBusy(VolunteerId(4)).error_code().code(),
            "E3001"
        );
    }
}
