//! Seams to the outside world: the backend that persists assignments and the
//! collaborator that shows failures to the operator.

use serde::Serialize;
use tracing::warn;

use crate::model::{AssignmentId, Attendance, DayId, FormId, HallId, PositionId};

/// Payload for creating a day assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAssignment {
    pub application_form_id: FormId,
    pub day_id: DayId,
    pub position_id: PositionId,
    pub hall_id: Option<HallId>,
    pub information: String,
    pub attendance: Attendance,
}

/// Exactly one backend call produced by a drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum Mutation {
    Create(NewAssignment),
    Update {
        assignment_id: AssignmentId,
        position_id: PositionId,
        hall_id: Option<HallId>,
    },
    Delete {
        assignment_id: AssignmentId,
    },
}

impl Mutation {
    /// Operation label used when reporting failures.
    #[must_use]
    pub const fn operation_name(&self) -> &'static str {
        match self {
            Self::Create(_) => "Create assignment",
            Self::Update { .. } => "Update assignment",
            Self::Delete { .. } => "Delete assignment",
        }
    }
}

/// A rejected or failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
    pub status: Option<u16>,
}

impl GatewayError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Performs create/update/delete of a single assignment record.
pub trait MutationGateway {
    /// Send one mutation and wait for the backend's answer.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the transport fails or the backend
    /// rejects the change.
    fn send(&self, mutation: &Mutation) -> Result<(), GatewayError>;
}

impl<G: MutationGateway + ?Sized> MutationGateway for &G {
    fn send(&self, mutation: &Mutation) -> Result<(), GatewayError> {
        (**self).send(mutation)
    }
}

/// Receives mutation failures once the optimistic change has been undone.
pub trait ErrorReporter {
    fn report(&self, operation: &str, error: &GatewayError);
}

/// Reports failures as `tracing` warnings. This is the only place a failed
/// mutation is logged at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, operation: &str, error: &GatewayError) {
        warn!(operation, status = ?error.status, "{operation} failed: {error}");
    }
}
