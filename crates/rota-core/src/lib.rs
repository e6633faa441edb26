//! rota-core library.
//!
//! Day rota engine for a volunteer-management system: the year catalog, the
//! optimistic pending-operation store, the reconciliation that derives what
//! the board shows, and the translation of drops into backend mutations.

pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod pending;
pub mod reconcile;
pub mod select;

pub use board::{DayBoard, DropTicket};
pub use catalog::YearCatalog;
pub use error::{ErrorCode, RotaError};
pub use gateway::{ErrorReporter, GatewayError, Mutation, MutationGateway, TracingReporter};
pub use pending::{OperationKey, OperationKind, PendingOperation, PendingOperations};
pub use reconcile::{EffectiveView, Location, compute_effective_view};
