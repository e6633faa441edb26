//! rota-client library.
//!
//! Talks to the volunteers admin API: fetches the year catalog and a day's
//! assignments, and persists board mutations through [`ApiClient`], which
//! implements [`rota_core::MutationGateway`].

pub mod api;
pub mod error;
pub mod http;
pub mod session;

pub use error::{ClientError, format_api_error};
pub use http::ApiClient;
pub use session::{Session, SessionState, TelegramLogin, UserProfile};
