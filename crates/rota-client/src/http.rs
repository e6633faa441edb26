//! Blocking client for the volunteers admin API.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use rota_core::catalog::YearCatalog;
use rota_core::gateway::{GatewayError, Mutation, MutationGateway, NewAssignment};
use rota_core::model::{
    Assignment, AssignmentId, DayId, Hall, HallId, Position, PositionId, RegistrationForm, YearId,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{
    self, API_PREFIX, CREATE_ASSIGNMENT_PATH, CreateAssignmentResponse, DayAssignmentsResponse,
    ME_PATH, REFRESH_PATH, RegistrationFormsResponse, TELEGRAM_LOGIN_PATH, UpdateAssignmentBody,
};
use crate::error::{ClientError, format_api_error};
use crate::session::{AuthResponse, RefreshRequest, Session, TelegramLogin, UserProfile};

type Result<T> = std::result::Result<T, ClientError>;

/// One authenticated connection to the admin API.
///
/// Every request carries the session's bearer token. A `401` answer triggers
/// a single token refresh and one retry of the original request.
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
    session: RefCell<Session>,
    requests: Cell<u64>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session.borrow())
            .field("requests", &self.requests.get())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client rooted at `base_url` (without the `/api/v1` prefix).
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("rota/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
            session: RefCell::new(Session::anonymous()),
            requests: Cell::new(0),
        }
    }

    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        *self.session.borrow_mut() = session;
        self
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Number of HTTP requests sent so far, retries included.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Exchange Telegram widget data for API tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginRejected`] when the server refuses the
    /// login, or a transport/status error when the call itself fails.
    pub fn login_telegram(&self, login: &TelegramLogin) -> Result<()> {
        let response: AuthResponse = self.post_json_once(TELEGRAM_LOGIN_PATH, login)?;
        self.adopt_tokens(response)?;
        info!(telegram_id = login.id, "logged in");
        Ok(())
    }

    /// Trade the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthenticated`] when no refresh token is
    /// held or the server refuses it. The session is cleared in that case.
    pub fn refresh(&self) -> Result<()> {
        let Some(refresh_token) = self.session.borrow().refresh_token().map(str::to_string) else {
            return Err(ClientError::Unauthenticated(
                "no refresh token available".to_string(),
            ));
        };

        let body = RefreshRequest {
            refresh_token: &refresh_token,
        };
        let outcome = self
            .post_json_once::<_, AuthResponse>(REFRESH_PATH, &body)
            .and_then(|response| self.adopt_tokens(response));

        match outcome {
            Ok(()) => {
                debug!("access token refreshed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.session.borrow_mut().clear();
                Err(ClientError::Unauthenticated(err.to_string()))
            }
        }
    }

    /// Confirm the session with the server and record who it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthenticated`] for an anonymous session, or
    /// whatever the `/auth/me` call fails with.
    pub fn initialize(&self) -> Result<UserProfile> {
        if self.session.borrow().access_token().is_none() {
            return Err(ClientError::Unauthenticated(
                "no access token; run `rota login` or pass --token".to_string(),
            ));
        }
        let profile: UserProfile = self.get_json(ME_PATH)?;
        self.session.borrow_mut().confirm(profile.clone());
        debug!(user = %profile.display_name(), "session ready");
        Ok(profile)
    }

    fn adopt_tokens(&self, response: AuthResponse) -> Result<()> {
        match response.token {
            Some(token) if response.success => {
                self.session
                    .borrow_mut()
                    .store_tokens(token, response.refresh_token);
                Ok(())
            }
            _ => Err(ClientError::LoginRejected(
                response
                    .description
                    .unwrap_or_else(|| "server did not issue a token".to_string()),
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All assignment records of one day.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub fn fetch_day_assignments(&self, day: DayId) -> Result<Vec<Assignment>> {
        let response: DayAssignmentsResponse = self.get_json(&api::day_assignments_path(day))?;
        debug!(%day, count = response.assignments.len(), "fetched assignments");
        Ok(response
            .assignments
            .into_iter()
            .map(Assignment::from)
            .collect())
    }

    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub fn fetch_positions(&self, year: YearId) -> Result<Vec<Position>> {
        self.get_json(&api::positions_path(year))
    }

    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub fn fetch_halls(&self, year: YearId) -> Result<Vec<Hall>> {
        self.get_json(&api::halls_path(year))
    }

    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub fn fetch_registration_forms(&self, year: YearId) -> Result<Vec<RegistrationForm>> {
        let response: RegistrationFormsResponse =
            self.get_json(&api::registration_forms_path(year))?;
        Ok(response.forms)
    }

    /// Positions, halls and volunteers of a year in one catalog.
    ///
    /// # Errors
    ///
    /// Fails if any of the three underlying fetches fails.
    pub fn fetch_year_catalog(&self, year: YearId) -> Result<YearCatalog> {
        let positions = self.fetch_positions(year)?;
        let halls = self.fetch_halls(year)?;
        let forms = self.fetch_registration_forms(year)?;
        debug!(
            %year,
            positions = positions.len(),
            halls = halls.len(),
            forms = forms.len(),
            "fetched year catalog"
        );
        Ok(YearCatalog::new(positions, halls, &forms))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub fn create_assignment(&self, new: &NewAssignment) -> Result<Option<AssignmentId>> {
        let response: CreateAssignmentResponse = self.post_json(CREATE_ASSIGNMENT_PATH, new)?;
        Ok(response.user_day_id)
    }

    /// # Errors
    ///
    /// Propagates transport and status failures.
    pub fn update_assignment(
        &self,
        id: AssignmentId,
        position_id: PositionId,
        hall_id: Option<HallId>,
    ) -> Result<()> {
        let body = UpdateAssignmentBody {
            position_id,
            hall_id,
        };
        let body = to_value(&body)?;
        self.execute("POST", &api::update_assignment_path(id), Some(&body))?;
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates transport and status failures.
    pub fn delete_assignment(&self, id: AssignmentId) -> Result<()> {
        self.execute("DELETE", &api::delete_assignment_path(id), None)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute("GET", path, None)?;
        self.decode(path, response)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = to_value(body)?;
        let response = self.execute("POST", path, Some(&body))?;
        self.decode(path, response)
    }

    // Auth endpoints must not recurse into refresh-on-401.
    fn post_json_once<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = to_value(body)?;
        let response = self.send_once("POST", path, Some(&body))?;
        self.decode(path, response)
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, response: ureq::Response) -> Result<T> {
        response
            .into_json::<T>()
            .map_err(|err| ClientError::Decode {
                url: self.url(path),
                message: err.to_string(),
            })
    }

    fn execute(&self, method: &str, path: &str, body: Option<&Value>) -> Result<ureq::Response> {
        let result = self.send_once(method, path, body);
        if matches!(result, Err(ClientError::Status { status: 401, .. })) && self.can_refresh() {
            debug!(method, path, "access token rejected, refreshing");
            self.refresh()?;
            return self.send_once(method, path, body);
        }
        result
    }

    fn can_refresh(&self) -> bool {
        self.session.borrow().refresh_token().is_some()
    }

    fn send_once(&self, method: &str, path: &str, body: Option<&Value>) -> Result<ureq::Response> {
        self.requests.set(self.requests.get() + 1);
        let url = self.url(path);

        let mut request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        let bearer = self
            .session
            .borrow()
            .access_token()
            .map(|token| format!("Bearer {token}"));
        if let Some(bearer) = &bearer {
            request = request.set("Authorization", bearer);
        }

        let outcome = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        outcome.map_err(|err| map_ureq_error(method, &url, err))
    }
}

impl MutationGateway for ApiClient {
    fn send(&self, mutation: &Mutation) -> std::result::Result<(), GatewayError> {
        let outcome = match mutation {
            Mutation::Create(new) => self.create_assignment(new).map(|id| {
                debug!(assignment = ?id, "assignment created");
            }),
            Mutation::Update {
                assignment_id,
                position_id,
                hall_id,
            } => self.update_assignment(*assignment_id, *position_id, *hall_id),
            Mutation::Delete { assignment_id } => self.delete_assignment(*assignment_id),
        };
        outcome.map_err(GatewayError::from)
    }
}

fn to_value<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|err| ClientError::Decode {
        url: "request body".to_string(),
        message: err.to_string(),
    })
}

fn map_ureq_error(method: &str, url: &str, err: ureq::Error) -> ClientError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            ClientError::Status {
                status,
                message: format_api_error(
                    &format!("Request failed with status code {status}"),
                    &body,
                ),
            }
        }
        ureq::Error::Transport(transport) => ClientError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}
