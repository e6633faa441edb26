pub mod board;
pub mod login;
pub mod place;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use rota_client::{ApiClient, ClientError, Session};
use rota_core::config::{EffectiveConfig, resolve_config};
use rota_core::model::{DayId, YearId};
use rota_core::{DayBoard, ErrorCode, GatewayError, RotaError};
use tracing::debug;

use crate::output::CliError;

/// Connection flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ApiOptions {
    /// Base URL of the volunteers API (overrides ROTA_API_URL and config).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Access token (falls back to ROTA_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Refresh token used when the access token expires (falls back to ROTA_REFRESH_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub refresh_token: Option<String>,
}

/// The year and day a board command works on.
#[derive(Args, Debug, Clone, Copy)]
pub struct DaySelector {
    /// Year id whose positions, halls and registration forms form the catalog.
    #[arg(long)]
    pub year: u64,

    /// Day id whose assignments are shown.
    #[arg(long)]
    pub day: u64,
}

pub struct Connection {
    pub client: ApiClient,
    pub config: EffectiveConfig,
}

/// Resolve config and build an API client carrying the caller's tokens.
pub fn connect(options: &ApiOptions, project_root: &Path) -> anyhow::Result<Connection> {
    let config = resolve_config(project_root, options.api_url.as_deref())
        .context("failed to load rota configuration")?;

    let client = ApiClient::new(
        &config.resolved_api_url,
        Duration::from_secs(config.config.api.timeout_secs),
    );

    let token = options
        .token
        .clone()
        .or_else(|| std::env::var("ROTA_TOKEN").ok())
        .filter(|t| !t.is_empty());
    let refresh = options
        .refresh_token
        .clone()
        .or_else(|| std::env::var("ROTA_REFRESH_TOKEN").ok())
        .filter(|t| !t.is_empty());

    let client = match token {
        Some(token) => client.with_session(Session::with_tokens(token, refresh)),
        None => client,
    };
    debug!(api_url = %config.resolved_api_url, state = %client.session().state(), "connected");

    Ok(Connection { client, config })
}

/// Fetch the year catalog and the day's assignments into a board.
pub fn load_board(conn: &Connection, selector: DaySelector) -> anyhow::Result<DayBoard> {
    let year = YearId(selector.year);
    let day = DayId(selector.day);

    if conn.client.session().access_token().is_some() {
        let profile = conn.client.initialize()?;
        debug!(user = %profile.display_name(), "session confirmed");
    }

    let catalog = conn
        .client
        .fetch_year_catalog(year)
        .with_context(|| format!("failed to load catalog for year {year}"))?;
    let assignments = conn
        .client
        .fetch_day_assignments(day)
        .with_context(|| format!("failed to load assignments for day {day}"))?;

    Ok(DayBoard::new(day, catalog, assignments, conn.config.config.board))
}

/// Map a command failure to what the operator sees.
///
/// The outermost message is kept; the code and hint come from the first
/// typed error found in the cause chain.
pub fn cli_error(err: &anyhow::Error) -> CliError {
    let message = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let base = CliError::new(message);

    for cause in err.chain() {
        if let Some(rota) = cause.downcast_ref::<RotaError>() {
            return base.with_suggestion(rota.suggestion()).with_code(rota.error_code());
        }
        if let Some(client) = cause.downcast_ref::<ClientError>() {
            return base.with_code(client.error_code());
        }
        if let Some(gateway) = cause.downcast_ref::<GatewayError>() {
            let code = if gateway.status == Some(401) {
                ErrorCode::Unauthenticated
            } else {
                ErrorCode::MutationFailed
            };
            return base.with_code(code);
        }
    }

    // Config loading reports through anyhow with the file path as context.
    if err
        .chain()
        .any(|cause| cause.to_string().contains("config.toml"))
    {
        return base.with_code(ErrorCode::ConfigParseError);
    }
    base.with_code(ErrorCode::InternalUnexpected)
}
