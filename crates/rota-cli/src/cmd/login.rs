//! `rota login` and `rota whoami`.

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::Context;
use clap::Args;
use rota_client::{SessionState, TelegramLogin, UserProfile};
use serde::Serialize;
use tracing::info;

use super::{ApiOptions, connect};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Telegram login-widget payload as JSON: a file path, or "-" for stdin.
    #[arg(long, value_name = "PATH")]
    pub widget_json: String,
}

#[derive(Debug, Serialize)]
pub struct LoginReport {
    pub user: UserProfile,
    pub display_name: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WhoamiReport {
    pub state: SessionState,
    pub display_name: String,
    pub user: UserProfile,
}

fn read_widget_payload(source: &str) -> anyhow::Result<TelegramLogin> {
    let raw = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read login payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read login payload from {source}"))?
    };
    parse_widget_payload(&raw)
}

fn parse_widget_payload(raw: &str) -> anyhow::Result<TelegramLogin> {
    serde_json::from_str(raw).context("login payload is not a Telegram widget object")
}

pub fn run_login(
    args: &LoginArgs,
    api: &ApiOptions,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let login = read_widget_payload(&args.widget_json)?;
    let conn = connect(api, project_root)?;

    conn.client.login_telegram(&login)?;
    let user = conn.client.initialize()?;
    let session = conn.client.session();
    info!(user = %user.display_name(), "login confirmed");

    let report = LoginReport {
        display_name: user.display_name(),
        user,
        access_token: session.access_token().map(str::to_string),
        refresh_token: session.refresh_token().map(str::to_string),
    };
    render_mode(output, &report, write_login_text, write_login_pretty)
}

fn write_login_text(report: &LoginReport, w: &mut dyn Write) -> io::Result<()> {
    if let Some(token) = &report.access_token {
        writeln!(w, "ROTA_TOKEN={token}")?;
    }
    if let Some(token) = &report.refresh_token {
        writeln!(w, "ROTA_REFRESH_TOKEN={token}")?;
    }
    Ok(())
}

fn write_login_pretty(report: &LoginReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "✓ logged in as {}", report.display_name)?;
    writeln!(w, "Tokens are not saved. Export them for later commands:")?;
    write_login_text(report, w)
}

pub fn run_whoami(api: &ApiOptions, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let conn = connect(api, project_root)?;
    let user = conn.client.initialize()?;
    let report = WhoamiReport {
        state: conn.client.session().state(),
        display_name: user.display_name(),
        user,
    };
    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}\t{}", r.state, r.display_name),
        |r, w| {
            pretty_section(w, "Session")?;
            pretty_kv(w, "User", &r.display_name)?;
            pretty_kv(w, "State", r.state.to_string())?;
            pretty_kv(w, "Admin", if r.user.is_admin { "yes" } else { "no" })
        },
    )
}
