//! Output layer shared by every `rota` command.
//!
//! Commands produce a serializable report and hand it to [`render_mode`]
//! with a text and a pretty renderer. JSON is derived from the report.
//!
//! Mode precedence (highest wins):
//! 1. `--format` / hidden `--json`
//! 2. `FORMAT` env var (`pretty` | `text` | `json`)
//! 3. `output` in the user config (`~/.config/rota/config.toml`)
//! 4. pretty on a TTY, text when piped

use clap::ValueEnum;
use rota_core::ErrorCode;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

pub const PRETTY_RULE_WIDTH: usize = 72;

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections and rules for people at a terminal.
    Pretty,
    /// Tab-separated rows for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

fn parse_mode(val: &str) -> Option<OutputMode> {
    match val.trim().to_lowercase().as_str() {
        "json" => Some(OutputMode::Json),
        "text" => Some(OutputMode::Text),
        "pretty" => Some(OutputMode::Pretty),
        _ => None,
    }
}

fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    config_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    if json_flag {
        return OutputMode::Json;
    }

    if let Some(mode) = format_env.and_then(parse_mode) {
        return mode;
    }
    if let Some(mode) = config_output.and_then(parse_mode) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the mode for this run. `config_output` is the user config's
/// `output` value, if one was loaded.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), config_output, is_tty)
}

/// Render `value` to stdout: JSON directly, otherwise through the matching closure.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_mode(mode, value, &mut out, text_fn, pretty_fn)
}

fn write_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    out: &mut dyn Write,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A failure as shown to the operator.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stable `E####` code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Attach the code and, when it has one, its hint.
    #[must_use]
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.error_code = Some(code.code().to_string());
        if self.suggestion.is_none() {
            self.suggestion = code.hint().map(str::to_string);
        }
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_wins_over_json_and_env() {
        let mode = resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), None, true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("pretty"), None, true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn env_selects_mode_case_insensitively() {
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("JSON"), None, true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("pretty"), None, false),
            OutputMode::Pretty
        );
    }

    #[test]
    fn unknown_env_falls_through_to_tty_detection() {
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("fancy"), None, true),
            OutputMode::Pretty
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("fancy"), None, false),
            OutputMode::Text
        );
    }

    #[test]
    fn user_config_output_sits_between_env_and_tty() {
        assert_eq!(
            resolve_output_mode_inner(None, false, None, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, Some("text"), Some("json"), true),
            OutputMode::Text
        );
        assert_eq!(
            resolve_output_mode_inner(Some(OutputMode::Pretty), false, None, Some("json"), false),
            OutputMode::Pretty
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, None, Some("bogus"), false),
            OutputMode::Text
        );
    }

    #[test]
    fn json_error_is_wrapped() {
        let err = CliError::new("hall 3 is not in the year's catalog")
            .with_code(ErrorCode::HallNotFound);
        let mut buf = Vec::new();
        write_error(OutputMode::Json, &err, &mut buf).expect("render");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["error"]["error_code"], "E2003");
        assert!(value["error"]["suggestion"].is_string());
    }

    #[test]
    fn text_error_carries_code_and_suggestion() {
        let err = CliError::new("boom").with_suggestion("try again");
        let mut buf = Vec::new();
        write_error(OutputMode::Text, &err, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "error: boom\n  suggestion: try again\n");
    }

    #[test]
    fn with_code_keeps_explicit_suggestion() {
        let err = CliError::new("x")
            .with_suggestion("custom")
            .with_code(ErrorCode::VolunteerBusy);
        assert_eq!(err.suggestion.as_deref(), Some("custom"));
        assert_eq!(err.error_code.as_deref(), Some("E3001"));
    }

    #[test]
    fn write_mode_dispatches() {
        let value = serde_json::json!({ "n": 1 });
        let mut buf = Vec::new();
        write_mode(
            OutputMode::Text,
            &value,
            &mut buf,
            |v, w| writeln!(w, "n={}", v["n"]),
            |_, w| writeln!(w, "pretty"),
        )
        .expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "n=1\n");
    }
}
