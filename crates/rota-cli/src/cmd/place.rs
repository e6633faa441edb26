//! `rota move` and `rota unassign`: one drop against the live API.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use clap::Args;
use rota_core::model::{DropTarget, HallId, PositionId, VolunteerId};
use rota_core::{DayBoard, ErrorReporter, GatewayError};
use serde::Serialize;
use tracing::info;

use super::board::{BoardReport, write_board_pretty, write_board_text};
use super::{ApiOptions, Connection, DaySelector, connect, load_board};
use crate::output::{OutputMode, pretty_kv, render_mode};

#[derive(Args, Debug)]
pub struct MoveArgs {
    #[command(flatten)]
    pub selector: DaySelector,

    /// Volunteer (user) id to place.
    pub volunteer: u64,

    /// Target position id.
    pub position: u64,

    /// Target hall id, for positions divided into halls.
    #[arg(long)]
    pub hall: Option<u64>,
}

impl MoveArgs {
    pub fn target(&self) -> DropTarget {
        let position = PositionId(self.position);
        match self.hall {
            Some(hall) => DropTarget::Hall {
                position,
                hall: HallId(hall),
            },
            None => DropTarget::Position { position },
        }
    }
}

#[derive(Args, Debug)]
pub struct UnassignArgs {
    #[command(flatten)]
    pub selector: DaySelector,

    /// Volunteer (user) id to take off the day.
    pub volunteer: u64,
}

/// Keeps the first failure so the command can exit non-zero.
#[derive(Default)]
struct CapturingReporter {
    failure: RefCell<Option<(String, GatewayError)>>,
}

impl ErrorReporter for CapturingReporter {
    fn report(&self, operation: &str, error: &GatewayError) {
        self.failure
            .borrow_mut()
            .get_or_insert_with(|| (operation.to_string(), error.clone()));
    }
}

#[derive(Debug, Serialize)]
pub struct PlaceReport {
    pub volunteer: VolunteerId,
    pub target: DropTarget,
    /// False when the drop did not need a backend call.
    pub changed: bool,
    pub board: BoardReport,
}

pub fn run_move(
    args: &MoveArgs,
    api: &ApiOptions,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let conn = connect(api, project_root)?;
    let board = load_board(&conn, args.selector)?;
    let report = apply_drop(&conn, board, VolunteerId(args.volunteer), args.target())?;
    render_place(output, &report)
}

pub fn run_unassign(
    args: &UnassignArgs,
    api: &ApiOptions,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let conn = connect(api, project_root)?;
    let board = load_board(&conn, args.selector)?;
    let report = apply_drop(
        &conn,
        board,
        VolunteerId(args.volunteer),
        DropTarget::Unassigned,
    )?;
    render_place(output, &report)
}

fn apply_drop(
    conn: &Connection,
    mut board: DayBoard,
    volunteer: VolunteerId,
    target: DropTarget,
) -> anyhow::Result<PlaceReport> {
    let reporter = CapturingReporter::default();
    let changed = board.on_drop(volunteer, target, &conn.client, &reporter)?;

    if let Some((operation, error)) = reporter.failure.into_inner() {
        return Err(anyhow::Error::new(error).context(format!("{operation} failed")));
    }

    if changed {
        info!(%volunteer, ?target, "assignment saved");
        let assignments = conn
            .client
            .fetch_day_assignments(board.day())
            .with_context(|| format!("failed to reload assignments for day {}", board.day()))?;
        board.refresh(assignments);
    }

    Ok(PlaceReport {
        volunteer,
        target,
        changed,
        board: BoardReport::new(board.day(), board.effective_view()),
    })
}

fn describe_target(target: DropTarget) -> String {
    match target {
        DropTarget::Position { position } => format!("position {position}"),
        DropTarget::Hall { position, hall } => format!("position {position}, hall {hall}"),
        DropTarget::Unassigned => "unassigned".to_string(),
    }
}

fn render_place(output: OutputMode, report: &PlaceReport) -> anyhow::Result<()> {
    render_mode(output, report, write_place_text, write_place_pretty)
}

fn write_place_text(report: &PlaceReport, w: &mut dyn Write) -> io::Result<()> {
    let status = if report.changed { "saved" } else { "unchanged" };
    writeln!(
        w,
        "{status}\t{}\t{}",
        report.volunteer,
        describe_target(report.target)
    )?;
    write_board_text(&report.board, w)
}

fn write_place_pretty(report: &PlaceReport, w: &mut dyn Write) -> io::Result<()> {
    if report.changed {
        writeln!(
            w,
            "✓ volunteer {} -> {}",
            report.volunteer,
            describe_target(report.target)
        )?;
    } else {
        writeln!(w, "volunteer {} already there, nothing sent", report.volunteer)?;
    }
    pretty_kv(w, "Day", report.board.day.to_string())?;
    writeln!(w)?;
    write_board_pretty(&report.board, w)
}
