//! `rota board`: show who works where on a day.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use rota_core::EffectiveView;
use rota_core::model::{DayId, Volunteer};
use serde::Serialize;

use super::{ApiOptions, DaySelector, connect, load_board};
use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct BoardArgs {
    #[command(flatten)]
    pub selector: DaySelector,
}

/// A day's effective view plus its headline counts.
#[derive(Debug, Serialize)]
pub struct BoardReport {
    pub day: DayId,
    pub total_assigned: usize,
    pub total_unassigned: usize,
    pub view: EffectiveView,
}

impl BoardReport {
    pub fn new(day: DayId, view: EffectiveView) -> Self {
        Self {
            day,
            total_assigned: view.total_assigned(),
            total_unassigned: view.unassigned.len(),
            view,
        }
    }
}

pub fn run_board(
    args: &BoardArgs,
    api: &ApiOptions,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let conn = connect(api, project_root)?;
    let board = load_board(&conn, args.selector)?;
    let report = BoardReport::new(board.day(), board.effective_view());
    render_mode(output, &report, write_board_text, write_board_pretty)
}

fn volunteer_label(volunteer: &Volunteer) -> String {
    match &volunteer.telegram_username {
        Some(username) => format!("{} (@{username})", volunteer.display_name()),
        None => volunteer.display_name(),
    }
}

/// One row per placed volunteer: `slot  volunteer_id  name`.
pub fn write_board_text(report: &BoardReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "slot\tvolunteer\tname")?;
    for position in &report.view.positions {
        for volunteer in &position.general {
            writeln!(
                w,
                "{}\t{}\t{}",
                position.position.id,
                volunteer.id,
                volunteer.display_name()
            )?;
        }
        for hall in &position.halls {
            for volunteer in &hall.volunteers {
                writeln!(
                    w,
                    "{}/{}\t{}\t{}",
                    position.position.id,
                    hall.hall.id,
                    volunteer.id,
                    volunteer.display_name()
                )?;
            }
        }
    }
    for volunteer in &report.view.unassigned {
        writeln!(
            w,
            "unassigned\t{}\t{}",
            volunteer.id,
            volunteer.display_name()
        )?;
    }
    Ok(())
}

pub fn write_board_pretty(report: &BoardReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(
        w,
        &format!(
            "Day {}: {} assigned, {} unassigned",
            report.day, report.total_assigned, report.total_unassigned
        ),
    )?;

    for position in &report.view.positions {
        writeln!(
            w,
            "{} [{}] ({})",
            position.position.name,
            position.position.id,
            position.total_assigned()
        )?;
        for volunteer in &position.general {
            writeln!(w, "  - {}", volunteer_label(volunteer))?;
        }
        for hall in &position.halls {
            writeln!(
                w,
                "  {} [{}] ({})",
                hall.hall.name,
                hall.hall.id,
                hall.volunteers.len()
            )?;
            for volunteer in &hall.volunteers {
                writeln!(w, "    - {}", volunteer_label(volunteer))?;
            }
        }
    }

    pretty_rule(w)?;
    writeln!(w, "Unassigned ({})", report.total_unassigned)?;
    for volunteer in &report.view.unassigned {
        writeln!(w, "  - {} [{}]", volunteer_label(volunteer), volunteer.id)?;
    }
    Ok(())
}
