#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "rota: day assignment board for volunteer events",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to pretty on a terminal, text otherwise).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for --format json.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(flatten)]
    api: cmd::ApiOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Show a day's board",
        long_about = "Show every position and hall of a day with the volunteers placed there, plus the unassigned pool.",
        after_help = "EXAMPLES:\n    # Show day 12 of year 3\n    rota board --year 3 --day 12\n\n    # Emit machine-readable output\n    rota board --year 3 --day 12 --json"
    )]
    Board(cmd::board::BoardArgs),

    #[command(
        next_help_heading = "Assign",
        about = "Place a volunteer on a position or hall",
        long_about = "Place a volunteer on a position (or one of its halls) for a day. Creates the day record or updates the existing one.",
        after_help = "EXAMPLES:\n    # Put volunteer 42 on position 5\n    rota move --year 3 --day 12 42 5\n\n    # Put volunteer 42 in hall 2 of position 6\n    rota move --year 3 --day 12 42 6 --hall 2"
    )]
    Move(cmd::place::MoveArgs),

    #[command(
        next_help_heading = "Assign",
        about = "Take a volunteer off a day",
        long_about = "Delete the volunteer's assignment record for the day.",
        after_help = "EXAMPLES:\n    # Unassign volunteer 42\n    rota unassign --year 3 --day 12 42"
    )]
    Unassign(cmd::place::UnassignArgs),

    #[command(
        next_help_heading = "Session",
        about = "Log in with a Telegram widget payload",
        after_help = "EXAMPLES:\n    # Log in from a saved widget payload\n    rota login --widget-json telegram.json\n\n    # Read the payload from stdin\n    pbpaste | rota login --widget-json -"
    )]
    Login(cmd::login::LoginArgs),

    #[command(next_help_heading = "Session", about = "Show who the current token belongs to")]
    Whoami,
}

impl Cli {
    fn output_mode(&self, config_output: Option<&str>) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, config_output)
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ROTA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "rota=debug,info"
        } else {
            "rota=info,warn"
        })
    });

    let format = env::var("ROTA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    // A broken user config is reported by the command itself.
    let config_output = match rota_core::config::load_user_config() {
        Ok(user) => user.output,
        Err(err) => {
            debug!("user config ignored for output mode: {err:#}");
            None
        }
    };
    let output = cli.output_mode(config_output.as_deref());

    let command_result = match cli.command {
        Commands::Board(ref args) => cmd::board::run_board(args, &cli.api, output, &project_root),
        Commands::Move(ref args) => cmd::place::run_move(args, &cli.api, output, &project_root),
        Commands::Unassign(ref args) => {
            cmd::place::run_unassign(args, &cli.api, output, &project_root)
        }
        Commands::Login(ref args) => cmd::login::run_login(args, &cli.api, output, &project_root),
        Commands::Whoami => cmd::login::run_whoami(&cli.api, output, &project_root),
    };

    if let Err(err) = command_result {
        output::render_error(output, &cmd::cli_error(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
