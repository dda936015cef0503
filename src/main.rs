mod cli;
mod config;
mod error;
mod notes;
mod session;

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use cli::ReportFormat;
use config::{ConfigLayer, Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "altum",
    version,
    about = "A minimalist CLI deep work companion for focused creators and knowledge workers",
    long_about = "Time deep work sessions, capture a milestone and reflection afterwards, \
                  and log each session to your daily notes (Obsidian-compatible)."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (default is <config dir>/altum/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the daily notes folder
    #[arg(long, global = true, alias = "daily_notes_folder_path")]
    daily_notes_folder_path: Option<String>,

    /// Date format of note file names (strftime, e.g. %Y-%m-%d)
    #[arg(long, global = true, alias = "date_format")]
    date_format: Option<String>,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            layer: ConfigLayer {
                daily_notes_folder_path: self.daily_notes_folder_path.clone(),
                date_format: self.date_format.clone(),
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start a deep work timer; press Enter to stop and log the session
    Start {
        /// Ask only for a 1-10 rating and notes (older entry format)
        #[arg(long)]
        quick: bool,
    },
    /// Summarize deep work sessions over the last N days
    Report {
        /// Number of days to include in the report
        #[arg(short, long, default_value_t = 7)]
        days: u32,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: ReportFormat,
    },
    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value (daily_notes_folder_path, date_format)
    Set { key: String, value: String },
    /// Show one configuration value, or all of them
    Get { key: Option<String> },
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.quiet, cli.global.verbose)?;

    let overrides = cli.global.overrides();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Config {
            action: ConfigAction::Set { key, value },
        } => cli::config::set(&overrides, &key, &value)?,
        Commands::Config {
            action: ConfigAction::Get { key },
        } => {
            let settings = Settings::load(&overrides)?;
            cli::config::get(&settings, key.as_deref())?
        }
        Commands::Start { quick } => {
            let settings = Settings::load(&overrides)?;
            cli::start::run(&settings, quick)?
        }
        Commands::Report { days, format } => {
            let settings = Settings::load(&overrides)?;
            cli::report::run(&settings, days, format)?
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ALTUM_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_defaults() {
        let cli = Cli::parse_from(["altum", "report"]);
        match cli.command {
            Some(Commands::Report { days, format }) => {
                assert_eq!(days, 7);
                assert!(matches!(format, ReportFormat::Text));
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "altum",
            "report",
            "-d",
            "30",
            "--daily_notes_folder_path",
            "/vault/daily",
            "--date-format",
            "%d.%m.%Y",
        ]);
        let overrides = cli.global.overrides();
        assert_eq!(overrides.layer.daily_notes_folder_path.as_deref(), Some("/vault/daily"));
        assert_eq!(overrides.layer.date_format.as_deref(), Some("%d.%m.%Y"));
        assert!(matches!(cli.command, Some(Commands::Report { days: 30, .. })));
    }
}
