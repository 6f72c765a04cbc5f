use std::path::PathBuf;

use clap::{Parser, Subcommand};
use taskdata::output::Format;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "taskdata",
    version,
    about = "Inspect, validate and migrate task data files"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upgrade a data file to the current version
    Migrate {
        /// Path to the data file
        file: PathBuf,
        /// Stop at this version instead of the newest available migration
        #[arg(long)]
        target: Option<String>,
        /// Run and validate the migration without writing the file
        #[arg(long)]
        dry_run: bool,
        /// Do not keep a backup of the pre-migration file
        #[arg(long)]
        no_backup: bool,
    },
    /// Report whether a data file needs migration
    Check {
        /// Path to the data file
        file: PathBuf,
    },
    /// Validate a data file against the current schema as-is
    Validate {
        /// Path to the data file
        file: PathBuf,
    },
    /// List the application version and registered migrations
    Versions,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TASKDATA_LOG").unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(cli: Cli, format: Format) -> taskdata::error::Result<()> {
    match cli.command {
        Commands::Migrate {
            file,
            target,
            dry_run,
            no_backup,
        } => taskdata::commands::migrate::run(
            &file,
            target.as_deref(),
            dry_run,
            !no_backup,
            format,
        ),
        Commands::Check { file } => taskdata::commands::check::run(&file, format),
        Commands::Validate { file } => taskdata::commands::validate::run(&file, format),
        Commands::Versions => taskdata::commands::versions::run(format),
    }
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
