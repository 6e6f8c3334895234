mod api;
mod cmd;
mod config;
mod core;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Post-fixed (CDI) loan installment calculator
#[derive(Parser, Debug)]
#[command(name = "cdic", version, about)]
struct Cli {
    /// Config file (defaults to $CDIC_CONFIG, then ./cdic.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create and edit form files
    Form(cmd::form::FormCommand),
    /// Generate an installment schedule
    Schedule(cmd::schedule::ScheduleCommand),
    /// Validate a form file
    Validate(cmd::validate::ValidateCommand),
    /// Send a form to the calculation service
    Calculate(cmd::calculate::CalculateCommand),
    /// Render a saved calculation response
    Table(cmd::table::TableCommand),
    /// Print the form file schema or the CSV output columns
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match &cli.command {
        Command::Form(form) => form.exec(),
        Command::Schedule(schedule) => schedule.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
        Command::Calculate(calculate) => {
            let config = config::Config::load(cli.config.as_deref())?;
            calculate.exec(&config)
        }
        Command::Table(table) => {
            let config = config::Config::load(cli.config.as_deref())?;
            table.exec(&config)
        }
    }
}

fn init_logger(verbose: bool) {
    let filters = log_filters(verbose, std::env::var("RUST_LOG").ok());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

/// `RUST_LOG` wins; otherwise `-v` selects debug and the default is warn.
fn log_filters(verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(filters) if !filters.trim().is_empty() => filters,
        _ if verbose => "debug".to_string(),
        _ => "warn".to_string(),
    }
}
