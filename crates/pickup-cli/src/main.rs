mod commands;
mod error;
mod notify;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{
    availability, bookings, collect, completions, fees, payments, residents, Context,
};
use crate::error::{exit_code_for, report_error};
use pickup_config as config;
use pickup_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "pickup", version, about = "Special-waste pickup scheduling")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
    #[command(subcommand)]
    Resident(residents::ResidentCommand),
    /// List bookable dates
    Dates(availability::DatesArgs),
    /// Show open slots on a date
    Slots(availability::SlotsArgs),
    /// Quote the fee for a category and quantity
    Fee(fees::FeeArgs),
    Book(bookings::BookArgs),
    Reschedule(bookings::RescheduleArgs),
    Cancel(bookings::CancelArgs),
    #[command(subcommand)]
    Payment(payments::PaymentCommand),
    /// Complete a pickup from its QR token
    Collect(collect::CollectArgs),
    Ls(bookings::ListArgs),
    Show(bookings::ShowArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    if let Command::Completions(args) = command {
        return completions::emit(args);
    }

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }

    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    if verbose {
        debug!(path = %db_path.display(), "database path resolved");
    }

    let store =
        Store::open(&db_path).with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
    };

    match command {
        Command::Resident(cmd) => match cmd {
            residents::ResidentCommand::Add(args) => residents::add_resident(&ctx, args),
            residents::ResidentCommand::Set(args) => residents::set_resident(&ctx, args),
            residents::ResidentCommand::Ls(args) => residents::list_residents(&ctx, args),
        },
        Command::Dates(args) => availability::list_dates(&ctx, args),
        Command::Slots(args) => availability::list_slots(&ctx, args),
        Command::Fee(args) => fees::quote_fee(&ctx, args),
        Command::Book(args) => bookings::book(&ctx, args),
        Command::Reschedule(args) => bookings::reschedule(&ctx, args),
        Command::Cancel(args) => bookings::cancel(&ctx, args),
        Command::Payment(cmd) => match cmd {
            payments::PaymentCommand::Paid(args) => payments::mark_paid(&ctx, args),
            payments::PaymentCommand::CashPending(args) => {
                payments::mark_cash_pending(&ctx, args)
            }
            payments::PaymentCommand::Unpaid(args) => payments::mark_unpaid(&ctx, args),
        },
        Command::Collect(args) => collect::collect(&ctx, args),
        Command::Ls(args) => bookings::list_collections(&ctx, args),
        Command::Show(args) => bookings::show_collection(&ctx, args),
        Command::Completions(_) => {
            unreachable!("completions command handled before store initialization")
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
