use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use eventhub_server::cli_error::CliError;
use log::{error, warn};

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if let Err(e) = dotenv_result {
        warn!("Could not read .env file: {}", e);
    }

    if let Err(e) = run_command(args.command) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run_command(command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve => {
            eventhub_server::cli::database_migration::check_migration_state()?;
            eventhub_server::web::serve()
        }
        Command::MigrateDatabase => eventhub_server::cli::database_migration::run_migrations(),
        Command::ListVenues => eventhub_server::cli::manage_venues::print_venue_list(),
        Command::BackfillBookings => eventhub_server::cli::manage_bookings::backfill_bookings(),
    }
}

/// Venue booking and event scheduling service for college events
#[derive(Debug, Parser)]
#[clap(name = "eventhub", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,
    /// Migrate the database schema to the current version
    MigrateDatabase,
    /// Print a table of all venues
    ListVenues,
    /// Create bookings for all existing events, if there are no bookings yet
    BackfillBookings,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}
