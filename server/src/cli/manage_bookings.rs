use crate::cli_error::CliError;
use crate::data_store::{get_store_from_env, BackfillOutcome, EventHubStore};

/// Fill the empty bookings table with one booking per event that has a venue.
pub fn backfill_bookings() -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    match data_store.backfill_bookings_from_events()? {
        BackfillOutcome::Inserted(count) => {
            println!("Created {} bookings from existing events.", count);
        }
        BackfillOutcome::AlreadyPopulated(count) => {
            println!(
                "Bookings table already contains {} bookings. Nothing to do.",
                count
            );
        }
    }
    Ok(())
}
