use crate::cli_error::CliError;
use crate::data_store::{get_store_from_env, EventHubStore};

pub fn print_venue_list() -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let venues = data_store.get_venues()?;

    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED)
        .set_header(vec!["id", "room", "building", "capacity", "facilities"])
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
        .add_rows(venues.into_iter().map(|venue| {
            [
                venue.id.to_string(),
                venue.room_number,
                venue.building,
                venue.capacity.to_string(),
                venue.facilities,
            ]
        }));

    println!("{table}");
    Ok(())
}
