//! Implementations of the command line subcommands (apart from `serve`, see [crate::web::serve])

pub mod database_migration;
pub mod manage_bookings;
pub mod manage_venues;
