//! The backend part of the backend: the database interface
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [EventHubStore] trait. This object can be shared between threads in a
//! global application state and be used to create [EventHubStoreFacade] instances for interaction
//! with the database. These provide a CRUD-like interface, using the data models from the [models]
//! module.
//!
//! The primary implementation of [EventHubStore] ([postgres::PgDataStore]) wraps a PostgreSQL
//! connection pool and its corresponding [EventHubStoreFacade] objects
//! ([postgres::PgDataStoreFacade]) hold a reference to one pooled connection each, using the Diesel
//! query DSL for implementing the database interaction.
//!
//! Creating events and bookings is guarded against double-booking of venues, using the decision
//! functions of [crate::scheduling]. The store implementations load the relevant records and
//! insert the new record within one transaction.
//!
//! There is also a mock implementation for unittests.

use crate::cli_error::CliError;
use crate::cli_error::CliError::UnexpectedStoreError;
use crate::scheduling::{SchedulingError, TimeSlot};
use crate::setup;
use chrono::NaiveDate;
use log::warn;

pub mod models;
mod postgres;
mod schema;
#[cfg(test)]
pub mod store_mock;
mod util;

/// Get a [EventHubStore] instance, according the "DATABASE_URL" environment variable.
///
/// The DATABASE_URL must be a PosgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl EventHubStore, CliError> {
    postgres::PgDataStore::new(&setup::get_database_url_from_env()?)
        .map_err(|err| UnexpectedStoreError(err.to_string()))
}

pub type VenueId = i32;
pub type EventId = i32;
pub type BookingId = i32;
pub type ClubId = i32;

pub trait EventHubStoreFacade {
    /// Run a trivial query, to check that the database is reachable
    fn check_connection(&mut self) -> Result<(), StoreError>;

    /// Get all venues, sorted by (room_number, building, id)
    fn get_venues(&mut self) -> Result<Vec<models::Venue>, StoreError>;
    fn get_venue(&mut self, venue_id: VenueId) -> Result<models::Venue, StoreError>;
    /// Get all venues which are neither occupied by an active booking nor by an event on the given
    /// date at any time within the given time slot.
    ///
    /// Venues are sorted by (room_number, building, id).
    fn get_available_venues(
        &mut self,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Result<Vec<models::Venue>, StoreError>;
    fn create_venue(&mut self, venue: models::NewVenue) -> Result<VenueId, StoreError>;
    /// Delete a venue, together with all of its bookings. Events in the venue are kept, but lose
    /// their venue.
    fn delete_venue(&mut self, venue_id: VenueId) -> Result<(), StoreError>;

    /// Get a filtered list of events
    ///
    /// Events are sorted by event_date descending, then by start time and id. Each event comes with
    /// the name of its club and its venue, if these exist.
    fn get_events(&mut self, filter: EventFilter) -> Result<Vec<models::FullEvent>, StoreError>;
    /// Create a new event, if its venue is available
    ///
    /// The event is only created if
    /// 1. it has a venue
    /// 2. its max_participants (if any) does not exceed the venue's capacity
    /// 3. no active booking of the venue overlaps with it
    /// 4. no other event in the venue overlaps with it
    ///
    /// These checks happen in this order; the first failing one is reported as
    /// [StoreError::SchedulingRejected]. Afterwards, a pending booking of the venue is created for
    /// the event. Failing to create this booking does not fail the event creation; it is only
    /// logged.
    fn create_event(&mut self, event: models::NewEvent) -> Result<models::Event, StoreError>;
    /// Delete an event, together with its bookings
    fn delete_event(&mut self, event_id: EventId) -> Result<(), StoreError>;

    /// Get a filtered list of bookings
    ///
    /// Bookings are sorted by (booking_date, start_time, id). Each booking comes with its venue and
    /// the event it has been created for (including the event's club name).
    fn get_bookings(
        &mut self,
        filter: BookingFilter,
    ) -> Result<Vec<models::FullBooking>, StoreError>;
    /// Create a new booking, if the venue is available.
    ///
    /// Rejected bookings can always be created. For other bookings, the same availability checks
    /// as for events are applied (ignoring the event the booking is linked to).
    fn create_booking(&mut self, booking: models::NewBooking) -> Result<BookingId, StoreError>;
    /// Delete a booking. If it is linked to an event, the event is deleted as well.
    fn delete_booking(&mut self, booking_id: BookingId) -> Result<(), StoreError>;
    /// Create a booking for every event with a venue, if there are no bookings yet.
    ///
    /// The bookings' status reflects the events' approval status (see
    /// [models::BookingStatus::mirroring]).
    fn backfill_bookings_from_events(&mut self) -> Result<BackfillOutcome, StoreError>;

    /// Get all clubs, sorted by name
    fn get_clubs(&mut self) -> Result<Vec<models::Club>, StoreError>;
    fn create_club(&mut self, club: models::NewClub) -> Result<ClubId, StoreError>;
    fn delete_club(&mut self, club_id: ClubId) -> Result<(), StoreError>;
}

/// Result of [EventHubStoreFacade::backfill_bookings_from_events]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BackfillOutcome {
    /// The given number of bookings has been created
    Inserted(usize),
    /// Nothing has been done, because the given number of bookings exists already
    AlreadyPopulated(i64),
}

/// Filter options for retrieving bookings from the store via
/// [EventHubStoreFacade::get_bookings()]
///
/// Can be constructed through the [BookingFilterBuilder]
#[derive(Default, Debug, Clone)]
pub struct BookingFilter {
    /// Filter for bookings on the given date
    pub date: Option<NaiveDate>,
    /// Filter for bookings of the given venue
    pub venue_id: Option<VenueId>,
    /// Filter for bookings linked to the given event
    pub event_id: Option<EventId>,
    /// Filter for bookings which overlap with the given time slot (touching is not overlapping)
    pub overlapping: Option<TimeSlot>,
    /// If true, filter for bookings which are not rejected
    pub active_only: bool,
}

impl BookingFilter {
    /// Checks if a given booking matches the filter
    ///
    /// Usually, filtering should be done by the database. This function can be used for separate
    /// checks of individual bookings in software.
    pub fn matches(&self, booking: &models::Booking) -> bool {
        if let Some(date) = self.date {
            if booking.booking_date != date {
                return false;
            }
        }
        if let Some(venue_id) = self.venue_id {
            if booking.venue_id != venue_id {
                return false;
            }
        }
        if let Some(event_id) = self.event_id {
            if booking.event_id != Some(event_id) {
                return false;
            }
        }
        if let Some(slot) = &self.overlapping {
            if !booking.time_slot().overlaps(slot) {
                return false;
            }
        }
        if self.active_only && !booking.is_active() {
            return false;
        }
        true
    }
}

/// Builder for constructing [BookingFilter] objects
pub struct BookingFilterBuilder {
    result: BookingFilter,
}

impl BookingFilterBuilder {
    pub fn new() -> Self {
        Self {
            result: BookingFilter::default(),
        }
    }

    /// Add filter to only include bookings on the given date
    pub fn on_date(&mut self, date: NaiveDate) -> &mut Self {
        self.result.date = Some(date);
        self
    }

    /// Add filter to only include bookings of the given venue
    pub fn of_venue(&mut self, venue_id: VenueId) -> &mut Self {
        self.result.venue_id = Some(venue_id);
        self
    }

    /// Add filter to only include bookings linked to the given event
    pub fn for_event(&mut self, event_id: EventId) -> &mut Self {
        self.result.event_id = Some(event_id);
        self
    }

    /// Add filter to only include bookings overlapping with the given time slot
    pub fn overlapping(&mut self, slot: TimeSlot) -> &mut Self {
        self.result.overlapping = Some(slot);
        self
    }

    /// Add filter to exclude rejected bookings
    pub fn active_only(&mut self) -> &mut Self {
        self.result.active_only = true;
        self
    }

    /// Create the BookingFilter object
    pub fn build(self) -> BookingFilter {
        self.result
    }
}

impl Default for BookingFilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter options for retrieving events from the store via [EventHubStoreFacade::get_events()]
#[derive(Default, Debug, Clone)]
pub struct EventFilter {
    /// Filter for events on the given date
    pub date: Option<NaiveDate>,
    /// Filter for events in the given venue
    pub venue_id: Option<VenueId>,
    /// Filter for events which overlap with the given time slot
    pub overlapping: Option<TimeSlot>,
}

impl EventFilter {
    pub fn matches(&self, event: &models::Event) -> bool {
        if let Some(date) = self.date {
            if event.event_date != date {
                return false;
            }
        }
        if let Some(venue_id) = self.venue_id {
            if event.venue_id != Some(venue_id) {
                return false;
            }
        }
        if let Some(slot) = &self.overlapping {
            if !event.time_slot().overlaps(slot) {
                return false;
            }
        }
        true
    }
}

/// Builder for constructing [EventFilter] objects
pub struct EventFilterBuilder {
    result: EventFilter,
}

impl EventFilterBuilder {
    pub fn new() -> Self {
        Self {
            result: EventFilter::default(),
        }
    }

    pub fn on_date(&mut self, date: NaiveDate) -> &mut Self {
        self.result.date = Some(date);
        self
    }

    pub fn in_venue(&mut self, venue_id: VenueId) -> &mut Self {
        self.result.venue_id = Some(venue_id);
        self
    }

    pub fn overlapping(&mut self, slot: TimeSlot) -> &mut Self {
        self.result.overlapping = Some(slot);
        self
    }

    pub fn build(self) -> EventFilter {
        self.result
    }
}

impl Default for EventFilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub trait EventHubStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn EventHubStoreFacade + 'a>, StoreError>;
}

/// Report that the booking of a newly created event's venue could not be created.
///
/// The event itself is kept in this case.
fn report_failed_event_booking(event: &models::Event, error: &StoreError) {
    warn!(
        "Could not create booking of venue {} for event {} ({}): {}",
        event
            .venue_id
            .map_or_else(|| "-".to_owned(), |id| id.to_string()),
        event.id,
        event.event_code,
        error
    );
}

#[derive(Debug)]
pub enum StoreError {
    /// Connection the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members (see
    /// string description)
    QueryError(diesel::result::Error),
    /// Database transaction could not be commited due to a conflicting concurrent transaction
    TransactionConflict,
    /// The requested entity does not exist
    NotExisting,
    /// The entity could not be created because it already exists.
    ConflictEntityExists,
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
    /// The event or booking has not been created, because the venue is not available for it.
    SchedulingRejected(SchedulingError),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::ConflictEntityExists,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::TransactionConflict,
            diesel::result::Error::DatabaseError(
                e @ diesel::result::DatabaseErrorKind::ForeignKeyViolation
                | e @ diesel::result::DatabaseErrorKind::CheckViolation,
                info,
            ) => Self::InvalidInputData(
                info.constraint_name()
                    .and_then(postgres::description_for_postgres_constraint)
                    .map(|d| d.to_owned())
                    .unwrap_or_else(|| format!("{:?}: {}", e, info.message())),
            ),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl From<SchedulingError> for StoreError {
    fn from(error: SchedulingError) -> Self {
        Self::SchedulingRejected(error)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::TransactionConflict => f.write_str("Database transaction could not be commited due to a conflicting concurrent transaction"),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ConflictEntityExists => f.write_str("Database record exists already."),
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            Self::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            }
            Self::SchedulingRejected(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StoreError {}
