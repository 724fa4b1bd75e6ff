//! Double-booking prevention for venues
//!
//! A venue is occupied on a date by its *active* (not rejected) bookings and by all events taking
//! place in it. Two time slots on the same date conflict, if they overlap as half-open intervals
//! (see [TimeSlot::overlaps]), so back-to-back reservations are possible.
//!
//! The functions in this module only take decisions on data that has already been loaded. The
//! [crate::data_store] implementations are responsible for loading the relevant bookings and
//! events of the venue and date (and for doing so within the same transaction as the subsequent
//! insert).

use crate::data_store::models::{Booking, Event, NewBooking, Venue};
use crate::data_store::VenueId;
use chrono::{NaiveDate, NaiveTime};
use std::fmt::{Display, Formatter};

mod time_normalization;

pub use time_normalization::{format_time_of_day, parse_time_of_day};

/// A time range `[begin, end)` on a single calendar day
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSlot {
    pub begin: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Create a time slot, ensuring that it is not empty
    pub fn new(begin: NaiveTime, end: NaiveTime) -> Result<Self, SchedulingError> {
        if begin >= end {
            return Err(SchedulingError::EmptyTimeSlot { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Create a time slot from user-supplied begin and end times (in 24-hour or 12-hour format)
    pub fn from_user_input(begin: &str, end: &str) -> Result<Self, SchedulingError> {
        Self::new(parse_time_of_day(begin)?, parse_time_of_day(end)?)
    }

    /// Check if this time slot and `other` share some time span.
    ///
    /// Slots which only touch each other (one ends exactly when the other begins) do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.begin < other.end && self.end > other.begin
    }
}

/// The kind of existing record which blocks a requested time slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictSource {
    Booking,
    Event,
}

impl ConflictSource {
    pub fn name(&self) -> &'static str {
        match self {
            ConflictSource::Booking => "booking",
            ConflictSource::Event => "event",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulingError {
    /// No venue has been given for an event
    VenueMissing,
    /// The given venue id does not reference an existing venue
    UnknownVenue(VenueId),
    /// The requested number of participants does not fit into the venue
    CapacityExceeded { requested: i32, capacity: i32 },
    /// A time of day could not be parsed, even after normalization
    InvalidTime(String),
    /// The end of a requested time slot is not after its begin
    EmptyTimeSlot { begin: NaiveTime, end: NaiveTime },
    /// The venue is already occupied at the requested date and time
    SlotTaken(ConflictSource),
}

impl Display for SchedulingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::VenueMissing => f.write_str("venue_id is required"),
            SchedulingError::UnknownVenue(venue_id) => {
                write!(f, "venue {} does not exist", venue_id)
            }
            SchedulingError::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "max_participants ({}) exceeds venue capacity ({})",
                requested, capacity
            ),
            SchedulingError::InvalidTime(value) => {
                write!(f, "'{}' is not a valid time of day", value)
            }
            SchedulingError::EmptyTimeSlot { begin, end } => write!(
                f,
                "end time ({}) must be after start time ({})",
                format_time_of_day(end),
                format_time_of_day(begin)
            ),
            SchedulingError::SlotTaken(ConflictSource::Booking) => f.write_str(
                "Selected venue is already booked for the given date/time in classroom bookings",
            ),
            SchedulingError::SlotTaken(ConflictSource::Event) => f.write_str(
                "Selected venue is already booked for the given date/time by another event",
            ),
        }
    }
}

impl std::error::Error for SchedulingError {}

/// First step of the event creation guard: an event must take place in some venue.
pub fn require_venue(venue_id: Option<VenueId>) -> Result<VenueId, SchedulingError> {
    venue_id.ok_or(SchedulingError::VenueMissing)
}

/// Check that the requested number of participants fits into the venue. No limit is always fine.
pub fn check_capacity(max_participants: Option<i32>, venue: &Venue) -> Result<(), SchedulingError> {
    match max_participants {
        Some(requested) if requested > venue.capacity => Err(SchedulingError::CapacityExceeded {
            requested,
            capacity: venue.capacity,
        }),
        _ => Ok(()),
    }
}

/// Check that no active booking and no event occupies the `slot` on `date`.
///
/// `bookings` and `events` must belong to the venue in question. Records on other dates are
/// ignored. Bookings are checked first, such that a conflict with both is reported as
/// [ConflictSource::Booking].
pub fn check_slot_is_free(
    date: NaiveDate,
    slot: &TimeSlot,
    bookings: &[Booking],
    events: &[Event],
) -> Result<(), SchedulingError> {
    if bookings
        .iter()
        .any(|b| b.is_active() && b.booking_date == date && b.time_slot().overlaps(slot))
    {
        return Err(SchedulingError::SlotTaken(ConflictSource::Booking));
    }
    if events
        .iter()
        .any(|e| e.event_date == date && e.time_slot().overlaps(slot))
    {
        return Err(SchedulingError::SlotTaken(ConflictSource::Event));
    }
    Ok(())
}

/// Full guard for creating an event in the given (existing) venue, after [require_venue] passed.
pub fn check_event_request(
    venue: &Venue,
    max_participants: Option<i32>,
    date: NaiveDate,
    slot: &TimeSlot,
    bookings: &[Booking],
    events: &[Event],
) -> Result<(), SchedulingError> {
    check_capacity(max_participants, venue)?;
    check_slot_is_free(date, slot, bookings, events)
}

/// Guard for creating a booking directly.
///
/// Rejected bookings never occupy the venue, so they are always admissible. The event a booking
/// is linked to does not block its own booking.
pub fn check_booking_request(
    booking: &NewBooking,
    bookings: &[Booking],
    events: &[Event],
) -> Result<(), SchedulingError> {
    if !booking.status.is_active() {
        return Ok(());
    }
    let other_events: Vec<Event> = events
        .iter()
        .filter(|e| Some(e.id) != booking.event_id)
        .cloned()
        .collect();
    check_slot_is_free(
        booking.booking_date,
        &booking.time_slot(),
        bookings,
        &other_events,
    )
}
