use chrono::{naive::NaiveDate, DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Venue {
    pub id: i32,
    pub room_number: String,
    pub building: String,
    /// Human-readable name of the venue, combined from room number and building
    pub label: String,
    pub capacity: i32,
    #[serde(default)]
    pub facilities: String,
}

/// Short description of a venue, embedded into event and booking listings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VenueSummary {
    pub id: i32,
    pub room_number: String,
    pub building: String,
    pub label: String,
    pub capacity: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewVenue {
    pub room_number: String,
    pub building: String,
    pub capacity: i32,
    #[serde(default)]
    pub facilities: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Booking {
    pub id: i32,
    pub venue_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i32>,
    pub booking_date: NaiveDate,
    /// Begin of the booking in 24-hour "HH:MM" form
    pub start_time: String,
    /// End of the booking in 24-hour "HH:MM" form
    pub end_time: String,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_by: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<VenueSummary>,
    /// The event which the booking has been created for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventSummary>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewBooking {
    pub venue_id: i32,
    #[serde(default)]
    pub event_id: Option<i32>,
    pub booking_date: NaiveDate,
    /// Begin of the booking, either as "HH:MM" or as "h:mm AM/PM"
    pub start_time: String,
    /// End of the booking, either as "HH:MM" or as "h:mm AM/PM"
    pub end_time: String,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub booked_by: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventCategory {
    Tech,
    #[serde(rename = "Non-Tech")]
    NonTech,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Proposed,
    FacultyApproved,
    HodApproved,
    Rejected,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Event {
    pub id: i32,
    pub event_code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<i32>,
    pub faculty_coordinator: String,
    pub student_coordinator: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<i32>,
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_fee: Option<i32>,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Name of the organizing club. Only filled in event listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    /// The event's venue. Only filled in event listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<VenueSummary>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventSummary {
    pub id: i32,
    pub event_code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: EventStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewEvent {
    pub event_code: String,
    pub title: String,
    #[serde(default)]
    pub club_id: Option<i32>,
    #[serde(default)]
    pub faculty_coordinator: String,
    #[serde(default)]
    pub student_coordinator: String,
    #[serde(default)]
    pub description: String,
    pub event_date: NaiveDate,
    /// Begin of the event, either as "HH:MM" or as "h:mm AM/PM"
    pub start_time: String,
    /// End of the event, either as "HH:MM" or as "h:mm AM/PM"
    pub end_time: String,
    #[serde(default)]
    pub venue_id: Option<i32>,
    pub category: EventCategory,
    #[serde(default)]
    pub max_participants: Option<i32>,
    #[serde(default)]
    pub entry_fee: Option<i32>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub created_by: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Club {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub coordinator_email: String,
    pub coordinator_contact: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewClub {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub coordinator_email: String,
    #[serde(default)]
    pub coordinator_contact: String,
}

/// Response to the creation of an entity with a database-generated id
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct CreatedId {
    pub id: i32,
}

/// Result of filling the bookings table from the existing events
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct BackfillReport {
    /// Number of bookings created from events. Zero, if bookings existed before.
    pub inserted: usize,
    /// Number of bookings which were present before. Backfilling only happens if this is zero.
    pub existing_bookings: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}
