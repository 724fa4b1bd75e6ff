use crate::data_store::util::sql_integer_enum;
use crate::data_store::{BookingId, ClubId, EventId, VenueId};
use crate::scheduling::{
    format_time_of_day, parse_time_of_day, require_venue, SchedulingError, TimeSlot,
};
use chrono::{naive::NaiveDate, DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use diesel::{AsExpression, FromSqlRow};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name=super::schema::venues)]
pub struct Venue {
    pub id: VenueId,
    pub room_number: String,
    pub building: String,
    pub capacity: i32,
    pub facilities: String,
    pub created_at: DateTime<Utc>,
}

impl Venue {
    pub fn label(&self) -> String {
        if self.building.is_empty() {
            self.room_number.clone()
        } else {
            format!("{} ({})", self.room_number, self.building)
        }
    }
}

impl From<Venue> for eventhub_api_types::Venue {
    fn from(value: Venue) -> Self {
        Self {
            label: value.label(),
            id: value.id,
            room_number: value.room_number,
            building: value.building,
            capacity: value.capacity,
            facilities: value.facilities,
        }
    }
}

impl From<Venue> for eventhub_api_types::VenueSummary {
    fn from(value: Venue) -> Self {
        Self {
            label: value.label(),
            id: value.id,
            room_number: value.room_number,
            building: value.building,
            capacity: value.capacity,
        }
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::venues)]
pub struct NewVenue {
    pub room_number: String,
    pub building: String,
    pub capacity: i32,
    pub facilities: String,
}

impl TryFrom<eventhub_api_types::NewVenue> for NewVenue {
    type Error = String;

    fn try_from(value: eventhub_api_types::NewVenue) -> Result<Self, Self::Error> {
        if value.room_number.trim().is_empty() {
            return Err("room_number must not be empty".to_owned());
        }
        if value.capacity <= 0 {
            return Err(format!(
                "capacity must be positive, got {}",
                value.capacity
            ));
        }
        Ok(Self {
            room_number: value.room_number.trim().to_owned(),
            building: value.building.trim().to_owned(),
            capacity: value.capacity,
            facilities: value.facilities,
        })
    }
}

#[derive(Debug, PartialEq, FromSqlRow, AsExpression, Eq, Clone, Copy)]
#[diesel(sql_type = diesel::sql_types::Integer)]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

sql_integer_enum!(BookingStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
});

impl BookingStatus {
    /// Active bookings occupy their venue. Rejected ones don't.
    pub fn is_active(&self) -> bool {
        *self != BookingStatus::Rejected
    }

    /// Booking status which reflects the approval state of an event
    pub fn mirroring(event_status: EventStatus) -> Self {
        match event_status {
            EventStatus::Rejected => BookingStatus::Rejected,
            EventStatus::FacultyApproved | EventStatus::HodApproved => BookingStatus::Approved,
            EventStatus::Proposed => BookingStatus::Pending,
        }
    }
}

impl From<BookingStatus> for eventhub_api_types::BookingStatus {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Approved => Self::Approved,
            BookingStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<eventhub_api_types::BookingStatus> for BookingStatus {
    fn from(value: eventhub_api_types::BookingStatus) -> Self {
        match value {
            eventhub_api_types::BookingStatus::Pending => Self::Pending,
            eventhub_api_types::BookingStatus::Approved => Self::Approved,
            eventhub_api_types::BookingStatus::Rejected => Self::Rejected,
        }
    }
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name=super::schema::bookings)]
pub struct Booking {
    pub id: BookingId,
    pub venue_id: VenueId,
    pub event_id: Option<EventId>,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub booked_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot {
            begin: self.start_time,
            end: self.end_time,
        }
    }
}

/// A booking together with its venue and the event it has been created for
#[derive(Clone, Debug)]
pub struct FullBooking {
    pub booking: Booking,
    pub venue: Option<Venue>,
    pub event: Option<FullEvent>,
}

impl From<FullBooking> for eventhub_api_types::Booking {
    fn from(value: FullBooking) -> Self {
        let booking = value.booking;
        Self {
            id: booking.id,
            venue_id: booking.venue_id,
            event_id: booking.event_id,
            booking_date: booking.booking_date,
            start_time: format_time_of_day(&booking.start_time),
            end_time: format_time_of_day(&booking.end_time),
            status: booking.status.into(),
            booked_by: booking.booked_by,
            venue: value.venue.map(|v| v.into()),
            event: value.event.map(|e| e.into()),
        }
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::bookings)]
pub struct NewBooking {
    pub venue_id: VenueId,
    pub event_id: Option<EventId>,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub booked_by: Option<i32>,
}

impl NewBooking {
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot {
            begin: self.start_time,
            end: self.end_time,
        }
    }
}

impl TryFrom<eventhub_api_types::NewBooking> for NewBooking {
    type Error = SchedulingError;

    fn try_from(value: eventhub_api_types::NewBooking) -> Result<Self, Self::Error> {
        let slot = TimeSlot::from_user_input(&value.start_time, &value.end_time)?;
        Ok(Self {
            venue_id: value.venue_id,
            event_id: value.event_id,
            booking_date: value.booking_date,
            start_time: slot.begin,
            end_time: slot.end,
            status: value.status.into(),
            booked_by: value.booked_by,
        })
    }
}

#[derive(Debug, PartialEq, FromSqlRow, AsExpression, Eq, Clone, Copy)]
#[diesel(sql_type = diesel::sql_types::Integer)]
pub enum EventCategory {
    Tech,
    NonTech,
}

sql_integer_enum!(EventCategory {
    Tech = 0,
    NonTech = 1,
});

impl From<EventCategory> for eventhub_api_types::EventCategory {
    fn from(value: EventCategory) -> Self {
        match value {
            EventCategory::Tech => Self::Tech,
            EventCategory::NonTech => Self::NonTech,
        }
    }
}

impl From<eventhub_api_types::EventCategory> for EventCategory {
    fn from(value: eventhub_api_types::EventCategory) -> Self {
        match value {
            eventhub_api_types::EventCategory::Tech => Self::Tech,
            eventhub_api_types::EventCategory::NonTech => Self::NonTech,
        }
    }
}

#[derive(Debug, PartialEq, FromSqlRow, AsExpression, Eq, Clone, Copy)]
#[diesel(sql_type = diesel::sql_types::Integer)]
pub enum EventStatus {
    Proposed,
    FacultyApproved,
    HodApproved,
    Rejected,
}

sql_integer_enum!(EventStatus {
    Proposed = 0,
    FacultyApproved = 1,
    HodApproved = 2,
    Rejected = 3,
});

impl From<EventStatus> for eventhub_api_types::EventStatus {
    fn from(value: EventStatus) -> Self {
        match value {
            EventStatus::Proposed => Self::Proposed,
            EventStatus::FacultyApproved => Self::FacultyApproved,
            EventStatus::HodApproved => Self::HodApproved,
            EventStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<eventhub_api_types::EventStatus> for EventStatus {
    fn from(value: eventhub_api_types::EventStatus) -> Self {
        match value {
            eventhub_api_types::EventStatus::Proposed => Self::Proposed,
            eventhub_api_types::EventStatus::FacultyApproved => Self::FacultyApproved,
            eventhub_api_types::EventStatus::HodApproved => Self::HodApproved,
            eventhub_api_types::EventStatus::Rejected => Self::Rejected,
        }
    }
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name=super::schema::events)]
pub struct Event {
    pub id: EventId,
    pub event_code: String,
    pub title: String,
    pub club_id: Option<ClubId>,
    pub faculty_coordinator: String,
    pub student_coordinator: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue_id: Option<VenueId>,
    pub category: EventCategory,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<i32>,
    pub status: EventStatus,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot {
            begin: self.start_time,
            end: self.end_time,
        }
    }

    /// The booking which reserves the event's venue for the event, with the given status.
    ///
    /// Returns None, if the event has no venue.
    pub fn venue_booking(&self, status: BookingStatus) -> Option<NewBooking> {
        self.venue_id.map(|venue_id| NewBooking {
            venue_id,
            event_id: Some(self.id),
            booking_date: self.event_date,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
            booked_by: self.created_by,
        })
    }
}

impl From<Event> for eventhub_api_types::Event {
    fn from(value: Event) -> Self {
        Self {
            id: value.id,
            event_code: value.event_code,
            title: value.title,
            club_id: value.club_id,
            faculty_coordinator: value.faculty_coordinator,
            student_coordinator: value.student_coordinator,
            description: value.description,
            event_date: value.event_date,
            start_time: format_time_of_day(&value.start_time),
            end_time: format_time_of_day(&value.end_time),
            venue_id: value.venue_id,
            category: value.category.into(),
            max_participants: value.max_participants,
            entry_fee: value.entry_fee,
            status: value.status.into(),
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
            club_name: None,
            venue: None,
        }
    }
}

/// An event together with the name of its club and its venue
#[derive(Clone, Debug)]
pub struct FullEvent {
    pub event: Event,
    pub club_name: Option<String>,
    pub venue: Option<Venue>,
}

impl From<FullEvent> for eventhub_api_types::Event {
    fn from(value: FullEvent) -> Self {
        let mut result: eventhub_api_types::Event = value.event.into();
        result.club_name = value.club_name;
        result.venue = value.venue.map(|v| v.into());
        result
    }
}

impl From<FullEvent> for eventhub_api_types::EventSummary {
    fn from(value: FullEvent) -> Self {
        let event = value.event;
        Self {
            id: event.id,
            event_code: event.event_code,
            title: event.title,
            club_name: value.club_name,
            event_date: event.event_date,
            start_time: format_time_of_day(&event.start_time),
            end_time: format_time_of_day(&event.end_time),
            status: event.status.into(),
        }
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::events)]
pub struct NewEvent {
    pub event_code: String,
    pub title: String,
    pub club_id: Option<ClubId>,
    pub faculty_coordinator: String,
    pub student_coordinator: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue_id: Option<VenueId>,
    pub category: EventCategory,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<i32>,
    pub status: EventStatus,
    pub created_by: Option<i32>,
}

impl NewEvent {
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot {
            begin: self.start_time,
            end: self.end_time,
        }
    }
}

impl TryFrom<eventhub_api_types::NewEvent> for NewEvent {
    type Error = SchedulingError;

    fn try_from(value: eventhub_api_types::NewEvent) -> Result<Self, Self::Error> {
        let venue_id = require_venue(value.venue_id)?;
        let slot = TimeSlot::new(
            parse_time_of_day(&value.start_time)?,
            parse_time_of_day(&value.end_time)?,
        )?;
        Ok(Self {
            event_code: value.event_code,
            title: value.title,
            club_id: value.club_id,
            faculty_coordinator: value.faculty_coordinator,
            student_coordinator: value.student_coordinator,
            description: value.description,
            event_date: value.event_date,
            start_time: slot.begin,
            end_time: slot.end,
            venue_id: Some(venue_id),
            category: value.category.into(),
            max_participants: value.max_participants,
            entry_fee: value.entry_fee,
            status: value.status.into(),
            created_by: value.created_by,
        })
    }
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name=super::schema::clubs)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub description: String,
    pub coordinator_email: String,
    pub coordinator_contact: String,
    pub created_at: DateTime<Utc>,
}

impl From<Club> for eventhub_api_types::Club {
    fn from(value: Club) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            coordinator_email: value.coordinator_email,
            coordinator_contact: value.coordinator_contact,
        }
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::clubs)]
pub struct NewClub {
    pub name: String,
    pub description: String,
    pub coordinator_email: String,
    pub coordinator_contact: String,
}

impl TryFrom<eventhub_api_types::NewClub> for NewClub {
    type Error = String;

    fn try_from(value: eventhub_api_types::NewClub) -> Result<Self, Self::Error> {
        if value.name.trim().is_empty() {
            return Err("Club name must not be empty".to_owned());
        }
        Ok(Self {
            name: value.name.trim().to_owned(),
            description: value.description,
            coordinator_email: value.coordinator_email,
            coordinator_contact: value.coordinator_contact,
        })
    }
}
