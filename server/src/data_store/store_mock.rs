use crate::data_store::models::{
    Booking, BookingStatus, Club, Event, FullBooking, FullEvent, NewBooking, NewClub, NewEvent,
    NewVenue, Venue,
};
use crate::data_store::{
    report_failed_event_booking, BackfillOutcome, BookingFilter, BookingId, ClubId, EventFilter, EventHubStore,
    EventHubStoreFacade, EventId, StoreError, VenueId,
};
use crate::scheduling::{self, SchedulingError, TimeSlot};
use chrono::NaiveDate;
use std::sync::Mutex;

/**
 * A mock [EventHubStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of entities. These
 * can be directly modified by the tests.
 *
 * The scheduling checks are applied in the same way as by the real store; the mutex serializes
 * all facade calls. Apart from that, only entity existence is checked. The
 * [StoreMockData::next_error] attribute can be set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

impl EventHubStore for StoreMock {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn EventHubStoreFacade + 'a>, StoreError> {
        Ok(Box::new(StoreMockFacade { store: self }))
    }
}

#[derive(Default)]
pub struct StoreMockData {
    pub venues: Vec<Venue>,
    pub events: Vec<Event>,
    pub bookings: Vec<Booking>,
    pub clubs: Vec<Club>,
    /// Id of the last created entity, shared by all entity types
    pub last_id: i32,
    /// If not none, the next call to a store facade method will return this error.
    pub next_error: Option<StoreError>,
    /// If not none, inserting the booking of the next created event fails with this error.
    pub event_booking_error: Option<StoreError>,
}

impl StoreMockData {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn venue_bookings(&self, venue_id: VenueId) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.venue_id == venue_id)
            .cloned()
            .collect()
    }

    fn venue_events(&self, venue_id: VenueId) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.venue_id == Some(venue_id))
            .cloned()
            .collect()
    }

    fn venue_for_scheduling(&self, venue_id: VenueId) -> Result<Venue, StoreError> {
        self.venues
            .iter()
            .find(|v| v.id == venue_id)
            .cloned()
            .ok_or(StoreError::SchedulingRejected(
                SchedulingError::UnknownVenue(venue_id),
            ))
    }

    fn insert_booking(&mut self, booking: NewBooking) -> BookingId {
        let id = self.next_id();
        self.bookings.push(Booking {
            id,
            venue_id: booking.venue_id,
            event_id: booking.event_id,
            booking_date: booking.booking_date,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: booking.status,
            booked_by: booking.booked_by,
            created_at: chrono::Utc::now(),
        });
        id
    }

    fn full_event(&self, event: Event) -> FullEvent {
        FullEvent {
            club_name: self
                .clubs
                .iter()
                .find(|c| Some(c.id) == event.club_id)
                .map(|c| c.name.clone()),
            venue: self
                .venues
                .iter()
                .find(|v| Some(v.id) == event.venue_id)
                .cloned(),
            event,
        }
    }

    fn full_booking(&self, booking: Booking) -> FullBooking {
        FullBooking {
            venue: self
                .venues
                .iter()
                .find(|v| v.id == booking.venue_id)
                .cloned(),
            event: self
                .events
                .iter()
                .find(|e| Some(e.id) == booking.event_id)
                .map(|e| self.full_event(e.clone())),
            booking,
        }
    }

    fn delete_event_with_bookings(&mut self, event_id: EventId) -> Result<(), StoreError> {
        let count_before = self.events.len();
        self.events.retain(|e| e.id != event_id);
        if self.events.len() == count_before {
            return Err(StoreError::NotExisting);
        }
        self.bookings.retain(|b| b.event_id != Some(event_id));
        Ok(())
    }
}

fn venue_sort_key(venue: &Venue) -> (String, String, VenueId) {
    (venue.room_number.clone(), venue.building.clone(), venue.id)
}

struct StoreMockFacade<'a> {
    store: &'a StoreMock,
}

impl<'a> EventHubStoreFacade for StoreMockFacade<'a> {
    fn check_connection(&mut self) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(())
    }

    fn get_venues(&mut self) -> Result<Vec<Venue>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result = data.venues.clone();
        result.sort_by_key(venue_sort_key);
        Ok(result)
    }

    fn get_venue(&mut self, venue_id: VenueId) -> Result<Venue, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.venues
            .iter()
            .find(|v| v.id == venue_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn get_available_venues(
        &mut self,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Result<Vec<Venue>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<Venue> = data
            .venues
            .iter()
            .filter(|v| {
                scheduling::check_slot_is_free(
                    date,
                    &slot,
                    &data.venue_bookings(v.id),
                    &data.venue_events(v.id),
                )
                .is_ok()
            })
            .cloned()
            .collect();
        result.sort_by_key(venue_sort_key);
        Ok(result)
    }

    fn create_venue(&mut self, venue: NewVenue) -> Result<VenueId, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data
            .venues
            .iter()
            .any(|v| v.room_number == venue.room_number && v.building == venue.building)
        {
            return Err(StoreError::ConflictEntityExists);
        }
        let id = data.next_id();
        data.venues.push(Venue {
            id,
            room_number: venue.room_number,
            building: venue.building,
            capacity: venue.capacity,
            facilities: venue.facilities,
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    fn delete_venue(&mut self, venue_id: VenueId) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let count_before = data.venues.len();
        data.venues.retain(|v| v.id != venue_id);
        if data.venues.len() == count_before {
            return Err(StoreError::NotExisting);
        }
        data.bookings.retain(|b| b.venue_id != venue_id);
        for event in data.events.iter_mut() {
            if event.venue_id == Some(venue_id) {
                event.venue_id = None;
            }
        }
        Ok(())
    }

    fn get_events(&mut self, filter: EventFilter) -> Result<Vec<FullEvent>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<Event> = data
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.event_date
                .cmp(&a.event_date)
                .then(a.start_time.cmp(&b.start_time))
                .then(a.id.cmp(&b.id))
        });
        Ok(result.into_iter().map(|e| data.full_event(e)).collect())
    }

    fn create_event(&mut self, event: NewEvent) -> Result<Event, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let venue_id = scheduling::require_venue(event.venue_id)?;
        let venue = data.venue_for_scheduling(venue_id)?;
        scheduling::check_event_request(
            &venue,
            event.max_participants,
            event.event_date,
            &event.time_slot(),
            &data.venue_bookings(venue_id),
            &data.venue_events(venue_id),
        )?;
        if data.events.iter().any(|e| e.event_code == event.event_code) {
            return Err(StoreError::ConflictEntityExists);
        }

        let now = chrono::Utc::now();
        let id = data.next_id();
        let created = Event {
            id,
            event_code: event.event_code,
            title: event.title,
            club_id: event.club_id,
            faculty_coordinator: event.faculty_coordinator,
            student_coordinator: event.student_coordinator,
            description: event.description,
            event_date: event.event_date,
            start_time: event.start_time,
            end_time: event.end_time,
            venue_id: event.venue_id,
            category: event.category,
            max_participants: event.max_participants,
            entry_fee: event.entry_fee,
            status: event.status,
            created_by: event.created_by,
            created_at: now,
            updated_at: now,
        };
        data.events.push(created.clone());

        if let Some(booking) = created.venue_booking(BookingStatus::Pending) {
            match data.event_booking_error.take() {
                Some(e) => report_failed_event_booking(&created, &e),
                None => {
                    data.insert_booking(booking);
                }
            }
        }
        Ok(created)
    }

    fn delete_event(&mut self, event_id: EventId) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.delete_event_with_bookings(event_id)
    }

    fn get_bookings(&mut self, filter: BookingFilter) -> Result<Vec<FullBooking>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<Booking> = data
            .bookings
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        result.sort_by_key(|b| (b.booking_date, b.start_time, b.id));
        Ok(result.into_iter().map(|b| data.full_booking(b)).collect())
    }

    fn create_booking(&mut self, booking: NewBooking) -> Result<BookingId, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.venue_for_scheduling(booking.venue_id)?;
        scheduling::check_booking_request(
            &booking,
            &data.venue_bookings(booking.venue_id),
            &data.venue_events(booking.venue_id),
        )?;
        if let Some(event_id) = booking.event_id {
            if !data.events.iter().any(|e| e.id == event_id) {
                return Err(StoreError::InvalidInputData(
                    "Booking's event_id must be null or reference an existing event.".to_owned(),
                ));
            }
        }
        Ok(data.insert_booking(booking))
    }

    fn delete_booking(&mut self, booking_id: BookingId) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let linked_event = data
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .ok_or(StoreError::NotExisting)?
            .event_id;
        data.bookings.retain(|b| b.id != booking_id);
        if let Some(event_id) = linked_event {
            data.delete_event_with_bookings(event_id)?;
        }
        Ok(())
    }

    fn backfill_bookings_from_events(&mut self) -> Result<BackfillOutcome, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if !data.bookings.is_empty() {
            return Ok(BackfillOutcome::AlreadyPopulated(data.bookings.len() as i64));
        }
        let mut events = data.events.clone();
        events.sort_by_key(|e| e.id);
        let new_bookings: Vec<NewBooking> = events
            .iter()
            .filter_map(|e| e.venue_booking(BookingStatus::mirroring(e.status)))
            .collect();
        let inserted = new_bookings.len();
        for booking in new_bookings {
            data.insert_booking(booking);
        }
        Ok(BackfillOutcome::Inserted(inserted))
    }

    fn get_clubs(&mut self) -> Result<Vec<Club>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result = data.clubs.clone();
        result.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    fn create_club(&mut self, club: NewClub) -> Result<ClubId, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let id = data.next_id();
        data.clubs.push(Club {
            id,
            name: club.name,
            description: club.description,
            coordinator_email: club.coordinator_email,
            coordinator_contact: club.coordinator_contact,
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    fn delete_club(&mut self, club_id: ClubId) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let count_before = data.clubs.len();
        data.clubs.retain(|c| c.id != club_id);
        if data.clubs.len() == count_before {
            return Err(StoreError::NotExisting);
        }
        for event in data.events.iter_mut() {
            if event.club_id == Some(club_id) {
                event.club_id = None;
            }
        }
        Ok(())
    }
}
