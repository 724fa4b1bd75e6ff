use super::{
    models, report_failed_event_booking, schema, BackfillOutcome, BookingFilter, BookingFilterBuilder, BookingId, ClubId,
    EventFilter, EventFilterBuilder, EventHubStore, EventHubStoreFacade, EventId, StoreError,
    VenueId,
};
use crate::scheduling::{self, SchedulingError, TimeSlot};
use chrono::NaiveDate;
use diesel::expression::AsExpression;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::collections::HashMap;

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let connection_manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(database_url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .min_idle(Some(2))
                .build(connection_manager)?,
        })
    }
}

impl EventHubStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn EventHubStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

impl EventHubStoreFacade for PgDataStoreFacade {
    fn check_connection(&mut self) -> Result<(), StoreError> {
        diesel::sql_query("SELECT 1").execute(&mut self.connection)?;
        Ok(())
    }

    fn get_venues(&mut self) -> Result<Vec<models::Venue>, StoreError> {
        use schema::venues::dsl::*;

        Ok(venues
            .select(models::Venue::as_select())
            .order_by((room_number.asc(), building.asc(), id.asc()))
            .load::<models::Venue>(&mut self.connection)?)
    }

    fn get_venue(&mut self, venue_id: VenueId) -> Result<models::Venue, StoreError> {
        use schema::venues::dsl::*;

        Ok(venues
            .filter(id.eq(venue_id))
            .select(models::Venue::as_select())
            .first::<models::Venue>(&mut self.connection)?)
    }

    fn get_available_venues(
        &mut self,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Result<Vec<models::Venue>, StoreError> {
        use diesel::dsl::{exists, not};
        use schema::venues::dsl::*;

        let occupying_bookings = schema::bookings::table
            .filter(schema::bookings::venue_id.eq(id))
            .filter(schema::bookings::booking_date.eq(date))
            .filter(schema::bookings::status.ne(models::BookingStatus::Rejected))
            .filter(schema::bookings::start_time.lt(slot.end))
            .filter(schema::bookings::end_time.gt(slot.begin));
        let occupying_events = schema::events::table
            .filter(schema::events::venue_id.eq(id.nullable()))
            .filter(schema::events::event_date.eq(date))
            .filter(schema::events::start_time.lt(slot.end))
            .filter(schema::events::end_time.gt(slot.begin));

        Ok(venues
            .filter(not(exists(occupying_bookings)))
            .filter(not(exists(occupying_events)))
            .select(models::Venue::as_select())
            .order_by((room_number.asc(), building.asc(), id.asc()))
            .load::<models::Venue>(&mut self.connection)?)
    }

    fn create_venue(&mut self, venue: models::NewVenue) -> Result<VenueId, StoreError> {
        use schema::venues::dsl::*;

        Ok(diesel::insert_into(venues)
            .values(&venue)
            .returning(id)
            .get_result::<VenueId>(&mut self.connection)?)
    }

    fn delete_venue(&mut self, venue_id: VenueId) -> Result<(), StoreError> {
        use schema::venues::dsl::*;

        // Bookings of the venue are removed and events are detached by the foreign key constraints
        let count = diesel::delete(venues.filter(id.eq(venue_id))).execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }

    fn get_events(&mut self, filter: EventFilter) -> Result<Vec<models::FullEvent>, StoreError> {
        use schema::events::dsl::*;

        self.connection.transaction(|connection| {
            let the_events = events
                .filter(event_filter_to_sql(filter))
                .select(models::Event::as_select())
                .order_by((event_date.desc(), start_time.asc(), id.asc()))
                .load::<models::Event>(connection)?;
            load_event_context(connection, the_events)
        })
    }

    fn create_event(&mut self, event: models::NewEvent) -> Result<models::Event, StoreError> {
        let the_venue_id = scheduling::require_venue(event.venue_id)?;

        self.connection
            .build_transaction()
            .serializable()
            .run(|connection| {
                let venue = load_venue_for_scheduling(connection, the_venue_id)?;
                let slot = event.time_slot();
                let (bookings, events) =
                    load_venue_occupation(connection, the_venue_id, event.event_date, slot)?;
                scheduling::check_event_request(
                    &venue,
                    event.max_participants,
                    event.event_date,
                    &slot,
                    &bookings,
                    &events,
                )?;

                let created = diesel::insert_into(schema::events::table)
                    .values(&event)
                    .returning(models::Event::as_returning())
                    .get_result::<models::Event>(connection)?;

                if let Some(booking) = created.venue_booking(models::BookingStatus::Pending) {
                    // Savepoint, such that a failing insert does not abort the outer transaction
                    let result = connection.transaction::<_, StoreError, _>(|connection| {
                        diesel::insert_into(schema::bookings::table)
                            .values(&booking)
                            .execute(connection)?;
                        Ok(())
                    });
                    if let Err(e) = result {
                        report_failed_event_booking(&created, &e);
                    }
                }
                Ok(created)
            })
    }

    fn delete_event(&mut self, event_id: EventId) -> Result<(), StoreError> {
        self.connection.transaction(|connection| {
            delete_event_with_bookings(connection, event_id)?;
            Ok(())
        })
    }

    fn get_bookings(
        &mut self,
        filter: BookingFilter,
    ) -> Result<Vec<models::FullBooking>, StoreError> {
        use schema::bookings::dsl::*;

        self.connection.transaction(|connection| {
            let the_bookings = bookings
                .filter(booking_filter_to_sql(filter))
                .select(models::Booking::as_select())
                .order_by((booking_date.asc(), start_time.asc(), id.asc()))
                .load::<models::Booking>(connection)?;

            let the_venues =
                load_venues_by_id(connection, the_bookings.iter().map(|b| b.venue_id))?;
            let linked_event_ids: Vec<EventId> =
                the_bookings.iter().filter_map(|b| b.event_id).collect();
            let linked_events = schema::events::table
                .filter(schema::events::id.eq_any(linked_event_ids))
                .select(models::Event::as_select())
                .load::<models::Event>(connection)?;
            let linked_events: HashMap<EventId, models::FullEvent> =
                load_event_context(connection, linked_events)?
                    .into_iter()
                    .map(|e| (e.event.id, e))
                    .collect();

            Ok(the_bookings
                .into_iter()
                .map(|booking| models::FullBooking {
                    venue: the_venues.get(&booking.venue_id).cloned(),
                    event: booking.event_id.and_then(|e| linked_events.get(&e).cloned()),
                    booking,
                })
                .collect())
        })
    }

    fn create_booking(&mut self, booking: models::NewBooking) -> Result<BookingId, StoreError> {
        self.connection
            .build_transaction()
            .serializable()
            .run(|connection| {
                load_venue_for_scheduling(connection, booking.venue_id)?;
                if booking.status.is_active() {
                    let (bookings, events) = load_venue_occupation(
                        connection,
                        booking.venue_id,
                        booking.booking_date,
                        booking.time_slot(),
                    )?;
                    scheduling::check_booking_request(&booking, &bookings, &events)?;
                }
                Ok(diesel::insert_into(schema::bookings::table)
                    .values(&booking)
                    .returning(schema::bookings::id)
                    .get_result::<BookingId>(connection)?)
            })
    }

    fn delete_booking(&mut self, booking_id: BookingId) -> Result<(), StoreError> {
        use schema::bookings::dsl::*;

        self.connection.transaction(|connection| {
            let linked_event = bookings
                .filter(id.eq(booking_id))
                .select(event_id)
                .first::<Option<EventId>>(connection)?;
            diesel::delete(bookings.filter(id.eq(booking_id))).execute(connection)?;
            if let Some(linked_event) = linked_event {
                delete_event_with_bookings(connection, linked_event)?;
            }
            Ok(())
        })
    }

    fn backfill_bookings_from_events(&mut self) -> Result<BackfillOutcome, StoreError> {
        self.connection
            .build_transaction()
            .serializable()
            .run(|connection| {
                let existing = schema::bookings::table
                    .count()
                    .get_result::<i64>(connection)?;
                if existing > 0 {
                    return Ok(BackfillOutcome::AlreadyPopulated(existing));
                }

                let new_bookings: Vec<models::NewBooking> = schema::events::table
                    .filter(schema::events::venue_id.is_not_null())
                    .select(models::Event::as_select())
                    .order_by(schema::events::id.asc())
                    .load::<models::Event>(connection)?
                    .iter()
                    .filter_map(|e| e.venue_booking(models::BookingStatus::mirroring(e.status)))
                    .collect();
                if new_bookings.is_empty() {
                    return Ok(BackfillOutcome::Inserted(0));
                }
                let inserted = diesel::insert_into(schema::bookings::table)
                    .values(&new_bookings)
                    .execute(connection)?;
                Ok(BackfillOutcome::Inserted(inserted))
            })
    }

    fn get_clubs(&mut self) -> Result<Vec<models::Club>, StoreError> {
        use schema::clubs::dsl::*;

        Ok(clubs
            .select(models::Club::as_select())
            .order_by((name.asc(), id.asc()))
            .load::<models::Club>(&mut self.connection)?)
    }

    fn create_club(&mut self, club: models::NewClub) -> Result<ClubId, StoreError> {
        use schema::clubs::dsl::*;

        Ok(diesel::insert_into(clubs)
            .values(&club)
            .returning(id)
            .get_result::<ClubId>(&mut self.connection)?)
    }

    fn delete_club(&mut self, club_id: ClubId) -> Result<(), StoreError> {
        use schema::clubs::dsl::*;

        let count = diesel::delete(clubs.filter(id.eq(club_id))).execute(&mut self.connection)?;
        if count == 0 {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }
}

/// Get the venue with the given id, reporting a missing venue as scheduling error
fn load_venue_for_scheduling(
    connection: &mut PgConnection,
    the_venue_id: VenueId,
) -> Result<models::Venue, StoreError> {
    use schema::venues::dsl::*;

    venues
        .filter(id.eq(the_venue_id))
        .select(models::Venue::as_select())
        .first::<models::Venue>(connection)
        .optional()?
        .ok_or(StoreError::SchedulingRejected(
            SchedulingError::UnknownVenue(the_venue_id),
        ))
}

/// Load the active bookings and the events of the venue on the given date, which overlap with the
/// given time slot.
fn load_venue_occupation(
    connection: &mut PgConnection,
    the_venue_id: VenueId,
    date: NaiveDate,
    slot: TimeSlot,
) -> Result<(Vec<models::Booking>, Vec<models::Event>), StoreError> {
    let mut booking_filter = BookingFilterBuilder::new();
    booking_filter
        .of_venue(the_venue_id)
        .on_date(date)
        .overlapping(slot)
        .active_only();
    let bookings = schema::bookings::table
        .filter(booking_filter_to_sql(booking_filter.build()))
        .select(models::Booking::as_select())
        .load::<models::Booking>(connection)?;

    let mut event_filter = EventFilterBuilder::new();
    event_filter
        .in_venue(the_venue_id)
        .on_date(date)
        .overlapping(slot);
    let events = schema::events::table
        .filter(event_filter_to_sql(event_filter.build()))
        .select(models::Event::as_select())
        .load::<models::Event>(connection)?;

    Ok((bookings, events))
}

/// Add the club names and venues to the given events
fn load_event_context(
    connection: &mut PgConnection,
    the_events: Vec<models::Event>,
) -> Result<Vec<models::FullEvent>, StoreError> {
    let the_venues = load_venues_by_id(connection, the_events.iter().filter_map(|e| e.venue_id))?;
    let club_ids: Vec<ClubId> = the_events.iter().filter_map(|e| e.club_id).collect();
    let club_names: HashMap<ClubId, String> = schema::clubs::table
        .filter(schema::clubs::id.eq_any(club_ids))
        .select((schema::clubs::id, schema::clubs::name))
        .load::<(ClubId, String)>(connection)?
        .into_iter()
        .collect();

    Ok(the_events
        .into_iter()
        .map(|event| models::FullEvent {
            club_name: event.club_id.and_then(|c| club_names.get(&c).cloned()),
            venue: event.venue_id.and_then(|v| the_venues.get(&v).cloned()),
            event,
        })
        .collect())
}

fn load_venues_by_id(
    connection: &mut PgConnection,
    venue_ids: impl Iterator<Item = VenueId>,
) -> Result<HashMap<VenueId, models::Venue>, StoreError> {
    let venue_ids: Vec<VenueId> = venue_ids.collect();
    Ok(schema::venues::table
        .filter(schema::venues::id.eq_any(venue_ids))
        .select(models::Venue::as_select())
        .load::<models::Venue>(connection)?
        .into_iter()
        .map(|v| (v.id, v))
        .collect())
}

fn delete_event_with_bookings(
    connection: &mut PgConnection,
    the_event_id: EventId,
) -> Result<(), StoreError> {
    diesel::delete(schema::bookings::table.filter(schema::bookings::event_id.eq(the_event_id)))
        .execute(connection)?;
    let count = diesel::delete(schema::events::table.filter(schema::events::id.eq(the_event_id)))
        .execute(connection)?;
    if count == 0 {
        return Err(StoreError::NotExisting);
    }
    Ok(())
}

type BoxedBoolExpression<'a, Table> =
    Box<dyn BoxableExpression<Table, diesel::pg::Pg, SqlType = diesel::sql_types::Bool> + 'a>;

fn booking_filter_to_sql<'a>(
    filter: BookingFilter,
) -> BoxedBoolExpression<'a, schema::bookings::table> {
    use schema::bookings::dsl::*;

    let mut expression: BoxedBoolExpression<'a, schema::bookings::table> =
        Box::new(diesel::dsl::sql::<diesel::sql_types::Bool>("TRUE"));
    if let Some(date) = filter.date {
        expression = Box::new(expression.as_expression().and(booking_date.eq(date)));
    }
    if let Some(the_venue_id) = filter.venue_id {
        expression = Box::new(expression.as_expression().and(venue_id.eq(the_venue_id)));
    }
    if let Some(the_event_id) = filter.event_id {
        expression = Box::new(
            expression
                .as_expression()
                .and(event_id.eq(the_event_id).assume_not_null()),
        );
    }
    if let Some(slot) = filter.overlapping {
        expression = Box::new(
            expression
                .as_expression()
                .and(start_time.lt(slot.end))
                .and(end_time.gt(slot.begin)),
        );
    }
    if filter.active_only {
        expression = Box::new(
            expression
                .as_expression()
                .and(status.ne(models::BookingStatus::Rejected)),
        );
    }
    expression
}

fn event_filter_to_sql<'a>(filter: EventFilter) -> BoxedBoolExpression<'a, schema::events::table> {
    use schema::events::dsl::*;

    let mut expression: BoxedBoolExpression<'a, schema::events::table> =
        Box::new(diesel::dsl::sql::<diesel::sql_types::Bool>("TRUE"));
    if let Some(date) = filter.date {
        expression = Box::new(expression.as_expression().and(event_date.eq(date)));
    }
    if let Some(the_venue_id) = filter.venue_id {
        expression = Box::new(
            expression
                .as_expression()
                .and(venue_id.eq(the_venue_id).assume_not_null()),
        );
    }
    if let Some(slot) = filter.overlapping {
        expression = Box::new(
            expression
                .as_expression()
                .and(start_time.lt(slot.end))
                .and(end_time.gt(slot.begin)),
        );
    }
    expression
}

#[rustfmt::skip]
pub fn description_for_postgres_constraint(constraint_name: &str) -> Option<&'static str> {
    match constraint_name {
        "bookings_event_id_fkey" => Some("Booking's event_id must be null or reference an existing event."),
        "bookings_time_range" => Some("Booking's start_time must be earlier than end_time."),
        "bookings_venue_id_fkey" => Some("Booking's venue_id must reference an existing venue."),
        "events_club_id_fkey" => Some("Event's club_id must be null or reference an existing club."),
        "events_max_participants_positive" => Some("Event's max_participants must be positive."),
        "events_time_range" => Some("Event's start_time must be earlier than end_time."),
        "events_venue_id_fkey" => Some("Event's venue_id must reference an existing venue."),
        "venues_capacity_positive" => Some("Venue's capacity must be positive."),
        _ => None,
    }
}
