use crate::data_store::models::NewBooking;
use crate::data_store::{BackfillOutcome, BookingFilterBuilder};
use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use log::info;
use serde::Deserialize;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BookingListQuery {
    #[serde(default)]
    date: Option<chrono::NaiveDate>,
    #[serde(default)]
    venue_id: Option<i32>,
    #[serde(default)]
    event_id: Option<i32>,
}

#[get("/bookings")]
async fn list_bookings(
    query: web::Query<BookingListQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let query = query.into_inner();
    let mut filter = BookingFilterBuilder::new();
    if let Some(date) = query.date {
        filter.on_date(date);
    }
    if let Some(venue_id) = query.venue_id {
        filter.of_venue(venue_id);
    }
    if let Some(event_id) = query.event_id {
        filter.for_event(event_id);
    }
    let bookings: Vec<eventhub_api_types::Booking> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_bookings(filter.build())?)
    })
    .await??
    .into_iter()
    .map(|b| b.into())
    .collect();
    Ok(web::Json(bookings))
}

#[post("/bookings")]
async fn create_booking(
    data: web::Json<eventhub_api_types::NewBooking>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let booking: NewBooking = data.into_inner().try_into()?;
    let id = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.create_booking(booking)?)
    })
    .await??;
    Ok(HttpResponse::Created().json(eventhub_api_types::CreatedId { id }))
}

/// Delete a booking. An event linked to the booking is deleted as well.
#[delete("/bookings/{booking_id}")]
async fn delete_booking(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let booking_id = path.into_inner();
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.delete_booking(booking_id)?)
    })
    .await??;
    Ok(HttpResponse::NoContent())
}

#[post("/bookings/backfill")]
async fn backfill_bookings(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let outcome = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.backfill_bookings_from_events()?)
    })
    .await??;
    let report = match outcome {
        BackfillOutcome::Inserted(inserted) => {
            info!("Created {} bookings from existing events.", inserted);
            eventhub_api_types::BackfillReport {
                inserted,
                existing_bookings: 0,
            }
        }
        BackfillOutcome::AlreadyPopulated(existing_bookings) => eventhub_api_types::BackfillReport {
            inserted: 0,
            existing_bookings,
        },
    };
    Ok(web::Json(report))
}
