use crate::data_store::models::NewVenue;
use crate::scheduling::TimeSlot;
use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::Deserialize;

#[get("/venues")]
async fn list_venues(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let venues: Vec<eventhub_api_types::Venue> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_venues()?)
    })
    .await??
    .into_iter()
    .map(|v| v.into())
    .collect();
    Ok(web::Json(venues))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityQuery {
    date: chrono::NaiveDate,
    start_time: String,
    end_time: String,
}

/// List all venues which are free on the given date for the whole given time span
#[get("/venues/available")]
async fn list_available_venues(
    query: web::Query<AvailabilityQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let query = query.into_inner();
    let slot = TimeSlot::from_user_input(&query.start_time, &query.end_time)?;
    let venues: Vec<eventhub_api_types::Venue> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_available_venues(query.date, slot)?)
    })
    .await??
    .into_iter()
    .map(|v| v.into())
    .collect();
    Ok(web::Json(venues))
}

#[post("/venues")]
async fn create_venue(
    data: web::Json<eventhub_api_types::NewVenue>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let venue: NewVenue = data.into_inner().try_into().map_err(APIError::InvalidData)?;
    let id = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.create_venue(venue)?)
    })
    .await??;
    Ok(HttpResponse::Created().json(eventhub_api_types::CreatedId { id }))
}

#[get("/venues/{venue_id}")]
async fn get_venue(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let venue_id = path.into_inner();
    let venue: eventhub_api_types::Venue = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_venue(venue_id)?)
    })
    .await??
    .into();
    Ok(web::Json(venue))
}

#[delete("/venues/{venue_id}")]
async fn delete_venue(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let venue_id = path.into_inner();
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.delete_venue(venue_id)?)
    })
    .await??;
    Ok(HttpResponse::NoContent())
}
