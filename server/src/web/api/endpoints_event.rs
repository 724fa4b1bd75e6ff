use crate::data_store::models::NewEvent;
use crate::data_store::EventFilterBuilder;
use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Deserialize, Default)]
struct EventListQuery {
    #[serde(default)]
    date: Option<chrono::NaiveDate>,
}

#[get("/events")]
async fn list_events(
    query: web::Query<EventListQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let mut filter = EventFilterBuilder::new();
    if let Some(date) = query.into_inner().date {
        filter.on_date(date);
    }
    let events: Vec<eventhub_api_types::Event> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_events(filter.build())?)
    })
    .await??
    .into_iter()
    .map(|e| e.into())
    .collect();
    Ok(web::Json(events))
}

/// Create an event, if its venue is available at the requested date and time.
///
/// A pending booking of the venue is created alongside.
#[post("/events")]
async fn create_event(
    data: web::Json<eventhub_api_types::NewEvent>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let event: NewEvent = data.into_inner().try_into()?;
    let created: eventhub_api_types::Event = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.create_event(event)?)
    })
    .await??
    .into();
    Ok(web::Json(created))
}

#[delete("/events/{event_id}")]
async fn delete_event(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.delete_event(event_id)?)
    })
    .await??;
    Ok(HttpResponse::NoContent())
}
