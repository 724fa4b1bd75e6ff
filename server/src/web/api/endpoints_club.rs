use crate::data_store::models::NewClub;
use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{delete, get, post, web, HttpResponse, Responder};

#[get("/clubs")]
async fn list_clubs(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let clubs: Vec<eventhub_api_types::Club> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_clubs()?)
    })
    .await??
    .into_iter()
    .map(|c| c.into())
    .collect();
    Ok(web::Json(clubs))
}

#[post("/clubs")]
async fn create_club(
    data: web::Json<eventhub_api_types::NewClub>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let club: NewClub = data.into_inner().try_into().map_err(APIError::InvalidData)?;
    let id = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.create_club(club)?)
    })
    .await??;
    Ok(HttpResponse::Created().json(eventhub_api_types::CreatedId { id }))
}

#[delete("/clubs/{club_id}")]
async fn delete_club(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let club_id = path.into_inner();
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.delete_club(club_id)?)
    })
    .await??;
    Ok(HttpResponse::NoContent())
}
