use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{get, web, Responder};

#[get("/health")]
async fn health(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.check_connection()?)
    })
    .await??;
    Ok(web::Json(eventhub_api_types::HealthStatus {
        status: "ok".to_owned(),
        version: crate::get_version().to_owned(),
    }))
}
