use std::fmt::Display;

mod endpoints_booking;
mod endpoints_club;
mod endpoints_event;
mod endpoints_health;
mod endpoints_venue;

use crate::data_store::StoreError;
use crate::scheduling::{ConflictSource, SchedulingError};
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    web, HttpResponse,
};
use serde_json::json;

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(get_api_service());
}

fn get_api_service() -> actix_web::Scope {
    let json_config =
        web::JsonConfig::default().error_handler(|err, _req| APIError::InvalidJson(err).into());
    let query_config =
        web::QueryConfig::default().error_handler(|err, _req| APIError::InvalidQuery(err).into());
    web::scope("/api/v1")
        .app_data(json_config)
        .app_data(query_config)
        .service(endpoints_health::health)
        // "/venues/available" must be registered before "/venues/{venue_id}"
        .service(endpoints_venue::list_available_venues)
        .service(endpoints_venue::list_venues)
        .service(endpoints_venue::get_venue)
        .service(endpoints_venue::create_venue)
        .service(endpoints_venue::delete_venue)
        .service(endpoints_event::list_events)
        .service(endpoints_event::create_event)
        .service(endpoints_event::delete_event)
        .service(endpoints_booking::backfill_bookings)
        .service(endpoints_booking::list_bookings)
        .service(endpoints_booking::create_booking)
        .service(endpoints_booking::delete_booking)
        .service(endpoints_club::list_clubs)
        .service(endpoints_club::create_club)
        .service(endpoints_club::delete_club)
}

#[derive(Debug)]
pub enum APIError {
    NotExisting,
    AlreadyExisting,
    InvalidJson(JsonPayloadError),
    InvalidQuery(QueryPayloadError),
    InvalidData(String),
    /// The request has been refused by the double-booking prevention
    SchedulingRejected(SchedulingError),
    TransactionConflict,
    InternalError(String),
}

impl Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExisting => f.write_str("Element does not exist")?,
            Self::AlreadyExisting => {
                f.write_str("Element already exists")?;
            }
            Self::InternalError(s) => {
                f.write_str("Internal error: ")?;
                f.write_str(s)?;
            }
            Self::InvalidJson(e) => {
                write!(f, "Invalid JSON request data: {}", e)?;
            }
            Self::InvalidQuery(e) => {
                write!(f, "Invalid query parameters: {}", e)?;
            }
            Self::InvalidData(e) => {
                write!(f, "Invalid request data: {}", e)?;
            }
            Self::SchedulingRejected(e) => {
                write!(f, "{}", e)?;
            }
            Self::TransactionConflict => {
                f.write_str("Concurrent database transaction conflict. Please retry request.")?;
            }
        };
        Ok(())
    }
}

impl APIError {
    fn conflict_source(&self) -> Option<ConflictSource> {
        match self {
            Self::SchedulingRejected(SchedulingError::SlotTaken(source)) => Some(*source),
            _ => None,
        }
    }
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse {
        let message = format!("{}", self);

        let body = match self.conflict_source() {
            Some(source) => json!({
                "httpCode": self.status_code().as_u16(),
                "message": message,
                "conflictWith": source.name(),
            }),
            None => json!({
                "httpCode": self.status_code().as_u16(),
                "message": message
            }),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotExisting => StatusCode::NOT_FOUND,
            Self::AlreadyExisting => StatusCode::CONFLICT,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidJson(e) => match e {
                JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::InvalidData(_) => StatusCode::BAD_REQUEST,
            Self::SchedulingRejected(SchedulingError::SlotTaken(_)) => StatusCode::CONFLICT,
            Self::SchedulingRejected(_) => StatusCode::BAD_REQUEST,
            Self::TransactionConflict => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionError(error) => {
                Self::InternalError(format!("Could not connect to database: {}", error))
            }
            StoreError::QueryError(diesel_error) => Self::InternalError(format!(
                "Error while executing database query: {}",
                diesel_error
            )),
            StoreError::TransactionConflict => Self::TransactionConflict,
            StoreError::NotExisting => Self::NotExisting,
            StoreError::ConflictEntityExists => Self::AlreadyExisting,
            StoreError::InvalidInputData(e) => Self::InvalidData(e),
            StoreError::InvalidDataInDatabase(e) => Self::InternalError(format!(
                "Data queried from database could not be deserialized: {}",
                e
            )),
            StoreError::SchedulingRejected(e) => Self::SchedulingRejected(e),
        }
    }
}

impl From<SchedulingError> for APIError {
    fn from(e: SchedulingError) -> Self {
        Self::SchedulingRejected(e)
    }
}

impl From<actix_web::error::BlockingError> for APIError {
    fn from(_e: actix_web::error::BlockingError) -> Self {
        APIError::InternalError(
            "Could not get thread from thread pool for synchronous database operation.".to_owned(),
        )
    }
}
