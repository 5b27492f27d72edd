use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;

use types::domain::MessageResponse;
use types::error::Error;

const SERVER_ERROR: &str = "Server error";

pub fn error_response(error: Error) -> Response {
    let (status, message) = error.into_response_tuple();
    (status, Json(MessageResponse::failure(message))).into_response()
}

/// Known failures keep their status and message; anything else is an opaque 500.
pub fn report_into_response(e: eyre::Report) -> Response {
    error!("Error occurred: {:?}", e);
    match e.downcast::<Error>() {
        Ok(error) => error_response(error),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse::failure(SERVER_ERROR)),
        )
            .into_response(),
    }
}
