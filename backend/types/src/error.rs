use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("All fields are required")]
    MissingFields,
    #[error("Email and password required")]
    MissingCredentials,
    #[error("Email already registered")]
    EmailAlreadyRegistered,
    #[error("Email already in use")]
    EmailInUse,
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid session")]
    InvalidSession,
    #[error("Session expired")]
    SessionExpired,
    #[error("User not found")]
    UserNotFound,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields => StatusCode::BAD_REQUEST,
            Error::MissingCredentials => StatusCode::BAD_REQUEST,
            Error::EmailAlreadyRegistered => StatusCode::BAD_REQUEST,
            Error::EmailInUse => StatusCode::BAD_REQUEST,
            Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidSession => StatusCode::UNAUTHORIZED,
            Error::SessionExpired => StatusCode::UNAUTHORIZED,
            Error::UserNotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn into_response_tuple(self) -> (StatusCode, String) {
        (self.status_code(), self.to_string())
    }
}
