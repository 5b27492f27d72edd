use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::response::Response;
use axum::Json;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use log::debug;
use serde::de::DeserializeOwned;
use tap::TapFallible;

use crate::error::error_response;
use types::error::Error;

/// Session token from an `Authorization: Bearer` header, when one is sent.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = TypedHeader::<Authorization<Bearer>>::from_request_parts(req, state)
            .await
            .tap_err(|e| debug!("No bearer token: {}", e))
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string());
        Ok(BearerToken(token))
    }
}

impl BearerToken {
    /// The body's token wins over the header's.
    pub fn or_body(self, body_token: Option<String>) -> Option<String> {
        body_token.or(self.0)
    }
}

/// `Json` whose rejections use the API's error body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(rejection_response(rejection)),
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    debug!("Rejected request body: {}", rejection);
    error_response(Error::InvalidBody(rejection.body_text()))
}
