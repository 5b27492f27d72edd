use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use types::domain::{
    AuthResponse, LoginRequest, MessageResponse, SaveTasksRequest, SessionRequest, SignupRequest,
    TasksResponse, UpdateProfileRequest, UserResponse,
};

use crate::error::report_into_response;
use crate::extensions::{BearerToken, JsonBody};
use crate::routes::Api;

pub async fn signup(
    Extension(api): Extension<Api>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Response {
    match api.signup(payload).await {
        Ok((user, session)) => Json(AuthResponse {
            success: true,
            message: "Account created successfully".to_string(),
            user,
            session_id: session.session_id,
        })
        .into_response(),
        Err(e) => report_into_response(e),
    }
}

pub async fn login(
    Extension(api): Extension<Api>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Response {
    match api.login(payload).await {
        Ok((user, session)) => Json(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
            user,
            session_id: session.session_id,
        })
        .into_response(),
        Err(e) => report_into_response(e),
    }
}

pub async fn logout(
    Extension(api): Extension<Api>,
    bearer: BearerToken,
    JsonBody(payload): JsonBody<SessionRequest>,
) -> Response {
    match api.logout(bearer.or_body(payload.session_id)).await {
        Ok(()) => Json(MessageResponse::ok("Logged out successfully")).into_response(),
        Err(e) => report_into_response(e),
    }
}

pub async fn verify(
    Extension(api): Extension<Api>,
    bearer: BearerToken,
    JsonBody(payload): JsonBody<SessionRequest>,
) -> Response {
    let token = bearer.or_body(payload.session_id);
    match api.verify(token.as_deref()) {
        Ok(user) => Json(UserResponse {
            success: true,
            message: None,
            user,
        })
        .into_response(),
        Err(e) => report_into_response(e),
    }
}

pub async fn update_profile(
    Extension(api): Extension<Api>,
    bearer: BearerToken,
    JsonBody(mut payload): JsonBody<UpdateProfileRequest>,
) -> Response {
    let token = bearer.or_body(payload.session_id.take());
    match api.update_profile(token.as_deref(), payload).await {
        Ok(user) => Json(UserResponse {
            success: true,
            message: Some("Profile updated".to_string()),
            user,
        })
        .into_response(),
        Err(e) => report_into_response(e),
    }
}

pub async fn get_tasks(
    Extension(api): Extension<Api>,
    bearer: BearerToken,
    JsonBody(payload): JsonBody<SessionRequest>,
) -> Response {
    let token = bearer.or_body(payload.session_id);
    match api.get_tasks(token.as_deref()) {
        Ok(tasks) => Json(TasksResponse {
            success: true,
            tasks,
        })
        .into_response(),
        Err(e) => report_into_response(e),
    }
}

pub async fn save_tasks(
    Extension(api): Extension<Api>,
    bearer: BearerToken,
    JsonBody(payload): JsonBody<SaveTasksRequest>,
) -> Response {
    let token = bearer.or_body(payload.session_id);
    match api.save_tasks(token.as_deref(), payload.tasks).await {
        Ok(()) => Json(MessageResponse::ok("Tasks saved")).into_response(),
        Err(e) => report_into_response(e),
    }
}
