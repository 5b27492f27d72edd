//! HTTP backend for the voice to-do list: session-authenticated task sync
//! over three JSON-file tables.

use std::path::PathBuf;

use axum::routing::{post, put};
use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub mod config;
pub mod domain;
pub mod error;
pub mod extensions;
pub mod handlers;
pub mod repository;
pub mod routes;
pub mod service;

pub use config::Config;
pub use routes::Api;

pub fn app(api: Api, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/verify", post(handlers::verify))
        .route("/api/auth/profile", put(handlers::update_profile))
        .route("/api/tasks/get", post(handlers::get_tasks))
        .route("/api/tasks/save", post(handlers::save_tasks));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(Extension(api))
}
