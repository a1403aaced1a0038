//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::dto::{ErrorBody, MessageResponse, UploadFilesForm, ValidationErrorBody};
use super::handlers::{upload_files, AppState};
use super::middleware::{create_cors_layer, security_headers, upload_rate_limit, RateLimitState};
use crate::contact::FieldError;

/// Room for the text fields and multipart framing on top of the attachment cap.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// OpenAPI document for the HTTP interface.
#[derive(OpenApi)]
#[openapi(
    paths(crate::web::handlers::upload::upload_files),
    components(schemas(
        UploadFilesForm,
        MessageResponse,
        ErrorBody,
        ValidationErrorBody,
        FieldError
    )),
    tags((name = "contact", description = "Contact form relay"))
)]
pub struct ApiDoc;

/// Create the main router.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let body_limit = app_state
        .max_attachment_bytes
        .saturating_add(FORM_OVERHEAD_BYTES);

    // Only the upload route is rate limited
    let upload_routes = Router::new()
        .route("/upload_files", post(upload_files))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            upload_rate_limit(state, req, next)
        }))
        .with_state(app_state);

    Router::new()
        .merge(upload_routes)
        .merge(create_health_router())
        .merge(create_openapi_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the router serving the OpenAPI document.
pub fn create_openapi_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
