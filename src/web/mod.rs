//! HTTP interface.
//!
//! A single upload endpoint behind rate limiting, CORS and security headers,
//! plus health and OpenAPI routes.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
