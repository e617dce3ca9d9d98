//! HTTP surface: request plumbing, multipart uploads, routes

pub mod http;
pub mod multipart;
pub mod routes;
pub mod upload;

pub use routes::{handle_request, serve, AppState};
