//! Carbon-usage HTTP API service.
//!
//! This crate provides the REST API for tracking usage events against
//! per-unit conversion factors:
//!
//! - `/usage` - recorded consumption events
//! - `/usage_types` - unit-conversion definitions
//!
//! Each collection exposes list (paginated, filterable, orderable),
//! retrieve, create, full update, partial update and delete.
//!
//! # Authentication
//!
//! Every endpoint except `/health` requires a bearer JWT signed with the
//! shared secret from `AUTH_SECRET`; the token's `sub` claim carries the
//! user id.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use pagination::Page;
pub use routes::create_router;
pub use state::AppState;
