//! RESTful user and item CRUD service.
//!
//! Layering: `api` (transport) → `app` (business rules) → `domain` traits,
//! implemented by `infra` (PostgreSQL).

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod infra;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
