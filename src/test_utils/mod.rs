//! Test utilities: in-memory gateways with failure injection.

pub mod mocks;

pub use mocks::{MockConfig, MockDatabaseClient, MockItemRepository, MockUserRepository};
