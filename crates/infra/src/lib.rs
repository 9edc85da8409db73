//! `taxifleet-infra` — storage adapters and seed data.
//!
//! The in-memory store implements every repository trait declared by the
//! domain crates; it backs the API binary in development and every
//! integration test.

pub mod seed;
pub mod store;

mod integration_tests;

pub use seed::{DEMO_SUBDOMAIN, DEMO_USERS, seed_demo};
pub use store::{InMemoryStore, InMemoryTable, Stored};
