//! `taxifleet-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error taxonomy, and the persistence contract every store
//! implements.

pub mod entity;
pub mod error;
pub mod id;
pub mod repository;
pub mod version;

pub use entity::{Entity, SoftDelete, TenantScoped};
pub use error::{DomainError, DomainResult, StateViolation};
pub use id::{DepositId, ExpenseId, ReportId, SessionId, TaxiId, TenantId, UserId};
pub use repository::Repository;
pub use version::{ExpectedVersion, Versioned};
