//! In-memory persistence for every entity, for tests/dev.

pub mod repositories;
pub mod table;

use std::sync::Arc;

use taxifleet_auth::{Session, User};
use taxifleet_fleet::{BankDeposit, Expense, Taxi, Tenant, WeeklyReport};

pub use table::{InMemoryTable, Stored};

/// One table per entity, shareable across services.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    pub tenants: Arc<InMemoryTable<Tenant>>,
    pub users: Arc<InMemoryTable<User>>,
    pub sessions: Arc<InMemoryTable<Session>>,
    pub taxis: Arc<InMemoryTable<Taxi>>,
    pub reports: Arc<InMemoryTable<WeeklyReport>>,
    pub expenses: Arc<InMemoryTable<Expense>>,
    pub deposits: Arc<InMemoryTable<BankDeposit>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tenants: Arc::new(InMemoryTable::new("tenant")),
            users: Arc::new(InMemoryTable::new("user")),
            sessions: Arc::new(InMemoryTable::new("session")),
            taxis: Arc::new(InMemoryTable::new("taxi")),
            reports: Arc::new(InMemoryTable::new("report")),
            expenses: Arc::new(InMemoryTable::new("expense")),
            deposits: Arc::new(InMemoryTable::new("deposit")),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
