//! Service wiring: every fleet service over one shared store.

use std::sync::Arc;

use taxifleet_auth::{AuthConfig, AuthError, AuthService, PasswordHasher, RoleMasks};
use taxifleet_core::DomainResult;
use taxifleet_fleet::{
    DashboardService, DepositService, ExpenseService, ReportService, TaxiService, Tenant, TenantService,
    UserAdminService,
};
use taxifleet_infra::InMemoryStore;

pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub tenants: TenantService,
    pub users: UserAdminService,
    pub taxis: TaxiService,
    pub reports: ReportService,
    pub expenses: ExpenseService,
    pub deposits: DepositService,
    pub dashboard: DashboardService,
    pub masks: RoleMasks,
    pub store: InMemoryStore,
}

impl AppServices {
    pub fn build(config: &AuthConfig, store: InMemoryStore) -> Result<Self, AuthError> {
        let masks = config.role_masks;
        let auth = AuthService::new(config, store.users.clone(), store.sessions.clone())?;

        Ok(Self {
            auth: Arc::new(auth),
            tenants: TenantService::new(store.tenants.clone()),
            users: UserAdminService::new(
                store.users.clone(),
                store.sessions.clone(),
                store.tenants.clone(),
                PasswordHasher::new(config.password_cost)?,
                masks,
            ),
            taxis: TaxiService::new(store.taxis.clone(), store.users.clone()),
            reports: ReportService::new(store.reports.clone(), store.taxis.clone(), store.expenses.clone(), masks),
            expenses: ExpenseService::new(store.expenses.clone(), store.reports.clone(), store.taxis.clone()),
            deposits: DepositService::new(store.deposits.clone()),
            dashboard: DashboardService::new(store.taxis.clone(), store.reports.clone(), store.expenses.clone()),
            masks,
            store,
        })
    }

    pub fn in_memory(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::build(config, InMemoryStore::new())
    }

    pub fn seed_demo(&self) -> DomainResult<Option<Tenant>> {
        taxifleet_infra::seed_demo(&self.tenants, &self.users, &self.taxis, &self.masks)
    }
}
