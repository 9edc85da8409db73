//! Repository trait implementations over [`InMemoryTable`].

use taxifleet_auth::{Session, SessionRepository, User, UserRepository};
use taxifleet_core::{DomainResult, ExpectedVersion, ReportId, TenantId, UserId};
use taxifleet_fleet::{
    BankDeposit, DepositRepository, Expense, ExpenseRepository, ReportRepository, Taxi, TaxiRepository, Tenant,
    TenantRepository, WeeklyReport,
};

use super::table::{InMemoryTable, Stored};

impl Stored for Tenant {}
impl Stored for User {}
impl Stored for Session {}
impl Stored for Taxi {}
impl Stored for Expense {}
impl Stored for BankDeposit {}

impl Stored for WeeklyReport {
    fn before_update(&mut self, stored: &Self) {
        self.version = stored.version + 1;
    }
}

impl TenantRepository for InMemoryTable<Tenant> {
    fn find_by_subdomain(&self, subdomain: &str) -> DomainResult<Option<Tenant>> {
        self.find(|t| t.subdomain == subdomain)
    }

    fn list_all(&self) -> DomainResult<Vec<Tenant>> {
        self.filter(|_| true)
    }
}

impl UserRepository for InMemoryTable<User> {
    fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.find(|u| u.email == email)
    }

    fn find_by_phone(&self, phone: &str) -> DomainResult<Option<User>> {
        self.find(|u| u.phone == phone)
    }

    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<User>> {
        self.filter(|u| u.tenant_id == tenant_id)
    }

    fn list_all(&self) -> DomainResult<Vec<User>> {
        self.filter(|_| true)
    }
}

impl SessionRepository for InMemoryTable<Session> {
    fn find_by_token(&self, token: &str) -> DomainResult<Option<Session>> {
        self.find(|s| s.token == token)
    }

    fn delete_by_token(&self, user_id: UserId, token: &str) -> DomainResult<bool> {
        Ok(self.delete_where(|s| s.user_id == user_id && s.token == token)? > 0)
    }

    fn delete_for_user(&self, user_id: UserId) -> DomainResult<usize> {
        self.delete_where(|s| s.user_id == user_id)
    }
}

impl TaxiRepository for InMemoryTable<Taxi> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Taxi>> {
        self.filter(|t| t.tenant_id == tenant_id)
    }
}

impl ReportRepository for InMemoryTable<WeeklyReport> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<WeeklyReport>> {
        self.filter(|r| r.tenant_id == tenant_id)
    }

    fn list_by_driver(&self, tenant_id: TenantId, driver_id: UserId) -> DomainResult<Vec<WeeklyReport>> {
        self.filter(|r| r.tenant_id == tenant_id && r.driver_id == driver_id)
    }

    fn update_versioned(&self, report: WeeklyReport, expected: ExpectedVersion) -> DomainResult<WeeklyReport> {
        self.update_checked(report, expected)
    }
}

impl ExpenseRepository for InMemoryTable<Expense> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Expense>> {
        self.filter(|e| e.tenant_id == tenant_id)
    }

    fn list_by_report(&self, tenant_id: TenantId, report_id: ReportId) -> DomainResult<Vec<Expense>> {
        self.filter(|e| e.tenant_id == tenant_id && e.report_id == Some(report_id))
    }
}

impl DepositRepository for InMemoryTable<BankDeposit> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<BankDeposit>> {
        self.filter(|d| d.tenant_id == tenant_id)
    }
}
