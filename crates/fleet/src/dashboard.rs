use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use taxifleet_auth::Principal;
use taxifleet_core::DomainResult;

use crate::expense::ExpenseRepository;
use crate::money::{checked_sub, checked_sum};
use crate::report::{ReportRepository, ReportStatus};
use crate::taxi::{TaxiRepository, TaxiStatus};

/// Tenant-wide headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_taxis: usize,
    /// Distinct drivers assigned to active taxis.
    pub active_drivers: usize,
    /// Reports still in draft.
    pub pending_reports: usize,
    /// Earnings of approved reports.
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_revenue: Decimal,
}

pub struct DashboardService {
    taxis: Arc<dyn TaxiRepository>,
    reports: Arc<dyn ReportRepository>,
    expenses: Arc<dyn ExpenseRepository>,
}

impl DashboardService {
    pub fn new(
        taxis: Arc<dyn TaxiRepository>,
        reports: Arc<dyn ReportRepository>,
        expenses: Arc<dyn ExpenseRepository>,
    ) -> Self {
        Self {
            taxis,
            reports,
            expenses,
        }
    }

    pub fn stats(&self, actor: &Principal) -> DomainResult<DashboardStats> {
        let taxis = self.taxis.list_by_tenant(actor.tenant_id)?;
        let reports = self.reports.list_by_tenant(actor.tenant_id)?;
        let expenses = self.expenses.list_by_tenant(actor.tenant_id)?;

        let active_drivers: HashSet<_> = taxis
            .iter()
            .filter(|t| t.status == TaxiStatus::Active)
            .filter_map(|t| t.assigned_driver_id)
            .collect();

        let total_revenue = checked_sum(
            reports
                .iter()
                .filter(|r| r.status == ReportStatus::Approved)
                .map(|r| r.earnings),
        )?;
        let total_expenses = checked_sum(expenses.iter().map(|e| e.amount))?;

        Ok(DashboardStats {
            total_taxis: taxis.len(),
            active_drivers: active_drivers.len(),
            pending_reports: reports.iter().filter(|r| r.status == ReportStatus::Draft).count(),
            total_revenue,
            total_expenses,
            net_revenue: checked_sub(total_revenue, total_expenses)?,
        })
    }
}
