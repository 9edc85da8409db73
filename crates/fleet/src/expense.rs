//! Expenses, optionally rolled up into a weekly report.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taxifleet_auth::Principal;
use taxifleet_core::{
    DomainResult, Entity, ExpenseId, ReportId, Repository, SoftDelete, TaxiId, TenantId, TenantScoped,
    UserId,
};

use crate::money::validate_amount;
use crate::report::{ReportRepository, WeeklyReport, recompute_total_expenses};
use crate::scope::load_scoped;
use crate::taxi::{Taxi, TaxiRepository};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Fuel,
    Maintenance,
    Insurance,
    Repair,
    Cleaning,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub tenant_id: TenantId,
    pub report_id: Option<ReportId>,
    pub taxi_id: Option<TaxiId>,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub reason: String,
    pub receipt_url: String,
    pub date: NaiveDate,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> ExpenseId {
        self.id
    }

    fn set_id(&mut self, id: ExpenseId) {
        self.id = id;
    }
}

impl TenantScoped for Expense {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl SoftDelete for Expense {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

pub trait ExpenseRepository: Repository<Expense> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Expense>>;

    fn list_by_report(&self, tenant_id: TenantId, report_id: ReportId) -> DomainResult<Vec<Expense>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub report_id: Option<ReportId>,
    pub taxi_id: Option<TaxiId>,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub receipt_url: String,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePatch {
    pub category: Option<ExpenseCategory>,
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
    pub receipt_url: Option<String>,
    pub date: Option<NaiveDate>,
}

pub struct ExpenseService {
    expenses: Arc<dyn ExpenseRepository>,
    reports: Arc<dyn ReportRepository>,
    taxis: Arc<dyn TaxiRepository>,
}

impl ExpenseService {
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        reports: Arc<dyn ReportRepository>,
        taxis: Arc<dyn TaxiRepository>,
    ) -> Self {
        Self {
            expenses,
            reports,
            taxis,
        }
    }

    pub fn create(&self, actor: &Principal, input: NewExpense) -> DomainResult<Expense> {
        validate_amount("amount", input.amount)?;
        if let Some(report_id) = input.report_id {
            load_scoped::<WeeklyReport, _>(&*self.reports, report_id, actor.tenant_id, "report")?;
        }
        if let Some(taxi_id) = input.taxi_id {
            load_scoped::<Taxi, _>(&*self.taxis, taxi_id, actor.tenant_id, "taxi")?;
        }

        let now = Utc::now();
        let expense = self.expenses.insert(Expense {
            id: ExpenseId::default(),
            tenant_id: actor.tenant_id,
            report_id: input.report_id,
            taxi_id: input.taxi_id,
            category: input.category,
            amount: input.amount,
            reason: input.reason,
            receipt_url: input.receipt_url,
            date: input.date.unwrap_or_else(|| now.date_naive()),
            created_by: actor.user_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })?;
        tracing::info!(expense_id = %expense.id, tenant_id = %expense.tenant_id, "expense created");

        self.sync_report_total(actor.tenant_id, expense.report_id);
        Ok(expense)
    }

    pub fn get(&self, actor: &Principal, id: ExpenseId) -> DomainResult<Expense> {
        load_scoped(&*self.expenses, id, actor.tenant_id, "expense")
    }

    /// Most recent date first.
    pub fn list(&self, actor: &Principal) -> DomainResult<Vec<Expense>> {
        let mut expenses = self.expenses.list_by_tenant(actor.tenant_id)?;
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(expenses)
    }

    pub fn update(&self, actor: &Principal, id: ExpenseId, patch: ExpensePatch) -> DomainResult<Expense> {
        let mut expense = self.get(actor, id)?;

        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(amount) = patch.amount {
            validate_amount("amount", amount)?;
            expense.amount = amount;
        }
        if let Some(reason) = patch.reason {
            expense.reason = reason;
        }
        if let Some(receipt_url) = patch.receipt_url {
            expense.receipt_url = receipt_url;
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }

        expense.updated_at = Utc::now();
        let expense = self.expenses.update(expense)?;
        self.sync_report_total(actor.tenant_id, expense.report_id);
        Ok(expense)
    }

    pub fn delete(&self, actor: &Principal, id: ExpenseId) -> DomainResult<()> {
        let expense = self.get(actor, id)?;
        self.expenses.delete(id)?;
        self.sync_report_total(actor.tenant_id, expense.report_id);
        Ok(())
    }

    /// Runs after the expense write; failures are logged, not returned.
    fn sync_report_total(&self, tenant_id: TenantId, report_id: Option<ReportId>) {
        let Some(report_id) = report_id else {
            return;
        };
        match recompute_total_expenses(&*self.reports, &*self.expenses, tenant_id, report_id) {
            Ok(report) => {
                tracing::debug!(report_id = %report.id, total_expenses = %report.total_expenses, "report total recomputed");
            }
            Err(e) => {
                tracing::warn!(report_id = %report_id, tenant_id = %tenant_id, error = %e, "report total recomputation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_lowercase_on_the_wire() {
        let c: ExpenseCategory = serde_json::from_str(r#""fuel""#).unwrap();
        assert_eq!(c, ExpenseCategory::Fuel);
        assert_eq!(serde_json::to_string(&ExpenseCategory::Cleaning).unwrap(), r#""cleaning""#);
        assert!(serde_json::from_str::<ExpenseCategory>(r#""snacks""#).is_err());
    }
}
