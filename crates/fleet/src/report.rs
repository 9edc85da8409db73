//! Weekly driver reports and their lifecycle.
//!
//! ```text
//! draft ──submit──▶ submitted ──approve──▶ approved
//!                       └──────reject────▶ rejected
//! ```
//!
//! `approved` and `rejected` are terminal. Every write is version-checked, and
//! `total_expenses` is always recomputed from the linked expenses rather than
//! patched incrementally.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taxifleet_auth::{Permission, Principal, Role, RoleMasks};
use taxifleet_core::{
    DomainError, DomainResult, Entity, ExpectedVersion, ReportId, Repository, SoftDelete, StateViolation, TaxiId,
    TenantId, TenantScoped, UserId, Versioned,
};

use crate::expense::ExpenseRepository;
use crate::money::{checked_sum, validate_amount};
use crate::scope::{load_scoped, non_blank};
use crate::taxi::{Taxi, TaxiRepository};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Approved | ReportStatus::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyReport {
    pub id: ReportId,
    pub tenant_id: TenantId,
    pub taxi_id: TaxiId,
    pub driver_id: UserId,
    pub week_start_date: NaiveDate,
    pub earnings: Decimal,
    pub total_expenses: Decimal,
    pub status: ReportStatus,
    pub notes: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<UserId>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<UserId>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for WeeklyReport {
    type Id = ReportId;

    fn id(&self) -> ReportId {
        self.id
    }

    fn set_id(&mut self, id: ReportId) {
        self.id = id;
    }
}

impl TenantScoped for WeeklyReport {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl SoftDelete for WeeklyReport {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

impl Versioned for WeeklyReport {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

pub trait ReportRepository: Repository<WeeklyReport> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<WeeklyReport>>;

    fn list_by_driver(&self, tenant_id: TenantId, driver_id: UserId) -> DomainResult<Vec<WeeklyReport>>;

    /// Overwrite only if the stored version matches; the stored copy gets the
    /// next version, which is returned.
    fn update_versioned(&self, report: WeeklyReport, expected: ExpectedVersion) -> DomainResult<WeeklyReport>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub taxi_id: TaxiId,
    pub week_start_date: NaiveDate,
    pub earnings: Decimal,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportPatch {
    pub taxi_id: Option<TaxiId>,
    pub week_start_date: Option<NaiveDate>,
    pub earnings: Option<Decimal>,
    pub notes: Option<String>,
}

/// Sum of the amounts of every live expense linked to the report, persisted
/// onto the report.
///
/// A concurrent report write makes the versioned save fail with `Conflict`;
/// the load, sum and save are then repeated, up to [`RECOMPUTE_ATTEMPTS`] times.
pub fn recompute_total_expenses(
    reports: &dyn ReportRepository,
    expenses: &dyn ExpenseRepository,
    tenant_id: TenantId,
    report_id: ReportId,
) -> DomainResult<WeeklyReport> {
    let mut attempt = 1;
    loop {
        match recompute_once(reports, expenses, tenant_id, report_id) {
            Err(DomainError::Conflict(reason)) if attempt < RECOMPUTE_ATTEMPTS => {
                tracing::debug!(report_id = %report_id, attempt, %reason, "report changed during recompute, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub const RECOMPUTE_ATTEMPTS: usize = 3;

fn recompute_once(
    reports: &dyn ReportRepository,
    expenses: &dyn ExpenseRepository,
    tenant_id: TenantId,
    report_id: ReportId,
) -> DomainResult<WeeklyReport> {
    let mut report: WeeklyReport = load_scoped(reports, report_id, tenant_id, "report")?;
    let total = linked_total(expenses, tenant_id, report_id)?;
    if report.total_expenses == total {
        return Ok(report);
    }

    let expected = ExpectedVersion::Exact(report.version);
    report.total_expenses = total;
    report.updated_at = Utc::now();
    reports.update_versioned(report, expected)
}

fn linked_total(expenses: &dyn ExpenseRepository, tenant_id: TenantId, report_id: ReportId) -> DomainResult<Decimal> {
    checked_sum(expenses.list_by_report(tenant_id, report_id)?.iter().map(|e| e.amount))
}

pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    taxis: Arc<dyn TaxiRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    masks: RoleMasks,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        taxis: Arc<dyn TaxiRepository>,
        expenses: Arc<dyn ExpenseRepository>,
        masks: RoleMasks,
    ) -> Self {
        Self {
            reports,
            taxis,
            expenses,
            masks,
        }
    }

    /// New draft for the calling driver.
    pub fn create(&self, actor: &Principal, input: NewReport) -> DomainResult<WeeklyReport> {
        self.ensure_taxi(actor.tenant_id, input.taxi_id)?;
        validate_amount("earnings", input.earnings)?;

        let now = Utc::now();
        let report = self.reports.insert(WeeklyReport {
            id: ReportId::default(),
            tenant_id: actor.tenant_id,
            taxi_id: input.taxi_id,
            driver_id: actor.user_id,
            week_start_date: input.week_start_date,
            earnings: input.earnings,
            total_expenses: Decimal::ZERO,
            status: ReportStatus::Draft,
            notes: input.notes,
            submitted_at: None,
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })?;
        tracing::info!(report_id = %report.id, tenant_id = %report.tenant_id, driver_id = %report.driver_id, "report created");
        Ok(report)
    }

    pub fn get(&self, actor: &Principal, id: ReportId) -> DomainResult<WeeklyReport> {
        load_scoped(&*self.reports, id, actor.tenant_id, "report")
    }

    /// Plain drivers see their own reports; everyone else sees the tenant's.
    /// Newest week first.
    pub fn list(&self, actor: &Principal) -> DomainResult<Vec<WeeklyReport>> {
        let mut reports = if self.masks.is_plain_driver(actor.permissions) {
            self.reports.list_by_driver(actor.tenant_id, actor.user_id)?
        } else {
            self.reports.list_by_tenant(actor.tenant_id)?
        };
        reports.sort_by(|a, b| b.week_start_date.cmp(&a.week_start_date).then(b.id.cmp(&a.id)));
        Ok(reports)
    }

    pub fn update(&self, actor: &Principal, id: ReportId, patch: ReportPatch) -> DomainResult<WeeklyReport> {
        let mut report = self.get(actor, id)?;

        if actor.has(Permission::EDIT_REPORTS) {
            if report.status == ReportStatus::Approved {
                return Err(StateViolation::CannotEditApproved.into());
            }
        } else if report.driver_id == actor.user_id {
            if report.status != ReportStatus::Draft {
                return Err(StateViolation::CanOnlyEditDraft.into());
            }
        } else {
            return Err(DomainError::unauthorized("only the report's driver or an editor may update it"));
        }

        if let Some(taxi_id) = patch.taxi_id {
            self.ensure_taxi(actor.tenant_id, taxi_id)?;
            report.taxi_id = taxi_id;
        }
        if let Some(week_start_date) = patch.week_start_date {
            report.week_start_date = week_start_date;
        }
        if let Some(earnings) = patch.earnings {
            validate_amount("earnings", earnings)?;
            report.earnings = earnings;
        }
        if let Some(notes) = non_blank(patch.notes) {
            report.notes = notes;
        }
        report.total_expenses = linked_total(&*self.expenses, actor.tenant_id, report.id)?;

        self.save(report, "report updated")
    }

    pub fn submit(&self, actor: &Principal, id: ReportId) -> DomainResult<WeeklyReport> {
        let mut report = self.get(actor, id)?;
        if report.driver_id != actor.user_id {
            return Err(DomainError::unauthorized("only the report's driver may submit it"));
        }
        if report.status != ReportStatus::Draft {
            return Err(StateViolation::AlreadySubmitted.into());
        }

        report.status = ReportStatus::Submitted;
        report.submitted_at = Some(Utc::now());
        self.save(report, "report submitted")
    }

    pub fn approve(&self, actor: &Principal, id: ReportId) -> DomainResult<WeeklyReport> {
        let mut report = self.reviewable(actor, id)?;
        report.status = ReportStatus::Approved;
        report.approved_at = Some(Utc::now());
        report.approved_by = Some(actor.user_id);
        self.save(report, "report approved")
    }

    pub fn reject(&self, actor: &Principal, id: ReportId) -> DomainResult<WeeklyReport> {
        let mut report = self.reviewable(actor, id)?;
        report.status = ReportStatus::Rejected;
        report.rejected_at = Some(Utc::now());
        report.rejected_by = Some(actor.user_id);
        self.save(report, "report rejected")
    }

    pub fn delete(&self, actor: &Principal, id: ReportId) -> DomainResult<()> {
        let report = self.get(actor, id)?;

        if !self.masks.holds_role(actor.permissions, Role::Owner) {
            if !self.masks.is_plain_driver(actor.permissions) || report.driver_id != actor.user_id {
                return Err(DomainError::unauthorized("not allowed to delete this report"));
            }
            if report.status != ReportStatus::Draft {
                return Err(StateViolation::CanOnlyDeleteDraft.into());
            }
        }

        self.reports.delete(id)?;
        tracing::info!(report_id = %id, tenant_id = %actor.tenant_id, "report deleted");
        Ok(())
    }

    /// Owner-or-admin gate followed by the `submitted` check.
    fn reviewable(&self, actor: &Principal, id: ReportId) -> DomainResult<WeeklyReport> {
        let report = self.get(actor, id)?;
        if !self.masks.holds_role(actor.permissions, Role::Owner) {
            return Err(DomainError::unauthorized("owner or admin capability required"));
        }
        if report.status != ReportStatus::Submitted {
            return Err(StateViolation::MustBeSubmittedFirst.into());
        }
        Ok(report)
    }

    fn ensure_taxi(&self, tenant_id: TenantId, taxi_id: TaxiId) -> DomainResult<()> {
        load_scoped::<Taxi, _>(&*self.taxis, taxi_id, tenant_id, "taxi").map(|_| ())
    }

    fn save(&self, mut report: WeeklyReport, event: &'static str) -> DomainResult<WeeklyReport> {
        let expected = ExpectedVersion::Exact(report.version);
        report.updated_at = Utc::now();
        let report = self.reports.update_versioned(report, expected)?;
        tracing::info!(
            report_id = %report.id,
            tenant_id = %report.tenant_id,
            status = ?report.status,
            version = report.version,
            "{event}"
        );
        Ok(report)
    }
}
