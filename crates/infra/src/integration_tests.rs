//! Integration tests for the fleet services over the in-memory store.
//!
//! Verifies:
//! - Report lifecycle transitions and who may trigger them
//! - Expense totals rolling up into their report
//! - Tenant isolation (foreign rows read as absent)
//! - Optimistic concurrency on report writes

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use taxifleet_auth::{PasswordCost, PasswordHasher, PermissionMask, Principal, RoleMasks};
    use taxifleet_core::{
        DomainError, DomainResult, ExpectedVersion, ReportId, Repository, StateViolation, TenantId, UserId,
    };
    use taxifleet_fleet::{
        DashboardService, DepositPatch, DepositService, ExpenseCategory, ExpensePatch, ExpenseService, MAX_AMOUNT,
        NewDeposit, NewExpense, NewReport, NewTaxi, NewTenant, NewUser, RECOMPUTE_ATTEMPTS, ReportPatch,
        ReportRepository, ReportService, ReportStatus, Taxi, TaxiPatch, TaxiService, TaxiStatus, TenantService,
        UserAdminService, UserPatch, WeeklyReport, recompute_total_expenses,
    };

    use crate::{InMemoryStore, InMemoryTable};

    struct Fleet {
        store: InMemoryStore,
        tenants: TenantService,
        users: UserAdminService,
        taxis: TaxiService,
        reports: ReportService,
        expenses: ExpenseService,
        deposits: DepositService,
        dashboard: DashboardService,
        masks: RoleMasks,
    }

    /// One tenant's cast of characters.
    struct Crew {
        tenant_id: TenantId,
        owner: Principal,
        manager: Principal,
        mechanic: Principal,
        driver: Principal,
        other_driver: Principal,
        taxi: Taxi,
    }

    fn setup() -> Fleet {
        let store = InMemoryStore::new();
        let masks = RoleMasks::default();
        let hasher = PasswordHasher::new(PasswordCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();

        Fleet {
            tenants: TenantService::new(store.tenants.clone()),
            users: UserAdminService::new(
                store.users.clone(),
                store.sessions.clone(),
                store.tenants.clone(),
                hasher,
                masks,
            ),
            taxis: TaxiService::new(store.taxis.clone(), store.users.clone()),
            reports: ReportService::new(store.reports.clone(), store.taxis.clone(), store.expenses.clone(), masks),
            expenses: ExpenseService::new(store.expenses.clone(), store.reports.clone(), store.taxis.clone()),
            deposits: DepositService::new(store.deposits.clone()),
            dashboard: DashboardService::new(store.taxis.clone(), store.reports.clone(), store.expenses.clone()),
            store,
            masks,
        }
    }

    impl Fleet {
        fn user(&self, tenant_id: TenantId, name: &str, mask: PermissionMask) -> Principal {
            let user = self
                .users
                .create(NewUser {
                    tenant_id,
                    email: format!("{name}@t{tenant_id}.test"),
                    password: "secret123".to_string(),
                    permission: Some(mask),
                    role: None,
                    first_name: name.to_string(),
                    last_name: "Test".to_string(),
                    phone: format!("+{tenant_id}-{name}"),
                    active: None,
                })
                .unwrap();
            Principal::from(&user)
        }

        fn crew(&self, subdomain: &str) -> Crew {
            let tenant = self
                .tenants
                .create(NewTenant {
                    name: subdomain.to_string(),
                    subdomain: subdomain.to_string(),
                    logo: String::new(),
                    settings: None,
                })
                .unwrap();
            let owner = self.user(tenant.id, "owner", self.masks.owner);
            let manager = self.user(tenant.id, "manager", self.masks.manager);
            let mechanic = self.user(tenant.id, "mechanic", self.masks.mechanic);
            let driver = self.user(tenant.id, "driver", self.masks.driver);
            let other_driver = self.user(tenant.id, "driver2", self.masks.driver);
            let taxi = self
                .taxis
                .create(
                    &owner,
                    NewTaxi {
                        license_plate: format!("{subdomain}-001"),
                        model: "Corolla".to_string(),
                        year: Some(2021),
                        color: "yellow".to_string(),
                        vin: String::new(),
                        status: None,
                        assigned_driver_id: Some(driver.user_id),
                    },
                )
                .unwrap();
            Crew {
                tenant_id: tenant.id,
                owner,
                manager,
                mechanic,
                driver,
                other_driver,
                taxi,
            }
        }

        fn draft(&self, crew: &Crew, earnings: Decimal) -> WeeklyReport {
            self.reports
                .create(
                    &crew.driver,
                    NewReport {
                        taxi_id: crew.taxi.id,
                        week_start_date: week(4),
                        earnings,
                        notes: String::new(),
                    },
                )
                .unwrap()
        }

        fn expense(&self, actor: &Principal, report: &WeeklyReport, amount: Decimal) -> taxifleet_fleet::Expense {
            self.expenses
                .create(
                    actor,
                    NewExpense {
                        report_id: Some(report.id),
                        taxi_id: Some(report.taxi_id),
                        category: ExpenseCategory::Fuel,
                        amount,
                        reason: "refuel".to_string(),
                        receipt_url: String::new(),
                        date: Some(week(5)),
                    },
                )
                .unwrap()
        }
    }

    fn week(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn driver_report_goes_from_draft_to_approved() {
        let fleet = setup();
        let t1 = fleet.crew("t1");

        let report = fleet.draft(&t1, dec("500"));
        assert_eq!(report.status, ReportStatus::Draft);
        assert_eq!(report.total_expenses, Decimal::ZERO);
        assert_eq!(report.driver_id, t1.driver.user_id);

        let report = fleet.reports.submit(&t1.driver, report.id).unwrap();
        assert_eq!(report.status, ReportStatus::Submitted);
        assert!(report.submitted_at.is_some());

        let report = fleet.reports.approve(&t1.owner, report.id).unwrap();
        assert_eq!(report.status, ReportStatus::Approved);
        assert_eq!(report.approved_by, Some(t1.owner.user_id));
        assert!(report.approved_at.is_some());

        let again = fleet.reports.approve(&t1.owner, report.id);
        assert_eq!(again, Err(StateViolation::MustBeSubmittedFirst.into()));
    }

    #[test]
    fn submitting_twice_fails() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("100"));

        fleet.reports.submit(&t1.driver, report.id).unwrap();
        let err = fleet.reports.submit(&t1.driver, report.id).unwrap_err();
        assert_eq!(err, DomainError::InvalidState(StateViolation::AlreadySubmitted));
    }

    #[test]
    fn only_the_driver_submits() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("100"));

        assert!(matches!(fleet.reports.submit(&t1.other_driver, report.id), Err(DomainError::Unauthorized(_))));
        assert!(matches!(fleet.reports.submit(&t1.owner, report.id), Err(DomainError::Unauthorized(_))));
    }

    #[test]
    fn approval_needs_owner_capability_and_a_submitted_report() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("100"));

        let draft = fleet.reports.approve(&t1.owner, report.id);
        assert_eq!(draft, Err(StateViolation::MustBeSubmittedFirst.into()));

        fleet.reports.submit(&t1.driver, report.id).unwrap();
        for actor in [&t1.driver, &t1.manager, &t1.mechanic] {
            assert!(matches!(fleet.reports.approve(actor, report.id), Err(DomainError::Unauthorized(_))));
        }

        let admin = fleet.user(t1.tenant_id, "admin", PermissionMask::ADMIN);
        let approved = fleet.reports.approve(&admin, report.id).unwrap();
        assert_eq!(approved.approved_by, Some(admin.user_id));
    }

    #[test]
    fn rejection_is_terminal_and_owner_gated() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("100"));
        fleet.reports.submit(&t1.driver, report.id).unwrap();

        assert!(matches!(fleet.reports.reject(&t1.manager, report.id), Err(DomainError::Unauthorized(_))));

        let rejected = fleet.reports.reject(&t1.owner, report.id).unwrap();
        assert_eq!(rejected.status, ReportStatus::Rejected);
        assert_eq!(rejected.rejected_by, Some(t1.owner.user_id));
        assert!(rejected.rejected_at.is_some());

        assert_eq!(
            fleet.reports.approve(&t1.owner, report.id),
            Err(StateViolation::MustBeSubmittedFirst.into())
        );
        assert_eq!(
            fleet.reports.submit(&t1.driver, report.id),
            Err(StateViolation::AlreadySubmitted.into())
        );
    }

    #[test]
    fn expense_amounts_roll_up_into_the_report() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));

        let expense = fleet.expense(&t1.driver, &report, dec("42.50"));
        assert_eq!(fleet.reports.get(&t1.owner, report.id).unwrap().total_expenses, dec("42.50"));

        let second = fleet.expense(&t1.driver, &report, dec("7.50"));
        assert_eq!(fleet.reports.get(&t1.owner, report.id).unwrap().total_expenses, dec("50.00"));

        fleet
            .expenses
            .update(
                &t1.owner,
                second.id,
                ExpensePatch {
                    amount: Some(dec("10")),
                    ..ExpensePatch::default()
                },
            )
            .unwrap();
        assert_eq!(fleet.reports.get(&t1.owner, report.id).unwrap().total_expenses, dec("52.50"));

        fleet.expenses.delete(&t1.owner, second.id).unwrap();
        fleet.expenses.delete(&t1.owner, expense.id).unwrap();
        assert_eq!(fleet.reports.get(&t1.owner, report.id).unwrap().total_expenses, Decimal::ZERO);
    }

    #[test]
    fn unlinked_expenses_leave_reports_alone() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));

        let expense = fleet
            .expenses
            .create(
                &t1.owner,
                NewExpense {
                    report_id: None,
                    taxi_id: None,
                    category: ExpenseCategory::Insurance,
                    amount: dec("300"),
                    reason: String::new(),
                    receipt_url: String::new(),
                    date: None,
                },
            )
            .unwrap();
        assert_eq!(expense.date, chrono::Utc::now().date_naive());

        let stored = fleet.reports.get(&t1.owner, report.id).unwrap();
        assert_eq!(stored.total_expenses, Decimal::ZERO);
        assert_eq!(stored.version, report.version);
    }

    #[test]
    fn negative_expense_is_a_validation_error() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));
        let err = fleet
            .expenses
            .create(
                &t1.driver,
                NewExpense {
                    report_id: Some(report.id),
                    taxi_id: None,
                    category: ExpenseCategory::Other,
                    amount: dec("-1"),
                    reason: String::new(),
                    receipt_url: String::new(),
                    date: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn drivers_edit_only_their_own_drafts() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));
        let patch = || ReportPatch {
            earnings: Some(dec("550")),
            notes: Some("late shift".to_string()),
            ..ReportPatch::default()
        };

        let edited = fleet.reports.update(&t1.driver, report.id, patch()).unwrap();
        assert_eq!(edited.earnings, dec("550"));
        assert_eq!(edited.notes, "late shift");

        assert!(matches!(
            fleet.reports.update(&t1.other_driver, report.id, patch()),
            Err(DomainError::Unauthorized(_))
        ));

        fleet.reports.submit(&t1.driver, report.id).unwrap();
        assert_eq!(
            fleet.reports.update(&t1.driver, report.id, patch()),
            Err(StateViolation::CanOnlyEditDraft.into())
        );
    }

    #[test]
    fn owners_edit_until_approval() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));
        fleet.reports.submit(&t1.driver, report.id).unwrap();

        let edited = fleet
            .reports
            .update(
                &t1.owner,
                report.id,
                ReportPatch {
                    week_start_date: Some(week(11)),
                    ..ReportPatch::default()
                },
            )
            .unwrap();
        assert_eq!(edited.week_start_date, week(11));
        assert_eq!(edited.status, ReportStatus::Submitted);

        fleet.reports.approve(&t1.owner, report.id).unwrap();
        assert_eq!(
            fleet.reports.update(&t1.owner, report.id, ReportPatch::default()),
            Err(StateViolation::CannotEditApproved.into())
        );
    }

    #[test]
    fn report_update_recomputes_total() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));
        fleet.expense(&t1.driver, &report, dec("12.25"));

        // Simulate a drifted total written behind the service's back.
        let mut drifted = fleet.store.reports.get(report.id).unwrap().unwrap();
        drifted.total_expenses = dec("999");
        fleet.store.reports.update(drifted).unwrap();

        let updated = fleet.reports.update(&t1.driver, report.id, ReportPatch::default()).unwrap();
        assert_eq!(updated.total_expenses, dec("12.25"));
    }

    #[test]
    fn deletion_rules() {
        let fleet = setup();
        let t1 = fleet.crew("t1");

        let own = fleet.draft(&t1, dec("1"));
        assert!(matches!(fleet.reports.delete(&t1.other_driver, own.id), Err(DomainError::Unauthorized(_))));
        assert!(matches!(fleet.reports.delete(&t1.manager, own.id), Err(DomainError::Unauthorized(_))));
        fleet.reports.delete(&t1.driver, own.id).unwrap();
        assert_eq!(fleet.reports.get(&t1.owner, own.id), Err(DomainError::NotFound("report")));

        let submitted = fleet.draft(&t1, dec("2"));
        fleet.reports.submit(&t1.driver, submitted.id).unwrap();
        assert_eq!(
            fleet.reports.delete(&t1.driver, submitted.id),
            Err(StateViolation::CanOnlyDeleteDraft.into())
        );

        fleet.reports.approve(&t1.owner, submitted.id).unwrap();
        fleet.reports.delete(&t1.owner, submitted.id).unwrap();
    }

    #[test]
    fn drivers_list_only_their_own_reports() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        fleet.draft(&t1, dec("1"));
        fleet
            .reports
            .create(
                &t1.other_driver,
                NewReport {
                    taxi_id: t1.taxi.id,
                    week_start_date: week(18),
                    earnings: dec("2"),
                    notes: String::new(),
                },
            )
            .unwrap();

        let mine = fleet.reports.list(&t1.driver).unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine.iter().all(|r| r.driver_id == t1.driver.user_id));

        let all = fleet.reports.list(&t1.manager).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].week_start_date, week(18));
    }

    #[test]
    fn other_tenants_rows_are_not_found() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let t2 = fleet.crew("t2");
        let report = fleet.draft(&t1, dec("500"));
        let expense = fleet.expense(&t1.driver, &report, dec("5"));

        assert_eq!(fleet.reports.get(&t2.owner, report.id), Err(DomainError::NotFound("report")));
        assert_eq!(
            fleet.reports.update(&t2.owner, report.id, ReportPatch::default()),
            Err(DomainError::NotFound("report"))
        );
        assert_eq!(fleet.reports.delete(&t2.owner, report.id), Err(DomainError::NotFound("report")));
        assert_eq!(fleet.reports.approve(&t2.owner, report.id), Err(DomainError::NotFound("report")));

        assert_eq!(fleet.taxis.get(&t2.owner, t1.taxi.id), Err(DomainError::NotFound("taxi")));
        assert_eq!(
            fleet.taxis.update(&t2.owner, t1.taxi.id, TaxiPatch::default()),
            Err(DomainError::NotFound("taxi"))
        );
        assert_eq!(fleet.taxis.delete(&t2.owner, t1.taxi.id), Err(DomainError::NotFound("taxi")));

        assert_eq!(fleet.expenses.get(&t2.owner, expense.id), Err(DomainError::NotFound("expense")));
        assert_eq!(fleet.expenses.delete(&t2.owner, expense.id), Err(DomainError::NotFound("expense")));

        let foreign_taxi = fleet.reports.create(
            &t2.driver,
            NewReport {
                taxi_id: t1.taxi.id,
                week_start_date: week(4),
                earnings: dec("1"),
                notes: String::new(),
            },
        );
        assert_eq!(foreign_taxi, Err(DomainError::NotFound("taxi")));

        assert_eq!(fleet.reports.list(&t2.owner).unwrap(), Vec::new());
    }

    #[test]
    fn stale_report_writes_conflict() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));

        let submitted = fleet.reports.submit(&t1.driver, report.id).unwrap();
        assert_eq!(submitted.version, report.version + 1);

        let stale = fleet
            .store
            .reports
            .update_versioned(report.clone(), ExpectedVersion::Exact(report.version));
        assert!(matches!(stale, Err(DomainError::Conflict(_))));
    }

    /// Report table that lets another writer bump the report right before
    /// the next `races` versioned saves.
    struct RacingReports {
        inner: Arc<InMemoryTable<WeeklyReport>>,
        races: AtomicUsize,
    }

    impl Repository<WeeklyReport> for RacingReports {
        fn insert(&self, item: WeeklyReport) -> DomainResult<WeeklyReport> {
            self.inner.insert(item)
        }
        fn get(&self, id: ReportId) -> DomainResult<Option<WeeklyReport>> {
            self.inner.get(id)
        }
        fn update(&self, item: WeeklyReport) -> DomainResult<WeeklyReport> {
            self.inner.update(item)
        }
        fn delete(&self, id: ReportId) -> DomainResult<()> {
            self.inner.delete(id)
        }
    }

    impl ReportRepository for RacingReports {
        fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<WeeklyReport>> {
            self.inner.list_by_tenant(tenant_id)
        }
        fn list_by_driver(&self, tenant_id: TenantId, driver_id: UserId) -> DomainResult<Vec<WeeklyReport>> {
            self.inner.list_by_driver(tenant_id, driver_id)
        }
        fn update_versioned(&self, report: WeeklyReport, expected: ExpectedVersion) -> DomainResult<WeeklyReport> {
            if self.races.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok() {
                let current = self.inner.get(report.id)?.ok_or(DomainError::not_found("report"))?;
                let version = current.version;
                self.inner.update_versioned(current, ExpectedVersion::Exact(version))?;
            }
            self.inner.update_versioned(report, expected)
        }
    }

    #[test]
    fn recompute_retries_after_a_concurrent_report_write() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));
        let mut expense = fleet.expense(&t1.driver, &report, dec("50"));

        // Change the amount behind the service's back so the stored total is stale.
        expense.amount = dec("60");
        fleet.store.expenses.update(expense).unwrap();
        let before = fleet.reports.get(&t1.owner, report.id).unwrap();
        assert_eq!(before.total_expenses, dec("50"));

        let racing = RacingReports {
            inner: fleet.store.reports.clone(),
            races: AtomicUsize::new(1),
        };
        let after = recompute_total_expenses(&racing, &*fleet.store.expenses, t1.tenant_id, report.id).unwrap();
        assert_eq!(after.total_expenses, dec("60"));
        assert_eq!(after.version, before.version + 2);
        assert_eq!(fleet.reports.get(&t1.owner, report.id).unwrap().total_expenses, dec("60"));
    }

    #[test]
    fn recompute_gives_up_after_bounded_conflicts() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));
        let mut expense = fleet.expense(&t1.driver, &report, dec("50"));
        expense.amount = dec("70");
        fleet.store.expenses.update(expense).unwrap();

        let racing = RacingReports {
            inner: fleet.store.reports.clone(),
            races: AtomicUsize::new(RECOMPUTE_ATTEMPTS),
        };
        let err = recompute_total_expenses(&racing, &*fleet.store.expenses, t1.tenant_id, report.id).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(racing.races.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn oversized_amounts_are_rejected_before_storing() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));

        let huge = NewExpense {
            report_id: Some(report.id),
            taxi_id: None,
            category: ExpenseCategory::Repair,
            amount: Decimal::MAX,
            reason: String::new(),
            receipt_url: String::new(),
            date: None,
        };
        let err = fleet.expenses.create(&t1.driver, huge.clone()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = fleet.expenses.create(&t1.driver, huge).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(fleet.expenses.list(&t1.owner).unwrap().is_empty());

        let max = Decimal::from(MAX_AMOUNT);
        fleet.expense(&t1.driver, &report, max);
        fleet.expense(&t1.driver, &report, max);
        let stored = fleet.reports.get(&t1.owner, report.id).unwrap();
        assert_eq!(stored.total_expenses, max + max);

        let too_much = ReportPatch {
            earnings: Some(max + Decimal::ONE),
            ..ReportPatch::default()
        };
        let err = fleet.reports.update(&t1.driver, report.id, too_much).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let deposit = NewDeposit {
            amount: Decimal::MAX,
            deposit_date: week(8),
            period_start: week(4),
            period_end: week(10),
            bank_account: String::new(),
            proof_url: String::new(),
            notes: String::new(),
        };
        let err = fleet.deposits.create(&t1.owner, deposit).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn overflowing_totals_are_errors_not_panics() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let report = fleet.draft(&t1, dec("500"));

        // Rows written straight to the store skip amount validation.
        for _ in 0..2 {
            let mut expense = fleet.expense(&t1.driver, &report, dec("1"));
            expense.amount = Decimal::MAX;
            fleet.store.expenses.update(expense).unwrap();
        }

        let err = recompute_total_expenses(&*fleet.store.reports, &*fleet.store.expenses, t1.tenant_id, report.id)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = fleet.dashboard.stats(&t1.owner).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let notes = ReportPatch {
            notes: Some("week four".to_string()),
            ..ReportPatch::default()
        };
        let err = fleet.reports.update(&t1.driver, report.id, notes).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // The expense write still lands; only the roll-up is skipped.
        let extra = fleet.expense(&t1.driver, &report, dec("5"));
        assert_eq!(fleet.expenses.get(&t1.owner, extra.id).unwrap().amount, dec("5"));
    }

    #[test]
    fn taxis_require_a_driver_from_the_same_tenant() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let t2 = fleet.crew("t2");

        let err = fleet
            .taxis
            .update(
                &t1.owner,
                t1.taxi.id,
                TaxiPatch {
                    assigned_driver_id: Some(Some(t2.driver.user_id)),
                    ..TaxiPatch::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound("driver"));

        let unassigned = fleet
            .taxis
            .update(
                &t1.owner,
                t1.taxi.id,
                TaxiPatch {
                    assigned_driver_id: Some(None),
                    status: Some(TaxiStatus::Maintenance),
                    ..TaxiPatch::default()
                },
            )
            .unwrap();
        assert_eq!(unassigned.assigned_driver_id, None);
        assert_eq!(unassigned.status, TaxiStatus::Maintenance);
    }

    #[test]
    fn deposits_validate_their_period() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let input = |start: u32, end: u32| NewDeposit {
            amount: dec("1200"),
            deposit_date: week(12),
            period_start: week(start),
            period_end: week(end),
            bank_account: "FR76-0001".to_string(),
            proof_url: String::new(),
            notes: String::new(),
        };

        assert!(matches!(fleet.deposits.create(&t1.manager, input(10, 4)), Err(DomainError::Validation(_))));

        let deposit = fleet.deposits.create(&t1.manager, input(4, 10)).unwrap();
        let err = fleet
            .deposits
            .update(
                &t1.manager,
                deposit.id,
                DepositPatch {
                    period_end: Some(week(1)),
                    ..DepositPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let later = fleet
            .deposits
            .create(
                &t1.manager,
                NewDeposit {
                    deposit_date: week(19),
                    ..input(11, 17)
                },
            )
            .unwrap();
        let listed = fleet.deposits.list(&t1.owner).unwrap();
        assert_eq!(listed.iter().map(|d| d.id).collect::<Vec<_>>(), vec![later.id, deposit.id]);
    }

    #[test]
    fn dashboard_figures() {
        let fleet = setup();
        let t1 = fleet.crew("t1");

        let approved = fleet.draft(&t1, dec("500"));
        fleet.expense(&t1.driver, &approved, dec("42.50"));
        fleet.reports.submit(&t1.driver, approved.id).unwrap();
        fleet.reports.approve(&t1.owner, approved.id).unwrap();
        fleet.draft(&t1, dec("80"));

        let stats = fleet.dashboard.stats(&t1.owner).unwrap();
        assert_eq!(stats.total_taxis, 1);
        assert_eq!(stats.active_drivers, 1);
        assert_eq!(stats.pending_reports, 1);
        assert_eq!(stats.total_revenue, dec("500"));
        assert_eq!(stats.total_expenses, dec("42.50"));
        assert_eq!(stats.net_revenue, dec("457.50"));
    }

    #[test]
    fn duplicate_keys_are_reported_by_field() {
        let fleet = setup();
        let t1 = fleet.crew("t1");

        let dup_subdomain = fleet.tenants.create(NewTenant {
            name: "again".to_string(),
            subdomain: "T1".to_string(),
            logo: String::new(),
            settings: None,
        });
        assert_eq!(dup_subdomain.unwrap_err(), DomainError::DuplicateKey("subdomain"));

        let new_user = |email: &str, phone: &str| NewUser {
            tenant_id: t1.tenant_id,
            email: email.to_string(),
            password: "secret123".to_string(),
            permission: None,
            role: Some("mechanic".to_string()),
            first_name: "Dup".to_string(),
            last_name: "User".to_string(),
            phone: phone.to_string(),
            active: None,
        };
        let email = format!("OWNER@t{}.test", t1.tenant_id);
        assert_eq!(
            fleet.users.create(new_user(&email, "+999")).unwrap_err(),
            DomainError::DuplicateKey("email")
        );
        let phone = format!("+{}-owner", t1.tenant_id);
        assert_eq!(
            fleet.users.create(new_user("fresh@t1.test", &phone)).unwrap_err(),
            DomainError::DuplicateKey("phone")
        );

        let created = fleet.users.create(new_user("fresh@t1.test", "+999")).unwrap();
        assert_eq!(created.permission, fleet.masks.mechanic);
        assert!(created.active);
    }

    #[test]
    fn deleted_users_lose_their_sessions() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let session = fleet
            .store
            .sessions
            .insert(taxifleet_auth::Session::new(
                t1.driver.user_id,
                "refresh-token".to_string(),
                chrono::Utc::now() + chrono::Duration::hours(1),
                chrono::Utc::now(),
            ))
            .unwrap();

        fleet.users.delete(t1.driver.user_id).unwrap();
        assert_eq!(fleet.store.sessions.get(session.id).unwrap(), None);
        assert_eq!(fleet.users.get(t1.driver.user_id), Err(DomainError::NotFound("user")));
    }

    #[test]
    fn deactivation_is_an_admin_patch() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let user = fleet
            .users
            .update(
                t1.mechanic.user_id,
                UserPatch {
                    active: Some(false),
                    role: Some("manager".to_string()),
                    ..UserPatch::default()
                },
            )
            .unwrap();
        assert!(!user.active);
        assert_eq!(user.permission, fleet.masks.manager);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn total_tracks_live_linked_expenses(
            cents in proptest::collection::vec(0i64..100_000, 1..8),
            drop_mask in any::<u8>(),
        ) {
            let fleet = setup();
            let t1 = fleet.crew("t1");
            let report = fleet.draft(&t1, dec("1000"));

            let created: Vec<_> = cents
                .iter()
                .map(|c| fleet.expense(&t1.driver, &report, Decimal::new(*c, 2)))
                .collect();

            let mut expected = Decimal::ZERO;
            for (i, expense) in created.iter().enumerate() {
                if drop_mask & (1 << i) != 0 {
                    fleet.expenses.delete(&t1.owner, expense.id).unwrap();
                } else {
                    expected += expense.amount;
                }
            }

            let stored = fleet.reports.get(&t1.owner, report.id).unwrap();
            prop_assert_eq!(stored.total_expenses, expected);
        }
    }

    #[test]
    fn tables_are_shared_through_the_store() {
        let fleet = setup();
        let t1 = fleet.crew("t1");
        let reports: Arc<dyn ReportRepository> = fleet.store.reports.clone();
        let report = fleet.draft(&t1, dec("1"));
        assert_eq!(reports.list_by_tenant(t1.tenant_id).unwrap(), vec![report]);
    }
}
