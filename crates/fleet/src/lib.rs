//! `taxifleet-fleet` — tenant-scoped fleet domain.
//!
//! Weekly report lifecycle, taxis, expenses, bank deposits, dashboard figures
//! and tenant/user administration. Services are storage-agnostic: they receive
//! repository trait objects at construction and a [`taxifleet_auth::Principal`]
//! per call.

pub mod dashboard;
pub mod deposit;
pub mod expense;
pub mod money;
pub mod report;
pub mod scope;
pub mod taxi;
pub mod tenant;
pub mod users;

pub use dashboard::{DashboardService, DashboardStats};
pub use deposit::{BankDeposit, DepositPatch, DepositRepository, DepositService, NewDeposit};
pub use expense::{Expense, ExpenseCategory, ExpensePatch, ExpenseRepository, ExpenseService, NewExpense};
pub use money::{MAX_AMOUNT, validate_amount};
pub use report::{
    NewReport, RECOMPUTE_ATTEMPTS, ReportPatch, ReportRepository, ReportService, ReportStatus, WeeklyReport,
    recompute_total_expenses,
};
pub use scope::load_scoped;
pub use taxi::{NewTaxi, Taxi, TaxiPatch, TaxiRepository, TaxiService, TaxiStatus};
pub use tenant::{NewTenant, Tenant, TenantPatch, TenantRepository, TenantService, normalize_subdomain};
pub use users::{NewUser, UserAdminService, UserPatch};
