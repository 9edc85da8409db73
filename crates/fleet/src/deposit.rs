//! Bank deposits of collected takings.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taxifleet_auth::Principal;
use taxifleet_core::{DepositId, DomainError, DomainResult, Entity, Repository, SoftDelete, TenantId, TenantScoped};

use crate::money::validate_amount;
use crate::scope::load_scoped;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankDeposit {
    pub id: DepositId,
    pub tenant_id: TenantId,
    pub amount: Decimal,
    pub deposit_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub bank_account: String,
    pub proof_url: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for BankDeposit {
    type Id = DepositId;

    fn id(&self) -> DepositId {
        self.id
    }

    fn set_id(&mut self, id: DepositId) {
        self.id = id;
    }
}

impl TenantScoped for BankDeposit {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl SoftDelete for BankDeposit {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

pub trait DepositRepository: Repository<BankDeposit> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<BankDeposit>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDeposit {
    pub amount: Decimal,
    pub deposit_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub bank_account: String,
    #[serde(default)]
    pub proof_url: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepositPatch {
    pub amount: Option<Decimal>,
    pub deposit_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub bank_account: Option<String>,
    pub proof_url: Option<String>,
    pub notes: Option<String>,
}

fn validate(deposit: &BankDeposit) -> DomainResult<()> {
    validate_amount("amount", deposit.amount)?;
    if deposit.period_start > deposit.period_end {
        return Err(DomainError::validation("period_start must not be after period_end"));
    }
    Ok(())
}

pub struct DepositService {
    deposits: Arc<dyn DepositRepository>,
}

impl DepositService {
    pub fn new(deposits: Arc<dyn DepositRepository>) -> Self {
        Self { deposits }
    }

    pub fn create(&self, actor: &Principal, input: NewDeposit) -> DomainResult<BankDeposit> {
        let now = Utc::now();
        let deposit = BankDeposit {
            id: DepositId::default(),
            tenant_id: actor.tenant_id,
            amount: input.amount,
            deposit_date: input.deposit_date,
            period_start: input.period_start,
            period_end: input.period_end,
            bank_account: input.bank_account,
            proof_url: input.proof_url,
            notes: input.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        validate(&deposit)?;

        let deposit = self.deposits.insert(deposit)?;
        tracing::info!(deposit_id = %deposit.id, tenant_id = %deposit.tenant_id, "deposit recorded");
        Ok(deposit)
    }

    pub fn get(&self, actor: &Principal, id: DepositId) -> DomainResult<BankDeposit> {
        load_scoped(&*self.deposits, id, actor.tenant_id, "deposit")
    }

    /// Most recent deposit date first.
    pub fn list(&self, actor: &Principal) -> DomainResult<Vec<BankDeposit>> {
        let mut deposits = self.deposits.list_by_tenant(actor.tenant_id)?;
        deposits.sort_by(|a, b| b.deposit_date.cmp(&a.deposit_date).then(b.id.cmp(&a.id)));
        Ok(deposits)
    }

    pub fn update(&self, actor: &Principal, id: DepositId, patch: DepositPatch) -> DomainResult<BankDeposit> {
        let mut deposit = self.get(actor, id)?;

        if let Some(amount) = patch.amount {
            deposit.amount = amount;
        }
        if let Some(date) = patch.deposit_date {
            deposit.deposit_date = date;
        }
        if let Some(start) = patch.period_start {
            deposit.period_start = start;
        }
        if let Some(end) = patch.period_end {
            deposit.period_end = end;
        }
        if let Some(account) = patch.bank_account {
            deposit.bank_account = account;
        }
        if let Some(url) = patch.proof_url {
            deposit.proof_url = url;
        }
        if let Some(notes) = patch.notes {
            deposit.notes = notes;
        }
        validate(&deposit)?;

        deposit.updated_at = Utc::now();
        self.deposits.update(deposit)
    }

    pub fn delete(&self, actor: &Principal, id: DepositId) -> DomainResult<()> {
        self.get(actor, id)?;
        self.deposits.delete(id)
    }
}
