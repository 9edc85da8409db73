//! Taxis: tenant-scoped vehicles with an optional assigned driver.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taxifleet_auth::{Principal, User, UserRepository};
use taxifleet_core::{DomainError, DomainResult, Entity, Repository, SoftDelete, TaxiId, TenantId, TenantScoped, UserId};

use crate::scope::{double_option, load_scoped, non_blank};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxiStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxi {
    pub id: TaxiId,
    pub tenant_id: TenantId,
    pub license_plate: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: String,
    pub vin: String,
    pub status: TaxiStatus,
    pub assigned_driver_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Taxi {
    type Id = TaxiId;

    fn id(&self) -> TaxiId {
        self.id
    }

    fn set_id(&mut self, id: TaxiId) {
        self.id = id;
    }
}

impl TenantScoped for Taxi {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl SoftDelete for Taxi {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

pub trait TaxiRepository: Repository<Taxi> {
    fn list_by_tenant(&self, tenant_id: TenantId) -> DomainResult<Vec<Taxi>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTaxi {
    pub license_plate: String,
    #[serde(default)]
    pub model: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub vin: String,
    pub status: Option<TaxiStatus>,
    pub assigned_driver_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxiPatch {
    pub license_plate: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub status: Option<TaxiStatus>,
    /// `null` unassigns the driver.
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_driver_id: Option<Option<UserId>>,
}

pub struct TaxiService {
    taxis: Arc<dyn TaxiRepository>,
    users: Arc<dyn UserRepository>,
}

impl TaxiService {
    pub fn new(taxis: Arc<dyn TaxiRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { taxis, users }
    }

    pub fn create(&self, actor: &Principal, input: NewTaxi) -> DomainResult<Taxi> {
        let license_plate = non_blank(Some(input.license_plate))
            .ok_or_else(|| DomainError::validation("license_plate is required"))?;
        if let Some(driver_id) = input.assigned_driver_id {
            self.ensure_driver(actor.tenant_id, driver_id)?;
        }

        let now = Utc::now();
        let taxi = self.taxis.insert(Taxi {
            id: TaxiId::default(),
            tenant_id: actor.tenant_id,
            license_plate,
            model: input.model,
            year: input.year,
            color: input.color,
            vin: input.vin,
            status: input.status.unwrap_or_default(),
            assigned_driver_id: input.assigned_driver_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })?;
        tracing::info!(taxi_id = %taxi.id, tenant_id = %taxi.tenant_id, "taxi created");
        Ok(taxi)
    }

    pub fn get(&self, actor: &Principal, id: TaxiId) -> DomainResult<Taxi> {
        load_scoped(&*self.taxis, id, actor.tenant_id, "taxi")
    }

    /// Newest first.
    pub fn list(&self, actor: &Principal) -> DomainResult<Vec<Taxi>> {
        let mut taxis = self.taxis.list_by_tenant(actor.tenant_id)?;
        taxis.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(taxis)
    }

    pub fn update(&self, actor: &Principal, id: TaxiId, patch: TaxiPatch) -> DomainResult<Taxi> {
        let mut taxi = self.get(actor, id)?;

        if let Some(plate) = non_blank(patch.license_plate) {
            taxi.license_plate = plate;
        }
        if let Some(model) = patch.model {
            taxi.model = model;
        }
        if let Some(year) = patch.year {
            taxi.year = Some(year);
        }
        if let Some(color) = patch.color {
            taxi.color = color;
        }
        if let Some(vin) = patch.vin {
            taxi.vin = vin;
        }
        if let Some(status) = patch.status {
            taxi.status = status;
        }
        if let Some(driver) = patch.assigned_driver_id {
            if let Some(driver_id) = driver {
                self.ensure_driver(actor.tenant_id, driver_id)?;
            }
            taxi.assigned_driver_id = driver;
        }

        taxi.updated_at = Utc::now();
        self.taxis.update(taxi)
    }

    pub fn delete(&self, actor: &Principal, id: TaxiId) -> DomainResult<()> {
        self.get(actor, id)?;
        self.taxis.delete(id)
    }

    fn ensure_driver(&self, tenant_id: TenantId, driver_id: UserId) -> DomainResult<()> {
        load_scoped::<User, _>(&*self.users, driver_id, tenant_id, "driver").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let absent: TaxiPatch = serde_json::from_str(r#"{"color":"red"}"#).unwrap();
        assert_eq!(absent.assigned_driver_id, None);

        let cleared: TaxiPatch = serde_json::from_str(r#"{"assigned_driver_id":null}"#).unwrap();
        assert_eq!(cleared.assigned_driver_id, Some(None));

        let set: TaxiPatch = serde_json::from_str(r#"{"assigned_driver_id":4}"#).unwrap();
        assert_eq!(set.assigned_driver_id, Some(Some(UserId::new(4))));
    }

    #[test]
    fn status_defaults_to_active() {
        let input: NewTaxi = serde_json::from_str(r#"{"license_plate":"AB-123"}"#).unwrap();
        assert_eq!(input.status.unwrap_or_default(), TaxiStatus::Active);
        assert!(serde_json::from_str::<TaxiStatus>(r#""scrapped""#).is_err());
    }
}
