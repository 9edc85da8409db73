//! Tenants and their administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taxifleet_core::{DomainError, DomainResult, Entity, Repository, SoftDelete, TenantId};

use crate::scope::non_blank;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    pub logo: String,
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Tenant {
    type Id = TenantId;

    fn id(&self) -> TenantId {
        self.id
    }

    fn set_id(&mut self, id: TenantId) {
        self.id = id;
    }
}

impl SoftDelete for Tenant {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

pub trait TenantRepository: Repository<Tenant> {
    /// Expects a normalized subdomain.
    fn find_by_subdomain(&self, subdomain: &str) -> DomainResult<Option<Tenant>>;

    fn list_all(&self) -> DomainResult<Vec<Tenant>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTenant {
    pub name: String,
    pub subdomain: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantPatch {
    pub name: Option<String>,
    pub subdomain: Option<String>,
    pub logo: Option<String>,
    pub settings: Option<serde_json::Value>,
}

/// Lowercases and checks `[a-z0-9-]+` without leading/trailing hyphen.
pub fn normalize_subdomain(subdomain: &str) -> DomainResult<String> {
    let s = subdomain.trim().to_ascii_lowercase();
    let valid = !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(s)
    } else {
        Err(DomainError::validation(format!("invalid subdomain '{subdomain}'")))
    }
}

/// Cross-tenant administration of tenants.
pub struct TenantService {
    tenants: Arc<dyn TenantRepository>,
}

impl TenantService {
    pub fn new(tenants: Arc<dyn TenantRepository>) -> Self {
        Self { tenants }
    }

    pub fn create(&self, input: NewTenant) -> DomainResult<Tenant> {
        let name = non_blank(Some(input.name)).ok_or_else(|| DomainError::validation("name is required"))?;
        let subdomain = normalize_subdomain(&input.subdomain)?;
        if self.tenants.find_by_subdomain(&subdomain)?.is_some() {
            return Err(DomainError::DuplicateKey("subdomain"));
        }

        let now = Utc::now();
        let tenant = self.tenants.insert(Tenant {
            id: TenantId::default(),
            name,
            subdomain,
            logo: input.logo,
            settings: input.settings.unwrap_or_else(|| serde_json::json!({})),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })?;
        tracing::info!(tenant_id = %tenant.id, subdomain = %tenant.subdomain, "tenant created");
        Ok(tenant)
    }

    pub fn list(&self) -> DomainResult<Vec<Tenant>> {
        let mut tenants = self.tenants.list_all()?;
        tenants.sort_by_key(|t| t.id);
        Ok(tenants)
    }

    pub fn get(&self, id: TenantId) -> DomainResult<Tenant> {
        self.tenants.get(id)?.ok_or(DomainError::not_found("tenant"))
    }

    pub fn find_by_subdomain(&self, subdomain: &str) -> DomainResult<Option<Tenant>> {
        self.tenants.find_by_subdomain(&normalize_subdomain(subdomain)?)
    }

    pub fn update(&self, id: TenantId, patch: TenantPatch) -> DomainResult<Tenant> {
        let mut tenant = self.get(id)?;

        if let Some(name) = non_blank(patch.name) {
            tenant.name = name;
        }
        if let Some(subdomain) = non_blank(patch.subdomain) {
            let subdomain = normalize_subdomain(&subdomain)?;
            if subdomain != tenant.subdomain {
                if self.tenants.find_by_subdomain(&subdomain)?.is_some() {
                    return Err(DomainError::DuplicateKey("subdomain"));
                }
                tenant.subdomain = subdomain;
            }
        }
        if let Some(logo) = patch.logo {
            tenant.logo = logo;
        }
        if let Some(settings) = patch.settings {
            tenant.settings = settings;
        }

        tenant.updated_at = Utc::now();
        self.tenants.update(tenant)
    }

    pub fn delete(&self, id: TenantId) -> DomainResult<()> {
        self.get(id)?;
        self.tenants.delete(id)?;
        tracing::info!(tenant_id = %id, "tenant deleted");
        Ok(())
    }
}
