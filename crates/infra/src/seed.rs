//! Demo data for local development.

use taxifleet_auth::{Principal, Role, RoleMasks};
use taxifleet_core::DomainResult;
use taxifleet_fleet::{NewTaxi, NewTenant, NewUser, TaxiService, TaxiStatus, Tenant, TenantService, UserAdminService};

pub const DEMO_SUBDOMAIN: &str = "demo-transport";

/// Login credentials created by [`seed_demo`], as `(role, email, password)`.
pub const DEMO_USERS: [(Role, &str, &str); 5] = [
    (Role::Admin, "admin@taxifleet.local", "admin123"),
    (Role::Owner, "owner@demo-transport.local", "owner123"),
    (Role::Manager, "manager@demo-transport.local", "manager123"),
    (Role::Mechanic, "mechanic@demo-transport.local", "mechanic123"),
    (Role::Driver, "driver@demo-transport.local", "driver123"),
];

const DEMO_TAXIS: [(&str, &str, i32, &str, TaxiStatus); 2] = [
    ("ABC-123", "Toyota Camry", 2020, "White", TaxiStatus::Active),
    ("DEF-456", "Nissan Altima", 2019, "Silver", TaxiStatus::Maintenance),
];

/// Creates the demo tenant with one user per role and a couple of taxis.
///
/// Returns `None` when the tenant already exists; nothing is touched then.
pub fn seed_demo(
    tenants: &TenantService,
    users: &UserAdminService,
    taxis: &TaxiService,
    masks: &RoleMasks,
) -> DomainResult<Option<Tenant>> {
    if tenants.find_by_subdomain(DEMO_SUBDOMAIN)?.is_some() {
        tracing::info!(subdomain = DEMO_SUBDOMAIN, "demo tenant already present, skipping seed");
        return Ok(None);
    }

    let tenant = tenants.create(NewTenant {
        name: "Demo Transport".to_string(),
        subdomain: DEMO_SUBDOMAIN.to_string(),
        logo: String::new(),
        settings: None,
    })?;

    let mut owner = None;
    for (i, (role, email, password)) in DEMO_USERS.iter().enumerate() {
        let (first_name, last_name) = (role.as_str().to_string(), "Demo".to_string());
        let user = users.create(NewUser {
            tenant_id: tenant.id,
            email: (*email).to_string(),
            password: (*password).to_string(),
            permission: Some(masks.mask_for(*role)),
            role: None,
            first_name,
            last_name,
            phone: format!("+100000000{i}"),
            active: Some(true),
        })?;
        tracing::info!(user_id = %user.id, role = role.as_str(), "demo user created");
        if *role == Role::Owner {
            owner = Some(Principal::from(&user));
        }
    }

    if let Some(owner) = owner {
        for (plate, model, year, color, status) in DEMO_TAXIS {
            taxis.create(
                &owner,
                NewTaxi {
                    license_plate: plate.to_string(),
                    model: model.to_string(),
                    year: Some(year),
                    color: color.to_string(),
                    vin: format!("VIN-{plate}"),
                    status: Some(status),
                    assigned_driver_id: None,
                },
            )?;
        }
    }

    tracing::info!(tenant_id = %tenant.id, "demo data seeded");
    Ok(Some(tenant))
}
