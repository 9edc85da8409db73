use axum::Router;

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod deposits;
pub mod expenses;
pub mod reports;
pub mod system;
pub mod taxis;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/taxis", taxis::router())
        .nest("/reports", reports::router())
        .nest("/expenses", expenses::router())
        .nest("/deposits", deposits::router())
        .nest("/dashboard", dashboard::router())
        .nest("/admin", admin::router())
}
