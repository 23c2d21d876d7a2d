/// API routes and handlers
pub mod accounts;
pub mod admin;
pub mod auth;
pub mod certificates;
pub mod contact;
pub mod enrollments;
pub mod middleware;
pub mod offerings;
pub mod payments;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(accounts::routes())
        .merge(offerings::routes())
        .merge(enrollments::routes())
        .merge(payments::routes())
        .merge(certificates::routes())
        .merge(contact::routes())
        .merge(admin::routes())
}
