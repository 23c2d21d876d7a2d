/// Upskill - training enrollment platform backend
///
/// Accounts, a training program catalog, enrollments with a UPI payment
/// flow, certificates, and a contact form. Authorization is layered: JWT
/// authentication, role/ownership gates at the routes, and row-level
/// security policies re-deriving the same decisions inside the database.

mod account;
mod api;
mod audit;
mod auth;
mod authz;
mod catalog;
mod certificate;
mod config;
mod contact;
mod context;
mod credentials;
mod db;
mod enrollment;
mod error;
mod payment;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upskill_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; fails fast if the signing secret is absent
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
