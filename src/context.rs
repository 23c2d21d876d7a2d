/// Application context and dependency injection
use crate::{
    account::AccountManager,
    audit::AuditManager,
    catalog::OfferingManager,
    certificate::CertificateManager,
    config::ServerConfig,
    contact::ContactManager,
    credentials::TokenService,
    db,
    enrollment::EnrollmentManager,
    error::ApiResult,
    payment::PaymentManager,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Application context holding all shared services.
///
/// Constructed once at startup and injected into handlers through axum
/// state; nothing here is ambient or global.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: PgPool,
    pub tokens: Arc<TokenService>,
    pub accounts: Arc<AccountManager>,
    pub offerings: Arc<OfferingManager>,
    pub enrollments: Arc<EnrollmentManager>,
    pub payments: Arc<PaymentManager>,
    pub certificates: Arc<CertificateManager>,
    pub audit: Arc<AuditManager>,
    pub contact: Arc<ContactManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let pool = db::create_pool(&config.database).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let tokens = Arc::new(TokenService::new(
            &config.authentication.jwt_secret,
            config.authentication.token_ttl_hours,
        ));

        let accounts = Arc::new(AccountManager::new(pool.clone(), Arc::clone(&config)));
        let offerings = Arc::new(OfferingManager::new(pool.clone()));
        let enrollments = Arc::new(EnrollmentManager::new(pool.clone()));
        let payments = Arc::new(PaymentManager::new(pool.clone(), Arc::clone(&config)));
        let certificates = Arc::new(CertificateManager::new(pool.clone()));
        let audit = Arc::new(AuditManager::new(pool.clone()));
        let contact = Arc::new(ContactManager::new(pool.clone()));

        Ok(Self {
            config,
            db: pool,
            tokens,
            accounts,
            offerings,
            enrollments,
            payments,
            certificates,
            audit,
            contact,
        })
    }

    /// Teardown: close the pool, releasing every connection
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
