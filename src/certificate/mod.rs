/// Certificate issuance
use crate::{
    auth::Identity,
    db::{models::Certificate, scope::SessionScope},
    error::{ApiError, ApiResult},
};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

const CERTIFICATE_COLUMNS: &str =
    "id, account_id, offering_id, certificate_no, issued_on, file_url";

/// Generate a unique human-readable certificate number.
///
/// Uniqueness comes from the UUID; the schema constraint backs it up.
pub fn generate_certificate_no() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("CERT-{}", &id[..12])
}

/// Certificate manager service
pub struct CertificateManager {
    db: PgPool,
}

impl CertificateManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Issue a certificate (administrator only)
    pub async fn issue(
        &self,
        identity: &Identity,
        account_id: Uuid,
        offering_id: Uuid,
        file_url: Option<String>,
    ) -> ApiResult<Certificate> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let certificate: Certificate = sqlx::query_as(&format!(
            "INSERT INTO certificates (id, account_id, offering_id, certificate_no, issued_on, file_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CERTIFICATE_COLUMNS}",
        ))
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(offering_id)
        .bind(generate_certificate_no())
        .bind(Utc::now().date_naive())
        .bind(&file_url)
        .fetch_one(scope.conn())
        .await?;

        scope.commit().await?;

        tracing::info!(
            certificate_no = %certificate.certificate_no,
            account_id = %account_id,
            "certificate issued"
        );
        Ok(certificate)
    }

    /// List certificates; RLS narrows members to their own
    pub async fn list(&self, identity: &Identity) -> ApiResult<Vec<Certificate>> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let certificates: Vec<Certificate> = sqlx::query_as(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates ORDER BY issued_on DESC"
        ))
        .fetch_all(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(certificates)
    }

    /// Public verification by certificate number
    pub async fn verify(&self, certificate_no: &str) -> ApiResult<Certificate> {
        let mut scope = SessionScope::service(&self.db).await?;

        let certificate: Option<Certificate> = sqlx::query_as(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE certificate_no = $1"
        ))
        .bind(certificate_no)
        .fetch_optional(scope.conn())
        .await?;

        scope.commit().await?;
        certificate.ok_or_else(|| ApiError::NotFound("certificate not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_certificate_no_format() {
        let no = generate_certificate_no();
        assert!(no.starts_with("CERT-"));
        assert_eq!(no.len(), "CERT-".len() + 12);
        assert!(no["CERT-".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_certificate_numbers_unique() {
        let nos: HashSet<String> = (0..1000).map(|_| generate_certificate_no()).collect();
        assert_eq!(nos.len(), 1000);
    }
}
