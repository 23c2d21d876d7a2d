/// Administrator activity audit trail
use crate::{
    auth::Identity,
    db::{models::AuditRecord, scope::SessionScope},
    error::ApiResult,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Append-only audit log for state-changing administrator operations
#[derive(Clone)]
pub struct AuditManager {
    db: PgPool,
}

impl AuditManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record an administrator action.
    ///
    /// Best-effort: callers go through [`record`](Self::record), which logs
    /// a failure instead of propagating it, so an audit problem never rolls
    /// back the operation it describes.
    async fn try_record(
        &self,
        actor: &Identity,
        action: &str,
        resource_type: &str,
        resource_id: Option<String>,
        payload: Option<serde_json::Value>,
        source_addr: Option<String>,
    ) -> ApiResult<()> {
        let mut scope = SessionScope::begin(&self.db, actor).await?;

        sqlx::query(
            "INSERT INTO audit_records (actor_id, action, resource_type, resource_id, payload, source_addr)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(actor.id)
        .bind(action)
        .bind(resource_type)
        .bind(&resource_id)
        .bind(&payload)
        .bind(&source_addr)
        .execute(scope.conn())
        .await?;

        scope.commit().await
    }

    /// Record an administrator action, swallowing (but logging) failures
    pub async fn record(
        &self,
        actor: &Identity,
        action: &str,
        resource_type: &str,
        resource_id: Option<Uuid>,
        payload: Option<serde_json::Value>,
        source_addr: Option<String>,
    ) {
        if let Err(e) = self
            .try_record(
                actor,
                action,
                resource_type,
                resource_id.map(|id| id.to_string()),
                payload,
                source_addr,
            )
            .await
        {
            tracing::warn!(
                actor_id = %actor.id,
                action,
                resource_type,
                error = %e,
                "failed to write audit record"
            );
        }
    }

    /// List recent audit records (administrator context enforced by RLS)
    pub async fn list(&self, identity: &Identity, limit: i64) -> ApiResult<Vec<AuditRecord>> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let records: Vec<AuditRecord> = sqlx::query_as(
            "SELECT id, actor_id, action, resource_type, resource_id, payload, source_addr, created_at
             FROM audit_records
             ORDER BY created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(records)
    }
}
