/// Contact form messages
use crate::{
    auth::Identity,
    db::{models::ContactMessage, scope::SessionScope},
    error::ApiResult,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Contact manager service
pub struct ContactManager {
    db: PgPool,
}

impl ContactManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Submit a contact message (no authentication required)
    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> ApiResult<ContactMessage> {
        let mut scope = SessionScope::service(&self.db).await?;

        // No RETURNING here: message reads are admin-only under RLS, and
        // INSERT .. RETURNING would require select visibility
        let record = ContactMessage {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            created_at: chrono::Utc::now(),
        };

        sqlx::query(
            "INSERT INTO contact_messages (id, name, email, message, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.message)
        .bind(record.created_at)
        .execute(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(record)
    }

    /// List messages (administrator context enforced by RLS)
    pub async fn list(&self, identity: &Identity) -> ApiResult<Vec<ContactMessage>> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let messages: Vec<ContactMessage> = sqlx::query_as(
            "SELECT id, name, email, message, created_at
             FROM contact_messages
             ORDER BY created_at DESC",
        )
        .fetch_all(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(messages)
    }
}
