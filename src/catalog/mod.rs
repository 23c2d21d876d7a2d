/// Training program catalog
use crate::{
    auth::Identity,
    db::{models::Offering, scope::SessionScope},
    error::{ApiError, ApiResult},
};
use sqlx::PgPool;
use uuid::Uuid;

const OFFERING_COLUMNS: &str = "id, title, description, duration, price, active, created_at";

/// Offering creation/update parameters
#[derive(Debug, Clone)]
pub struct OfferingInput {
    pub title: String,
    pub description: String,
    pub duration: String,
    /// Price in paise
    pub price: i64,
    pub active: bool,
}

/// Catalog manager service
pub struct OfferingManager {
    db: PgPool,
}

impl OfferingManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Public catalog: active offerings only
    pub async fn list_active(&self) -> ApiResult<Vec<Offering>> {
        let mut scope = SessionScope::service(&self.db).await?;

        let offerings: Vec<Offering> = sqlx::query_as(&format!(
            "SELECT {OFFERING_COLUMNS} FROM offerings WHERE active ORDER BY created_at DESC"
        ))
        .fetch_all(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(offerings)
    }

    /// All offerings; RLS limits members to active rows
    pub async fn list(&self, identity: &Identity) -> ApiResult<Vec<Offering>> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let offerings: Vec<Offering> = sqlx::query_as(&format!(
            "SELECT {OFFERING_COLUMNS} FROM offerings ORDER BY created_at DESC"
        ))
        .fetch_all(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(offerings)
    }

    /// Fetch one offering; members see only active rows
    pub async fn get(&self, identity: Option<&Identity>, offering_id: Uuid) -> ApiResult<Offering> {
        let mut scope = match identity {
            Some(identity) => SessionScope::begin(&self.db, identity).await?,
            None => SessionScope::service(&self.db).await?,
        };

        let query = match identity {
            Some(i) if i.role.is_admin() => {
                format!("SELECT {OFFERING_COLUMNS} FROM offerings WHERE id = $1")
            }
            _ => format!("SELECT {OFFERING_COLUMNS} FROM offerings WHERE id = $1 AND active"),
        };

        let offering: Option<Offering> = sqlx::query_as(&query)
            .bind(offering_id)
            .fetch_optional(scope.conn())
            .await?;

        scope.commit().await?;
        offering.ok_or_else(|| ApiError::NotFound("offering not found".to_string()))
    }

    /// Create an offering (administrator)
    pub async fn create(&self, identity: &Identity, input: OfferingInput) -> ApiResult<Offering> {
        if input.price < 0 {
            return Err(ApiError::Validation("Price cannot be negative".to_string()));
        }

        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let offering: Offering = sqlx::query_as(&format!(
            "INSERT INTO offerings (id, title, description, duration, price, active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {OFFERING_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.duration)
        .bind(input.price)
        .bind(input.active)
        .fetch_one(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(offering)
    }

    /// Update an offering (administrator)
    pub async fn update(
        &self,
        identity: &Identity,
        offering_id: Uuid,
        input: OfferingInput,
    ) -> ApiResult<Offering> {
        if input.price < 0 {
            return Err(ApiError::Validation("Price cannot be negative".to_string()));
        }

        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let offering: Option<Offering> = sqlx::query_as(&format!(
            "UPDATE offerings
             SET title = $2, description = $3, duration = $4, price = $5, active = $6
             WHERE id = $1
             RETURNING {OFFERING_COLUMNS}"
        ))
        .bind(offering_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.duration)
        .bind(input.price)
        .bind(input.active)
        .fetch_optional(scope.conn())
        .await?;

        scope.commit().await?;
        offering.ok_or_else(|| ApiError::NotFound("offering not found".to_string()))
    }

    /// Delete an offering (administrator).
    ///
    /// The foreign keys from enrollments/payments/certificates are RESTRICT,
    /// so deleting a referenced offering fails with 23503 and maps to
    /// Conflict; one with no references succeeds.
    pub async fn delete(&self, identity: &Identity, offering_id: Uuid) -> ApiResult<()> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let result = sqlx::query("DELETE FROM offerings WHERE id = $1")
            .bind(offering_id)
            .execute(scope.conn())
            .await
            .map_err(|e| match ApiError::from(e) {
                ApiError::Conflict(_) => ApiError::Conflict(
                    "offering has enrollments and cannot be deleted".to_string(),
                ),
                other => other,
            })?;

        scope.commit().await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("offering not found".to_string()));
        }

        Ok(())
    }
}
