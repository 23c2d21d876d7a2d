/// Enrollment lifecycle
use crate::{
    auth::Identity,
    db::{
        models::{Enrollment, EnrollmentStatus},
        scope::SessionScope,
    },
    error::{ApiError, ApiResult},
};
use sqlx::PgPool;
use uuid::Uuid;

const ENROLLMENT_COLUMNS: &str = "id, account_id, offering_id, status, created_at";

/// Enrollment manager service
pub struct EnrollmentManager {
    db: PgPool,
}

impl EnrollmentManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Enroll the calling member in an offering.
    ///
    /// Starts in awaiting_payment. The (account, offering) uniqueness
    /// constraint turns concurrent duplicates into exactly one success and
    /// Conflict for the rest.
    pub async fn enroll(&self, identity: &Identity, offering_id: Uuid) -> ApiResult<Enrollment> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        // Members only see active offerings, so an inactive one reads as absent
        let offering_exists: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM offerings WHERE id = $1 AND active",
        )
        .bind(offering_id)
        .fetch_optional(scope.conn())
        .await?;

        if offering_exists.is_none() {
            return Err(ApiError::NotFound("offering not found".to_string()));
        }

        let enrollment: Enrollment = sqlx::query_as(&format!(
            "INSERT INTO enrollments (id, account_id, offering_id, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(identity.id)
        .bind(offering_id)
        .bind(EnrollmentStatus::AwaitingPayment.as_str())
        .fetch_one(scope.conn())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("already enrolled in this offering".to_string())
            }
            other => other,
        })?;

        scope.commit().await?;
        Ok(enrollment)
    }

    /// List enrollments; RLS narrows members to their own rows
    pub async fn list(&self, identity: &Identity) -> ApiResult<Vec<Enrollment>> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let enrollments: Vec<Enrollment> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments ORDER BY created_at DESC"
        ))
        .fetch_all(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(enrollments)
    }

    /// Fetch one enrollment
    pub async fn get(&self, identity: &Identity, enrollment_id: Uuid) -> ApiResult<Enrollment> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let enrollment: Option<Enrollment> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(enrollment_id)
        .fetch_optional(scope.conn())
        .await?;

        scope.commit().await?;
        enrollment.ok_or_else(|| ApiError::NotFound("enrollment not found".to_string()))
    }

    /// Advance an enrollment to completed (administrator only).
    ///
    /// Only enrolled rows advance; completed never regresses.
    pub async fn complete(&self, identity: &Identity, enrollment_id: Uuid) -> ApiResult<Enrollment> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let current: Option<Enrollment> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1 FOR UPDATE"
        ))
        .bind(enrollment_id)
        .fetch_optional(scope.conn())
        .await?;

        let current =
            current.ok_or_else(|| ApiError::NotFound("enrollment not found".to_string()))?;

        if current.status()? != EnrollmentStatus::Enrolled {
            return Err(ApiError::InvalidState(format!(
                "enrollment is {}, only enrolled enrollments can be completed",
                current.status
            )));
        }

        let enrollment: Enrollment = sqlx::query_as(&format!(
            "UPDATE enrollments SET status = $2 WHERE id = $1 RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(enrollment_id)
        .bind(EnrollmentStatus::Completed.as_str())
        .fetch_one(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(enrollment)
    }
}
