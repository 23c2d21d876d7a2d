/// Payment lifecycle and its coupling to enrollments
///
/// Payment: awaiting_verification -> {confirmed | rejected}, and
/// confirmed -> refunded (administrator only). Expiry of the verification
/// window is realized lazily on the next touch of a payment (initiate,
/// confirm, or status read) rather than by a background sweep; a payment can
/// therefore sit expired-but-unobserved indefinitely. That is accepted
/// lazy-consistency behavior, not a bug.
pub mod upi;

use crate::{
    auth::Identity,
    config::ServerConfig,
    db::{
        models::{Enrollment, EnrollmentStatus, Payment, PaymentStatus},
        scope::SessionScope,
    },
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const PAYMENT_COLUMNS: &str =
    "id, account_id, offering_id, amount, method, reference, txn_ref, status, created_at";

/// Fixed verification window applied uniformly to every payment
pub const VERIFICATION_WINDOW_SECS: i64 = 300;

/// True once the verification window has elapsed.
///
/// Exactly at the boundary the window is still open; one unit past it is
/// elapsed.
pub fn window_elapsed(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at > Duration::seconds(VERIFICATION_WINDOW_SECS)
}

/// Validate an administrator's target status against the current one
pub fn validate_decision(current: PaymentStatus, target: PaymentStatus) -> ApiResult<()> {
    match target {
        PaymentStatus::AwaitingVerification => Err(ApiError::Validation(
            "cannot move a payment back to awaiting_verification".to_string(),
        )),
        PaymentStatus::Confirmed => match current {
            PaymentStatus::AwaitingVerification => Ok(()),
            _ => Err(ApiError::InvalidState(format!(
                "cannot confirm a {} payment",
                current.as_str()
            ))),
        },
        PaymentStatus::Rejected => match current {
            PaymentStatus::AwaitingVerification | PaymentStatus::Confirmed => Ok(()),
            _ => Err(ApiError::InvalidState(format!(
                "cannot reject a {} payment",
                current.as_str()
            ))),
        },
        PaymentStatus::Refunded => match current {
            PaymentStatus::Confirmed => Ok(()),
            _ => Err(ApiError::InvalidState(format!(
                "only confirmed payments can be refunded, payment is {}",
                current.as_str()
            ))),
        },
    }
}

/// Enrollment side effect of an administrator decision: which enrollment
/// status flips to which, for the same (account, offering) pair
pub fn enrollment_effect(
    target: PaymentStatus,
) -> Option<(EnrollmentStatus, EnrollmentStatus)> {
    match target {
        PaymentStatus::Confirmed => {
            Some((EnrollmentStatus::AwaitingPayment, EnrollmentStatus::Enrolled))
        }
        PaymentStatus::Rejected => {
            Some((EnrollmentStatus::Enrolled, EnrollmentStatus::AwaitingPayment))
        }
        _ => None,
    }
}

/// Payment session returned to the member after initiation
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSession {
    pub payment_id: Uuid,
    pub reference: String,
    /// Amount in paise
    pub amount: i64,
    pub upi_link: String,
    /// Payload for the client to render as a scannable code
    pub qr_payload: String,
    pub expires_at: DateTime<Utc>,
    /// True when an unexpired session was returned instead of a new one
    pub reused: bool,
}

/// Payment status view with explicit expiry indication
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusView {
    pub payment_id: Uuid,
    pub status: PaymentStatus,
    pub reference: String,
    pub txn_ref: Option<String>,
    /// True when this read realized a lapsed verification window
    pub expired: bool,
}

/// Payment manager service
pub struct PaymentManager {
    db: PgPool,
    config: Arc<ServerConfig>,
}

impl PaymentManager {
    pub fn new(db: PgPool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    fn session_for(&self, payment: &Payment, note: &str, reused: bool) -> PaymentSession {
        let upi_link = upi::build_link(
            &self.config.payment.merchant_vpa,
            &self.config.payment.merchant_name,
            payment.amount,
            note,
            &payment.reference,
        );

        PaymentSession {
            payment_id: payment.id,
            reference: payment.reference.clone(),
            amount: payment.amount,
            qr_payload: upi_link.clone(),
            upi_link,
            expires_at: payment.created_at + Duration::seconds(VERIFICATION_WINDOW_SECS),
            reused,
        }
    }

    /// Initiate payment for the caller's awaiting_payment enrollment.
    ///
    /// Idempotent within the verification window: a still-valid session for
    /// the same (account, offering) pair is returned as-is. An elapsed one
    /// is rolled to rejected first, then a fresh session is created.
    pub async fn initiate(&self, identity: &Identity, offering_id: Uuid) -> ApiResult<PaymentSession> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let enrollment: Option<Enrollment> = sqlx::query_as(
            "SELECT id, account_id, offering_id, status, created_at
             FROM enrollments
             WHERE account_id = $1 AND offering_id = $2
             FOR UPDATE",
        )
        .bind(identity.id)
        .bind(offering_id)
        .fetch_optional(scope.conn())
        .await?;

        let enrollment = enrollment
            .ok_or_else(|| ApiError::NotFound("no enrollment for this offering".to_string()))?;

        if enrollment.status()? != EnrollmentStatus::AwaitingPayment {
            return Err(ApiError::InvalidState(format!(
                "enrollment is {}, payment can only be initiated while awaiting payment",
                enrollment.status
            )));
        }

        let offering: Option<(String, i64)> =
            sqlx::query_as("SELECT title, price FROM offerings WHERE id = $1")
                .bind(offering_id)
                .fetch_optional(scope.conn())
                .await?;
        let (title, price) =
            offering.ok_or_else(|| ApiError::NotFound("offering not found".to_string()))?;

        let existing: Option<Payment> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE account_id = $1 AND offering_id = $2 AND status = $3
             ORDER BY created_at DESC
             LIMIT 1
             FOR UPDATE",
        ))
        .bind(identity.id)
        .bind(offering_id)
        .bind(PaymentStatus::AwaitingVerification.as_str())
        .fetch_optional(scope.conn())
        .await?;

        let now = Utc::now();

        if let Some(payment) = existing {
            if !window_elapsed(payment.created_at, now) {
                // Same session, deterministically; no duplicate payment row
                scope.commit().await?;
                return Ok(self.session_for(&payment, &title, true));
            }

            sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
                .bind(payment.id)
                .bind(PaymentStatus::Rejected.as_str())
                .execute(scope.conn())
                .await?;
            tracing::info!(payment_id = %payment.id, "expired payment session rolled to rejected");
        }

        let payment: Payment = sqlx::query_as(&format!(
            "INSERT INTO payments (id, account_id, offering_id, amount, method, reference, status)
             VALUES ($1, $2, $3, $4, 'upi', $5, $6)
             RETURNING {PAYMENT_COLUMNS}",
        ))
        .bind(Uuid::new_v4())
        .bind(identity.id)
        .bind(offering_id)
        .bind(price)
        .bind(upi::generate_reference())
        .bind(PaymentStatus::AwaitingVerification.as_str())
        .fetch_one(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(self.session_for(&payment, &title, false))
    }

    /// Member attestation of a completed transfer.
    ///
    /// Records the optional external transaction reference; the status stays
    /// awaiting_verification, the administrator makes the final decision. A
    /// lapsed window rolls the payment to rejected and asks for a retry.
    pub async fn confirm(
        &self,
        identity: &Identity,
        payment_id: Uuid,
        txn_ref: Option<String>,
    ) -> ApiResult<Payment> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let payment: Option<Payment> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 FOR UPDATE",
        ))
        .bind(payment_id)
        .fetch_optional(scope.conn())
        .await?;

        let payment =
            payment.ok_or_else(|| ApiError::NotFound("payment not found".to_string()))?;

        if payment.status()? != PaymentStatus::AwaitingVerification {
            return Err(ApiError::InvalidState(format!(
                "payment is {}, confirmation only applies while awaiting verification",
                payment.status
            )));
        }

        if window_elapsed(payment.created_at, Utc::now()) {
            sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
                .bind(payment.id)
                .bind(PaymentStatus::Rejected.as_str())
                .execute(scope.conn())
                .await?;
            scope.commit().await?;

            return Err(ApiError::SessionExpired(
                "verification window elapsed, initiate a new payment".to_string(),
            ));
        }

        let payment: Payment = sqlx::query_as(&format!(
            "UPDATE payments SET txn_ref = COALESCE($2, txn_ref)
             WHERE id = $1
             RETURNING {PAYMENT_COLUMNS}",
        ))
        .bind(payment.id)
        .bind(&txn_ref)
        .fetch_one(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(payment)
    }

    /// Read payment status, realizing a lapsed window as rejected first
    pub async fn status(&self, identity: &Identity, payment_id: Uuid) -> ApiResult<PaymentStatusView> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let payment: Option<Payment> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 FOR UPDATE",
        ))
        .bind(payment_id)
        .fetch_optional(scope.conn())
        .await?;

        let mut payment =
            payment.ok_or_else(|| ApiError::NotFound("payment not found".to_string()))?;

        let mut expired = false;
        if payment.status()? == PaymentStatus::AwaitingVerification
            && window_elapsed(payment.created_at, Utc::now())
        {
            payment = sqlx::query_as(&format!(
                "UPDATE payments SET status = $2 WHERE id = $1 RETURNING {PAYMENT_COLUMNS}",
            ))
            .bind(payment.id)
            .bind(PaymentStatus::Rejected.as_str())
            .fetch_one(scope.conn())
            .await?;
            expired = true;
        }

        scope.commit().await?;

        Ok(PaymentStatusView {
            payment_id: payment.id,
            status: payment.status()?,
            reference: payment.reference.clone(),
            txn_ref: payment.txn_ref.clone(),
            expired,
        })
    }

    /// Administrator decision on a payment.
    ///
    /// The payment update and any enrollment flip for the same
    /// (account, offering) pair happen in one transaction; a half-applied
    /// state is never observable.
    pub async fn decide(
        &self,
        identity: &Identity,
        payment_id: Uuid,
        target: PaymentStatus,
    ) -> ApiResult<Payment> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let payment: Option<Payment> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 FOR UPDATE",
        ))
        .bind(payment_id)
        .fetch_optional(scope.conn())
        .await?;

        let payment =
            payment.ok_or_else(|| ApiError::NotFound("payment not found".to_string()))?;

        validate_decision(payment.status()?, target)?;

        let updated: Payment = sqlx::query_as(&format!(
            "UPDATE payments SET status = $2 WHERE id = $1 RETURNING {PAYMENT_COLUMNS}",
        ))
        .bind(payment.id)
        .bind(target.as_str())
        .fetch_one(scope.conn())
        .await?;

        if let Some((from, to)) = enrollment_effect(target) {
            sqlx::query(
                "UPDATE enrollments SET status = $4
                 WHERE account_id = $1 AND offering_id = $2 AND status = $3",
            )
            .bind(payment.account_id)
            .bind(payment.offering_id)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(scope.conn())
            .await?;
        }

        scope.commit().await?;

        tracing::info!(
            payment_id = %payment.id,
            from = %payment.status,
            to = target.as_str(),
            "administrator payment decision applied"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_boundary() {
        let created = Utc::now();
        let window = Duration::seconds(VERIFICATION_WINDOW_SECS);

        assert!(!window_elapsed(created, created));
        assert!(!window_elapsed(created, created + window - Duration::seconds(1)));
        // Exactly at the boundary is still inside the window
        assert!(!window_elapsed(created, created + window));
        // One unit past the boundary is elapsed
        assert!(window_elapsed(created, created + window + Duration::seconds(1)));
    }

    #[test]
    fn test_confirm_only_from_awaiting_verification() {
        assert!(validate_decision(
            PaymentStatus::AwaitingVerification,
            PaymentStatus::Confirmed
        )
        .is_ok());

        for current in [
            PaymentStatus::Confirmed,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ] {
            assert!(validate_decision(current, PaymentStatus::Confirmed).is_err());
        }
    }

    #[test]
    fn test_reject_from_awaiting_or_confirmed() {
        assert!(validate_decision(
            PaymentStatus::AwaitingVerification,
            PaymentStatus::Rejected
        )
        .is_ok());
        assert!(validate_decision(PaymentStatus::Confirmed, PaymentStatus::Rejected).is_ok());
        assert!(validate_decision(PaymentStatus::Rejected, PaymentStatus::Rejected).is_err());
        assert!(validate_decision(PaymentStatus::Refunded, PaymentStatus::Rejected).is_err());
    }

    #[test]
    fn test_refund_only_from_confirmed() {
        assert!(validate_decision(PaymentStatus::Confirmed, PaymentStatus::Refunded).is_ok());
        for current in [
            PaymentStatus::AwaitingVerification,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ] {
            assert!(validate_decision(current, PaymentStatus::Refunded).is_err());
        }
    }

    #[test]
    fn test_awaiting_verification_is_never_a_target() {
        for current in [
            PaymentStatus::AwaitingVerification,
            PaymentStatus::Confirmed,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ] {
            let err =
                validate_decision(current, PaymentStatus::AwaitingVerification).unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[test]
    fn test_enrollment_effects() {
        assert_eq!(
            enrollment_effect(PaymentStatus::Confirmed),
            Some((EnrollmentStatus::AwaitingPayment, EnrollmentStatus::Enrolled))
        );
        assert_eq!(
            enrollment_effect(PaymentStatus::Rejected),
            Some((EnrollmentStatus::Enrolled, EnrollmentStatus::AwaitingPayment))
        );
        assert_eq!(enrollment_effect(PaymentStatus::Refunded), None);
        assert_eq!(enrollment_effect(PaymentStatus::AwaitingVerification), None);
    }
}
