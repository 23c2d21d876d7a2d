/// Database models shared across the server
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Administrator => "administrator",
        }
    }

    pub fn parse(s: &str) -> ApiResult<Self> {
        match s {
            "member" => Ok(Role::Member),
            "administrator" => Ok(Role::Administrator),
            _ => Err(ApiError::Validation(format!("Invalid role: {}", s))),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

/// Enrollment lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    AwaitingPayment,
    Enrolled,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::AwaitingPayment => "awaiting_payment",
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> ApiResult<Self> {
        match s {
            "awaiting_payment" => Ok(EnrollmentStatus::AwaitingPayment),
            "enrolled" => Ok(EnrollmentStatus::Enrolled),
            "completed" => Ok(EnrollmentStatus::Completed),
            _ => Err(ApiError::Validation(format!(
                "Invalid enrollment status: {}",
                s
            ))),
        }
    }
}

/// Payment lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    AwaitingVerification,
    Confirmed,
    Rejected,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::AwaitingVerification => "awaiting_verification",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> ApiResult<Self> {
        match s {
            "awaiting_verification" => Ok(PaymentStatus::AwaitingVerification),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "rejected" => Ok(PaymentStatus::Rejected),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(ApiError::Validation(format!(
                "Invalid payment status: {}",
                s
            ))),
        }
    }
}

/// Account record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_elevated: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn role(&self) -> ApiResult<Role> {
        Role::parse(&self.role)
    }
}

/// Training program record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Offering {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Human-readable duration, e.g. "6 weeks"
    pub duration: String,
    /// Price in paise
    pub price: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Enrollment record linking an account to an offering
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub offering_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn status(&self) -> ApiResult<EnrollmentStatus> {
        EnrollmentStatus::parse(&self.status)
    }
}

/// Payment record; `created_at` anchors the verification window
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub offering_id: Uuid,
    /// Amount in paise
    pub amount: i64,
    pub method: String,
    /// Server-generated external reference
    pub reference: String,
    /// Member-supplied transaction reference, attached on confirmation
    pub txn_ref: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn status(&self) -> ApiResult<PaymentStatus> {
        PaymentStatus::parse(&self.status)
    }
}

/// Certificate record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub account_id: Uuid,
    pub offering_id: Uuid,
    pub certificate_no: String,
    pub issued_on: NaiveDate,
    pub file_url: Option<String>,
}

/// Append-only administrator activity record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub actor_id: Uuid,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub source_addr: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contact form message
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("member").unwrap(), Role::Member);
        assert_eq!(Role::parse("administrator").unwrap(), Role::Administrator);
        assert!(Role::parse("superuser").is_err());
        assert_eq!(Role::Member.as_str(), "member");
        assert!(Role::Administrator.is_admin());
        assert!(!Role::Member.is_admin());
    }

    #[test]
    fn test_enrollment_status_round_trip() {
        for status in [
            EnrollmentStatus::AwaitingPayment,
            EnrollmentStatus::Enrolled,
            EnrollmentStatus::Completed,
        ] {
            assert_eq!(EnrollmentStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(EnrollmentStatus::parse("cancelled").is_err());
    }

    #[test]
    fn test_payment_status_round_trip() {
        for status in [
            PaymentStatus::AwaitingVerification,
            PaymentStatus::Confirmed,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(PaymentStatus::parse("pending").is_err());
    }
}
