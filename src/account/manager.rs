/// Account manager implementation using runtime queries
use crate::{
    auth::Identity,
    config::ServerConfig,
    credentials,
    db::{
        models::{Account, Role},
        scope::SessionScope,
    },
    error::{ApiError, ApiResult},
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str =
    "id, full_name, email, phone, password_hash, role, is_elevated, created_at";

/// Signup parameters
///
/// There is deliberately no role field here: signup always produces a member
/// unless the out-of-band administrator secret is presented.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub admin_secret: Option<String>,
}

/// Self-service profile update; role and elevated flag are not representable
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Administrator update; may touch any field including role/elevated
#[derive(Debug, Clone, Default)]
pub struct AdminAccountUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub is_elevated: Option<bool>,
}

/// Decide the role for a new account: always member unless the presented
/// secret matches the configured privileged-signup secret. A presented
/// secret with none configured never elevates.
fn signup_role(presented: Option<&str>, expected: Option<&str>) -> (Role, bool) {
    match (presented, expected) {
        (Some(presented), Some(expected)) if presented == expected => {
            (Role::Administrator, true)
        }
        _ => (Role::Member, false),
    }
}

/// Account manager service
pub struct AccountManager {
    db: PgPool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    pub fn new(db: PgPool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Create a new account.
    ///
    /// Role is hardcoded to member unless the privileged signup secret
    /// matches the configured one.
    pub async fn signup(&self, req: SignupRequest) -> ApiResult<Account> {
        if req.password.len() < 8 {
            return Err(ApiError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let (role, elevated) = signup_role(
            req.admin_secret.as_deref(),
            self.config.authentication.admin_signup_secret.as_deref(),
        );

        let password_hash = credentials::hash_password(&req.password)?;
        let id = Uuid::new_v4();

        let mut scope = SessionScope::service(&self.db).await?;

        // Unique email is enforced by the schema; 23505 maps to Conflict
        let account: Account = sqlx::query_as(&format!(
            "INSERT INTO accounts (id, full_name, email, phone, password_hash, role, is_elevated)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(&req.full_name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(elevated)
        .fetch_one(scope.conn())
        .await?;

        scope.commit().await?;

        tracing::info!(account_id = %account.id, role = role.as_str(), "account created");
        Ok(account)
    }

    /// Verify credentials and return the account
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Account> {
        let mut scope = SessionScope::service(&self.db).await?;

        let account: Option<Account> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(scope.conn())
        .await?;

        scope.commit().await?;

        // Same error for unknown email and bad password
        let account = account.ok_or_else(|| {
            ApiError::AuthenticationRequired("invalid credentials".to_string())
        })?;

        if !credentials::verify_password(password, &account.password_hash) {
            return Err(ApiError::AuthenticationRequired(
                "invalid credentials".to_string(),
            ));
        }

        Ok(account)
    }

    /// Fetch one account within the caller's session context
    pub async fn get(&self, identity: &Identity, account_id: Uuid) -> ApiResult<Account> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let account: Option<Account> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(account_id)
        .fetch_optional(scope.conn())
        .await?;

        scope.commit().await?;
        account.ok_or_else(|| ApiError::NotFound("account not found".to_string()))
    }

    /// Self-service profile update.
    ///
    /// Only profile columns appear in the statement, so role and elevated
    /// flag cannot change regardless of the request body; the schema trigger
    /// re-checks the same invariant independently.
    pub async fn update_profile(
        &self,
        identity: &Identity,
        account_id: Uuid,
        update: ProfileUpdate,
    ) -> ApiResult<Account> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let account: Option<Account> = sqlx::query_as(&format!(
            "UPDATE accounts
             SET full_name = COALESCE($2, full_name),
                 email = COALESCE($3, email),
                 phone = COALESCE($4, phone)
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account_id)
        .bind(&update.full_name)
        .bind(&update.email)
        .bind(&update.phone)
        .fetch_optional(scope.conn())
        .await?;

        scope.commit().await?;
        account.ok_or_else(|| ApiError::NotFound("account not found".to_string()))
    }

    /// Administrator update of any account, including role and elevated flag
    pub async fn admin_update(
        &self,
        identity: &Identity,
        account_id: Uuid,
        update: AdminAccountUpdate,
    ) -> ApiResult<Account> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let account: Option<Account> = sqlx::query_as(&format!(
            "UPDATE accounts
             SET full_name = COALESCE($2, full_name),
                 email = COALESCE($3, email),
                 phone = COALESCE($4, phone),
                 role = COALESCE($5, role),
                 is_elevated = COALESCE($6, is_elevated)
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account_id)
        .bind(&update.full_name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.is_elevated)
        .fetch_optional(scope.conn())
        .await?;

        scope.commit().await?;
        account.ok_or_else(|| ApiError::NotFound("account not found".to_string()))
    }

    /// Delete an account; owned enrollments/payments/certificates cascade
    pub async fn delete(&self, identity: &Identity, account_id: Uuid) -> ApiResult<()> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(scope.conn())
            .await?;

        scope.commit().await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("account not found".to_string()));
        }

        Ok(())
    }

    /// List all accounts (administrator context; RLS hides rows otherwise)
    pub async fn list(&self, identity: &Identity) -> ApiResult<Vec<Account>> {
        let mut scope = SessionScope::begin(&self.db, identity).await?;

        let accounts: Vec<Account> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at DESC"
        ))
        .fetch_all(scope.conn())
        .await?;

        scope.commit().await?;
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_without_secret_is_member() {
        assert_eq!(signup_role(None, None), (Role::Member, false));
        assert_eq!(signup_role(None, Some("hunter2")), (Role::Member, false));
    }

    #[test]
    fn test_signup_with_wrong_secret_is_member() {
        assert_eq!(
            signup_role(Some("guess"), Some("hunter2")),
            (Role::Member, false)
        );
    }

    #[test]
    fn test_signup_secret_without_configuration_never_elevates() {
        assert_eq!(signup_role(Some("hunter2"), None), (Role::Member, false));
    }

    #[test]
    fn test_signup_with_matching_secret_is_administrator() {
        assert_eq!(
            signup_role(Some("hunter2"), Some("hunter2")),
            (Role::Administrator, true)
        );
    }
}
