/// Session-context propagation to the storage layer
///
/// Every identity-bound database operation runs inside a `SessionScope`: one
/// borrowed connection, one transaction, with the caller's id and role bound
/// as transaction-local settings (`set_config(..., true)`). The row-level
/// security policies in the schema re-derive allow/deny decisions from those
/// settings, independently of the route-level authorization gate.
///
/// Because the settings are transaction-local they vanish on commit or
/// rollback and can never leak across pooled-connection reuse. Dropping an
/// uncommitted scope rolls the transaction back, so the connection is
/// released clean on every exit path.
use crate::{auth::Identity, error::ApiResult};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// Reserved role for trusted pre-authentication paths (signup, login,
/// contact form, public catalog reads). Policies grant it the narrow access
/// those paths need; it is never derived from request data.
pub const SERVICE_ROLE: &str = "service";

/// A transaction with an identity context bound for its lifetime
pub struct SessionScope<'a> {
    tx: Transaction<'a, Postgres>,
}

impl<'a> SessionScope<'a> {
    /// Begin a scope bound to an authenticated identity
    pub async fn begin(pool: &'a PgPool, identity: &Identity) -> ApiResult<SessionScope<'a>> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "SELECT set_config('app.identity_id', $1, true), set_config('app.role', $2, true)",
        )
        .bind(identity.id.to_string())
        .bind(identity.role.as_str())
        .execute(&mut *tx)
        .await?;

        Ok(SessionScope { tx })
    }

    /// Begin a scope for a trusted pre-authentication code path
    pub async fn service(pool: &'a PgPool) -> ApiResult<SessionScope<'a>> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT set_config('app.role', $1, true)")
            .bind(SERVICE_ROLE)
            .execute(&mut *tx)
            .await?;

        Ok(SessionScope { tx })
    }

    /// The underlying connection; context binding and queries share it
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit the transaction, clearing the bound context
    pub async fn commit(self) -> ApiResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Roll back explicitly (dropping the scope has the same effect)
    pub async fn rollback(self) -> ApiResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
