/// Authorization gate predicates
///
/// Route-level allow/deny decisions over an identity attached by the
/// authentication gate. The storage layer re-derives the same decisions
/// independently from the session context (see `db::scope`), so a bug in
/// either layer leaves the other one protecting.
use crate::{
    auth::Identity,
    db::{models::Role, scope::SessionScope},
    error::{ApiError, ApiResult},
};
use sqlx::PgPool;
use uuid::Uuid;

/// Resources that carry an owning-identity column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedResource {
    Enrollment,
    Payment,
    Certificate,
}

impl OwnedResource {
    fn table(&self) -> &'static str {
        match self {
            OwnedResource::Enrollment => "enrollments",
            OwnedResource::Payment => "payments",
            OwnedResource::Certificate => "certificates",
        }
    }
}

/// Deny with `AuthenticationRequired` when a predicate runs without an
/// identity. This is a programming-contract violation, not a user error,
/// and is logged at error level so it stands out.
fn require_identity<'a>(
    identity: Option<&'a Identity>,
    endpoint: &str,
) -> ApiResult<&'a Identity> {
    identity.ok_or_else(|| {
        tracing::error!(
            endpoint,
            "authorization predicate invoked without identity context"
        );
        ApiError::AuthenticationRequired("authentication required".to_string())
    })
}

/// Role predicate: identity's role must be in the allowed set
pub fn require_role<'a>(
    identity: Option<&'a Identity>,
    allowed: &[Role],
    endpoint: &str,
) -> ApiResult<&'a Identity> {
    let identity = require_identity(identity, endpoint)?;

    if !allowed.contains(&identity.role) {
        tracing::warn!(
            account_id = %identity.id,
            attempted_role = identity.role.as_str(),
            allowed_roles = ?allowed.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            endpoint,
            "role check denied"
        );
        return Err(ApiError::InsufficientPermissions(
            "insufficient permissions".to_string(),
        ));
    }

    Ok(identity)
}

/// Self-or-administrator predicate: administrators always pass; members pass
/// only when operating on their own account
pub fn require_self_or_admin<'a>(
    identity: Option<&'a Identity>,
    target_account_id: Uuid,
    endpoint: &str,
) -> ApiResult<&'a Identity> {
    let identity = require_identity(identity, endpoint)?;

    if identity.role.is_admin() || identity.id == target_account_id {
        return Ok(identity);
    }

    tracing::warn!(
        account_id = %identity.id,
        target_account_id = %target_account_id,
        endpoint,
        "self-or-admin check denied"
    );
    Err(ApiError::InsufficientPermissions(
        "insufficient permissions".to_string(),
    ))
}

/// Resource-ownership predicate: administrators always pass; members must
/// own the resource. Missing resource is not-found; a storage failure during
/// the check fails closed.
///
/// The lookup runs inside the caller's session scope, so the row-level
/// policies narrow a member's view to owned rows. A row the member does not
/// own therefore reads as absent, which also avoids disclosing its existence.
pub async fn require_owner<'a>(
    pool: &PgPool,
    identity: Option<&'a Identity>,
    resource: OwnedResource,
    resource_id: Uuid,
    endpoint: &str,
) -> ApiResult<&'a Identity> {
    let identity = require_identity(identity, endpoint)?;

    if identity.role.is_admin() {
        return Ok(identity);
    }

    let query = format!(
        "SELECT account_id FROM {} WHERE id = $1",
        resource.table()
    );

    let lookup = async {
        let mut scope = SessionScope::begin(pool, identity).await?;
        let owner: Option<(Uuid,)> = sqlx::query_as(&query)
            .bind(resource_id)
            .fetch_optional(scope.conn())
            .await?;
        scope.commit().await?;
        Ok::<_, ApiError>(owner)
    };

    let owner = lookup.await.map_err(|e| {
        tracing::error!(error = %e, endpoint, "ownership check failed, denying");
        ApiError::StorageUnavailable("ownership check failed".to_string())
    })?;

    let owner = match owner {
        Some((owner,)) => owner,
        None => return Err(ApiError::NotFound("resource not found".to_string())),
    };

    if owner != identity.id {
        tracing::warn!(
            account_id = %identity.id,
            owner_id = %owner,
            resource = ?resource,
            resource_id = %resource_id,
            endpoint,
            "ownership check denied"
        );
        return Err(ApiError::InsufficientPermissions(
            "insufficient permissions".to_string(),
        ));
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role: Role::Member,
            email: "member@example.com".into(),
            elevated: false,
        }
    }

    fn admin() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role: Role::Administrator,
            email: "admin@example.com".into(),
            elevated: true,
        }
    }

    #[test]
    fn test_missing_identity_denied() {
        let err = require_role(None, &[Role::Member], "/test").unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationRequired(_)));

        let err = require_self_or_admin(None, Uuid::new_v4(), "/test").unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationRequired(_)));
    }

    #[test]
    fn test_role_predicate() {
        let m = member();
        assert!(require_role(Some(&m), &[Role::Member], "/test").is_ok());
        assert!(require_role(Some(&m), &[Role::Administrator], "/test").is_err());

        let a = admin();
        assert!(require_role(Some(&a), &[Role::Administrator], "/test").is_ok());
        assert!(require_role(Some(&a), &[Role::Member, Role::Administrator], "/test").is_ok());
    }

    #[test]
    fn test_self_or_admin_predicate() {
        let m = member();
        assert!(require_self_or_admin(Some(&m), m.id, "/test").is_ok());
        assert!(require_self_or_admin(Some(&m), Uuid::new_v4(), "/test").is_err());

        // Administrators pass regardless of target
        let a = admin();
        assert!(require_self_or_admin(Some(&a), Uuid::new_v4(), "/test").is_ok());
    }
}
