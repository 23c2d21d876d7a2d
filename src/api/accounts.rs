/// Account endpoints
use crate::{
    account::{AdminAccountUpdate, ProfileUpdate},
    auth::{AdminAuthContext, AuthContext},
    authz,
    context::AppContext,
    db::models::{Account, Role},
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Build account routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/accounts/me", get(get_me).put(update_me))
        .route("/api/accounts", get(list_accounts))
        .route(
            "/api/accounts/:id",
            get(get_account).put(admin_update_account).delete(delete_account),
        )
}

async fn get_me(State(ctx): State<AppContext>, auth: AuthContext) -> ApiResult<Json<Account>> {
    let account = ctx.accounts.get(&auth.identity, auth.identity.id).await?;
    Ok(Json(account))
}

/// Self-service update; there is no way to express a role or elevated-flag
/// change through this body.
#[derive(Debug, Deserialize)]
struct UpdateMeBody {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

async fn update_me(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(body): Json<UpdateMeBody>,
) -> ApiResult<Json<Account>> {
    let account = ctx
        .accounts
        .update_profile(
            &auth.identity,
            auth.identity.id,
            ProfileUpdate {
                full_name: body.full_name,
                email: body.email,
                phone: body.phone,
            },
        )
        .await?;

    Ok(Json(account))
}

async fn list_accounts(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Account>>> {
    let accounts = ctx.accounts.list(&auth.identity).await?;
    Ok(Json(accounts))
}

async fn get_account(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Account>> {
    authz::require_self_or_admin(Some(&auth.identity), id, "/api/accounts/:id")?;

    let account = ctx.accounts.get(&auth.identity, id).await?;
    Ok(Json(account))
}

#[derive(Debug, Deserialize)]
struct AdminUpdateBody {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    role: Option<String>,
    is_elevated: Option<bool>,
}

/// Administrator update of any account, including role and elevated flag.
/// Both are mutated together under the same restriction.
async fn admin_update_account(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<AdminUpdateBody>,
) -> ApiResult<Json<Account>> {
    let role = body.role.as_deref().map(Role::parse).transpose()?;

    let account = ctx
        .accounts
        .admin_update(
            &auth.identity,
            id,
            AdminAccountUpdate {
                full_name: body.full_name,
                email: body.email,
                phone: body.phone,
                role,
                is_elevated: body.is_elevated,
            },
        )
        .await?;

    ctx.audit
        .record(
            &auth.identity,
            "account.update",
            "account",
            Some(id),
            Some(json!({ "role": account.role, "is_elevated": account.is_elevated })),
            crate::api::middleware::client_addr(&headers),
        )
        .await;

    Ok(Json(account))
}

async fn delete_account(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authz::require_self_or_admin(Some(&auth.identity), id, "/api/accounts/:id")?;

    ctx.accounts.delete(&auth.identity, id).await?;

    if auth.identity.role.is_admin() {
        ctx.audit
            .record(
                &auth.identity,
                "account.delete",
                "account",
                Some(id),
                None,
                crate::api::middleware::client_addr(&headers),
            )
            .await;
    }

    Ok(Json(json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The self-service body cannot express a role or elevated-flag change;
    // injected fields are dropped on deserialization and ProfileUpdate has
    // no path to carry them to the statement.
    #[test]
    fn test_update_me_body_drops_privilege_fields() {
        let body: UpdateMeBody = serde_json::from_str(
            r#"{"full_name": "New Name", "role": "administrator", "is_elevated": true}"#,
        )
        .unwrap();

        assert_eq!(body.full_name.as_deref(), Some("New Name"));
        assert!(body.email.is_none());
        assert!(body.phone.is_none());
    }
}
