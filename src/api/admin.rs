/// Administrator endpoints
use crate::{
    auth::AdminAuthContext,
    context::AppContext,
    db::models::{AuditRecord, ContactMessage},
    error::ApiResult,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/admin/audit", get(list_audit))
        .route("/api/admin/messages", get(list_messages))
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    100
}

async fn list_audit(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<Vec<AuditRecord>>> {
    let records = ctx
        .audit
        .list(&auth.identity, query.limit.clamp(1, 1000))
        .await?;
    Ok(Json(records))
}

async fn list_messages(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    let messages = ctx.contact.list(&auth.identity).await?;
    Ok(Json(messages))
}
