/// Enrollment endpoints
use crate::{
    auth::{AdminAuthContext, AuthContext},
    authz::{self, OwnedResource},
    context::AppContext,
    db::models::Enrollment,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Build enrollment routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/enrollments", get(list_enrollments).post(create_enrollment))
        .route("/api/enrollments/:id", get(get_enrollment))
        .route("/api/enrollments/:id/complete", post(complete_enrollment))
}

#[derive(Debug, Deserialize)]
struct EnrollBody {
    offering_id: Uuid,
}

async fn create_enrollment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(body): Json<EnrollBody>,
) -> ApiResult<Json<Enrollment>> {
    let enrollment = ctx.enrollments.enroll(&auth.identity, body.offering_id).await?;
    Ok(Json(enrollment))
}

async fn list_enrollments(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Enrollment>>> {
    let enrollments = ctx.enrollments.list(&auth.identity).await?;
    Ok(Json(enrollments))
}

async fn get_enrollment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Enrollment>> {
    // Gate-level ownership check; the row-level policy re-checks inside the
    // manager's session scope
    authz::require_owner(
        &ctx.db,
        Some(&auth.identity),
        OwnedResource::Enrollment,
        id,
        "/api/enrollments/:id",
    )
    .await?;

    let enrollment = ctx.enrollments.get(&auth.identity, id).await?;
    Ok(Json(enrollment))
}

async fn complete_enrollment(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Enrollment>> {
    let enrollment = ctx.enrollments.complete(&auth.identity, id).await?;

    ctx.audit
        .record(
            &auth.identity,
            "enrollment.complete",
            "enrollment",
            Some(id),
            Some(json!({ "account_id": enrollment.account_id })),
            crate::api::middleware::client_addr(&headers),
        )
        .await;

    Ok(Json(enrollment))
}
