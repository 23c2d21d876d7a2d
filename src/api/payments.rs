/// Payment endpoints
use crate::{
    auth::{AdminAuthContext, AuthContext},
    authz::{self, OwnedResource},
    context::AppContext,
    db::models::{Payment, PaymentStatus},
    error::ApiResult,
    payment::{PaymentSession, PaymentStatusView},
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

/// Build payment routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/payments/initiate", post(initiate_payment))
        .route("/api/payments/:id/confirm", post(confirm_payment))
        .route("/api/payments/:id/status", get(payment_status))
        .route("/api/payments/:id/decision", post(decide_payment))
}

#[derive(Debug, Deserialize)]
struct InitiateBody {
    offering_id: Uuid,
}

async fn initiate_payment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(body): Json<InitiateBody>,
) -> ApiResult<Json<PaymentSession>> {
    let session = ctx.payments.initiate(&auth.identity, body.offering_id).await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
struct ConfirmBody {
    txn_ref: Option<String>,
}

async fn confirm_payment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(body): Json<ConfirmBody>,
) -> ApiResult<Json<Payment>> {
    authz::require_owner(
        &ctx.db,
        Some(&auth.identity),
        OwnedResource::Payment,
        id,
        "/api/payments/:id/confirm",
    )
    .await?;

    let payment = ctx.payments.confirm(&auth.identity, id, body.txn_ref).await?;
    Ok(Json(payment))
}

async fn payment_status(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PaymentStatusView>> {
    authz::require_owner(
        &ctx.db,
        Some(&auth.identity),
        OwnedResource::Payment,
        id,
        "/api/payments/:id/status",
    )
    .await?;

    let view = ctx.payments.status(&auth.identity, id).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct DecisionBody {
    status: String,
}

/// Final administrator decision; the enrollment side effect is applied in
/// the same transaction as the payment update.
async fn decide_payment(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<DecisionBody>,
) -> ApiResult<Json<Payment>> {
    let target = PaymentStatus::parse(&body.status)?;

    let payment = ctx.payments.decide(&auth.identity, id, target).await?;

    ctx.audit
        .record(
            &auth.identity,
            "payment.decision",
            "payment",
            Some(id),
            Some(json!({ "status": payment.status, "account_id": payment.account_id })),
            crate::api::middleware::client_addr(&headers),
        )
        .await;

    Ok(Json(payment))
}
