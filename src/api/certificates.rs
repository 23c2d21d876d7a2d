/// Certificate endpoints
use crate::{
    auth::{AdminAuthContext, AuthContext},
    context::AppContext,
    db::models::Certificate,
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

/// Build certificate routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/certificates", get(list_certificates).post(issue_certificate))
        .route("/api/certificates/verify/:certificate_no", get(verify_certificate))
}

#[derive(Debug, Deserialize)]
struct IssueBody {
    account_id: Uuid,
    offering_id: Uuid,
    file_url: Option<String>,
}

async fn issue_certificate(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    headers: HeaderMap,
    Json(body): Json<IssueBody>,
) -> ApiResult<Json<Certificate>> {
    let certificate = ctx
        .certificates
        .issue(&auth.identity, body.account_id, body.offering_id, body.file_url)
        .await?;

    ctx.audit
        .record(
            &auth.identity,
            "certificate.issue",
            "certificate",
            Some(certificate.id),
            Some(json!({
                "certificate_no": certificate.certificate_no,
                "account_id": body.account_id,
            })),
            crate::api::middleware::client_addr(&headers),
        )
        .await;

    Ok(Json(certificate))
}

async fn list_certificates(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Certificate>>> {
    let certificates = ctx.certificates.list(&auth.identity).await?;
    Ok(Json(certificates))
}

/// Public verification endpoint, no authentication needed
async fn verify_certificate(
    State(ctx): State<AppContext>,
    Path(certificate_no): Path<String>,
) -> ApiResult<Json<Certificate>> {
    let certificate = ctx.certificates.verify(&certificate_no).await?;
    Ok(Json(certificate))
}
