/// Training program catalog endpoints
use crate::{
    auth::{AdminAuthContext, OptionalAuthContext},
    catalog::OfferingInput,
    context::AppContext,
    db::models::Offering,
    error::{ApiError, ApiResult},
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
use validator::Validate;

/// Build catalog routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/offerings", get(list_offerings).post(create_offering))
        .route(
            "/api/offerings/:id",
            get(get_offering).put(update_offering).delete(delete_offering),
        )
}

/// Members and anonymous callers see active offerings only; administrators
/// see the full catalog.
async fn list_offerings(
    State(ctx): State<AppContext>,
    auth: OptionalAuthContext,
) -> ApiResult<Json<Vec<Offering>>> {
    let offerings = match &auth.identity {
        Some(identity) if identity.role.is_admin() => ctx.offerings.list(identity).await?,
        _ => ctx.offerings.list_active().await?,
    };

    Ok(Json(offerings))
}

async fn get_offering(
    State(ctx): State<AppContext>,
    auth: OptionalAuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Offering>> {
    let offering = ctx.offerings.get(auth.identity.as_ref(), id).await?;
    Ok(Json(offering))
}

#[derive(Debug, Deserialize, Validate)]
struct OfferingBody {
    #[validate(length(min = 1, max = 200))]
    title: String,
    description: String,
    #[validate(length(min = 1, max = 60))]
    duration: String,
    /// Price in paise
    price: i64,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl OfferingBody {
    fn into_input(self) -> OfferingInput {
        OfferingInput {
            title: self.title,
            description: self.description,
            duration: self.duration,
            price: self.price,
            active: self.active,
        }
    }
}

async fn create_offering(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    headers: HeaderMap,
    Json(body): Json<OfferingBody>,
) -> ApiResult<Json<Offering>> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let offering = ctx
        .offerings
        .create(&auth.identity, body.into_input())
        .await?;

    ctx.audit
        .record(
            &auth.identity,
            "offering.create",
            "offering",
            Some(offering.id),
            Some(json!({ "title": offering.title, "price": offering.price })),
            crate::api::middleware::client_addr(&headers),
        )
        .await;

    Ok(Json(offering))
}

async fn update_offering(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<OfferingBody>,
) -> ApiResult<Json<Offering>> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let offering = ctx
        .offerings
        .update(&auth.identity, id, body.into_input())
        .await?;

    ctx.audit
        .record(
            &auth.identity,
            "offering.update",
            "offering",
            Some(id),
            Some(json!({ "title": offering.title, "active": offering.active })),
            crate::api::middleware::client_addr(&headers),
        )
        .await;

    Ok(Json(offering))
}

async fn delete_offering(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.offerings.delete(&auth.identity, id).await?;

    ctx.audit
        .record(
            &auth.identity,
            "offering.delete",
            "offering",
            Some(id),
            None,
            crate::api::middleware::client_addr(&headers),
        )
        .await;

    Ok(Json(json!({ "deleted": true })))
}
