/// Contact form endpoint
use crate::{
    context::AppContext,
    db::models::ContactMessage,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

/// Build contact routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/contact", post(submit_contact))
}

#[derive(Debug, Deserialize, Validate)]
struct ContactBody {
    #[validate(length(min = 1, max = 120))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, max = 4000))]
    message: String,
}

async fn submit_contact(
    State(ctx): State<AppContext>,
    Json(body): Json<ContactBody>,
) -> ApiResult<Json<ContactMessage>> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let record = ctx
        .contact
        .submit(&body.name, &body.email, &body.message)
        .await?;

    Ok(Json(record))
}
