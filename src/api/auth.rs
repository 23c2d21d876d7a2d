/// Signup and login endpoints
use crate::{
    account::SignupRequest,
    auth::Identity,
    context::AppContext,
    db::models::Account,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

/// Unknown body fields (including any client-supplied "role") are ignored;
/// the role is decided server-side.
#[derive(Debug, Deserialize, Validate)]
struct SignupBody {
    #[validate(length(min = 1, max = 120))]
    full_name: String,
    #[validate(email)]
    email: String,
    phone: Option<String>,
    #[validate(length(min = 8, max = 128))]
    password: String,
    admin_secret: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    account: Account,
    token: String,
}

async fn signup(
    State(ctx): State<AppContext>,
    Json(body): Json<SignupBody>,
) -> ApiResult<Json<SessionResponse>> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let account = ctx
        .accounts
        .signup(SignupRequest {
            full_name: body.full_name,
            email: body.email,
            phone: body.phone,
            password: body.password,
            admin_secret: body.admin_secret,
        })
        .await?;

    let token = ctx.tokens.issue(&identity_of(&account)?)?;
    Ok(Json(SessionResponse { account, token }))
}

#[derive(Debug, Deserialize, Validate)]
struct LoginBody {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

async fn login(
    State(ctx): State<AppContext>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<SessionResponse>> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let account = ctx.accounts.login(&body.email, &body.password).await?;
    let token = ctx.tokens.issue(&identity_of(&account)?)?;

    Ok(Json(SessionResponse { account, token }))
}

fn identity_of(account: &Account) -> ApiResult<Identity> {
    Ok(Identity {
        id: account.id,
        role: account.role()?,
        email: account.email.clone(),
        elevated: account.is_elevated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // A signup body smuggling role/elevated fields deserializes cleanly with
    // those fields dropped; there is nowhere for them to land.
    #[test]
    fn test_signup_body_drops_injected_role_fields() {
        let body: SignupBody = serde_json::from_str(
            r#"{
                "full_name": "Mallory",
                "email": "mallory@example.com",
                "password": "password123",
                "role": "administrator",
                "is_elevated": true
            }"#,
        )
        .unwrap();

        assert_eq!(body.full_name, "Mallory");
        assert_eq!(body.email, "mallory@example.com");
        assert!(body.admin_secret.is_none());
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_signup_body_rejects_short_password() {
        let body: SignupBody = serde_json::from_str(
            r#"{"full_name": "Alice", "email": "alice@example.com", "password": "short"}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());
    }
}
