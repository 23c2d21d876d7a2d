/// Authentication extractors and utilities
use crate::{
    api::middleware::extract_bearer_token,
    context::AppContext,
    db::models::Role,
    error::ApiError,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Identity bound to a request after token verification
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub elevated: bool,
}

/// Authenticated context - extracts and validates the session token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::AuthenticationRequired("missing authorization header".to_string())
        })?;

        // Specific failure reason stays in the server log; the client sees
        // only the taxonomy kind
        let claims = state.tokens.verify(&token).map_err(|e| {
            tracing::warn!(reason = %e, path = %parts.uri.path(), "token verification failed");
            e
        })?;

        let identity = state.tokens.identity_from_claims(&claims)?;
        Ok(AuthContext { identity })
    }
}

/// Optional authenticated context - does not fail if no auth provided
#[derive(Debug, Clone)]
pub struct OptionalAuthContext {
    pub identity: Option<Identity>,
}

#[async_trait]
impl FromRequestParts<AppContext> for OptionalAuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let identity = match extract_bearer_token(&parts.headers) {
            Some(token) => match state.tokens.verify(&token) {
                Ok(claims) => Some(state.tokens.identity_from_claims(&claims)?),
                Err(_) => None,
            },
            None => None,
        };

        Ok(OptionalAuthContext { identity })
    }
}

/// Administrator authentication context - requires the administrator role
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub identity: Identity,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let AuthContext { identity } =
            AuthContext::from_request_parts(parts, state).await?;

        if !identity.role.is_admin() {
            tracing::warn!(
                account_id = %identity.id,
                attempted_role = identity.role.as_str(),
                path = %parts.uri.path(),
                "non-administrator attempted admin endpoint"
            );
            return Err(ApiError::InsufficientPermissions(
                "administrator role required".to_string(),
            ));
        }

        Ok(AdminAuthContext { identity })
    }
}
