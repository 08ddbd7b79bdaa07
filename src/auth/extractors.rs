use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::auth::repo::User;
use crate::auth::token::{TokenKeys, TokenKind};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated principal. Verifies the bearer token, then re-reads the user
/// row so the attached identity reflects the store's present state rather
/// than the token's snapshot.
pub struct AuthUser(pub User);

/// Authenticated principal with the admin role. Runs the same authentication
/// first, so an unauthenticated request is rejected 401, never 403.
pub struct AdminUser(pub User);

/// Best-effort authentication: any failure yields `None` instead of a
/// rejection.
pub struct MaybeUser(pub Option<User>);

fn unauthorized(message: &str) -> ApiError {
    ApiError::Unauthorized(message.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| unauthorized("Access token is required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Access token is required"))?;

        let keys = TokenKeys::from_config(&state.config.auth);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            unauthorized("Invalid or expired token")
        })?;

        if claims.kind != TokenKind::Access {
            return Err(unauthorized("Invalid or expired token"));
        }

        let user = User::find_by_id(&state.db, claims.sub)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for unknown user");
                unauthorized("Invalid or expired token")
            })?;

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != "admin" {
            warn!(user_id = %user.id, role = %user.role, "admin access denied");
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(user)) => Ok(MaybeUser(Some(user))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::for_tests();
        let mut parts = parts_with_headers(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejection");
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let state = AppState::for_tests();
        let mut parts = parts_with_headers(Some("Basic dXNlcjpwYXNz"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejection");
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let state = AppState::for_tests();
        let mut parts = parts_with_headers(Some("Bearer not-a-token"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejection");
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn admin_gate_without_identity_is_unauthorized_not_forbidden() {
        let state = AppState::for_tests();
        let mut parts = parts_with_headers(None);
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejection");
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn optional_auth_swallows_failures() {
        let state = AppState::for_tests();
        let mut parts = parts_with_headers(Some("Bearer not-a-token"));
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts, &state)
            .await
            .expect("never rejects");
        assert!(user.is_none());
    }
}
