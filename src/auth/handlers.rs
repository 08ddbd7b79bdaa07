use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{
    AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest, TokenPair,
};
use crate::auth::extractors::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::auth::token::TokenKeys;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::util::is_valid_email;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let (Some(email), Some(username), Some(password)) =
        (payload.email, payload.username, payload.password)
    else {
        return Err(ApiError::BadRequest(
            "Email, username, and password are required".into(),
        ));
    };

    let email = email.trim().to_lowercase();
    let username = username.trim().to_string();

    if email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email, username, and password are required".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email at registration");
        return Err(ApiError::BadRequest("Invalid email format".into()));
    }
    if password.len() < 6 {
        return Err(ApiError::BadRequest(
            "Password must be at least 6 characters long".into(),
        ));
    }

    if let Some(existing) = User::find_by_email_or_username(&state.db, &email, &username).await? {
        let message = if existing.email == email {
            "User with this email already exists"
        } else {
            "User with this username already exists"
        };
        warn!(email = %email, username = %username, "duplicate registration");
        return Err(ApiError::Conflict(message.into()));
    }

    let hash = hash_password(&password)?;
    let role = &state.config.auth.registration_role;
    let user = User::create(&state.db, &email, &username, &hash, role).await?;

    let tokens = TokenKeys::from_config(&state.config.auth).sign_pair(&user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            AuthResponse { user: PublicUser::from(&user), tokens },
            "User registered successfully",
        )),
    ))
}

/// All failures past input validation collapse into one generic 401 so the
/// response does not reveal whether the email exists.
#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    };
    let email = email.trim().to_lowercase();

    let rejected = || ApiError::Unauthorized("Invalid email or password".into());

    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(|e| {
            error!(error = %e, "user lookup failed at login");
            rejected()
        })?
        .ok_or_else(|| {
            warn!(email = %email, "login for unknown email");
            rejected()
        })?;

    let ok = verify_password(&password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "password verification failed");
        rejected()
    })?;
    if !ok {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(rejected());
    }

    let tokens = TokenKeys::from_config(&state.config.auth)
        .sign_pair(&user)
        .map_err(|e| {
            error!(error = %e, "token signing failed at login");
            rejected()
        })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(ApiResponse::success(
        AuthResponse { user: PublicUser::from(&user), tokens },
        "Login successful",
    )))
}

/// Issues a new pair from the store's current email and role, so role or
/// email changes propagate here before the old token's natural expiry.
/// Failures collapse into one generic 401, like login.
#[instrument(skip(state, payload))]
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let Some(token) = payload.refresh_token else {
        return Err(ApiError::BadRequest("Refresh token is required".into()));
    };

    let rejected = || ApiError::Unauthorized("Invalid refresh token".into());

    let keys = TokenKeys::from_config(&state.config.auth);
    let claims = keys.verify_refresh(&token).map_err(|_| rejected())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(|e| {
            error!(error = %e, "user lookup failed at refresh");
            rejected()
        })?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "refresh for deleted user");
            rejected()
        })?;

    let tokens = keys.sign_pair(&user).map_err(|e| {
        error!(error = %e, "token signing failed at refresh");
        rejected()
    })?;

    info!(user_id = %user.id, "tokens refreshed");
    Ok(Json(ApiResponse::success(tokens, "Token refreshed successfully")))
}

#[instrument(skip_all)]
async fn me(AuthUser(user): AuthUser) -> Json<ApiResponse<PublicUser>> {
    Json(ApiResponse::success(
        PublicUser::from(&user),
        "Profile retrieved successfully",
    ))
}

/// Nothing is invalidated server side; clients discard their tokens.
async fn logout() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logout successful"))
}
