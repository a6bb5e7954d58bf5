// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::user::{LoginRequest, RefreshTokenRequest, RegisterRequest, User},
    state::AppState,
    utils::{
        deadline::within,
        extract::ValidatedJson,
        hash::{hash_password, verify_password},
        html::sanitize_text,
        jwt::{Claims, sign_access_token, sign_refresh_token, verify_jwt},
    },
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = sanitize_text(&payload.name);
    if name.is_empty() {
        return Err(AppError::BadRequest("Name must not be empty.".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;
    let user = User::new(name, normalize_email(&payload.email), hashed_password);

    within(state.config.query_timeout(), state.users.create_user(&user))
        .await
        .map_err(|e| {
            if !matches!(e, AppError::Conflict(_)) {
                tracing::error!("Failed to register user: {:?}", e);
            }
            e
        })?;

    tracing::info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns an access/refresh token pair.
///
/// The refresh token is stored on the user so that logout can revoke it.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let limit = state.config.query_timeout();
    let user = within(limit, state.users.user_by_email(&normalize_email(&payload.email)))
        .await?
        .ok_or(AppError::AuthError(
            "User not found. Please register to continue".to_string(),
        ))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let access_token = sign_access_token(user.id, &user.email, &state.config)?;
    let refresh_token = sign_refresh_token(user.id, &user.email, &state.config)?;

    within(limit, state.users.set_refresh_token(user.id, Some(&refresh_token))).await?;

    Ok(Json(json!({
        "accessToken": access_token,
        "refreshToken": refresh_token,
        "type": "Bearer",
        "user": user,
    })))
}

/// Exchanges a refresh token for a new access token.
///
/// The token must verify against the refresh secret, belong to `email`, and
/// still be the one stored at the last login.
pub async fn request_access_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = verify_jwt(&payload.refresh_token, &state.config.jwt_refresh_secret)
        .map_err(|_| AppError::AuthError("Refresh token invalid".to_string()))?;

    if claims.email != normalize_email(&payload.email) {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let user = within(state.config.query_timeout(), state.users.user_by_id(claims.sub))
        .await?
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    if user.refresh_token.as_deref() != Some(payload.refresh_token.as_str()) {
        return Err(AppError::AuthError("Refresh token has been revoked".to_string()));
    }

    let access_token = sign_access_token(user.id, &user.email, &state.config)?;

    Ok(Json(json!({
        "accessToken": access_token,
        "refreshToken": payload.refresh_token,
        "type": "Bearer",
    })))
}

/// Revokes the caller's refresh token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    within(
        state.config.query_timeout(),
        state.users.set_refresh_token(claims.sub, None),
    )
    .await?;

    Ok(Json(json!({ "message": "Logged out" })))
}
