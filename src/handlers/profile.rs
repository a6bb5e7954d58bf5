// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use super::find_user;
use crate::{
    error::AppError,
    models::user::{ProfileUpdate, UpdateProfileRequest},
    state::AppState,
    utils::{
        deadline::within,
        extract::ValidatedJson,
        html::{sanitize_optional, sanitize_text},
        jwt::Claims,
    },
};

/// Get the current user's profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user(&state, claims.sub).await?;
    Ok(Json(user))
}

/// Update any subset of the caller's profile fields.
/// Free-text fields are stripped of markup first; an update that ends up empty is a 400.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let diet_preferences = payload.diet_preferences.map(|preferences| {
        preferences
            .iter()
            .map(|p| sanitize_text(p))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
    });
    if diet_preferences.as_ref().is_some_and(Vec::is_empty) {
        return Err(AppError::BadRequest(
            "dietPreferences must contain at least one preference.".to_string(),
        ));
    }

    let update = ProfileUpdate {
        name: sanitize_optional(payload.name.as_deref()),
        age: payload.age,
        sex: sanitize_optional(payload.sex.as_deref()),
        height_in_cm: payload.height_in_cm,
        country: sanitize_optional(payload.country.as_deref()),
        diet_preferences,
    };

    if update.is_empty() {
        return Err(AppError::BadRequest(
            "No profile fields to update.".to_string(),
        ));
    }

    let updated = within(
        state.config.query_timeout(),
        state.users.update_profile(claims.sub, &update),
    )
    .await?;
    if !updated {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = find_user(&state, claims.sub).await?;
    tracing::info!("Updated profile of user {}", user.id);
    Ok(Json(user))
}
