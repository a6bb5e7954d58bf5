// src/handlers/mod.rs

pub mod advice;
pub mod auth;
pub mod dashboard;
pub mod goals;
pub mod meals;
pub mod profile;

use uuid::Uuid;

use crate::{
    error::AppError,
    generation::TaskKind,
    models::user::{Biometrics, User},
    state::AppState,
    utils::deadline::within,
};

/// Loads a user by id. Missing users are a 404.
async fn find_user(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    within(state.config.query_timeout(), state.users.user_by_id(user_id))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Generation needs every biometric field, so an incomplete profile blocks it.
fn require_biometrics(user: &User) -> Result<Biometrics<'_>, AppError> {
    user.biometrics().ok_or_else(|| {
        AppError::Precondition(
            "Your profile is incomplete. Add height, age, sex, country and at least one diet preference first."
                .to_string(),
        )
    })
}

/// One model round trip under the generation deadline.
async fn generate(state: &AppState, kind: TaskKind, prompt: &str) -> Result<String, AppError> {
    tracing::info!("Requesting {} from the model", kind);
    let raw = within(state.config.generation_timeout(), async {
        state
            .generator
            .generate(kind, prompt)
            .await
            .map_err(AppError::from)
    })
    .await?;
    tracing::debug!("Model returned {} bytes for {}", raw.len(), kind);
    Ok(raw)
}
