// src/handlers/advice.rs

//! The four advice endpoints. Each one checks ownership and the profile,
//! asks the model under its task schema and returns the decoded answer.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::de::DeserializeOwned;

use super::{find_user, generate, require_biometrics};
use crate::{
    error::AppError,
    generation::{
        TaskKind,
        parser::decode_advice,
        prompt::{self, BodySnapshot, GoalContext},
    },
    models::advice::{
        GoalDurationParams, GoalDurationResponse, IdealWeightParams, IdealWeightResponse,
        MacroParams, MacroResponse, TdeeParams, TdeeResponse,
    },
    state::AppState,
    utils::{
        extract::ValidatedQuery,
        jwt::{Claims, ensure_owner},
    },
};

async fn advise<T: DeserializeOwned>(
    state: &AppState,
    kind: TaskKind,
    prompt: &str,
) -> Result<T, AppError> {
    let raw = generate(state, kind, prompt).await?;
    Ok(decode_advice(kind, &raw)?)
}

/// Ideal weight range with matching body fat.
pub async fn get_ideal_weight(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<IdealWeightParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;
    let user = find_user(&state, params.user_id).await?;
    let bio = require_biometrics(&user)?;

    let body = BodySnapshot {
        weight_in_kg: params.current_weight_in_kg,
        body_fat_percentage: params.current_body_fat_percentage,
    };
    let prompt = prompt::ideal_weight_prompt(&bio, body);

    let answer: IdealWeightResponse = advise(&state, TaskKind::WeightRange, &prompt).await?;
    Ok(Json(answer))
}

/// Slow, medium and fast paces toward the target weight.
pub async fn get_goal_duration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<GoalDurationParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;
    let user = find_user(&state, params.user_id).await?;
    let bio = require_biometrics(&user)?;

    let body = BodySnapshot {
        weight_in_kg: params.current_weight_in_kg,
        body_fat_percentage: params.current_body_fat_percentage,
    };
    let prompt = prompt::goal_duration_prompt(
        &bio,
        body,
        params.goal_weight_in_kg,
        params.goal_body_fat_percentage,
    );

    let answer: GoalDurationResponse = advise(&state, TaskKind::GoalDuration, &prompt).await?;
    Ok(Json(answer))
}

/// BMR and TDEE estimates per lifestyle.
pub async fn get_tdee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<TdeeParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;
    let user = find_user(&state, params.user_id).await?;
    let bio = require_biometrics(&user)?;

    let body = BodySnapshot {
        weight_in_kg: params.current_weight_in_kg,
        body_fat_percentage: params.current_body_fat_percentage,
    };
    let goal = GoalContext {
        goal_type: params.goal_type,
        target_weight_in_kg: params.goal_weight_in_kg,
        target_body_fat_percentage: params.goal_body_fat_percentage,
    };
    let prompt = prompt::tdee_prompt(&bio, body, goal);

    let answer: TdeeResponse = advise(&state, TaskKind::Tdee, &prompt).await?;
    Ok(Json(answer))
}

/// Daily intake and macro split for the requested weekly weight change.
pub async fn get_macros(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<MacroParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;
    let user = find_user(&state, params.user_id).await?;
    let bio = require_biometrics(&user)?;

    let body = BodySnapshot {
        weight_in_kg: params.current_weight_in_kg,
        body_fat_percentage: params.current_body_fat_percentage,
    };
    let goal = GoalContext {
        goal_type: params.goal_type,
        target_weight_in_kg: params.goal_weight_in_kg,
        target_body_fat_percentage: params.goal_body_fat_percentage,
    };
    let prompt = prompt::macro_prompt(
        &bio,
        body,
        goal,
        params.current_bmr,
        params.current_tdee,
        params.weight_change,
    );

    let answer: MacroResponse = advise(&state, TaskKind::Macros, &prompt).await?;
    Ok(Json(answer))
}
