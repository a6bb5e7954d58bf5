// src/handlers/goals.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::goal::{
        CreateGoalRequest, CreateWeeklyGoalRequest, DeleteGoalParams, DeleteWeeklyGoalParams,
        Goal, MainGoalParams, UserGoalsParams,
    },
    state::AppState,
    utils::{
        deadline::within,
        extract::{ValidatedJson, ValidatedQuery},
        jwt::{Claims, ensure_owner},
    },
};

/// Loads a goal and checks that the caller owns it.
async fn owned_goal(state: &AppState, claims: &Claims, goal_id: Uuid) -> Result<Goal, AppError> {
    let goal = within(state.config.query_timeout(), state.goals.goal_by_id(goal_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Goal not found".to_string()))?;
    ensure_owner(claims, goal.user_id)?;
    Ok(goal)
}

/// Creates a main goal for the caller.
pub async fn register_goal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<CreateGoalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let goal = payload.into_goal(claims.sub);

    within(state.config.query_timeout(), state.goals.create_goal(&goal))
        .await
        .map_err(|e| {
            tracing::error!("Failed to create goal: {:?}", e);
            e
        })?;

    tracing::info!("User {} registered goal {}", claims.sub, goal.id);
    Ok((StatusCode::CREATED, Json(goal)))
}

/// Appends a weekly goal to one of the caller's main goals.
pub async fn register_weekly_goal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<MainGoalParams>,
    ValidatedJson(payload): ValidatedJson<CreateWeeklyGoalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let goal = owned_goal(&state, &claims, params.main_goal_id).await?;
    let weekly = payload.into_weekly_goal();

    let appended = within(
        state.config.query_timeout(),
        state.goals.append_weekly_goal(goal.id, &weekly),
    )
    .await?;
    if !appended {
        return Err(AppError::NotFound("Goal not found".to_string()));
    }

    tracing::info!("Goal {} gained weekly goal {}", goal.id, weekly.id);
    Ok((StatusCode::CREATED, Json(weekly)))
}

/// Lists every goal of a user, weekly goals included.
pub async fn get_user_goals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<UserGoalsParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;

    let goals = within(
        state.config.query_timeout(),
        state.goals.goals_for_user(params.user_id),
    )
    .await?;

    Ok(Json(json!({ "userGoals": goals })))
}

/// Deletes a main goal together with its weekly goals.
/// Meal plans generated for it are left in place.
pub async fn delete_main_goal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<DeleteGoalParams>,
) -> Result<impl IntoResponse, AppError> {
    let goal = owned_goal(&state, &claims, params.goal_id).await?;

    let deleted = within(state.config.query_timeout(), state.goals.delete_goal(goal.id)).await?;
    if !deleted {
        return Err(AppError::NotFound("Goal not found".to_string()));
    }

    tracing::info!("Deleted goal {}", goal.id);
    Ok(Json(json!({ "success": true })))
}

/// Removes a single weekly goal from a main goal.
pub async fn delete_weekly_goal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<DeleteWeeklyGoalParams>,
) -> Result<impl IntoResponse, AppError> {
    let goal = owned_goal(&state, &claims, params.goal_id).await?;

    let deleted = within(
        state.config.query_timeout(),
        state.goals.delete_weekly_goal(goal.id, params.weekly_goal_id),
    )
    .await?;
    if !deleted {
        return Err(AppError::NotFound("Weekly goal not found".to_string()));
    }

    tracing::info!("Deleted weekly goal {} of goal {}", params.weekly_goal_id, goal.id);
    Ok(Json(json!({ "success": true })))
}
