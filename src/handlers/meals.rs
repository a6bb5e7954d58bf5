// src/handlers/meals.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use uuid::Uuid;

use super::{find_user, generate, require_biometrics};
use crate::{
    error::AppError,
    generation::{
        TaskKind,
        parser::{parse_day_meals, parse_meal_plan},
        prompt::{self, BodySnapshot, DailyTargets, GoalContext},
    },
    models::{
        goal::{Goal, WeeklyGoal},
        meal::{ConsumeMealParams, CustomizeParams, MealPlanMeta, MealPlanParams},
    },
    state::AppState,
    store::MEAL_PLAN_EXISTS,
    utils::{
        deadline::within,
        extract::ValidatedQuery,
        html::{sanitize_optional, sanitize_text},
        jwt::{Claims, ensure_owner},
        time::local_date,
    },
};

fn body_snapshot(weekly: &WeeklyGoal) -> BodySnapshot {
    BodySnapshot {
        weight_in_kg: weekly.current_weight_in_kg,
        body_fat_percentage: weekly.current_fat_percentage,
    }
}

fn goal_context(goal: &Goal) -> GoalContext {
    GoalContext {
        goal_type: goal.goal_type,
        target_weight_in_kg: goal.target_weight_in_kg,
        target_body_fat_percentage: goal.target_fat_percentage,
    }
}

fn daily_targets(weekly: &WeeklyGoal) -> DailyTargets {
    DailyTargets {
        calories: weekly.target_daily_calories.round() as i64,
        protein_grams: weekly.target_daily_macros_protein.round() as i64,
        fat_grams: weekly.target_daily_macros_fats.round() as i64,
        carb_grams: weekly.target_daily_macros_carbs.round() as i64,
    }
}

/// Loads plan metadata and checks that the caller owns the plan.
async fn owned_plan(
    state: &AppState,
    claims: &Claims,
    meal_plan_id: Uuid,
) -> Result<MealPlanMeta, AppError> {
    let meta = within(
        state.config.query_timeout(),
        state.meal_plans.meal_plan_meta(meal_plan_id),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Meal plan not found".to_string()))?;
    ensure_owner(claims, meta.user_id)?;
    Ok(meta)
}

/// Get the meal plan generated for a weekly goal.
pub async fn get_meal_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<MealPlanParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;

    let plan = within(
        state.config.query_timeout(),
        state
            .meal_plans
            .meal_plan(params.user_id, params.main_goal_id, params.weekly_goal_id),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Meal plan not found".to_string()))?;

    Ok(Json(plan))
}

/// Generates and stores the meal plan of one weekly goal.
///
/// A weekly goal gets at most one plan. The existence check runs before the
/// model is called; the store rejects a plan that slipped past it.
pub async fn create_meal_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<MealPlanParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;
    let limit = state.config.query_timeout();

    let exists = within(
        limit,
        state
            .meal_plans
            .meal_plan_exists(params.user_id, params.weekly_goal_id),
    )
    .await?;
    if exists {
        return Err(AppError::Precondition(MEAL_PLAN_EXISTS.to_string()));
    }

    let user = find_user(&state, params.user_id).await?;
    let bio = require_biometrics(&user)?;

    let goal = within(limit, state.goals.goal_by_id(params.main_goal_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Goal not found".to_string()))?;
    ensure_owner(&claims, goal.user_id)?;
    let weekly = goal.weekly_goal(params.weekly_goal_id).ok_or_else(|| {
        AppError::Precondition(
            "This goal has no such weekly goal. Register the weekly goal first.".to_string(),
        )
    })?;

    let user_prompt = sanitize_optional(params.user_prompt.as_deref()).unwrap_or_default();
    let prompt = prompt::weekly_meal_prompt(
        &bio,
        body_snapshot(weekly),
        goal_context(&goal),
        daily_targets(weekly),
        &user_prompt,
    );

    let raw = generate(&state, TaskKind::WeeklyMealPlan, &prompt).await?;
    let week_start = local_date(weekly.start_date, state.config.utc_offset_minutes);
    let plan = parse_meal_plan(user.id, goal.id, weekly.id, week_start, &raw)?;

    within(limit, state.meal_plans.insert_meal_plan(&plan)).await?;

    tracing::info!(
        "Created meal plan {} with {} days for weekly goal {}",
        plan.id,
        plan.day_meals.len(),
        weekly.id
    );
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Regenerates the meals of a single day from a free-text request.
pub async fn customize_meal_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<CustomizeParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_prompt = sanitize_text(&params.user_prompt);
    if user_prompt.is_empty() {
        return Err(AppError::BadRequest(
            "userPrompt must contain some text.".to_string(),
        ));
    }

    let meta = owned_plan(&state, &claims, params.meal_plan_id).await?;
    let limit = state.config.query_timeout();

    let user = find_user(&state, meta.user_id).await?;
    let bio = require_biometrics(&user)?;

    let goal = within(limit, state.goals.goal_by_id(meta.main_goal_id))
        .await?
        .ok_or_else(|| {
            AppError::Precondition("The goal behind this meal plan no longer exists.".to_string())
        })?;
    let weekly = goal.weekly_goal(meta.weekly_goal_id).ok_or_else(|| {
        AppError::Precondition(
            "The weekly goal behind this meal plan no longer exists.".to_string(),
        )
    })?;

    let day = within(limit, state.meal_plans.day_meal(meta.id, params.day_meal_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Day meal not found".to_string()))?;

    let meals_json = serde_json::to_string(&day.meals).map_err(|e| {
        tracing::error!("Failed to serialize day meals: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;
    let prompt = prompt::day_meal_edit_prompt(
        &bio,
        body_snapshot(weekly),
        goal_context(&goal),
        daily_targets(weekly),
        &meals_json,
        &user_prompt,
    );

    let raw = generate(&state, TaskKind::DayMealEdit, &prompt).await?;
    let meals = parse_day_meals(&raw)?;

    let replaced = within(
        limit,
        state.meal_plans.replace_day_meals(meta.id, day.id, &meals),
    )
    .await?;
    if !replaced {
        return Err(AppError::NotFound("Day meal not found".to_string()));
    }

    tracing::info!("Regenerated day {} of meal plan {}", day.id, meta.id);
    Ok(Json(json!({
        "mealPlanId": meta.id,
        "mainGoalId": meta.main_goal_id,
        "weeklyGoalId": meta.weekly_goal_id,
    })))
}

/// Marks one meal of a plan as eaten.
pub async fn consume_meal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<ConsumeMealParams>,
) -> Result<impl IntoResponse, AppError> {
    let meta = owned_plan(&state, &claims, params.meal_plan_id).await?;

    let consumed = within(
        state.config.query_timeout(),
        state.meal_plans.consume_meal(meta.id, params.meal_id),
    )
    .await?;
    if !consumed {
        return Err(AppError::NotFound("Meal not found".to_string()));
    }

    Ok(Json(json!({
        "mealPlanId": meta.id,
        "mealId": params.meal_id,
        "isConsumed": true,
    })))
}
