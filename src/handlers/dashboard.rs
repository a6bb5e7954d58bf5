// src/handlers/dashboard.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;

use super::find_user;
use crate::{
    error::AppError,
    models::{
        dashboard::{
            CalorieOverview, CalorieTotal, DashboardParams, DashboardResponse, MacroItem,
            MacroOverview, MetricProgress, ProgressSummary, UserSummary,
        },
        goal::ActiveGoal,
        meal::{DayMeal, Meal},
        user::User,
    },
    state::AppState,
    utils::{
        deadline::within,
        extract::ValidatedQuery,
        jwt::{Claims, ensure_owner},
        time::today,
    },
};

const GREETING: &str = "Practice makes perfect";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Totals {
    calories: i64,
    protein: i64,
    fat: i64,
    carbs: i64,
}

impl Totals {
    fn add(&mut self, meal: &Meal) {
        self.calories += i64::from(meal.calories);
        self.protein += i64::from(meal.protein);
        self.fat += i64::from(meal.fat);
        self.carbs += i64::from(meal.carbs);
    }
}

/// Builds the dashboard view. "goal" totals sum every meal of the day,
/// "consumed" totals only the meals marked as eaten.
pub fn summarize(user: &User, active: &ActiveGoal, day: DayMeal) -> DashboardResponse {
    let mut planned = Totals::default();
    let mut consumed = Totals::default();
    for meal in &day.meals {
        planned.add(meal);
        if meal.is_consumed {
            consumed.add(meal);
        }
    }

    let goal = &active.goal;
    let weekly = &active.weekly_goal;

    DashboardResponse {
        user: UserSummary {
            name: user.name.clone(),
            greeting: GREETING.to_string(),
        },
        progress_summary: ProgressSummary {
            weight_in_kg: MetricProgress {
                current: weekly.current_weight_in_kg,
                last: weekly.current_weight_in_kg,
                goal: goal.target_weight_in_kg,
                start: goal.start_weight_in_kg,
            },
            body_fat_percentage: MetricProgress {
                current: weekly.current_fat_percentage,
                last: weekly.current_fat_percentage,
                goal: goal.target_fat_percentage,
                start: goal.start_fat_percentage,
            },
        },
        calorie_overview: CalorieOverview {
            total: CalorieTotal {
                consumed: consumed.calories as f64,
                goal: planned.calories as f64,
            },
            macros: MacroOverview {
                protein: MacroItem::grams(consumed.protein, planned.protein),
                carbs: MacroItem::grams(consumed.carbs, planned.carbs),
                fats: MacroItem::grams(consumed.fat, planned.fat),
            },
        },
        today_meals: day.meals,
    }
}

/// Today's progress and meals for the active weekly goal.
///
/// Having no active goal or no meals for today is an expected state and is
/// answered with `no_plan_yet`.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedQuery(params): ValidatedQuery<DashboardParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&claims, params.user_id)?;
    let limit = state.config.query_timeout();

    let user = find_user(&state, params.user_id).await?;

    let active = within(limit, state.goals.active_goal(user.id, Utc::now()))
        .await?
        .ok_or_else(|| AppError::NoPlanYet("No active weekly goal yet.".to_string()))?;

    let date = today(state.config.utc_offset_minutes);
    let day = within(limit, state.meal_plans.day_meal_on(user.id, date))
        .await?
        .filter(|day| !day.meals.is_empty())
        .ok_or_else(|| AppError::NoPlanYet("No meal plan for today yet.".to_string()))?;

    Ok(Json(summarize(&user, &active, day)))
}
