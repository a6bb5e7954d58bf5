// src/store/mod.rs

//! Persistence seams. Handlers only see these traits; `PgStore` backs them in
//! production and `MemoryStore` in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::{
    error::AppError,
    models::{
        goal::{ActiveGoal, Goal, WeeklyGoal, select_active},
        meal::{DayMeal, Meal, MealPlan, MealPlanMeta},
        user::{ProfileUpdate, User},
    },
};

/// Message returned whenever a second plan is requested for the same weekly goal.
pub const MEAL_PLAN_EXISTS: &str = "A meal plan already exists for this weekly goal.";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Returns `false` if no such user exists.
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<bool, AppError>;

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn create_goal(&self, goal: &Goal) -> Result<(), AppError>;

    /// Appends to the goal's weekly list. Returns `false` if the goal is unknown.
    async fn append_weekly_goal(&self, goal_id: Uuid, weekly: &WeeklyGoal)
    -> Result<bool, AppError>;

    async fn goal_by_id(&self, goal_id: Uuid) -> Result<Option<Goal>, AppError>;

    async fn goals_for_user(&self, user_id: Uuid) -> Result<Vec<Goal>, AppError>;

    /// The goal whose weekly goal covers `now`, if any.
    async fn active_goal(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ActiveGoal>, AppError> {
        let goals = self.goals_for_user(user_id).await?;
        Ok(select_active(&goals, now))
    }

    async fn delete_goal(&self, goal_id: Uuid) -> Result<bool, AppError>;

    /// Removes a single weekly entry, leaving the rest of the goal intact.
    async fn delete_weekly_goal(&self, goal_id: Uuid, weekly_goal_id: Uuid)
    -> Result<bool, AppError>;
}

#[async_trait]
pub trait MealPlanStore: Send + Sync {
    /// Fails with `Precondition(MEAL_PLAN_EXISTS)` if the (user, weekly goal) pair already has a plan.
    async fn insert_meal_plan(&self, plan: &MealPlan) -> Result<(), AppError>;

    async fn meal_plan_exists(&self, user_id: Uuid, weekly_goal_id: Uuid)
    -> Result<bool, AppError>;

    async fn meal_plan(
        &self,
        user_id: Uuid,
        main_goal_id: Uuid,
        weekly_goal_id: Uuid,
    ) -> Result<Option<MealPlan>, AppError>;

    async fn meal_plan_meta(&self, meal_plan_id: Uuid) -> Result<Option<MealPlanMeta>, AppError>;

    async fn day_meal(&self, meal_plan_id: Uuid, day_meal_id: Uuid)
    -> Result<Option<DayMeal>, AppError>;

    /// The user's day entry for an absolute calendar date, across all plans.
    async fn day_meal_on(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DayMeal>, AppError>;

    async fn replace_day_meals(
        &self,
        meal_plan_id: Uuid,
        day_meal_id: Uuid,
        meals: &[Meal],
    ) -> Result<bool, AppError>;

    async fn consume_meal(&self, meal_plan_id: Uuid, meal_id: Uuid) -> Result<bool, AppError>;
}
