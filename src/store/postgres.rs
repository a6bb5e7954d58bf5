// src/store/postgres.rs

//! PostgreSQL store. Goals embed their weekly goals and meal plans embed the
//! whole day/meal/ingredient tree, both as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use super::{GoalStore, MEAL_PLAN_EXISTS, MealPlanStore, UserStore};
use crate::{
    error::AppError,
    models::{
        goal::{Goal, GoalType, WeeklyGoal},
        meal::{DayMeal, Meal, MealPlan, MealPlanMeta},
        user::{ProfileUpdate, User},
    },
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    let text = err.to_string();
    text.contains("23505") || text.contains("unique constraint")
}

fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("Failed to {}: {:?}", action, e);
        AppError::InternalServerError(e.to_string())
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password: String,
    height_in_cm: Option<f64>,
    age: Option<i32>,
    sex: Option<String>,
    country: Option<String>,
    diet_preferences: Json<Vec<String>>,
    refresh_token: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            height_in_cm: row.height_in_cm,
            age: row.age,
            sex: row.sex,
            country: row.country,
            diet_preferences: row.diet_preferences.0,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, password, height_in_cm, age, sex, country, \
                            diet_preferences, refresh_token, created_at";

#[derive(sqlx::FromRow)]
struct GoalRow {
    id: Uuid,
    user_id: Uuid,
    start_weight_in_kg: f64,
    start_fat_percentage: f64,
    target_weight_in_kg: f64,
    target_fat_percentage: f64,
    goal_start_date: DateTime<Utc>,
    goal_end_date: DateTime<Utc>,
    goal_type: String,
    weekly_weight_change: f64,
    weekly_goals: Json<Vec<WeeklyGoal>>,
}

impl TryFrom<GoalRow> for Goal {
    type Error = AppError;

    fn try_from(row: GoalRow) -> Result<Self, Self::Error> {
        let goal_type = row.goal_type.parse::<GoalType>().map_err(|e: String| {
            tracing::error!("Stored goal {} has a bad goal_type: {}", row.id, e);
            AppError::InternalServerError(e)
        })?;

        Ok(Goal {
            id: row.id,
            user_id: row.user_id,
            start_weight_in_kg: row.start_weight_in_kg,
            start_fat_percentage: row.start_fat_percentage,
            target_weight_in_kg: row.target_weight_in_kg,
            target_fat_percentage: row.target_fat_percentage,
            goal_start_date: row.goal_start_date,
            goal_end_date: row.goal_end_date,
            goal_type,
            weekly_weight_change: row.weekly_weight_change,
            weekly_goals: row.weekly_goals.0,
        })
    }
}

const GOAL_COLUMNS: &str = "id, user_id, start_weight_in_kg, start_fat_percentage, \
                            target_weight_in_kg, target_fat_percentage, goal_start_date, \
                            goal_end_date, goal_type, weekly_weight_change, weekly_goals";

#[derive(sqlx::FromRow)]
struct MealPlanRow {
    id: Uuid,
    user_id: Uuid,
    main_goal_id: Uuid,
    weekly_goal_id: Uuid,
    day_meals: Json<Vec<DayMeal>>,
}

impl From<MealPlanRow> for MealPlan {
    fn from(row: MealPlanRow) -> Self {
        MealPlan {
            id: row.id,
            user_id: row.user_id,
            main_goal_id: row.main_goal_id,
            weekly_goal_id: row.weekly_goal_id,
            day_meals: row.day_meals.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MealPlanMetaRow {
    id: Uuid,
    user_id: Uuid,
    main_goal_id: Uuid,
    weekly_goal_id: Uuid,
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, diet_preferences, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(Json(&user.diet_preferences))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' already exists", user.email))
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })?;
        Ok(())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch user by email"))?;
        Ok(row.map(User::from))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch user by id"))?;
        Ok(row.map(User::from))
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<bool, AppError> {
        // COALESCE keeps columns the update leaves out.
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                sex = COALESCE($4, sex),
                height_in_cm = COALESCE($5, height_in_cm),
                country = COALESCE($6, country),
                diet_preferences = COALESCE($7, diet_preferences)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.age)
        .bind(update.sex.as_deref())
        .bind(update.height_in_cm)
        .bind(update.country.as_deref())
        .bind(update.diet_preferences.as_ref().map(Json))
        .execute(&self.pool)
        .await
        .map_err(db_error("update profile"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(db_error("store refresh token"))?;
        Ok(())
    }
}

#[async_trait]
impl GoalStore for PgStore {
    async fn create_goal(&self, goal: &Goal) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO goals (
                id, user_id, start_weight_in_kg, start_fat_percentage,
                target_weight_in_kg, target_fat_percentage, goal_start_date,
                goal_end_date, goal_type, weekly_weight_change, weekly_goals
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(goal.start_weight_in_kg)
        .bind(goal.start_fat_percentage)
        .bind(goal.target_weight_in_kg)
        .bind(goal.target_fat_percentage)
        .bind(goal.goal_start_date)
        .bind(goal.goal_end_date)
        .bind(goal.goal_type.as_str())
        .bind(goal.weekly_weight_change)
        .bind(Json(&goal.weekly_goals))
        .execute(&self.pool)
        .await
        .map_err(db_error("create goal"))?;
        Ok(())
    }

    async fn append_weekly_goal(
        &self,
        goal_id: Uuid,
        weekly: &WeeklyGoal,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE goals SET weekly_goals = weekly_goals || jsonb_build_array($2::jsonb) WHERE id = $1",
        )
        .bind(goal_id)
        .bind(Json(weekly))
        .execute(&self.pool)
        .await
        .map_err(db_error("append weekly goal"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn goal_by_id(&self, goal_id: Uuid) -> Result<Option<Goal>, AppError> {
        let row = sqlx::query_as::<_, GoalRow>(&format!(
            "SELECT {} FROM goals WHERE id = $1",
            GOAL_COLUMNS
        ))
        .bind(goal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch goal"))?;
        row.map(Goal::try_from).transpose()
    }

    async fn goals_for_user(&self, user_id: Uuid) -> Result<Vec<Goal>, AppError> {
        let rows = sqlx::query_as::<_, GoalRow>(&format!(
            "SELECT {} FROM goals WHERE user_id = $1 ORDER BY created_at",
            GOAL_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list goals"))?;
        rows.into_iter().map(Goal::try_from).collect()
    }

    async fn delete_goal(&self, goal_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(goal_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete goal"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_weekly_goal(
        &self,
        goal_id: Uuid,
        weekly_goal_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE goals SET weekly_goals = COALESCE(
                (SELECT jsonb_agg(w.elem ORDER BY w.idx)
                 FROM jsonb_array_elements(weekly_goals) WITH ORDINALITY AS w(elem, idx)
                 WHERE w.elem->>'id' <> $2),
                '[]'::jsonb)
            WHERE id = $1
              AND EXISTS (
                SELECT 1 FROM jsonb_array_elements(weekly_goals) AS e(elem)
                WHERE e.elem->>'id' = $2)
            "#,
        )
        .bind(goal_id)
        .bind(weekly_goal_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error("delete weekly goal"))?;
        Ok(result.rows_affected() > 0)
    }
}

impl PgStore {
    /// Loads a plan under a row lock, lets `change` edit it, and writes the
    /// days back. Returns `false` if the plan or the edited entry is missing.
    async fn update_plan<F>(&self, meal_plan_id: Uuid, change: F) -> Result<bool, AppError>
    where
        F: FnOnce(&mut MealPlan) -> bool + Send,
    {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT id, user_id, main_goal_id, weekly_goal_id, day_meals
            FROM meal_plans
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(meal_plan_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("lock meal plan"))?;

        let Some(row) = row else {
            return Ok(false);
        };
        let mut plan = MealPlan::from(row);
        if !change(&mut plan) {
            return Ok(false);
        }

        sqlx::query("UPDATE meal_plans SET day_meals = $2 WHERE id = $1")
            .bind(meal_plan_id)
            .bind(Json(&plan.day_meals))
            .execute(&mut *tx)
            .await
            .map_err(db_error("update meal plan"))?;

        tx.commit().await.map_err(db_error("commit meal plan"))?;
        Ok(true)
    }
}

#[async_trait]
impl MealPlanStore for PgStore {
    async fn insert_meal_plan(&self, plan: &MealPlan) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO meal_plans (id, user_id, main_goal_id, weekly_goal_id, day_meals)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(plan.id)
        .bind(plan.user_id)
        .bind(plan.main_goal_id)
        .bind(plan.weekly_goal_id)
        .bind(Json(&plan.day_meals))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // idx_meal_plans_user_week
            if is_unique_violation(&e) {
                AppError::Precondition(MEAL_PLAN_EXISTS.to_string())
            } else {
                tracing::error!("Failed to insert meal plan: {:?}", e);
                AppError::from(e)
            }
        })?;
        Ok(())
    }

    async fn meal_plan_exists(&self, user_id: Uuid, weekly_goal_id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM meal_plans WHERE user_id = $1 AND weekly_goal_id = $2)",
        )
        .bind(user_id)
        .bind(weekly_goal_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("check meal plan"))?;
        Ok(exists)
    }

    async fn meal_plan(
        &self,
        user_id: Uuid,
        main_goal_id: Uuid,
        weekly_goal_id: Uuid,
    ) -> Result<Option<MealPlan>, AppError> {
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT id, user_id, main_goal_id, weekly_goal_id, day_meals
            FROM meal_plans
            WHERE user_id = $1 AND main_goal_id = $2 AND weekly_goal_id = $3
            "#,
        )
        .bind(user_id)
        .bind(main_goal_id)
        .bind(weekly_goal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch meal plan"))?;
        Ok(row.map(MealPlan::from))
    }

    async fn meal_plan_meta(&self, meal_plan_id: Uuid) -> Result<Option<MealPlanMeta>, AppError> {
        let row = sqlx::query_as::<_, MealPlanMetaRow>(
            "SELECT id, user_id, main_goal_id, weekly_goal_id FROM meal_plans WHERE id = $1",
        )
        .bind(meal_plan_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch meal plan metadata"))?;

        Ok(row.map(|r| MealPlanMeta {
            id: r.id,
            user_id: r.user_id,
            main_goal_id: r.main_goal_id,
            weekly_goal_id: r.weekly_goal_id,
        }))
    }

    async fn day_meal(
        &self,
        meal_plan_id: Uuid,
        day_meal_id: Uuid,
    ) -> Result<Option<DayMeal>, AppError> {
        let row: Option<(Json<DayMeal>,)> = sqlx::query_as(
            r#"
            SELECT d.elem
            FROM meal_plans p, jsonb_array_elements(p.day_meals) AS d(elem)
            WHERE p.id = $1 AND d.elem->>'id' = $2
            "#,
        )
        .bind(meal_plan_id)
        .bind(day_meal_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch day meal"))?;
        Ok(row.map(|(day,)| day.0))
    }

    async fn day_meal_on(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DayMeal>, AppError> {
        let row: Option<(Json<DayMeal>,)> = sqlx::query_as(
            r#"
            SELECT d.elem
            FROM meal_plans p, jsonb_array_elements(p.day_meals) AS d(elem)
            WHERE p.user_id = $1 AND d.elem->>'date' = $2
            ORDER BY p.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch today's meals"))?;
        Ok(row.map(|(day,)| day.0))
    }

    async fn replace_day_meals(
        &self,
        meal_plan_id: Uuid,
        day_meal_id: Uuid,
        meals: &[Meal],
    ) -> Result<bool, AppError> {
        let meals = meals.to_vec();
        self.update_plan(meal_plan_id, move |plan| {
            plan.replace_day_meals(day_meal_id, meals)
        })
        .await
    }

    async fn consume_meal(&self, meal_plan_id: Uuid, meal_id: Uuid) -> Result<bool, AppError> {
        self.update_plan(meal_plan_id, move |plan| plan.consume_meal(meal_id))
            .await
    }
}
