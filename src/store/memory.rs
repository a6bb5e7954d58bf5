// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GoalStore, MEAL_PLAN_EXISTS, MealPlanStore, UserStore};
use crate::{
    error::AppError,
    models::{
        goal::{Goal, WeeklyGoal},
        meal::{DayMeal, Meal, MealPlan, MealPlanMeta},
        user::{ProfileUpdate, User},
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    goals: Vec<Goal>,
    meal_plans: Vec<MealPlan>,
}

/// Process-local store. A single write lock serializes every mutation, which
/// also closes the duplicate-plan race.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.apply(update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.refresh_token = token.map(str::to_string);
        }
        Ok(())
    }
}

#[async_trait]
impl GoalStore for MemoryStore {
    async fn create_goal(&self, goal: &Goal) -> Result<(), AppError> {
        self.tables.write().await.goals.push(goal.clone());
        Ok(())
    }

    async fn append_weekly_goal(
        &self,
        goal_id: Uuid,
        weekly: &WeeklyGoal,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.goals.iter_mut().find(|g| g.id == goal_id) {
            Some(goal) => {
                goal.weekly_goals.push(weekly.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn goal_by_id(&self, goal_id: Uuid) -> Result<Option<Goal>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.goals.iter().find(|g| g.id == goal_id).cloned())
    }

    async fn goals_for_user(&self, user_id: Uuid) -> Result<Vec<Goal>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_goal(&self, goal_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.goals.len();
        tables.goals.retain(|g| g.id != goal_id);
        Ok(tables.goals.len() != before)
    }

    async fn delete_weekly_goal(
        &self,
        goal_id: Uuid,
        weekly_goal_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let Some(goal) = tables.goals.iter_mut().find(|g| g.id == goal_id) else {
            return Ok(false);
        };
        let before = goal.weekly_goals.len();
        goal.weekly_goals.retain(|w| w.id != weekly_goal_id);
        Ok(goal.weekly_goals.len() != before)
    }
}

#[async_trait]
impl MealPlanStore for MemoryStore {
    async fn insert_meal_plan(&self, plan: &MealPlan) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .meal_plans
            .iter()
            .any(|p| p.user_id == plan.user_id && p.weekly_goal_id == plan.weekly_goal_id);
        if taken {
            return Err(AppError::Precondition(MEAL_PLAN_EXISTS.to_string()));
        }
        tables.meal_plans.push(plan.clone());
        Ok(())
    }

    async fn meal_plan_exists(&self, user_id: Uuid, weekly_goal_id: Uuid) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .meal_plans
            .iter()
            .any(|p| p.user_id == user_id && p.weekly_goal_id == weekly_goal_id))
    }

    async fn meal_plan(
        &self,
        user_id: Uuid,
        main_goal_id: Uuid,
        weekly_goal_id: Uuid,
    ) -> Result<Option<MealPlan>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .meal_plans
            .iter()
            .find(|p| {
                p.user_id == user_id
                    && p.main_goal_id == main_goal_id
                    && p.weekly_goal_id == weekly_goal_id
            })
            .cloned())
    }

    async fn meal_plan_meta(&self, meal_plan_id: Uuid) -> Result<Option<MealPlanMeta>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .meal_plans
            .iter()
            .find(|p| p.id == meal_plan_id)
            .map(MealPlan::meta))
    }

    async fn day_meal(
        &self,
        meal_plan_id: Uuid,
        day_meal_id: Uuid,
    ) -> Result<Option<DayMeal>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .meal_plans
            .iter()
            .find(|p| p.id == meal_plan_id)
            .and_then(|p| p.day_meal(day_meal_id))
            .cloned())
    }

    async fn day_meal_on(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DayMeal>, AppError> {
        let tables = self.tables.read().await;
        // Latest plan wins when weeks overlap.
        Ok(tables
            .meal_plans
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .find_map(|p| p.day_meal_on(date))
            .cloned())
    }

    async fn replace_day_meals(
        &self,
        meal_plan_id: Uuid,
        day_meal_id: Uuid,
        meals: &[Meal],
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .meal_plans
            .iter_mut()
            .find(|p| p.id == meal_plan_id)
            .is_some_and(|p| p.replace_day_meals(day_meal_id, meals.to_vec())))
    }

    async fn consume_meal(&self, meal_plan_id: Uuid, meal_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .meal_plans
            .iter_mut()
            .find(|p| p.id == meal_plan_id)
            .is_some_and(|p| p.consume_meal(meal_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::goal::tests::{goal_with, weekly};
    use crate::models::meal::tests::meal;
    use chrono::{Duration, TimeZone, Utc};

    fn plan_for(user_id: Uuid, weekly_goal_id: Uuid, date: NaiveDate) -> MealPlan {
        MealPlan {
            id: Uuid::new_v4(),
            user_id,
            main_goal_id: Uuid::new_v4(),
            weekly_goal_id,
            day_meals: vec![DayMeal {
                id: Uuid::new_v4(),
                date,
                meals: vec![meal(500, false)],
            }],
        }
    }

    #[tokio::test]
    async fn second_plan_for_the_same_week_is_rejected() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let week = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();

        store.insert_meal_plan(&plan_for(user, week, date)).await.unwrap();
        let err = store
            .insert_meal_plan(&plan_for(user, week, date))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));

        // A fresh (user, week) pair is fine.
        store
            .insert_meal_plan(&plan_for(user, Uuid::new_v4(), date))
            .await
            .unwrap();
        assert!(store.meal_plan_exists(user, week).await.unwrap());
    }

    #[tokio::test]
    async fn active_goal_uses_the_current_week() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let goal = goal_with(vec![weekly(start)]);
        store.create_goal(&goal).await.unwrap();

        let found = store
            .active_goal(goal.user_id, start + Duration::days(2))
            .await
            .unwrap();
        assert_eq!(found.map(|a| a.goal.id), Some(goal.id));

        let none = store
            .active_goal(goal.user_id, start + Duration::days(8))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn deleting_a_weekly_goal_keeps_its_siblings() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let first = weekly(start);
        let second = weekly(start + Duration::days(7));
        let goal = goal_with(vec![first.clone(), second.clone()]);
        store.create_goal(&goal).await.unwrap();

        assert!(store.delete_weekly_goal(goal.id, first.id).await.unwrap());
        let stored = store.goal_by_id(goal.id).await.unwrap().unwrap();
        assert_eq!(stored.weekly_goals, vec![second]);
        assert!(!store.delete_weekly_goal(goal.id, first.id).await.unwrap());
    }

    #[tokio::test]
    async fn day_meal_on_matches_the_absolute_date() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        store
            .insert_meal_plan(&plan_for(user, Uuid::new_v4(), date))
            .await
            .unwrap();

        assert!(store.day_meal_on(user, date).await.unwrap().is_some());
        assert!(store.day_meal_on(user, date.succ_opt().unwrap()).await.unwrap().is_none());
        assert!(store.day_meal_on(Uuid::new_v4(), date).await.unwrap().is_none());
    }
}
