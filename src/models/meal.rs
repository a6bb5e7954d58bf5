// src/models/meal.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One generated week of meals, bound to a (user, main goal, weekly goal) triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub main_goal_id: Uuid,
    pub weekly_goal_id: Uuid,
    pub day_meals: Vec<DayMeal>,
}

/// The identifying part of a meal plan, without the day payload.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanMeta {
    pub id: Uuid,
    pub user_id: Uuid,
    pub main_goal_id: Uuid,
    pub weekly_goal_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayMeal {
    pub id: Uuid,
    pub date: NaiveDate,
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Time of day as "h:mm am/pm".
    pub time: String,
    pub calories: i32,
    pub protein: i32,
    pub fat: i32,
    pub carbs: i32,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, rename = "recipe_steps")]
    pub recipe_steps: Vec<String>,
    #[serde(default)]
    pub is_consumed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

impl MealPlan {
    pub fn meta(&self) -> MealPlanMeta {
        MealPlanMeta {
            id: self.id,
            user_id: self.user_id,
            main_goal_id: self.main_goal_id,
            weekly_goal_id: self.weekly_goal_id,
        }
    }

    pub fn day_meal(&self, day_meal_id: Uuid) -> Option<&DayMeal> {
        self.day_meals.iter().find(|d| d.id == day_meal_id)
    }

    pub fn day_meal_on(&self, date: NaiveDate) -> Option<&DayMeal> {
        self.day_meals.iter().find(|d| d.date == date)
    }

    /// Swaps the meal list of one day. Returns `false` if the day is unknown.
    pub fn replace_day_meals(&mut self, day_meal_id: Uuid, meals: Vec<Meal>) -> bool {
        match self.day_meals.iter_mut().find(|d| d.id == day_meal_id) {
            Some(day) => {
                day.meals = meals;
                true
            }
            None => false,
        }
    }

    /// Marks a meal as eaten. Returns `false` if no day holds that meal.
    pub fn consume_meal(&mut self, meal_id: Uuid) -> bool {
        self.day_meals
            .iter_mut()
            .flat_map(|d| d.meals.iter_mut())
            .find(|m| m.id == meal_id)
            .map(|meal| meal.is_consumed = true)
            .is_some()
    }
}

/// Query for `GET /getMealPlan` and `POST /createMealPlan`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanParams {
    pub user_id: Uuid,
    pub main_goal_id: Uuid,
    pub weekly_goal_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 1000, message = "userPrompt must be at most 1000 characters."))]
    pub user_prompt: Option<String>,
}

/// Query for `POST /customizeMealPlan`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomizeParams {
    pub meal_plan_id: Uuid,
    pub day_meal_id: Uuid,
    #[validate(length(min = 1, max = 1000, message = "userPrompt must be 1 to 1000 characters."))]
    pub user_prompt: String,
}

/// Query for `POST /consumeMeal`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeMealParams {
    pub meal_plan_id: Uuid,
    pub meal_id: Uuid,
}
