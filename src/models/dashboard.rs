// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::meal::Meal;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: UserSummary,
    pub progress_summary: ProgressSummary,
    pub calorie_overview: CalorieOverview,
    pub today_meals: Vec<Meal>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserSummary {
    pub name: String,
    pub greeting: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub weight_in_kg: MetricProgress,
    pub body_fat_percentage: MetricProgress,
}

/// `last` mirrors `current` until week-over-week history is tracked.
#[derive(Debug, Serialize, PartialEq)]
pub struct MetricProgress {
    pub current: f64,
    pub last: f64,
    pub goal: f64,
    pub start: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CalorieOverview {
    pub total: CalorieTotal,
    pub macros: MacroOverview,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CalorieTotal {
    pub consumed: f64,
    pub goal: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MacroOverview {
    pub protein: MacroItem,
    pub carbs: MacroItem,
    pub fats: MacroItem,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MacroItem {
    pub consumed: f64,
    pub goal: f64,
    pub unit: &'static str,
}

impl MacroItem {
    pub fn grams(consumed: i64, goal: i64) -> Self {
        Self {
            consumed: consumed as f64,
            goal: goal as f64,
            unit: "g",
        }
    }
}
