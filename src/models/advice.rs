// src/models/advice.rs

//! Request parameters and typed answers of the four advice endpoints.
//! Answer field names follow the generation schemas, so they are not camelCased.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::goal::GoalType;
use crate::utils::validation::{
    validate_body_fat, validate_current_body_fat, validate_weight, validate_weight_change,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IdealWeightParams {
    pub user_id: Uuid,
    #[validate(custom(function = validate_weight))]
    pub current_weight_in_kg: f64,
    #[validate(custom(function = validate_current_body_fat))]
    pub current_body_fat_percentage: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoalDurationParams {
    pub user_id: Uuid,
    #[validate(custom(function = validate_weight))]
    pub current_weight_in_kg: f64,
    #[validate(custom(function = validate_weight))]
    pub goal_weight_in_kg: f64,
    #[validate(custom(function = validate_current_body_fat))]
    pub current_body_fat_percentage: f64,
    #[validate(custom(function = validate_body_fat))]
    pub goal_body_fat_percentage: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TdeeParams {
    pub user_id: Uuid,
    #[validate(custom(function = validate_weight))]
    pub current_weight_in_kg: f64,
    #[validate(custom(function = validate_weight))]
    pub goal_weight_in_kg: f64,
    #[validate(custom(function = validate_current_body_fat))]
    pub current_body_fat_percentage: f64,
    #[validate(custom(function = validate_body_fat))]
    pub goal_body_fat_percentage: f64,
    pub goal_type: GoalType,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MacroParams {
    pub user_id: Uuid,
    #[validate(custom(function = validate_weight))]
    pub current_weight_in_kg: f64,
    #[validate(custom(function = validate_weight))]
    pub goal_weight_in_kg: f64,
    #[validate(custom(function = validate_current_body_fat))]
    pub current_body_fat_percentage: f64,
    #[validate(custom(function = validate_body_fat))]
    pub goal_body_fat_percentage: f64,
    pub goal_type: GoalType,
    #[validate(range(min = 500, max = 6000, message = "currentBmr must be between 500 and 6000."))]
    pub current_bmr: i32,
    #[validate(range(min = 800, max = 10000, message = "currentTdee must be between 800 and 10000."))]
    pub current_tdee: i32,
    #[validate(custom(function = validate_weight_change))]
    pub weight_change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdealWeightResponse {
    pub ideal_weight_range: IdealWeightRange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdealWeightRange {
    pub lower_bound: WeightBound,
    pub upper_bound: WeightBound,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightBound {
    pub weight_in_kg: f64,
    pub fat_percentage: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalDurationResponse {
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub pace_options: PaceOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaceOptions {
    pub slow: PaceOption,
    pub medium: PaceOption,
    pub fast: PaceOption,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaceOption {
    pub weekly_weight_change_kg: f64,
    pub duration_weeks: i64,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Lifestyle {
    Sedentary,
    Light,
    Moderate,
    #[serde(rename = "Very Active")]
    VeryActive,
    #[serde(rename = "Extra Active")]
    ExtraActive,
}

impl Lifestyle {
    pub const ALL: [&'static str; 5] =
        ["Sedentary", "Light", "Moderate", "Very Active", "Extra Active"];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TdeeResponse {
    pub bmr: i64,
    pub tdee: Vec<TdeeEstimate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TdeeEstimate {
    pub description: String,
    pub tdee: i64,
    pub lifestyle: Lifestyle,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroResponse {
    pub weekly_weight_loss_kg: f64,
    pub daily_calorie_deficit: i64,
    pub daily_calorie_intake: i64,
    pub macronutrient_split: MacronutrientSplit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacronutrientSplit {
    pub protein: MacroAmount,
    pub fat: MacroAmount,
    pub carbohydrates: MacroAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroAmount {
    pub total_grams: i64,
    pub calories: i64,
}
