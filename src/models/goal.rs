// src/models/goal.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{
    validate_body_fat, validate_current_body_fat, validate_weight, validate_weight_change,
};

/// What the main goal is trying to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalType {
    #[serde(rename = "Fat loss")]
    FatLoss,
    #[serde(rename = "Muscle gain")]
    MuscleGain,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::FatLoss => "Fat loss",
            GoalType::MuscleGain => "Muscle gain",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fat loss" => Ok(GoalType::FatLoss),
            "Muscle gain" => Ok(GoalType::MuscleGain),
            other => Err(format!("unknown goal type '{}'", other)),
        }
    }
}

/// A user's overarching weight/body-fat objective.
/// Weekly goals are embedded and kept in creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,

    pub start_weight_in_kg: f64,
    pub start_fat_percentage: f64,

    pub target_weight_in_kg: f64,
    pub target_fat_percentage: f64,

    pub goal_start_date: DateTime<Utc>,
    pub goal_end_date: DateTime<Utc>,

    pub goal_type: GoalType,
    pub weekly_weight_change: f64,

    #[serde(default)]
    pub weekly_goals: Vec<WeeklyGoal>,
}

/// A 7-day checkpoint with its own calorie and macro targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoal {
    pub id: Uuid,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    pub current_weight_in_kg: f64,
    pub current_fat_percentage: f64,

    pub daily_maintenance_calories: f64,
    pub target_daily_calories: f64,

    pub target_daily_macros_protein: f64,
    pub target_daily_macros_carbs: f64,
    pub target_daily_macros_fats: f64,

    #[serde(default)]
    pub workout_routine: String,
}

impl WeeklyGoal {
    /// Active means `now` falls in the half-open interval `[start_date, end_date)`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now < self.end_date
    }
}

impl Goal {
    pub fn weekly_goal(&self, weekly_goal_id: Uuid) -> Option<&WeeklyGoal> {
        self.weekly_goals.iter().find(|w| w.id == weekly_goal_id)
    }

    pub fn active_weekly_goal(&self, now: DateTime<Utc>) -> Option<&WeeklyGoal> {
        self.weekly_goals.iter().find(|w| w.is_active_at(now))
    }
}

/// A main goal paired with the weekly goal that is running right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGoal {
    pub goal: Goal,
    pub weekly_goal: WeeklyGoal,
}

/// Picks the first goal that has a weekly goal covering `now`.
/// Returns `None` rather than an arbitrary goal when nothing qualifies.
pub fn select_active(goals: &[Goal], now: DateTime<Utc>) -> Option<ActiveGoal> {
    goals.iter().find_map(|goal| {
        goal.active_weekly_goal(now).map(|weekly| ActiveGoal {
            goal: goal.clone(),
            weekly_goal: weekly.clone(),
        })
    })
}

/// DTO for registering a main goal.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_goal_dates))]
pub struct CreateGoalRequest {
    #[validate(custom(function = validate_weight))]
    pub start_weight_in_kg: f64,
    #[validate(custom(function = validate_current_body_fat))]
    pub start_fat_percentage: f64,
    #[validate(custom(function = validate_weight))]
    pub target_weight_in_kg: f64,
    #[validate(custom(function = validate_body_fat))]
    pub target_fat_percentage: f64,
    pub goal_start_date: DateTime<Utc>,
    pub goal_end_date: DateTime<Utc>,
    pub goal_type: GoalType,
    #[validate(custom(function = validate_weight_change))]
    pub weekly_weight_change: f64,
}

fn validate_goal_dates(req: &CreateGoalRequest) -> Result<(), validator::ValidationError> {
    if req.goal_end_date <= req.goal_start_date {
        return Err(validator::ValidationError::new("goal_end_before_start"));
    }
    Ok(())
}

impl CreateGoalRequest {
    pub fn into_goal(self, user_id: Uuid) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id,
            start_weight_in_kg: self.start_weight_in_kg,
            start_fat_percentage: self.start_fat_percentage,
            target_weight_in_kg: self.target_weight_in_kg,
            target_fat_percentage: self.target_fat_percentage,
            goal_start_date: self.goal_start_date,
            goal_end_date: self.goal_end_date,
            goal_type: self.goal_type,
            weekly_weight_change: self.weekly_weight_change,
            weekly_goals: Vec::new(),
        }
    }
}

/// DTO for appending a weekly goal to a main goal.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_weekly_dates))]
pub struct CreateWeeklyGoalRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(custom(function = validate_weight))]
    pub current_weight_in_kg: f64,
    #[validate(custom(function = validate_current_body_fat))]
    pub current_fat_percentage: f64,
    #[validate(range(min = 800.0, max = 8000.0))]
    pub daily_maintenance_calories: f64,
    #[validate(range(min = 800.0, max = 8000.0))]
    pub target_daily_calories: f64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub target_daily_macros_protein: f64,
    #[validate(range(min = 0.0, max = 1500.0))]
    pub target_daily_macros_carbs: f64,
    #[validate(range(min = 0.0, max = 500.0))]
    pub target_daily_macros_fats: f64,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub workout_routine: String,
}

fn validate_weekly_dates(req: &CreateWeeklyGoalRequest) -> Result<(), validator::ValidationError> {
    if req.end_date <= req.start_date {
        return Err(validator::ValidationError::new("weekly_end_before_start"));
    }
    Ok(())
}

impl CreateWeeklyGoalRequest {
    pub fn into_weekly_goal(self) -> WeeklyGoal {
        WeeklyGoal {
            id: Uuid::new_v4(),
            start_date: self.start_date,
            end_date: self.end_date,
            current_weight_in_kg: self.current_weight_in_kg,
            current_fat_percentage: self.current_fat_percentage,
            daily_maintenance_calories: self.daily_maintenance_calories,
            target_daily_calories: self.target_daily_calories,
            target_daily_macros_protein: self.target_daily_macros_protein,
            target_daily_macros_carbs: self.target_daily_macros_carbs,
            target_daily_macros_fats: self.target_daily_macros_fats,
            workout_routine: self.workout_routine,
        }
    }
}

/// Query for `GET /getUserGoals`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserGoalsParams {
    pub user_id: Uuid,
}

/// Query for `POST /registerWeeklyGoal`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MainGoalParams {
    pub main_goal_id: Uuid,
}

/// Query for `DELETE /deleteMainGoal`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGoalParams {
    pub goal_id: Uuid,
}

/// Query for `DELETE /deleteWeeklyGoal`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteWeeklyGoalParams {
    pub goal_id: Uuid,
    pub weekly_goal_id: Uuid,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn weekly(start: DateTime<Utc>) -> WeeklyGoal {
        WeeklyGoal {
            id: Uuid::new_v4(),
            start_date: start,
            end_date: start + Duration::days(7),
            current_weight_in_kg: 82.0,
            current_fat_percentage: 24.0,
            daily_maintenance_calories: 2600.0,
            target_daily_calories: 2100.0,
            target_daily_macros_protein: 160.0,
            target_daily_macros_carbs: 200.0,
            target_daily_macros_fats: 70.0,
            workout_routine: String::new(),
        }
    }

    pub(crate) fn goal_with(weeks: Vec<WeeklyGoal>) -> Goal {
        let start = weeks.first().map(|w| w.start_date).unwrap_or_else(Utc::now);
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_weight_in_kg: 85.0,
            start_fat_percentage: 26.0,
            target_weight_in_kg: 75.0,
            target_fat_percentage: 18.0,
            goal_start_date: start,
            goal_end_date: start + Duration::weeks(12),
            goal_type: GoalType::FatLoss,
            weekly_weight_change: -0.5,
            weekly_goals: weeks,
        }
    }

    #[test]
    fn active_interval_is_half_open() {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let week = weekly(start);
        assert!(week.is_active_at(start));
        assert!(week.is_active_at(start + Duration::days(6)));
        assert!(!week.is_active_at(start + Duration::days(7)));
        assert!(!week.is_active_at(start - Duration::seconds(1)));
    }

    #[test]
    fn select_active_picks_the_week_containing_now() {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let first = weekly(start);
        let second = weekly(start + Duration::days(7));
        let goal = goal_with(vec![first, second.clone()]);

        let now = start + Duration::days(9);
        let active = select_active(std::slice::from_ref(&goal), now).expect("active week");
        assert_eq!(active.weekly_goal.id, second.id);
        assert_eq!(active.goal.id, goal.id);
    }

    #[test]
    fn select_active_returns_none_outside_every_week() {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let goal = goal_with(vec![weekly(start)]);
        assert!(select_active(&[goal.clone()], start + Duration::days(30)).is_none());
        assert!(select_active(&[], start).is_none());
    }

    #[test]
    fn goal_type_uses_display_names() {
        assert_eq!(GoalType::FatLoss.to_string(), "Fat loss");
        assert_eq!("Muscle gain".parse::<GoalType>(), Ok(GoalType::MuscleGain));
        assert!("bulk".parse::<GoalType>().is_err());
        assert_eq!(
            serde_json::to_value(GoalType::MuscleGain).unwrap(),
            serde_json::json!("Muscle gain")
        );
    }
}
