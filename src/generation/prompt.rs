// src/generation/prompt.rs

//! Prompt text for each generation task. Pure string building, no I/O.

use crate::models::{goal::GoalType, user::Biometrics};

pub const SYSTEM_INSTRUCTION: &str = "You are a highly qualified fitness and nutrition coach \
with more than 15 years of experience. You help clients reach their body composition goals \
and give detailed calorie and macronutrient breakdowns. \
Always answer with valid JSON and nothing else.";

/// Weight and body fat as measured now. A body fat of exactly 0 means unknown.
#[derive(Debug, Clone, Copy)]
pub struct BodySnapshot {
    pub weight_in_kg: f64,
    pub body_fat_percentage: f64,
}

/// Where the user wants to end up.
#[derive(Debug, Clone, Copy)]
pub struct GoalContext {
    pub goal_type: GoalType,
    pub target_weight_in_kg: f64,
    pub target_body_fat_percentage: f64,
}

/// Daily intake the meal plan has to respect.
#[derive(Debug, Clone, Copy)]
pub struct DailyTargets {
    pub calories: i64,
    pub protein_grams: i64,
    pub fat_grams: i64,
    pub carb_grams: i64,
}

fn body_fat_clause(body_fat_percentage: f64) -> String {
    if body_fat_percentage == 0.0 {
        String::new()
    } else {
        format!(" with approx {:.1}% body fat", body_fat_percentage)
    }
}

fn about_me(bio: &Biometrics<'_>, body: BodySnapshot) -> String {
    format!(
        "I am {:.1} kg{}, a {} year old {}, and {:.1} cm tall.",
        body.weight_in_kg,
        body_fat_clause(body.body_fat_percentage),
        bio.age,
        bio.sex,
        bio.height_in_cm
    )
}

fn my_goal(goal: GoalContext) -> String {
    format!(
        " My goal is {}, with a target weight of {:.1} kg and {:.1}% body fat.",
        goal.goal_type, goal.target_weight_in_kg, goal.target_body_fat_percentage
    )
}

fn diet_context(bio: &Biometrics<'_>, targets: DailyTargets) -> String {
    format!(
        " For the coming week I will eat {} calories per day with {} g protein, {} g fat and {} g carbs. \
I live in {} and follow a {} diet. \
Pick meals that are easy to get in my country and stay within my dietary preferences.",
        targets.calories,
        targets.protein_grams,
        targets.fat_grams,
        targets.carb_grams,
        bio.country,
        bio.diet_preferences.join(", ")
    )
}

const MEAL_FORMAT_RULES: &str = " Include calories and macros for every meal. \
Always write the time in am/pm format, for example 6:30 pm. \
Use generic raw ingredients, not brands or ready-made products; \
for example, instead of 'chicken tikka masala' list its raw ingredients and put the preparation in the recipe steps.";

pub fn ideal_weight_prompt(bio: &Biometrics<'_>, body: BodySnapshot) -> String {
    format!(
        "{} What is my ideal weight range in kg, with the matching body fat percentage? \
Keep each description to one line.",
        about_me(bio, body)
    )
}

pub fn goal_duration_prompt(
    bio: &Biometrics<'_>,
    body: BodySnapshot,
    target_weight_in_kg: f64,
    target_body_fat_percentage: f64,
) -> String {
    format!(
        "{} I want to reach {:.1} kg and {:.1}% body fat. \
Give me three pace options to get there: slow, medium and fast. \
For each option tell me the duration in weeks and the weekly weight change in kg.",
        about_me(bio, body),
        target_weight_in_kg,
        target_body_fat_percentage
    )
}

pub fn tdee_prompt(bio: &Biometrics<'_>, body: BodySnapshot, goal: GoalContext) -> String {
    format!(
        "{}{} I want to know my maintenance calories and TDEE. \
BMR should be the average of the Mifflin-St Jeor and Harris-Benedict equations. \
Each description should mention job, lifestyle and exercise.",
        about_me(bio, body),
        my_goal(goal)
    )
}

pub fn macro_prompt(
    bio: &Biometrics<'_>,
    body: BodySnapshot,
    goal: GoalContext,
    current_bmr: i32,
    current_tdee: i32,
    weekly_weight_change: f64,
) -> String {
    format!(
        "{}{} My current BMR is {} calories and my TDEE is {} calories. \
What daily calorie intake gets me a weight change of {:.2} kg per week? \
Include the daily calories and the macro split.",
        about_me(bio, body),
        my_goal(goal),
        current_bmr,
        current_tdee,
        weekly_weight_change
    )
}

pub fn weekly_meal_prompt(
    bio: &Biometrics<'_>,
    body: BodySnapshot,
    goal: GoalContext,
    targets: DailyTargets,
    user_prompt: &str,
) -> String {
    format!(
        "{}{}{} Suggest a meal plan for the whole week, with a time for each meal.{} \
I also attach a note with special requests; only use the parts of it that are relevant to the meal plan and ignore the rest. \
Note: {}",
        about_me(bio, body),
        my_goal(goal),
        diet_context(bio, targets),
        MEAL_FORMAT_RULES,
        user_prompt
    )
}

pub fn day_meal_edit_prompt(
    bio: &Biometrics<'_>,
    body: BodySnapshot,
    goal: GoalContext,
    targets: DailyTargets,
    meals_json: &str,
    user_prompt: &str,
) -> String {
    format!(
        "{}{}{} Suggest changes to a single day of my meal plan. I attach the day's meals and a note with the requested changes; \
only use the parts of the note that are relevant to the meal plan and ignore the rest. \
If nothing in the note is relevant, send the same meals back.{} \
Meals: {}. \
Note: {}.",
        about_me(bio, body),
        my_goal(goal),
        diet_context(bio, targets),
        MEAL_FORMAT_RULES,
        meals_json,
        user_prompt
    )
}
