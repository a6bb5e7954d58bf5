// src/generation/parser.rs

//! Turns model output into domain records.
//!
//! The model is asked for schema-shaped JSON but is not trusted to deliver it.
//! Decoding never panics: every offending field is collected with its path and
//! reported in a single [`ParseError::Invalid`].

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{FieldIssue, ParseError, TaskKind, schema::WEEKDAYS, schema::schema_for};
use crate::models::meal::{DayMeal, Ingredient, Meal, MealPlan};

/// Leading number of strings such as "450", "450 kcal" or "12.5g".
static LEADING_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").ok());

/// Maps a weekday name onto the week that starts at `week_start`
/// (Monday is day 0). Unrecognized names fall back to `week_start`.
pub fn resolve_date(week_start: NaiveDate, day_of_week: &str) -> NaiveDate {
    let name = day_of_week.trim();
    match WEEKDAYS.iter().position(|d| d.eq_ignore_ascii_case(name)) {
        Some(offset) => week_start + Duration::days(offset as i64),
        None => {
            tracing::warn!(
                "Unrecognized dayOfWeek '{}', using week start {}",
                day_of_week,
                week_start
            );
            week_start
        }
    }
}

/// Parses a weekly answer into a new meal plan with fresh ids.
pub fn parse_meal_plan(
    user_id: Uuid,
    main_goal_id: Uuid,
    weekly_goal_id: Uuid,
    week_start: NaiveDate,
    raw: &str,
) -> Result<MealPlan, ParseError> {
    let root = decode_json(raw)?;
    let mut decoder = Decoder::default();

    let mut day_meals = Vec::new();
    if let Some(days) = decoder.root_array(&root, "mealPlans") {
        for (i, day) in days.iter().enumerate() {
            let path = format!("mealPlans[{}]", i);
            let Some(day) = decoder.object(day, &path) else {
                continue;
            };

            let date = decoder
                .string(day, "dayOfWeek", &path)
                .map(|name| resolve_date(week_start, &name))
                .unwrap_or(week_start);

            let meals = decoder
                .array(day, "meals", &path)
                .map(|meals| decoder.meals(meals, &format!("{}.meals", path)))
                .unwrap_or_default();

            day_meals.push(DayMeal {
                id: Uuid::new_v4(),
                date,
                meals,
            });
        }
    }

    decoder.finish()?;
    Ok(MealPlan {
        id: Uuid::new_v4(),
        user_id,
        main_goal_id,
        weekly_goal_id,
        day_meals,
    })
}

/// Parses a single-day answer into fresh meals.
pub fn parse_day_meals(raw: &str) -> Result<Vec<Meal>, ParseError> {
    let root = decode_json(raw)?;
    let mut decoder = Decoder::default();

    let meals = decoder
        .root_array(&root, "meals")
        .map(|meals| decoder.meals(meals, "meals"))
        .unwrap_or_default();

    decoder.finish()?;
    Ok(meals)
}

/// Decodes an advice answer: JSON first, then the task's schema, then the typed value.
pub fn decode_advice<T: DeserializeOwned>(kind: TaskKind, raw: &str) -> Result<T, ParseError> {
    let value = decode_json(raw)?;
    schema_for(kind).validate(&value)?;
    serde_json::from_value(value)
        .map_err(|e| ParseError::Invalid(vec![FieldIssue::new("(root)", e.to_string())]))
}

fn decode_json(raw: &str) -> Result<Value, ParseError> {
    serde_json::from_str(raw.trim()).map_err(|e| ParseError::NotJson(e.to_string()))
}

/// Reads an integer the way models tend to write one: as an integer, as a
/// float (rounded), or as a string starting with a number.
fn coerce_int(value: &Value) -> Option<i32> {
    let number = match value {
        Value::Number(n) => n.as_i64().map(|i| i as f64).or_else(|| n.as_f64())?,
        Value::String(s) => {
            let pattern = LEADING_NUMBER.as_ref()?;
            pattern.captures(s)?.get(1)?.as_str().parse::<f64>().ok()?
        }
        _ => return None,
    };

    if !number.is_finite() {
        return None;
    }
    let rounded = number.round();
    if rounded < i32::MIN as f64 || rounded > i32::MAX as f64 {
        return None;
    }
    Some(rounded as i32)
}

fn field_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

#[derive(Default)]
struct Decoder {
    issues: Vec<FieldIssue>,
}

impl Decoder {
    fn issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(path, message));
    }

    fn finish(self) -> Result<(), ParseError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ParseError::Invalid(self.issues))
        }
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        let object = value.as_object();
        if object.is_none() {
            self.issue(path, "expected object");
        }
        object
    }

    /// The top-level array of an answer. It has to exist and hold at least one entry.
    fn root_array<'v>(&mut self, root: &'v Value, key: &str) -> Option<&'v Vec<Value>> {
        let root = self.object(root, "(root)")?;
        let items = self.array(root, key, "")?;
        if items.is_empty() {
            self.issue(key, "must not be empty");
            return None;
        }
        Some(items)
    }

    fn array<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'v Vec<Value>> {
        match object.get(key) {
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.issue(field_path(path, key), "expected array");
                None
            }
            None => {
                self.issue(field_path(path, key), "missing required field");
                None
            }
        }
    }

    /// Like [`Decoder::array`], but a missing key reads as an empty list.
    fn optional_array<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        key: &str,
        path: &str,
    ) -> &'v [Value] {
        match object.get(key) {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.issue(field_path(path, key), "expected array");
                &[]
            }
        }
    }

    fn string(&mut self, object: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        match object.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.issue(field_path(path, key), "expected string");
                None
            }
            None => {
                self.issue(field_path(path, key), "missing required field");
                None
            }
        }
    }

    /// Nutrition numbers: coerced leniently, but never negative.
    fn integer(&mut self, object: &Map<String, Value>, key: &str, path: &str) -> i32 {
        match object.get(key) {
            Some(value) => match coerce_int(value) {
                Some(number) if number < 0 => {
                    self.issue(field_path(path, key), "must not be negative");
                    0
                }
                Some(number) => number,
                None => {
                    self.issue(field_path(path, key), format!("expected integer, found {}", value));
                    0
                }
            },
            None => {
                self.issue(field_path(path, key), "missing required field");
                0
            }
        }
    }

    fn meals(&mut self, values: &[Value], path: &str) -> Vec<Meal> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, value)| self.meal(value, &format!("{}[{}]", path, i)))
            .collect()
    }

    fn meal(&mut self, value: &Value, path: &str) -> Option<Meal> {
        let object = self.object(value, path)?;

        let name = self.string(object, "name", path);
        let description = self.string(object, "description", path);
        let time = self.string(object, "time", path);
        let calories = self.integer(object, "calories", path);
        let protein = self.integer(object, "protein", path);
        let fat = self.integer(object, "fat", path);
        let carbs = self.integer(object, "carbs", path);

        let ingredients_path = field_path(path, "ingredients");
        let ingredients = self
            .optional_array(object, "ingredients", path)
            .iter()
            .enumerate()
            .filter_map(|(i, v)| self.ingredient(v, &format!("{}[{}]", ingredients_path, i)))
            .collect();

        let steps_path = field_path(path, "recipe_steps");
        let mut recipe_steps = Vec::new();
        for (i, step) in self
            .optional_array(object, "recipe_steps", path)
            .iter()
            .enumerate()
        {
            match step.as_str() {
                Some(step) => recipe_steps.push(step.to_string()),
                None => self.issue(format!("{}[{}]", steps_path, i), "expected string"),
            }
        }

        Some(Meal {
            id: Uuid::new_v4(),
            name: name?,
            description: description?,
            time: time?,
            calories,
            protein,
            fat,
            carbs,
            ingredients,
            recipe_steps,
            is_consumed: false,
        })
    }

    fn ingredient(&mut self, value: &Value, path: &str) -> Option<Ingredient> {
        let object = self.object(value, path)?;
        let name = self.string(object, "name", path);
        let quantity = match object.get("quantity") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(_) => {
                self.issue(field_path(path, "quantity"), "expected string");
                None
            }
            None => {
                self.issue(field_path(path, "quantity"), "missing required field");
                None
            }
        };

        Some(Ingredient {
            name: name?,
            quantity: quantity?,
        })
    }
}
