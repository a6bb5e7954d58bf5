// src/generation/schema.rs

//! Output schemas for every task kind.
//!
//! A [`Schema`] is sent to the model as its `responseSchema` and is also used
//! to check what comes back, so both sides agree on a single definition.

use std::sync::OnceLock;

use serde_json::{Map, Value, json};

use super::{FieldIssue, ParseError, TaskKind};
use crate::models::advice::Lifestyle;

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Array,
    Object,
}

impl SchemaType {
    fn wire_name(self) -> &'static str {
        match self {
            SchemaType::String => "STRING",
            SchemaType::Number => "NUMBER",
            SchemaType::Integer => "INTEGER",
            SchemaType::Array => "ARRAY",
            SchemaType::Object => "OBJECT",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: SchemaType,
    /// Object properties in the order the model should emit them.
    pub properties: Vec<(String, Schema)>,
    pub required: Vec<String>,
    pub items: Option<Box<Schema>>,
    pub enum_values: Vec<String>,
}

impl Schema {
    fn leaf(kind: SchemaType) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            required: Vec::new(),
            items: None,
            enum_values: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::leaf(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::leaf(SchemaType::Integer)
    }

    pub fn string_enum(values: &[&str]) -> Self {
        Self {
            enum_values: values.iter().map(|v| v.to_string()).collect(),
            ..Self::leaf(SchemaType::String)
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    /// An object whose listed properties are all required.
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let required = properties.iter().map(|(name, _)| name.to_string()).collect();
        Self {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required,
            ..Self::leaf(SchemaType::Object)
        }
    }

    /// Renders the schema in the provider's `responseSchema` dialect.
    pub fn to_wire(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.kind.wire_name()));

        if !self.enum_values.is_empty() {
            out.insert("enum".into(), json!(self.enum_values));
        }
        if let Some(items) = &self.items {
            out.insert("items".into(), items.to_wire());
        }
        if !self.properties.is_empty() {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_wire()))
                .collect();
            let ordering: Vec<&str> = self.properties.iter().map(|(n, _)| n.as_str()).collect();
            out.insert("properties".into(), Value::Object(properties));
            out.insert("propertyOrdering".into(), json!(ordering));
        }
        if !self.required.is_empty() {
            out.insert("required".into(), json!(self.required));
        }

        Value::Object(out)
    }

    /// Checks `value` against the schema and reports every violation.
    pub fn validate(&self, value: &Value) -> Result<(), ParseError> {
        let mut issues = Vec::new();
        self.collect_issues(value, "", &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ParseError::Invalid(issues))
        }
    }

    fn collect_issues(&self, value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
        let here = if path.is_empty() { "(root)" } else { path };

        match self.kind {
            SchemaType::Object => {
                let Some(map) = value.as_object() else {
                    issues.push(type_issue(here, self.kind, value));
                    return;
                };
                for name in &self.required {
                    if !map.contains_key(name) {
                        issues.push(FieldIssue::new(join(path, name), "missing required field"));
                    }
                }
                for (name, schema) in &self.properties {
                    if let Some(child) = map.get(name) {
                        schema.collect_issues(child, &join(path, name), issues);
                    }
                }
            }
            SchemaType::Array => {
                let Some(elements) = value.as_array() else {
                    issues.push(type_issue(here, self.kind, value));
                    return;
                };
                if let Some(items) = &self.items {
                    for (i, element) in elements.iter().enumerate() {
                        items.collect_issues(element, &format!("{}[{}]", path, i), issues);
                    }
                }
            }
            SchemaType::String => match value.as_str() {
                Some(s) if !self.enum_values.is_empty() && !self.enum_values.iter().any(|v| v == s) => {
                    issues.push(FieldIssue::new(
                        here,
                        format!("'{}' is not one of {}", s, self.enum_values.join(", ")),
                    ));
                }
                Some(_) => {}
                None => issues.push(type_issue(here, self.kind, value)),
            },
            SchemaType::Number => {
                if !value.is_number() {
                    issues.push(type_issue(here, self.kind, value));
                }
            }
            SchemaType::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    issues.push(type_issue(here, self.kind, value));
                }
            }
        }
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path, field)
    }
}

fn type_issue(path: &str, expected: SchemaType, found: &Value) -> FieldIssue {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    FieldIssue::new(path, format!("expected {}, found {}", expected.describe(), found))
}

fn weight_bound() -> Schema {
    Schema::object(vec![
        ("weight_in_kg", Schema::number()),
        ("fat_percentage", Schema::number()),
        ("description", Schema::string()),
    ])
}

fn pace() -> Schema {
    Schema::object(vec![
        ("weekly_weight_change_kg", Schema::number()),
        ("duration_weeks", Schema::integer()),
        ("notes", Schema::string()),
    ])
}

fn macro_amount() -> Schema {
    Schema::object(vec![
        ("total_grams", Schema::integer()),
        ("calories", Schema::integer()),
    ])
}

/// Shape of a single meal, shared by the weekly and single-day schemas.
pub fn meal_schema() -> Schema {
    Schema::object(vec![
        ("time", Schema::string()),
        ("name", Schema::string()),
        ("description", Schema::string()),
        (
            "ingredients",
            Schema::array(Schema::object(vec![
                ("name", Schema::string()),
                ("quantity", Schema::string()),
            ])),
        ),
        ("recipe_steps", Schema::array(Schema::string())),
        ("calories", Schema::integer()),
        ("protein", Schema::integer()),
        ("fat", Schema::integer()),
        ("carbs", Schema::integer()),
    ])
}

fn build(kind: TaskKind) -> Schema {
    match kind {
        TaskKind::WeightRange => Schema::object(vec![(
            "idealWeightRange",
            Schema::object(vec![("lowerBound", weight_bound()), ("upperBound", weight_bound())]),
        )]),
        TaskKind::GoalDuration => Schema::object(vec![
            ("type", Schema::string_enum(&["Fat loss", "Muscle gain"])),
            (
                "pace_options",
                Schema::object(vec![("slow", pace()), ("medium", pace()), ("fast", pace())]),
            ),
        ]),
        TaskKind::Tdee => Schema::object(vec![
            ("bmr", Schema::integer()),
            (
                "tdee",
                Schema::array(Schema::object(vec![
                    ("description", Schema::string()),
                    ("tdee", Schema::integer()),
                    ("lifestyle", Schema::string_enum(&Lifestyle::ALL)),
                ])),
            ),
        ]),
        TaskKind::Macros => Schema::object(vec![
            ("weekly_weight_loss_kg", Schema::number()),
            ("daily_calorie_deficit", Schema::integer()),
            ("daily_calorie_intake", Schema::integer()),
            (
                "macronutrient_split",
                Schema::object(vec![
                    ("protein", macro_amount()),
                    ("fat", macro_amount()),
                    ("carbohydrates", macro_amount()),
                ]),
            ),
        ]),
        TaskKind::WeeklyMealPlan => Schema::object(vec![(
            "mealPlans",
            Schema::array(Schema::object(vec![
                ("dayOfWeek", Schema::string_enum(&WEEKDAYS)),
                ("meals", Schema::array(meal_schema())),
            ])),
        )]),
        TaskKind::DayMealEdit => Schema::object(vec![("meals", Schema::array(meal_schema()))]),
    }
}

static SCHEMAS: [OnceLock<Schema>; 6] = [
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
];

/// The registered schema for `kind`, built on first use.
pub fn schema_for(kind: TaskKind) -> &'static Schema {
    SCHEMAS[kind.index()].get_or_init(|| build(kind))
}
