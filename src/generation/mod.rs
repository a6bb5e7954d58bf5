// src/generation/mod.rs

//! Everything between a user's numbers and a validated domain record:
//! prompt text, per-task output schemas, the model client and the parser
//! that turns the model's JSON into typed values.

pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod schema;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiGenerator;

/// The six things the model is asked to produce. Each has its own schema
/// and its own cached model configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    WeightRange,
    GoalDuration,
    Tdee,
    Macros,
    WeeklyMealPlan,
    DayMealEdit,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::WeightRange,
        TaskKind::GoalDuration,
        TaskKind::Tdee,
        TaskKind::Macros,
        TaskKind::WeeklyMealPlan,
        TaskKind::DayMealEdit,
    ];

    /// Dense index into per-kind tables.
    pub const fn index(self) -> usize {
        match self {
            TaskKind::WeightRange => 0,
            TaskKind::GoalDuration => 1,
            TaskKind::Tdee => 2,
            TaskKind::Macros => 3,
            TaskKind::WeeklyMealPlan => 4,
            TaskKind::DayMealEdit => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskKind::WeightRange => "ideal_weight_range",
            TaskKind::GoalDuration => "goal_duration",
            TaskKind::Tdee => "tdee",
            TaskKind::Macros => "macros",
            TaskKind::WeeklyMealPlan => "weekly_meal_plan",
            TaskKind::DayMealEdit => "day_meal_edit",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to obtain text from the model. No retries are attempted.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to the model failed: {0}")]
    Request(String),

    #[error("model responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("model reported an error: {0}")]
    Api(String),

    #[error("model did not answer in time: {0}")]
    Timeout(String),

    #[error("model returned no content")]
    EmptyResponse,
}

/// One schema violation, located by JSON path such as `mealPlans[2].meals[0].calories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Generated text that could not be turned into a domain value.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("generated content is not valid JSON: {0}")]
    NotJson(String),

    #[error("generated content does not match the expected shape: {}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),
}

impl ParseError {
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ParseError::NotJson(_) => &[],
            ParseError::Invalid(issues) => issues,
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Sends one prompt for one task kind and returns the raw text answer,
/// which by contract is JSON for that kind's schema. Validation is left
/// to the parser.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, kind: TaskKind, prompt: &str) -> Result<String, GenerationError>;
}
