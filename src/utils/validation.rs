// src/utils/validation.rs

//! Plausibility checks shared by query parameters and request bodies.
//!
//! Written as `validator` custom functions rather than `range(...)` so that
//! non-finite values (`NaN`, `inf`) are rejected as well.

use validator::ValidationError;

use crate::config::{
    MAX_BODY_FAT_PERCENTAGE, MAX_WEIGHT_KG, MIN_BODY_FAT_PERCENTAGE, MIN_WEIGHT_KG,
};

fn out_of_range(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn validate_weight(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&value) {
        return Ok(());
    }
    Err(out_of_range(
        "weight_out_of_range",
        format!("weight must be between {MIN_WEIGHT_KG} and {MAX_WEIGHT_KG} kg"),
    ))
}

pub fn validate_body_fat(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (MIN_BODY_FAT_PERCENTAGE..=MAX_BODY_FAT_PERCENTAGE).contains(&value) {
        return Ok(());
    }
    Err(out_of_range(
        "body_fat_out_of_range",
        format!(
            "body fat must be between {MIN_BODY_FAT_PERCENTAGE} and {MAX_BODY_FAT_PERCENTAGE} percent"
        ),
    ))
}

/// Like [`validate_body_fat`], but also accepts exactly `0`, the "unknown" sentinel.
pub fn validate_current_body_fat(value: f64) -> Result<(), ValidationError> {
    if value == 0.0 {
        return Ok(());
    }
    validate_body_fat(value)
}

/// Weekly weight change in kg, positive or negative.
pub fn validate_weight_change(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (-2.0..=2.0).contains(&value) {
        return Ok(());
    }
    Err(out_of_range(
        "weight_change_out_of_range",
        "weekly weight change must be between -2 and 2 kg".to_string(),
    ))
}
