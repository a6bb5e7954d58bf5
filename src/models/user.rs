// src/models/user.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered account together with its biometric profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    pub name: String,

    /// Unique login identifier.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub height_in_cm: Option<f64>,
    pub age: Option<i32>,
    pub sex: Option<String>,
    pub country: Option<String>,
    pub diet_preferences: Vec<String>,

    /// The refresh token issued at the last login, cleared on logout.
    #[serde(skip)]
    pub refresh_token: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// The biometric fields every generation prompt needs.
/// Only obtainable from a complete profile.
#[derive(Debug, Clone, Copy)]
pub struct Biometrics<'a> {
    pub height_in_cm: f64,
    pub age: i32,
    pub sex: &'a str,
    pub country: &'a str,
    pub diet_preferences: &'a [String],
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password: password_hash,
            height_in_cm: None,
            age: None,
            sex: None,
            country: None,
            diet_preferences: Vec::new(),
            refresh_token: None,
            created_at: Some(chrono::Utc::now()),
        }
    }

    /// Returns the biometric summary, or `None` while any field is missing.
    pub fn biometrics(&self) -> Option<Biometrics<'_>> {
        let sex = self.sex.as_deref().filter(|s| !s.trim().is_empty())?;
        let country = self.country.as_deref().filter(|c| !c.trim().is_empty())?;
        if self.diet_preferences.is_empty() {
            return None;
        }

        Some(Biometrics {
            height_in_cm: self.height_in_cm.filter(|h| *h > 0.0)?,
            age: self.age.filter(|a| *a > 0)?,
            sex,
            country,
            diet_preferences: &self.diet_preferences,
        })
    }

    /// Applies the present fields of a profile update.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(age) = update.age {
            self.age = Some(age);
        }
        if let Some(sex) = &update.sex {
            self.sex = Some(sex.clone());
        }
        if let Some(height) = update.height_in_cm {
            self.height_in_cm = Some(height);
        }
        if let Some(country) = &update.country {
            self.country = Some(country.clone());
        }
        if let Some(preferences) = &update.diet_preferences {
            self.diet_preferences = preferences.clone();
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Name length must be between 3 and 50 characters."
    ))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for exchanging a refresh token for a new access token.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// DTO for a partial profile update. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50))]
    pub name: Option<String>,
    #[validate(range(min = 10, max = 120, message = "Age must be between 10 and 120."))]
    pub age: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub sex: Option<String>,
    #[validate(range(
        min = 50.0,
        max = 272.0,
        message = "Height must be between 50 and 272 cm."
    ))]
    pub height_in_cm: Option<f64>,
    #[validate(length(min = 2, max = 60))]
    pub country: Option<String>,
    #[validate(length(max = 10), custom(function = validate_preferences))]
    pub diet_preferences: Option<Vec<String>>,
}

fn validate_preferences(preferences: &[String]) -> Result<(), validator::ValidationError> {
    for preference in preferences {
        if preference.trim().is_empty() || preference.len() > 50 {
            return Err(validator::ValidationError::new("invalid_diet_preference"));
        }
    }
    Ok(())
}

/// Sanitized field set handed to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub sex: Option<String>,
    pub height_in_cm: Option<f64>,
    pub country: Option<String>,
    pub diet_preferences: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}
