// src/config.rs

use std::{env, time::Duration};

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

/// Plausibility bounds for body weight, in kilograms.
pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 250.0;

/// Plausibility bounds for body-fat percentage.
pub const MIN_BODY_FAT_PERCENTAGE: f64 = 10.0;
pub const MAX_BODY_FAT_PERCENTAGE: f64 = 80.0;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expiration: u64,
    /// Refresh token lifetime in seconds.
    pub jwt_refresh_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub query_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    /// Offset from UTC used to decide which calendar day is "today".
    pub utc_offset_minutes: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let jwt_refresh_secret = required("JWT_REFRESH_SECRET")?;
        let gemini_api_key = required("GEMINI_API_KEY")?;

        let jwt_expiration = parsed_or("JWT_EXPIRATION", 15 * 60)?;
        let jwt_refresh_expiration = parsed_or("JWT_REFRESH_EXPIRATION", 7 * 24 * 60 * 60)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let port = parsed_or("PORT", 3000)?;

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());
        Url::parse(&gemini_base_url).map_err(|e| {
            AppError::InternalServerError(format!("GEMINI_BASE_URL is not a valid URL: {}", e))
        })?;

        let query_timeout_secs = parsed_or("QUERY_TIMEOUT_SECS", 5)?;
        let generation_timeout_secs = parsed_or("GENERATION_TIMEOUT_SECS", 120)?;
        let utc_offset_minutes = parsed_or("DASHBOARD_UTC_OFFSET_MINUTES", 330)?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_refresh_secret,
            jwt_expiration,
            jwt_refresh_expiration,
            rust_log,
            port,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            query_timeout_secs,
            generation_timeout_secs,
            utc_offset_minutes,
        })
    }

    /// Deadline for ordinary store-backed requests.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Deadline for requests that wait on the generative model.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::InternalServerError(format!("{} must be set", key)))
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} has an invalid value", key))),
        Err(_) => Ok(default),
    }
}
