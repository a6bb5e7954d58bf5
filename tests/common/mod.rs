// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use fiteats::{
    config::Config,
    generation::{GenerationError, Generator, TaskKind},
    routes,
    state::AppState,
    store::MemoryStore,
};
use serde_json::{Value, json};
use uuid::Uuid;

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_refresh_secret: "test_refresh_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        jwt_refresh_expiration: 3600,
        rust_log: "error".to_string(),
        port: 0,
        gemini_api_key: "unused".to_string(),
        gemini_model: "unused".to_string(),
        gemini_base_url: "http://127.0.0.1:1".to_string(),
        query_timeout_secs: 5,
        generation_timeout_secs: 10,
        utc_offset_minutes: 330,
    }
}

/// Answers each task kind with a canned response and counts calls.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<HashMap<TaskKind, String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn respond(&self, kind: TaskKind, body: impl Into<String>) {
        self.responses.lock().unwrap().insert(kind, body.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, kind: TaskKind, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .ok_or(GenerationError::EmptyResponse)
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub generator: Arc<ScriptedGenerator>,
}

/// Spawns the app on a random port, backed by the in-memory store.
pub async fn spawn_app() -> TestApp {
    let generator = Arc::new(ScriptedGenerator::default());
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        generator.clone(),
        test_config(),
    );
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        generator,
    }
}

pub struct LoggedIn {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub async fn register_and_login(&self) -> LoggedIn {
        let email = format!("user_{}@example.com", &Uuid::new_v4().to_string()[..8]);

        let response = self
            .client
            .post(self.url("/register"))
            .json(&json!({ "name": "Test User", "email": email, "password": "password123" }))
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(response.status().as_u16(), 201);

        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": "password123" }))
            .send()
            .await
            .expect("Failed to login");
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();

        LoggedIn {
            user_id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            email,
            access_token: body["accessToken"].as_str().unwrap().to_string(),
            refresh_token: body["refreshToken"].as_str().unwrap().to_string(),
        }
    }

    pub async fn complete_profile(&self, user: &LoggedIn) {
        let response = self
            .client
            .put(self.url("/profile"))
            .bearer_auth(&user.access_token)
            .json(&json!({
                "age": 29,
                "sex": "female",
                "heightInCm": 164.0,
                "country": "India",
                "dietPreferences": ["vegetarian"]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    /// Registers a main goal with one weekly goal that started yesterday.
    /// Returns `(main_goal_id, weekly_goal_id)`.
    pub async fn goal_for_this_week(&self, user: &LoggedIn) -> (Uuid, Uuid) {
        let now = Utc::now();
        let response = self
            .client
            .post(self.url("/registerGoal"))
            .bearer_auth(&user.access_token)
            .json(&json!({
                "startWeightInKg": 82.0,
                "startFatPercentage": 26.0,
                "targetWeightInKg": 72.0,
                "targetFatPercentage": 18.0,
                "goalStartDate": now - Duration::days(1),
                "goalEndDate": now + Duration::days(90),
                "goalType": "Fat loss",
                "weeklyWeightChange": -0.5
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let goal: Value = response.json().await.unwrap();
        let goal_id: Uuid = goal["id"].as_str().unwrap().parse().unwrap();

        let response = self
            .client
            .post(self.url(&format!("/registerWeeklyGoal?mainGoalId={}", goal_id)))
            .bearer_auth(&user.access_token)
            .json(&json!({
                "startDate": now - Duration::days(1),
                "endDate": now + Duration::days(6),
                "currentWeightInKg": 81.0,
                "currentFatPercentage": 25.0,
                "dailyMaintenanceCalories": 2500.0,
                "targetDailyCalories": 2000.0,
                "targetDailyMacrosProtein": 150.0,
                "targetDailyMacrosCarbs": 200.0,
                "targetDailyMacrosFats": 60.0,
                "workoutRoutine": "Strength training three times a week"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let weekly: Value = response.json().await.unwrap();

        (goal_id, weekly["id"].as_str().unwrap().parse().unwrap())
    }
}

pub fn meal_json(name: &str, calories: i64) -> Value {
    json!({
        "time": "8:00 am",
        "name": name,
        "description": format!("{} for the day", name),
        "ingredients": [{ "name": "oats", "quantity": "80 g" }],
        "recipe_steps": ["Cook everything"],
        "calories": calories,
        "protein": 30,
        "fat": 10,
        "carbs": 50
    })
}

/// A full week with a 500 and a 700 calorie meal every day.
pub fn weekly_plan_json() -> String {
    let days: Vec<Value> = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ]
    .iter()
    .map(|day| {
        json!({
            "dayOfWeek": day,
            "meals": [meal_json("Breakfast", 500), meal_json("Dinner", 700)]
        })
    })
    .collect();
    json!({ "mealPlans": days }).to_string()
}
