// tests/meal_plan_tests.rs

mod common;

use common::{LoggedIn, TestApp, meal_json, spawn_app, weekly_plan_json};
use fiteats::generation::TaskKind;
use serde_json::{Value, json};
use uuid::Uuid;

async fn create_plan(app: &TestApp, user: &LoggedIn, goal_id: Uuid, weekly_id: Uuid) -> reqwest::Response {
    app.client
        .post(app.url(&format!(
            "/createMealPlan?userId={}&mainGoalId={}&weeklyGoalId={}&userPrompt=more%20paneer",
            user.user_id, goal_id, weekly_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap()
}

async fn dashboard(app: &TestApp, user: &LoggedIn) -> reqwest::Response {
    app.client
        .get(app.url(&format!("/dashboard?userId={}", user.user_id)))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap()
}

/// A user with a complete profile and a goal running this week.
async fn ready_user(app: &TestApp) -> (LoggedIn, Uuid, Uuid) {
    let user = app.register_and_login().await;
    app.complete_profile(&user).await;
    let (goal_id, weekly_id) = app.goal_for_this_week(&user).await;
    (user, goal_id, weekly_id)
}

#[tokio::test]
async fn weekly_plan_is_generated_once() {
    let app = spawn_app().await;
    app.generator.respond(TaskKind::WeeklyMealPlan, weekly_plan_json());
    let (user, goal_id, weekly_id) = ready_user(&app).await;

    let response = create_plan(&app, &user, goal_id, weekly_id).await;
    assert_eq!(response.status().as_u16(), 201);
    let plan: Value = response.json().await.unwrap();
    let days = plan["dayMeals"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["meals"][1]["calories"], 700);
    assert_eq!(days[0]["meals"][0]["isConsumed"], false);
    assert_eq!(app.generator.calls(), 1);

    // Same weekly goal again: rejected before the model is asked
    let response = create_plan(&app, &user, goal_id, weekly_id).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "precondition_failed");
    assert_eq!(app.generator.calls(), 1);

    let response = app
        .client
        .get(app.url(&format!(
            "/getMealPlan?userId={}&mainGoalId={}&weeklyGoalId={}",
            user.user_id, goal_id, weekly_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["id"], plan["id"]);
}

#[tokio::test]
async fn concurrent_creates_store_one_plan() {
    let app = spawn_app().await;
    app.generator.respond(TaskKind::WeeklyMealPlan, weekly_plan_json());
    let (user, goal_id, weekly_id) = ready_user(&app).await;

    let (first, second) = tokio::join!(
        create_plan(&app, &user, goal_id, weekly_id),
        create_plan(&app, &user, goal_id, weekly_id)
    );

    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [201, 400]);

    let (created, rejected) = if first.status().as_u16() == 201 {
        (first, second)
    } else {
        (second, first)
    };
    let rejected: Value = rejected.json().await.unwrap();
    assert_eq!(rejected["code"], "precondition_failed");
    let created: Value = created.json().await.unwrap();

    let fetched: Value = app
        .client
        .get(app.url(&format!(
            "/getMealPlan?userId={}&mainGoalId={}&weeklyGoalId={}",
            user.user_id, goal_id, weekly_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["id"], created["id"]);
}

#[tokio::test]
async fn missing_plan_is_not_found() {
    let app = spawn_app().await;
    let (user, goal_id, weekly_id) = ready_user(&app).await;

    let response = app
        .client
        .get(app.url(&format!(
            "/getMealPlan?userId={}&mainGoalId={}&weeklyGoalId={}",
            user.user_id, goal_id, weekly_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn implausible_weight_never_reaches_the_model() {
    let app = spawn_app().await;
    let (user, _, _) = ready_user(&app).await;

    for weight in ["10", "300", "heavy"] {
        let response = app
            .client
            .get(app.url(&format!(
                "/getIdealWeight?userId={}&currentWeightInKg={}&currentBodyFatPercentage=20",
                user.user_id, weight
            )))
            .bearer_auth(&user.access_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "weight {}", weight);
    }
    assert_eq!(app.generator.calls(), 0);
}

#[tokio::test]
async fn incomplete_profile_blocks_generation() {
    let app = spawn_app().await;
    let user = app.register_and_login().await;
    let (goal_id, weekly_id) = app.goal_for_this_week(&user).await;

    let response = create_plan(&app, &user, goal_id, weekly_id).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "precondition_failed");

    let response = app
        .client
        .get(app.url(&format!(
            "/getIdealWeight?userId={}&currentWeightInKg=80&currentBodyFatPercentage=0",
            user.user_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(app.generator.calls(), 0);
}

#[tokio::test]
async fn unknown_weekly_goal_is_a_precondition() {
    let app = spawn_app().await;
    app.generator.respond(TaskKind::WeeklyMealPlan, weekly_plan_json());
    let (user, goal_id, _) = ready_user(&app).await;

    let response = create_plan(&app, &user, goal_id, Uuid::new_v4()).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(app.generator.calls(), 0);
}

#[tokio::test]
async fn dashboard_tracks_consumption() {
    let app = spawn_app().await;
    app.generator.respond(TaskKind::WeeklyMealPlan, weekly_plan_json());
    let (user, goal_id, weekly_id) = ready_user(&app).await;

    // Nothing generated yet
    let response = dashboard(&app, &user).await;
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "no_plan_yet");

    let plan: Value = create_plan(&app, &user, goal_id, weekly_id).await.json().await.unwrap();
    let plan_id = plan["id"].as_str().unwrap();

    let response = dashboard(&app, &user).await;
    assert_eq!(response.status().as_u16(), 200);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["calorieOverview"]["total"]["goal"], 1200.0);
    assert_eq!(view["calorieOverview"]["total"]["consumed"], 0.0);
    assert_eq!(view["progressSummary"]["weightInKg"]["current"], 81.0);
    assert_eq!(view["progressSummary"]["weightInKg"]["start"], 82.0);

    // Eat today's 500 kcal breakfast
    let breakfast = view["todayMeals"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["calories"] == 500)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .client
        .post(app.url(&format!(
            "/consumeMeal?mealPlanId={}&mealId={}",
            plan_id, breakfast
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let view: Value = dashboard(&app, &user).await.json().await.unwrap();
    assert_eq!(view["calorieOverview"]["total"]["goal"], 1200.0);
    assert_eq!(view["calorieOverview"]["total"]["consumed"], 500.0);
    assert_eq!(view["calorieOverview"]["macros"]["protein"]["consumed"], 30.0);
    assert_eq!(view["calorieOverview"]["macros"]["protein"]["unit"], "g");

    // Unknown meal
    let response = app
        .client
        .post(app.url(&format!(
            "/consumeMeal?mealPlanId={}&mealId={}",
            plan_id,
            Uuid::new_v4()
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn customizing_replaces_one_day() {
    let app = spawn_app().await;
    app.generator.respond(TaskKind::WeeklyMealPlan, weekly_plan_json());
    app.generator.respond(
        TaskKind::DayMealEdit,
        json!({ "meals": [meal_json("Paneer bowl", 650)] }).to_string(),
    );
    let (user, goal_id, weekly_id) = ready_user(&app).await;

    let plan: Value = create_plan(&app, &user, goal_id, weekly_id).await.json().await.unwrap();
    let plan_id = plan["id"].as_str().unwrap();
    let day_id = plan["dayMeals"][2]["id"].as_str().unwrap();

    let response = app
        .client
        .post(app.url(&format!(
            "/customizeMealPlan?mealPlanId={}&dayMealId={}&userPrompt=more%20paneer",
            plan_id, day_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mealPlanId"], plan["id"]);
    assert_eq!(body["mainGoalId"], goal_id.to_string());
    assert_eq!(body["weeklyGoalId"], weekly_id.to_string());

    let updated: Value = app
        .client
        .get(app.url(&format!(
            "/getMealPlan?userId={}&mainGoalId={}&weeklyGoalId={}",
            user.user_id, goal_id, weekly_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let day = &updated["dayMeals"][2];
    assert_eq!(day["id"], plan["dayMeals"][2]["id"]);
    assert_eq!(day["date"], plan["dayMeals"][2]["date"]);
    assert_eq!(day["meals"].as_array().unwrap().len(), 1);
    assert_eq!(day["meals"][0]["name"], "Paneer bowl");
    // Other days untouched
    assert_eq!(updated["dayMeals"][1], plan["dayMeals"][1]);
}

#[tokio::test]
async fn plans_of_another_user_are_forbidden() {
    let app = spawn_app().await;
    app.generator.respond(TaskKind::WeeklyMealPlan, weekly_plan_json());
    let (owner, goal_id, weekly_id) = ready_user(&app).await;
    let intruder = app.register_and_login().await;

    let plan: Value = create_plan(&app, &owner, goal_id, weekly_id).await.json().await.unwrap();
    let plan_id = plan["id"].as_str().unwrap();
    let meal_id = plan["dayMeals"][0]["meals"][0]["id"].as_str().unwrap();

    let response = app
        .client
        .post(app.url(&format!(
            "/consumeMeal?mealPlanId={}&mealId={}",
            plan_id, meal_id
        )))
        .bearer_auth(&intruder.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = dashboard(&app, &intruder).await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .client
        .get(app.url(&format!("/dashboard?userId={}", owner.user_id)))
        .bearer_auth(&intruder.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn schema_violations_are_bad_gateway() {
    let app = spawn_app().await;
    app.generator.respond(
        TaskKind::WeeklyMealPlan,
        json!({ "mealPlans": [{ "dayOfWeek": "Monday", "meals": [{ "name": "Oats" }] }] }).to_string(),
    );
    let (user, goal_id, weekly_id) = ready_user(&app).await;

    let response = create_plan(&app, &user, goal_id, weekly_id).await;
    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_generation");
    assert!(body["error"].as_str().unwrap().contains("mealPlans[0].meals[0].calories"));

    // Nothing was stored, so a retry is allowed
    app.generator.respond(TaskKind::WeeklyMealPlan, weekly_plan_json());
    let response = create_plan(&app, &user, goal_id, weekly_id).await;
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let app = spawn_app().await;
    let (user, _, _) = ready_user(&app).await;

    // No scripted answer: the generator reports an empty response
    let response = app
        .client
        .get(app.url(&format!(
            "/getIdealWeight?userId={}&currentWeightInKg=80&currentBodyFatPercentage=0",
            user.user_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_generation");
}

#[tokio::test]
async fn advice_answers_are_typed() {
    let app = spawn_app().await;
    app.generator.respond(
        TaskKind::Tdee,
        json!({
            "bmr": 1650,
            "tdee": [
                { "description": "Desk job, no exercise", "tdee": 1980, "lifestyle": "Sedentary" },
                { "description": "Daily training", "tdee": 2550, "lifestyle": "Very Active" }
            ]
        })
        .to_string(),
    );
    let (user, _, _) = ready_user(&app).await;

    let response = app
        .client
        .get(app.url(&format!(
            "/getTdee?userId={}&currentWeightInKg=80&goalWeightInKg=72&currentBodyFatPercentage=24&goalBodyFatPercentage=18&goalType=Fat%20loss",
            user.user_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["bmr"], 1650);
    assert_eq!(body["tdee"][1]["lifestyle"], "Very Active");

    // A lifestyle outside the enum is rejected with its path
    app.generator.respond(
        TaskKind::Tdee,
        json!({ "bmr": 1650, "tdee": [{ "description": "x", "tdee": 1980, "lifestyle": "Lazy" }] })
            .to_string(),
    );
    let response = app
        .client
        .get(app.url(&format!(
            "/getTdee?userId={}&currentWeightInKg=80&goalWeightInKg=72&currentBodyFatPercentage=24&goalBodyFatPercentage=18&goalType=Fat%20loss",
            user.user_id
        )))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("tdee[0].lifestyle"));
}
