// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{advice, auth, dashboard, goals, meals, profile},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: registration, login and token refresh.
/// * Everything else sits behind the bearer-token middleware.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/requestAccessToken", post(auth::request_access_token));

    let protected_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        // Goals
        .route("/registerGoal", post(goals::register_goal))
        .route("/registerWeeklyGoal", post(goals::register_weekly_goal))
        .route("/getUserGoals", get(goals::get_user_goals))
        .route("/deleteMainGoal", delete(goals::delete_main_goal))
        .route("/deleteWeeklyGoal", delete(goals::delete_weekly_goal))
        // Advice
        .route("/getIdealWeight", get(advice::get_ideal_weight))
        .route("/getGoalDuration", get(advice::get_goal_duration))
        .route("/getTdee", get(advice::get_tdee))
        .route("/getMacros", get(advice::get_macros))
        // Meal plans
        .route("/getMealPlan", get(meals::get_meal_plan))
        .route("/createMealPlan", post(meals::create_meal_plan))
        .route("/customizeMealPlan", post(meals::customize_meal_plan))
        .route("/consumeMeal", post(meals::consume_meal))
        .route("/dashboard", get(dashboard::get_dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
