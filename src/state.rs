// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    generation::Generator,
    store::{GoalStore, MealPlanStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub goals: Arc<dyn GoalStore>,
    pub meal_plans: Arc<dyn MealPlanStore>,
    pub generator: Arc<dyn Generator>,
    pub config: Config,
}

impl AppState {
    /// Wires one backing store into all three store seams.
    pub fn new<S>(store: Arc<S>, generator: Arc<dyn Generator>, config: Config) -> Self
    where
        S: UserStore + GoalStore + MealPlanStore + 'static,
    {
        Self {
            users: store.clone(),
            goals: store.clone(),
            meal_plans: store,
            generator,
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
