// src/models/mod.rs

pub mod advice;
pub mod dashboard;
pub mod goal;
pub mod meal;
pub mod user;
