// src/utils/mod.rs

pub mod deadline;
pub mod extract;
pub mod hash;
pub mod html;
pub mod jwt;
pub mod time;
pub mod validation;
