#![forbid(unsafe_code)]

//! Core domain model and business logic for the wellness meal planner.
//!
//! This crate provides:
//! - Domain types (profiles, diet log entries, meal plans)
//! - Health metrics (BMI, BMR, TDEE) and calorie strategy
//! - Profile and diet log persistence (in-memory and JSONL backends)
//! - Diet diary ordering and summaries
//! - Meal plan generation through a pluggable text generator
//! - Session persistence and export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
mod files;
pub mod metrics;
pub mod profile;
pub mod store;
pub mod jsonl;
pub mod generation;
pub mod prompts;
pub mod diary;
pub mod planner;
pub mod session;
pub mod export;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use types::*;
pub use catalog::{form_catalog, merge_selections};
pub use config::Config;
pub use metrics::{
    calorie_strategy, classify_bmi, compute_bmi, compute_bmr, compute_tdee, interpret_bmi,
    BmiCategory, CalorieStrategy, HealthMetrics,
};
pub use store::{
    append_log_entry, create_profile, get_profile, list_log_entries, MemoryStore, WellnessStore,
};
pub use jsonl::JsonlStore;
pub use generation::{
    generator_from_config, CommandGenerator, GenerationRequest, HttpGenerator, ImageAttachment,
    TextGenerator,
};
pub use diary::{describe_meal, group_by_date, summarize_day, MealInput};
pub use planner::{generate_meal_plan, PlanRequest};
pub use session::Session;
