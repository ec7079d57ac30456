//! Core domain types for the wellness system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Enumerated form fields (gender, activity level, diet type, meal input)
//! - Profile input and the persisted profile record
//! - Diet log entries
//! - Meal plan records

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Enumerated form fields
// ============================================================================

/// Gender as selected on the profile form
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    /// Total mapping from free text, used by the BMR formula dispatch.
    ///
    /// Only a case-insensitive "male" selects [`Gender::Male`]. Anything that
    /// is not "male" or "female" maps to [`Gender::Other`], which shares the
    /// female formula branch.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            "other" => Ok(Gender::Other),
            _ => Err(Error::Validation(format!(
                "gender must be one of Female, Male, Other (got {:?})",
                s
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Self-reported activity level, each with a fixed TDEE multiplier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    #[serde(rename = "Sedentary (little or no exercise)")]
    Sedentary,
    #[serde(rename = "Lightly active (light exercise/sports 1–3 days/week)")]
    LightlyActive,
    #[serde(rename = "Moderately active (moderate exercise/sports 3–5 days/week)")]
    ModeratelyActive,
    #[serde(rename = "Very active (hard exercise/sports 6–7 days/week)")]
    VeryActive,
    #[serde(rename = "Super active (very hard exercise/physical job)")]
    SuperActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::SuperActive,
    ];

    /// Full descriptive label, exactly as shown on the form
    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::LightlyActive => {
                "Lightly active (light exercise/sports 1–3 days/week)"
            }
            ActivityLevel::ModeratelyActive => {
                "Moderately active (moderate exercise/sports 3–5 days/week)"
            }
            ActivityLevel::VeryActive => "Very active (hard exercise/sports 6–7 days/week)",
            ActivityLevel::SuperActive => "Super active (very hard exercise/physical job)",
        }
    }

    /// Short command-line name
    pub fn short_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly-active",
            ActivityLevel::ModeratelyActive => "moderately-active",
            ActivityLevel::VeryActive => "very-active",
            ActivityLevel::SuperActive => "super-active",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::SuperActive => 1.9,
        }
    }

    /// Total mapping from an exact label; unknown labels fall back to Sedentary.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.label() == label)
            .unwrap_or(ActivityLevel::Sedentary)
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    /// Strict parse: accepts the exact label or the short name (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|level| {
                level.label() == wanted || level.short_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| Error::Validation(format!("unknown activity level {:?}", s)))
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dietary pattern preference
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DietType {
    #[default]
    #[serde(rename = "None")]
    NoPreference,
    Vegetarian,
    Vegan,
    Keto,
    Paleo,
    Other,
}

impl DietType {
    pub const ALL: [DietType; 6] = [
        DietType::NoPreference,
        DietType::Vegetarian,
        DietType::Vegan,
        DietType::Keto,
        DietType::Paleo,
        DietType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DietType::NoPreference => "None",
            DietType::Vegetarian => "Vegetarian",
            DietType::Vegan => "Vegan",
            DietType::Keto => "Keto",
            DietType::Paleo => "Paleo",
            DietType::Other => "Other",
        }
    }
}

impl FromStr for DietType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|diet| diet.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("unknown diet type {:?}", s)))
    }
}

impl fmt::Display for DietType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a logged meal was captured
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MealInputType {
    Text,
    Image,
    Audio,
}

impl MealInputType {
    pub fn label(&self) -> &'static str {
        match self {
            MealInputType::Text => "Text",
            MealInputType::Image => "Image",
            MealInputType::Audio => "Audio",
        }
    }
}

impl FromStr for MealInputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(MealInputType::Text),
            "image" => Ok(MealInputType::Image),
            "audio" => Ok(MealInputType::Audio),
            _ => Err(Error::Validation(format!("unknown meal input type {:?}", s))),
        }
    }
}

impl fmt::Display for MealInputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Profile Types
// ============================================================================

/// Raw profile form fields, before derived metrics are computed
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileInput {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub activity_level: ActivityLevel,
    pub allergies: Vec<String>,
    pub diet_type: DietType,
    pub cooking_equipment: String,
    pub goals: Vec<String>,
    pub goal_details: Option<String>,
}

/// A persisted user profile with metrics derived at save time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub body_fat_pct: Option<f64>,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub diet_type: DietType,
    #[serde(default)]
    pub cooking_equipment: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub goal_details: Option<String>,
    pub bmi: f64,
    pub bmr: i32,
    pub tdee: i32,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Diet Log Types
// ============================================================================

/// One recorded meal observation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DietLogEntry {
    pub log_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    pub meal_input_type: MealInputType,
    #[serde(default)]
    pub food_description: String,
    #[serde(default)]
    pub likes_dislikes: Option<String>,
}

/// Fields of a meal log before it is assigned an identifier
#[derive(Clone, Debug, PartialEq)]
pub struct NewLogEntry {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub meal_input_type: MealInputType,
    pub food_description: String,
    pub likes_dislikes: Option<String>,
}

// ============================================================================
// Meal Plan Types
// ============================================================================

/// How many days a generated meal plan covers
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanScope {
    OneDay,
    Week,
}

impl PlanScope {
    pub fn days(&self) -> u32 {
        match self {
            PlanScope::OneDay => 1,
            PlanScope::Week => 7,
        }
    }
}

/// A generated meal plan kept in the session history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanRecord {
    pub date: NaiveDate,
    pub scope: PlanScope,
    pub meal_plan: String,
    pub created_at: DateTime<Utc>,
}
