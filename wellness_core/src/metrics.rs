//! Health metric calculations.
//!
//! Pure functions converting biometric inputs into:
//! - BMI (Body Mass Index)
//! - BMR (Basal Metabolic Rate, Mifflin-St Jeor)
//! - TDEE (Total Daily Energy Expenditure)
//! - A qualitative BMI interpretation and a goal-based calorie strategy
//!
//! All rounding is half-to-even ("banker's rounding"), applied to the final
//! value of each formula.

use crate::{ActivityLevel, Gender};
use serde::{Deserialize, Serialize};

/// Round the exact binary value of `value` to the given number of decimal
/// places, ties to even.
///
/// Scaling by a power of ten first would round twice: `7.525000000000000355`
/// times 100 lands on `752.5` and would round down.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

fn round_to_int(value: f64) -> i32 {
    value.round_ties_even() as i32
}

/// Body Mass Index: `weight_kg / height_m^2`, rounded to 2 decimal places.
///
/// `height_cm` must be non-zero; callers validate ranges before calling.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round_to(weight_kg / (height_m * height_m), 2)
}

/// Basal Metabolic Rate using the Mifflin-St Jeor equation, rounded to kcal.
///
/// - Male: `10w + 6.25h - 5a + 5`
/// - Everyone else: `10w + 6.25h - 5a - 161`
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> i32 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female | Gender::Other => -161.0,
    };
    round_to_int(base + offset)
}

/// Total Daily Energy Expenditure: BMR scaled by the activity multiplier.
pub fn compute_tdee(bmr: i32, activity_level: ActivityLevel) -> i32 {
    round_to_int(f64::from(bmr) * activity_level.multiplier())
}

/// BMI band
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn name(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => {
                "consider nutrient-dense meals and strength training"
            }
            BmiCategory::NormalWeight => "keep maintaining with a balanced diet",
            BmiCategory::Overweight => "slight calorie deficit and movement can help",
            BmiCategory::Obese => "focus on sustainable weight loss and whole foods",
        }
    }
}

/// Classify a BMI value.
///
/// The thresholds are checked in order. The Normal band ends at 24.9 while
/// Overweight starts at 25.0; values in `[24.9, 25.0)` stay Normal weight.
#[allow(clippy::if_same_then_else)]
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 24.9 {
        BmiCategory::NormalWeight
    } else if bmi < 25.0 {
        BmiCategory::NormalWeight
    } else if bmi < 29.9 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Advisory text for a BMI value, e.g. "Normal weight – keep maintaining..."
pub fn interpret_bmi(bmi: f64) -> String {
    let category = classify_bmi(bmi);
    format!("{} – {}", category.name(), category.advice())
}

/// The derived values stored alongside a profile
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthMetrics {
    pub bmi: f64,
    pub bmr: i32,
    pub tdee: i32,
}

impl HealthMetrics {
    pub fn compute(
        weight_kg: f64,
        height_cm: f64,
        age: u32,
        gender: Gender,
        activity_level: ActivityLevel,
    ) -> Self {
        let bmi = compute_bmi(weight_kg, height_cm);
        let bmr = compute_bmr(weight_kg, height_cm, age, gender);
        let tdee = compute_tdee(bmr, activity_level);
        Self { bmi, bmr, tdee }
    }
}

/// Daily calorie guidance derived from the user's goals
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CalorieStrategy {
    /// 10–25% below TDEE
    LoseWeight { min_kcal: i32, max_kcal: i32 },
    /// 10–20% above TDEE
    GainMuscle { min_kcal: i32, max_kcal: i32 },
    /// Stay close to TDEE while stabilising blood sugar
    Metabolic { target_kcal: i32 },
    Maintain { target_kcal: i32 },
}

/// Pick a calorie strategy from free-text goals.
///
/// The first matching goal wins, checked in the order: lose weight, gain
/// muscle, improve metabolic markers.
pub fn calorie_strategy(goals: &[String], tdee: i32) -> CalorieStrategy {
    let joined = goals.join(", ").to_lowercase();
    let scaled = |factor: f64| round_to_int(f64::from(tdee) * factor);

    if joined.contains("lose weight") {
        CalorieStrategy::LoseWeight {
            min_kcal: scaled(0.75),
            max_kcal: scaled(0.9),
        }
    } else if joined.contains("gain muscle") {
        CalorieStrategy::GainMuscle {
            min_kcal: scaled(1.1),
            max_kcal: scaled(1.2),
        }
    } else if joined.contains("improve metabolic markers") {
        CalorieStrategy::Metabolic { target_kcal: tdee }
    } else {
        CalorieStrategy::Maintain { target_kcal: tdee }
    }
}

impl CalorieStrategy {
    /// Human-readable guidance lines
    pub fn describe(&self) -> Vec<String> {
        match self {
            CalorieStrategy::LoseWeight { min_kcal, max_kcal } => vec![
                "To lose weight, aim to eat 10–25% fewer calories than your TDEE.".into(),
                format!("Target intake: {}–{} kcal/day", min_kcal, max_kcal),
                "Focus on high protein, fiber-rich foods, and hydration.".into(),
            ],
            CalorieStrategy::GainMuscle { min_kcal, max_kcal } => vec![
                "To gain lean muscle, aim to eat 10–20% more than your TDEE.".into(),
                format!("Target intake: {}–{} kcal/day", min_kcal, max_kcal),
                "Prioritize protein, resistance training, and meal timing.".into(),
            ],
            CalorieStrategy::Metabolic { target_kcal } => vec![
                "Prioritize complex carbs, healthy fats, and moderate calories.".into(),
                format!("Aim to stay close to your TDEE: {} kcal/day", target_kcal),
                "Avoid extreme deficits or surpluses.".into(),
            ],
            CalorieStrategy::Maintain { .. } => vec![
                "Stick to your TDEE range for maintenance and adjust as needed.".into(),
            ],
        }
    }
}
