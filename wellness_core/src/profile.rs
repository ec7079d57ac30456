//! Profile validation and construction.
//!
//! A [`Profile`] is built from validated [`ProfileInput`] in one step:
//! derived metrics are computed once, an identifier is assigned and blank
//! optional fields are normalised away.

use crate::metrics::HealthMetrics;
use crate::{Error, Profile, ProfileInput, Result};
use chrono::{DateTime, Utc};
use std::ops::RangeInclusive;
use uuid::Uuid;

pub const AGE_RANGE: RangeInclusive<u32> = 10..=100;
pub const HEIGHT_CM_RANGE: RangeInclusive<f64> = 100.0..=250.0;
pub const WEIGHT_KG_RANGE: RangeInclusive<f64> = 30.0..=200.0;
pub const BODY_FAT_PCT_RANGE: RangeInclusive<f64> = 5.0..=50.0;

fn check_range<T>(field: &str, value: T, range: &RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be between {} and {} (got {})",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl ProfileInput {
    /// Check every numeric field against its documented range
    pub fn validate(&self) -> Result<()> {
        check_range("age", self.age, &AGE_RANGE)?;
        check_range("height_cm", self.height_cm, &HEIGHT_CM_RANGE)?;
        check_range("weight_kg", self.weight_kg, &WEIGHT_KG_RANGE)?;
        if let Some(body_fat) = self.body_fat_pct {
            check_range("body_fat_pct", body_fat, &BODY_FAT_PCT_RANGE)?;
        }
        Ok(())
    }

    /// Derived metrics for these inputs
    pub fn metrics(&self) -> HealthMetrics {
        HealthMetrics::compute(
            self.weight_kg,
            self.height_cm,
            self.age,
            self.gender,
            self.activity_level,
        )
    }
}

impl Profile {
    /// Validate the input and build a complete profile with a fresh id
    pub fn from_input(input: ProfileInput, now: DateTime<Utc>) -> Result<Self> {
        input.validate()?;
        let metrics = input.metrics();

        Ok(Profile {
            user_id: Uuid::new_v4(),
            age: input.age,
            gender: input.gender,
            height_cm: input.height_cm,
            weight_kg: input.weight_kg,
            body_fat_pct: input.body_fat_pct,
            activity_level: input.activity_level,
            allergies: clean_list(input.allergies),
            diet_type: input.diet_type,
            cooking_equipment: input.cooking_equipment.trim().to_string(),
            goals: clean_list(input.goals),
            goal_details: non_blank(input.goal_details),
            bmi: metrics.bmi,
            bmr: metrics.bmr,
            tdee: metrics.tdee,
            created_at: now,
        })
    }

    /// The metrics stored with this profile (never recomputed)
    pub fn metrics(&self) -> HealthMetrics {
        HealthMetrics {
            bmi: self.bmi,
            bmr: self.bmr,
            tdee: self.tdee,
        }
    }
}
