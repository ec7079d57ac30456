//! Prompt text sent to the generation backend.

use crate::{DietLogEntry, Profile};

pub const MEAL_IMAGE_PROMPT: &str =
    "Describe the food content and estimate calories/macros from this image of a meal.";

pub const MEAL_AUDIO_PROMPT: &str =
    "Transcribe and summarize the food mentioned in the audio, with calorie/macro estimates.";

const ONE_DAY_PREAMBLE: &str = "You are a certified nutritionist and wellness coach. Create a 1-day meal plan.
Include breakfast, lunch, dinner, and 1–2 snacks with estimated portion sizes and macronutrients (calories, protein, carbs, fat).";

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

/// The "User Info" block shared by every meal plan prompt
pub fn user_info(profile: &Profile) -> String {
    let body_fat = profile
        .body_fat_pct
        .map(|bf| format!("{}%", bf))
        .unwrap_or_else(|| "not provided".to_string());

    let lines = [
        format!("- Age: {} years", profile.age),
        format!("- Gender: {}", profile.gender),
        format!("- Height: {} cm", profile.height_cm),
        format!("- Weight: {} kg", profile.weight_kg),
        format!("- Body Fat: {}", body_fat),
        format!("- Activity Level: {}", profile.activity_level),
        format!("- Allergies/Intolerances: {}", join_or_none(&profile.allergies)),
        format!("- Diet Type: {}", profile.diet_type),
        format!("- Cooking Equipment: {}", profile.cooking_equipment),
        format!("- Goal: {}", join_or_none(&profile.goals)),
        format!("- Details: {}", profile.goal_details.as_deref().unwrap_or("")),
        format!("- BMI: {}", profile.bmi),
        format!("- BMR: {} kcal/day", profile.bmr),
        format!("- TDEE: {} kcal/day", profile.tdee),
    ];
    format!("User Info:\n{}\n", lines.join("\n"))
}

fn diet_summary_line(diet_summary: Option<&str>) -> String {
    match diet_summary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(summary) => format!("\nRecent diet summary: {}", summary),
        None => String::new(),
    }
}

pub fn one_day_plan(profile: &Profile, diet_summary: Option<&str>) -> String {
    format!(
        "{}\n{}{}",
        ONE_DAY_PREAMBLE,
        user_info(profile),
        diet_summary_line(diet_summary)
    )
}

/// Prompt for day `day` (1-based) of a week plan
pub fn week_day_plan(
    profile: &Profile,
    day: u32,
    has_images: bool,
    pantry: &str,
    diet_summary: Option<&str>,
) -> String {
    let mut prompt = format!(
        "You are a certified nutritionist and wellness coach. Create a meal plan for **Day {}**.
Include breakfast, lunch, dinner, and 1–2 snacks with estimated portion sizes and macronutrients PER MEAL (calories, protein, carbs, fat). Only include calories and macronutrients per meal.
Try to keep it precise yet informative.
{}",
        day,
        user_info(profile)
    );

    if has_images {
        prompt.push_str("\nUse the uploaded grocery images to infer available ingredients.");
    }

    if pantry.trim().is_empty() {
        prompt.push_str("\nNo specific ingredients were provided. Use general healthy foods.");
    } else {
        prompt.push_str(&format!("\nAvailable Ingredients: {}", pantry.trim()));
    }

    prompt.push_str(&diet_summary_line(diet_summary));
    prompt
}

/// Prompt asking for a summary of one day's logged meals
pub fn daily_summary(entries: &[DietLogEntry]) -> String {
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            let time = if entry.time.is_empty() {
                "[Unknown time]"
            } else {
                entry.time.as_str()
            };
            let food = if entry.food_description.is_empty() {
                "[Image/Audio Upload]"
            } else {
                entry.food_description.as_str()
            };
            format!("Time: {} — {}", time, food)
        })
        .collect();

    format!(
        "{}\n\nSummarize total calories, macros, and meal patterns.",
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample_input;
    use crate::MealInputType;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn profile() -> Profile {
        Profile::from_input(sample_input(), Utc::now()).unwrap()
    }

    #[test]
    fn test_user_info_includes_metrics() {
        let info = user_info(&profile());
        assert!(info.contains("- Age: 30 years"));
        assert!(info.contains("- Gender: Male"));
        assert!(info.contains("- Body Fat: 20%"));
        assert!(info.contains("- Activity Level: Sedentary (little or no exercise)"));
        assert!(info.contains("- Allergies/Intolerances: Peanuts"));
        assert!(info.contains("- BMI: 22.86"));
        assert!(info.contains("- TDEE: 1979 kcal/day"));
    }

    #[test]
    fn test_week_day_prompt_ingredients() {
        let p = profile();
        let with_pantry = week_day_plan(&p, 3, true, "eggs, spinach", None);
        assert!(with_pantry.contains("**Day 3**"));
        assert!(with_pantry.contains("Use the uploaded grocery images"));
        assert!(with_pantry.contains("Available Ingredients: eggs, spinach"));

        let without = week_day_plan(&p, 1, false, "  ", None);
        assert!(!without.contains("grocery images"));
        assert!(without.contains("No specific ingredients were provided"));
    }

    #[test]
    fn test_diet_summary_appended() {
        let prompt = one_day_plan(&profile(), Some("Too much sugar at lunch"));
        assert!(prompt.ends_with("Recent diet summary: Too much sugar at lunch"));
        assert!(!one_day_plan(&profile(), Some(" ")).contains("Recent diet summary"));
    }

    #[test]
    fn test_daily_summary_prompt() {
        let entry = DietLogEntry {
            log_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time: "08:30 AM".into(),
            meal_input_type: MealInputType::Text,
            food_description: "Oatmeal with berries".into(),
            likes_dislikes: None,
        };
        let blank = DietLogEntry {
            time: String::new(),
            food_description: String::new(),
            ..entry.clone()
        };
        let prompt = daily_summary(&[entry, blank]);
        assert!(prompt.starts_with("Time: 08:30 AM — Oatmeal with berries\n"));
        assert!(prompt.contains("Time: [Unknown time] — [Image/Audio Upload]"));
        assert!(prompt.ends_with("Summarize total calories, macros, and meal patterns."));
    }
}
