//! Built-in options offered on the profile form.
//!
//! Allergy and goal choices, diet types and activity-level guidance live
//! here so that every front end offers the same lists.

use crate::{ActivityLevel, DietType};
use once_cell::sync::Lazy;

/// Options offered when building a profile
#[derive(Clone, Debug)]
pub struct FormCatalog {
    pub common_allergies: Vec<&'static str>,
    pub goal_options: Vec<&'static str>,
    pub diet_types: Vec<DietType>,
    pub activity_examples: Vec<(ActivityLevel, &'static str)>,
}

static FORM_CATALOG: Lazy<FormCatalog> = Lazy::new(build_form_catalog);

/// Get a reference to the cached form catalog
pub fn form_catalog() -> &'static FormCatalog {
    &FORM_CATALOG
}

fn build_form_catalog() -> FormCatalog {
    FormCatalog {
        common_allergies: vec![
            "Dairy",
            "Eggs",
            "Fish",
            "Gluten",
            "Peanuts",
            "Shellfish",
            "Soy",
            "Tree nuts",
            "Wheat",
        ],
        goal_options: vec![
            "Lose weight",
            "Gain muscle",
            "Improve metabolic markers",
            "Maintain weight",
            "Other",
        ],
        diet_types: DietType::ALL.to_vec(),
        activity_examples: vec![
            (
                ActivityLevel::Sedentary,
                "Desk job, under 3,000 steps/day, little to no exercise",
            ),
            (
                ActivityLevel::LightlyActive,
                "3,000–7,000 steps/day, light exercise 1–3 times/week",
            ),
            (
                ActivityLevel::ModeratelyActive,
                "7,000–10,000 steps/day, regular workouts 3–5 times/week",
            ),
            (
                ActivityLevel::VeryActive,
                "10,000–15,000 steps/day, hard exercise 6–7 days/week",
            ),
            (
                ActivityLevel::SuperActive,
                "Intense daily training or physically demanding job",
            ),
        ],
    }
}

impl FormCatalog {
    /// Example lifestyle for an activity level
    pub fn activity_example(&self, level: ActivityLevel) -> Option<&'static str> {
        self.activity_examples
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, text)| *text)
    }

    /// Whether `allergy` is one of the listed common allergies (case-insensitive)
    pub fn is_common_allergy(&self, allergy: &str) -> bool {
        self.common_allergies
            .iter()
            .any(|a| a.eq_ignore_ascii_case(allergy.trim()))
    }
}

/// Combine selected options with comma-separated custom text.
///
/// Entries are trimmed, blanks dropped and duplicates (case-insensitive)
/// removed while keeping first-seen order.
pub fn merge_selections(selected: &[String], custom: &str) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let candidates = selected
        .iter()
        .map(|s| s.as_str())
        .chain(custom.split(','));

    for candidate in candidates {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            continue;
        }
        if merged.iter().any(|m| m.eq_ignore_ascii_case(trimmed)) {
            continue;
        }
        merged.push(trimmed.to_string());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists() {
        let catalog = form_catalog();
        assert_eq!(catalog.common_allergies.len(), 9);
        assert_eq!(catalog.goal_options.len(), 5);
        assert_eq!(catalog.diet_types.len(), 6);
        assert!(catalog.is_common_allergy("tree nuts"));
        assert!(!catalog.is_common_allergy("Kiwi"));
    }

    #[test]
    fn test_every_activity_level_has_example() {
        let catalog = form_catalog();
        for level in ActivityLevel::ALL {
            assert!(catalog.activity_example(level).is_some(), "{:?}", level);
        }
    }

    #[test]
    fn test_merge_selections() {
        let selected = vec!["Dairy".to_string(), "Eggs".to_string()];
        let merged = merge_selections(&selected, " kiwi, ,eggs ,Sesame ");
        assert_eq!(merged, vec!["Dairy", "Eggs", "kiwi", "Sesame"]);
    }

    #[test]
    fn test_merge_selections_empty() {
        assert!(merge_selections(&[], "").is_empty());
        assert!(merge_selections(&[], " , ").is_empty());
    }
}
