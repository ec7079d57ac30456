//! Meal plan generation.
//!
//! A one-day plan is a single prompt. A week plan asks for each day in turn
//! and stitches the answers together under `### Day N` headings. The plan is
//! only recorded in the session once every day has been generated.

use crate::generation::{GenerationRequest, ImageAttachment, TextGenerator};
use crate::session::Session;
use crate::{prompts, Error, PlanRecord, PlanScope, Result};
use chrono::{NaiveDate, Utc};

/// Most grocery/fridge photos accepted per request
pub const MAX_PLAN_IMAGES: usize = 3;

/// What the user asked for
#[derive(Clone, Debug)]
pub struct PlanRequest {
    pub scope: PlanScope,
    /// Free-text list of foods on hand
    pub pantry: String,
    pub images: Vec<ImageAttachment>,
}

impl PlanRequest {
    pub fn new(scope: PlanScope) -> Self {
        Self {
            scope,
            pantry: String::new(),
            images: Vec::new(),
        }
    }
}

/// Generate a meal plan for the session's profile and append it to history.
///
/// Fails with [`Error::Validation`] when no profile is saved or too many
/// images are attached. Generation failures leave the session unchanged.
pub fn generate_meal_plan<G>(
    session: &mut Session,
    request: &PlanRequest,
    generator: &G,
    today: NaiveDate,
) -> Result<PlanRecord>
where
    G: TextGenerator + ?Sized,
{
    let profile = session.require_profile()?;
    if request.images.len() > MAX_PLAN_IMAGES {
        return Err(Error::Validation(format!(
            "upload up to {} images (got {})",
            MAX_PLAN_IMAGES,
            request.images.len()
        )));
    }
    let diet_summary = session.diet_summary.as_deref();

    let meal_plan = match request.scope {
        PlanScope::OneDay => {
            let prompt = prompts::one_day_plan(profile, diet_summary);
            generator.generate(&GenerationRequest::text(prompt))?
        }
        PlanScope::Week => {
            let mut output = String::new();
            for day in 1..=request.scope.days() {
                let prompt = prompts::week_day_plan(
                    profile,
                    day,
                    !request.images.is_empty(),
                    &request.pantry,
                    diet_summary,
                );
                tracing::info!("Generating meal plan for day {}", day);
                let daily = generator.generate(&GenerationRequest::with_images(
                    prompt,
                    request.images.clone(),
                ))?;
                output.push_str(&format!("\n\n### Day {}\n{}", day, daily.trim()));
            }
            output
        }
    };

    let record = PlanRecord {
        date: today,
        scope: request.scope,
        meal_plan,
        created_at: Utc::now(),
    };
    session.history.push(record.clone());
    tracing::info!(
        "Recorded {:?} meal plan ({} plans in history)",
        record.scope,
        session.history.len()
    );
    Ok(record)
}
