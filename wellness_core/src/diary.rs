//! Diet diary: capturing meals and ordering logged entries for display.
//!
//! Display order is by date, newest first, then by time of day ascending
//! within a date. Times are free text; when they parse as a clock time they
//! are compared as times, otherwise they sort after the parsed ones by
//! their text.

use crate::generation::{GenerationRequest, ImageAttachment, TextGenerator};
use crate::{prompts, DietLogEntry, Error, MealInputType, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use std::cmp::Ordering;

/// Clock format used when the user gives no time, e.g. `08:30 AM`
pub const DEFAULT_TIME_FORMAT: &str = "%I:%M %p";

const TIME_FORMATS: [&str; 4] = ["%I:%M %p", "%I:%M%p", "%H:%M", "%H:%M:%S"];

/// Raw meal input before it becomes a text description
#[derive(Clone, Debug)]
pub enum MealInput {
    Text(String),
    Image(ImageAttachment),
    Audio(Vec<u8>),
}

impl MealInput {
    pub fn input_type(&self) -> MealInputType {
        match self {
            MealInput::Text(_) => MealInputType::Text,
            MealInput::Image(_) => MealInputType::Image,
            MealInput::Audio(_) => MealInputType::Audio,
        }
    }
}

/// Current local time in [`DEFAULT_TIME_FORMAT`]
pub fn default_time() -> String {
    Local::now().format(DEFAULT_TIME_FORMAT).to_string()
}

/// Turn a meal input into a food description.
///
/// Text is used as written. Images and audio are described by the
/// generator. An empty result is rejected.
pub fn describe_meal<G>(input: &MealInput, generator: &G) -> Result<String>
where
    G: TextGenerator + ?Sized,
{
    let description = match input {
        MealInput::Text(text) => text.clone(),
        MealInput::Image(image) => generator.generate(&GenerationRequest::with_images(
            prompts::MEAL_IMAGE_PROMPT,
            vec![image.clone()],
        ))?,
        MealInput::Audio(audio) => {
            // The backend only accepts text and images; the audio is not forwarded.
            tracing::debug!("Describing audio meal input ({} bytes)", audio.len());
            generator.generate(&GenerationRequest::text(prompts::MEAL_AUDIO_PROMPT))?
        }
    };

    let description = description.trim().to_string();
    if description.is_empty() {
        return Err(Error::Validation(
            "please enter or upload your meal".into(),
        ));
    }
    Ok(description)
}

/// Parse a free-text clock time in any of the accepted formats
pub fn parse_time(time: &str) -> Option<NaiveTime> {
    let trimmed = time.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
}

fn compare_times(a: &str, b: &str) -> Ordering {
    match (parse_time(a), parse_time(b)) {
        (Some(ta), Some(tb)) => ta.cmp(&tb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Distinct logged dates, newest first
pub fn log_dates(entries: &[DietLogEntry]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    dates
}

/// Entries for one date, earliest time first
pub fn entries_for_date(entries: &[DietLogEntry], date: NaiveDate) -> Vec<DietLogEntry> {
    let mut day: Vec<DietLogEntry> = entries
        .iter()
        .filter(|e| e.date == date)
        .cloned()
        .collect();
    day.sort_by(|a, b| compare_times(&a.time, &b.time));
    day
}

/// All entries grouped by date in display order
pub fn group_by_date(entries: &[DietLogEntry]) -> Vec<(NaiveDate, Vec<DietLogEntry>)> {
    log_dates(entries)
        .into_iter()
        .map(|date| (date, entries_for_date(entries, date)))
        .collect()
}

/// Ask the generator to summarize one day's meals
pub fn summarize_day<G>(entries: &[DietLogEntry], generator: &G) -> Result<String>
where
    G: TextGenerator + ?Sized,
{
    if entries.is_empty() {
        return Err(Error::Validation("no meals logged for this day".into()));
    }
    let summary = generator.generate(&GenerationRequest::text(prompts::daily_summary(entries)))?;
    tracing::info!("Summarized {} meals", entries.len());
    Ok(summary.trim().to_string())
}
