//! Export of meal plans and diet logs.
//!
//! Plans are exported as UTF-8 text or as an A4 PDF. Diet logs are appended
//! to a CSV archive, writing the header only when the file is new.

use crate::{DietLogEntry, Error, PlanRecord, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::OpenOptions;
use std::path::Path;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const FONT_SIZE_PT: f32 = 12.0;
/// Helvetica 12pt fits roughly this many characters between the margins
const WRAP_COLUMNS: usize = 90;

/// A row in the diet log CSV archive
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    log_id: String,
    user_id: String,
    date: String,
    time: &'a str,
    meal_input_type: &'a str,
    food_description: &'a str,
    likes_dislikes: &'a str,
}

impl<'a> From<&'a DietLogEntry> for CsvRow<'a> {
    fn from(entry: &'a DietLogEntry) -> Self {
        CsvRow {
            log_id: entry.log_id.to_string(),
            user_id: entry.user_id.to_string(),
            date: entry.date.to_string(),
            time: &entry.time,
            meal_input_type: entry.meal_input_type.label(),
            food_description: &entry.food_description,
            likes_dislikes: entry.likes_dislikes.as_deref().unwrap_or(""),
        }
    }
}

/// The plan text as downloadable bytes
pub fn plan_as_text(plan: &PlanRecord) -> Vec<u8> {
    plan.meal_plan.as_bytes().to_vec()
}

/// Write the plan text to a file, replacing it
pub fn write_plan_text(plan: &PlanRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, plan_as_text(plan))?;
    tracing::info!("Wrote meal plan to {:?}", path);
    Ok(())
}

/// Render the plan as a PDF document
pub fn plan_as_pdf(plan: &PlanRecord) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Meal Plan",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Storage(format!("failed to load PDF font: {:?}", e)))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut pages = 1;

    for line in pdf_lines(&plan.meal_plan) {
        if y < MARGIN_MM {
            let (page, next) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(next);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
            pages += 1;
        }
        if !line.is_empty() {
            layer.use_text(line, FONT_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
        }
        y -= LINE_HEIGHT_MM;
    }

    tracing::debug!("Rendered meal plan PDF ({} pages)", pages);
    doc.save_to_bytes()
        .map_err(|e| Error::Storage(format!("failed to render PDF: {:?}", e)))
}

/// Write the plan as a PDF file, replacing it
pub fn write_plan_pdf(plan: &PlanRecord, path: &Path) -> Result<()> {
    let bytes = plan_as_pdf(plan)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!("Wrote meal plan PDF to {:?}", path);
    Ok(())
}

/// Split plan text into printable lines: the built-in PDF fonts only cover
/// plain ASCII, and long lines wrap at word boundaries.
fn pdf_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let line: String = raw.chars().map(ascii_fallback).collect();
        let line = line.trim_end();
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in line.split(' ') {
            if !current.is_empty() && current.len() + 1 + word.len() > WRAP_COLUMNS {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            while current.len() > WRAP_COLUMNS {
                let rest = current.split_off(WRAP_COLUMNS);
                lines.push(std::mem::replace(&mut current, rest));
            }
        }
        lines.push(current);
    }
    lines
}

fn ascii_fallback(c: char) -> char {
    match c {
        '\u{2013}' | '\u{2014}' | '\u{2022}' => '-',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\t' => ' ',
        c if c.is_ascii() && !c.is_ascii_control() => c,
        _ => '?',
    }
}

/// Append diet log entries to a CSV archive and return how many were written
pub fn export_logs_csv(entries: &[DietLogEntry], csv_path: &Path) -> Result<usize> {
    if entries.is_empty() {
        tracing::info!("No diet log entries to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} diet log entries to {:?}", entries.len(), csv_path);
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MealInputType, PlanScope};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn entry(food: &str) -> DietLogEntry {
        DietLogEntry {
            log_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time: "08:30 AM".into(),
            meal_input_type: MealInputType::Image,
            food_description: food.into(),
            likes_dislikes: Some("liked it".into()),
        }
    }

    #[test]
    fn test_plan_text_bytes() {
        let plan = PlanRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            scope: PlanScope::OneDay,
            meal_plan: "Breakfast – oats".into(),
            created_at: Utc::now(),
        };
        assert_eq!(plan_as_text(&plan), "Breakfast – oats".as_bytes());

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/meal_plan.txt");
        write_plan_text(&plan, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Breakfast – oats");
    }

    #[test]
    fn test_plan_pdf() {
        let plan = PlanRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            scope: PlanScope::Week,
            meal_plan: (1..=7)
                .map(|day| format!("### Day {}\nBreakfast – oats\nLunch – salad\n", day))
                .collect::<Vec<_>>()
                .join("\n")
                .repeat(3),
            created_at: Utc::now(),
        };

        let bytes = plan_as_pdf(&plan).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/meal_plan.pdf");
        write_plan_pdf(&plan, &path).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_lines_wrap_and_replace() {
        let long = "word ".repeat(40);
        let lines = pdf_lines(&format!("Lunch – “salad”\n\n{}", long));
        assert_eq!(lines[0], "Lunch - \"salad\"");
        assert_eq!(lines[1], "");
        assert!(lines.len() > 3);
        assert!(lines.iter().all(|l| l.len() <= WRAP_COLUMNS));

        let unbroken = "x".repeat(WRAP_COLUMNS * 2 + 5);
        let lines = pdf_lines(&unbroken);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].len(), 5);
    }

    #[test]
    fn test_export_writes_header_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("logs.csv");

        assert_eq!(export_logs_csv(&[entry("oats, berries")], &csv_path).unwrap(), 1);
        assert_eq!(
            export_logs_csv(&[entry("rice"), entry("tea")], &csv_path).unwrap(),
            2
        );

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(contents.matches("log_id,user_id").count(), 1);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][5], "oats, berries");
        assert_eq!(&rows[0][4], "Image");
    }

    #[test]
    fn test_export_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("logs.csv");
        assert_eq!(export_logs_csv(&[], &csv_path).unwrap(), 0);
        assert!(!csv_path.exists());
    }
}
