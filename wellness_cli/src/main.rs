use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wellness_core::diary::{default_time, entries_for_date, log_dates};
use wellness_core::export::{export_logs_csv, write_plan_pdf, write_plan_text};
use wellness_core::*;

#[derive(Parser)]
#[command(name = "wellness")]
#[command(about = "Wellness meal plan generator and diet tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    /// One day: breakfast, lunch, dinner and snacks
    Day,
    /// Seven days, generated one day at a time
    Week,
}

impl From<ScopeArg> for PlanScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Day => PlanScope::OneDay,
            ScopeArg::Week => PlanScope::Week,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Save your health profile and show your body stats
    Profile {
        #[arg(long)]
        age: u32,

        /// Female, Male or Other
        #[arg(long)]
        gender: Gender,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// Body fat percentage, if known
        #[arg(long)]
        body_fat: Option<f64>,

        /// sedentary, lightly-active, moderately-active, very-active, super-active
        #[arg(long, default_value = "sedentary")]
        activity: ActivityLevel,

        /// Known allergy or intolerance (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,

        /// Other allergies, comma-separated
        #[arg(long, default_value = "")]
        other_allergies: String,

        /// None, Vegetarian, Vegan, Keto, Paleo or Other
        #[arg(long, default_value = "None")]
        diet: DietType,

        /// Available cooking equipment
        #[arg(long, default_value = "")]
        equipment: String,

        /// Health goal (repeatable)
        #[arg(long = "goal")]
        goals: Vec<String>,

        /// Any other goals or motivations
        #[arg(long, default_value = "")]
        other_goal: String,

        /// Specific goal details or timeline
        #[arg(long)]
        goal_details: Option<String>,
    },

    /// Show the body stats of the current profile
    Stats,

    /// List the options offered on the profile form
    Options,

    /// Log a meal
    Log {
        /// Date of the meal (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Time of the meal, e.g. "08:30 AM" (default now)
        #[arg(long)]
        time: Option<String>,

        /// Describe the meal in words
        #[arg(long, conflicts_with_all = ["image", "audio"])]
        text: Option<String>,

        /// Photo of the meal (jpg, jpeg, png)
        #[arg(long, conflicts_with = "audio")]
        image: Option<PathBuf>,

        /// Audio description of the meal (mp3, wav, m4a)
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Likes/dislikes about the meal
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Show logged meals
    Logs {
        /// Only show this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Summarize one day's meals
    Summarize {
        /// Date to summarize (default: most recent logged day)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Use the summary to adjust the next meal plan
        #[arg(long)]
        adjust_plan: bool,
    },

    /// Generate a personalized meal plan
    Plan {
        #[arg(long, value_enum, default_value = "day")]
        scope: ScopeArg,

        /// Ingredients or foods in your fridge
        #[arg(long, default_value = "")]
        ingredients: String,

        /// Grocery receipt or fridge photo (up to 3)
        #[arg(long = "image")]
        images: Vec<PathBuf>,

        /// Also save the plan as a text file
        #[arg(long)]
        txt: Option<PathBuf>,

        /// Also save the plan as a PDF file
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Show previously generated meal plans
    History,

    /// Export logged meals
    Export {
        /// Append logged meals to this CSV file
        #[arg(long)]
        csv: PathBuf,
    },
}

fn main() -> ExitCode {
    wellness_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("⚠ {}", e);
            match e.kind() {
                ErrorKind::Validation => ExitCode::from(2),
                ErrorKind::Storage => ExitCode::from(3),
                ErrorKind::Generation => ExitCode::from(4),
                ErrorKind::Other => ExitCode::FAILURE,
            }
        }
    }
}

/// Paths derived from the data directory
struct Paths {
    session: PathBuf,
    data_dir: PathBuf,
}

impl Paths {
    fn new(data_dir: PathBuf) -> Self {
        Self {
            session: data_dir.join("session.json"),
            data_dir,
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(data_dir);
    tracing::debug!("Using data directory {:?}", paths.data_dir);
    let mut store = JsonlStore::in_dir(&paths.data_dir, &config.data.table);

    match cli.command {
        Commands::Profile {
            age,
            gender,
            height,
            weight,
            body_fat,
            activity,
            allergies,
            other_allergies,
            diet,
            equipment,
            goals,
            other_goal,
            goal_details,
        } => {
            let input = ProfileInput {
                age,
                gender,
                height_cm: height,
                weight_kg: weight,
                body_fat_pct: body_fat,
                activity_level: activity,
                allergies: merge_selections(&allergies, &other_allergies),
                diet_type: diet,
                cooking_equipment: equipment,
                goals: merge_selections(&goals, &other_goal),
                goal_details,
            };
            cmd_profile(&mut store, &paths, input)
        }
        Commands::Stats => cmd_stats(&paths),
        Commands::Options => {
            cmd_options();
            Ok(())
        }
        Commands::Log {
            date,
            time,
            text,
            image,
            audio,
            feedback,
        } => {
            let input = match (text, image, audio) {
                (Some(text), _, _) => MealInput::Text(text),
                (None, Some(path), _) => MealInput::Image(ImageAttachment::from_path(&path)?),
                (None, None, Some(path)) => MealInput::Audio(std::fs::read(&path)?),
                (None, None, None) => {
                    return Err(Error::Validation(
                        "please enter or upload your meal (--text, --image or --audio)".into(),
                    ))
                }
            };
            cmd_log(&mut store, &paths, &config, input, date, time, feedback)
        }
        Commands::Logs { date } => cmd_logs(&store, &paths, date),
        Commands::Summarize { date, adjust_plan } => {
            cmd_summarize(&store, &paths, &config, date, adjust_plan)
        }
        Commands::Plan {
            scope,
            ingredients,
            images,
            txt,
            pdf,
        } => {
            let exports = PlanExports { txt, pdf };
            cmd_plan(&paths, &config, scope.into(), ingredients, &images, exports)
        }
        Commands::History => cmd_history(&paths),
        Commands::Export { csv } => cmd_export(&store, &paths, &csv),
    }
}

fn cmd_profile(store: &mut JsonlStore, paths: &Paths, input: ProfileInput) -> Result<()> {
    let user_id = create_profile(store, input)?;
    let profile = get_profile(store, user_id)?;

    Session::update(&paths.session, |session| {
        session.set_profile(profile.clone());
        Ok(())
    })?;

    println!("✓ Profile saved and health stats calculated!");
    println!("  User ID: {}", user_id);
    display_stats(&profile);
    Ok(())
}

fn cmd_stats(paths: &Paths) -> Result<()> {
    let session = Session::load(&paths.session)?;
    display_stats(session.require_profile()?);
    Ok(())
}

fn display_stats(profile: &Profile) {
    println!();
    println!("  Your Body Stats");
    println!("  BMI:  {} – {}", profile.bmi, interpret_bmi(profile.bmi));
    println!(
        "  BMR:  {} kcal/day – Basal calories your body needs at rest",
        profile.bmr
    );
    println!(
        "  TDEE: {} kcal/day – Estimated daily calories needed with your activity level",
        profile.tdee
    );
    println!();
    for line in calorie_strategy(&profile.goals, profile.tdee).describe() {
        println!("  {}", line);
    }
    println!();
}

fn cmd_options() {
    let catalog = form_catalog();
    println!("Activity levels:");
    for (level, example) in &catalog.activity_examples {
        println!("  {:<18} {}", level.short_name(), level.label());
        println!("  {:<18} e.g. {}", "", example);
    }
    println!("Common allergies: {}", catalog.common_allergies.join(", "));
    println!("Goals: {}", catalog.goal_options.join(", "));
    let diets: Vec<&str> = catalog.diet_types.iter().map(|d| d.label()).collect();
    println!("Diet types: {}", diets.join(", "));
}

fn cmd_log(
    store: &mut JsonlStore,
    paths: &Paths,
    config: &Config,
    input: MealInput,
    date: Option<NaiveDate>,
    time: Option<String>,
    feedback: Option<String>,
) -> Result<()> {
    let session = Session::load(&paths.session)?;
    let user_id = session.require_profile()?.user_id;

    let food_description = match &input {
        MealInput::Text(_) => describe_meal(&input, &NoGenerator)?,
        _ => {
            let generator = generator_from_config(&config.generation)?;
            let description = describe_meal(&input, generator.as_ref())?;
            println!("Detected meal: {}", description);
            description
        }
    };

    let time = time
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(default_time);

    let log_id = append_log_entry(
        store,
        NewLogEntry {
            user_id,
            date: date.unwrap_or_else(|| Local::now().date_naive()),
            time,
            meal_input_type: input.input_type(),
            food_description,
            likes_dislikes: feedback,
        },
    )?;

    println!("✓ Meal logged! ({})", log_id);
    Ok(())
}

/// Text meals never reach the generator
struct NoGenerator;

impl TextGenerator for NoGenerator {
    fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        Err(Error::Generation("no generator available".into()))
    }
}

fn cmd_logs(store: &JsonlStore, paths: &Paths, date: Option<NaiveDate>) -> Result<()> {
    let session = Session::load(&paths.session)?;
    let user_id = session.require_profile()?.user_id;
    let entries = list_log_entries(store, user_id)?;

    if entries.is_empty() {
        println!("No meals logged yet.");
        return Ok(());
    }

    let groups = match date {
        Some(date) => vec![(date, entries_for_date(&entries, date))],
        None => group_by_date(&entries),
    };

    for (date, day) in groups {
        println!("── {} ──", date);
        if day.is_empty() {
            println!("  No meals logged on this day.");
        }
        for entry in day {
            let time = if entry.time.is_empty() {
                "[Unknown time]"
            } else {
                entry.time.as_str()
            };
            println!("  {} — {}", time, entry.meal_input_type);
            println!("    {}", entry.food_description);
            if let Some(feedback) = &entry.likes_dislikes {
                println!("    Feedback: {}", feedback);
            }
        }
    }
    Ok(())
}

fn cmd_summarize(
    store: &JsonlStore,
    paths: &Paths,
    config: &Config,
    date: Option<NaiveDate>,
    adjust_plan: bool,
) -> Result<()> {
    let session = Session::load(&paths.session)?;
    let user_id = session.require_profile()?.user_id;
    let entries = list_log_entries(store, user_id)?;

    let Some(date) = date.or_else(|| log_dates(&entries).first().copied()) else {
        println!("No meals logged yet.");
        return Ok(());
    };

    let day = entries_for_date(&entries, date);
    let generator = generator_from_config(&config.generation)?;
    let summary = summarize_day(&day, generator.as_ref())?;

    println!("Daily Summary ({})", date);
    println!("{}", summary);

    if adjust_plan {
        Session::update(&paths.session, |session| {
            session.diet_summary = Some(summary.clone());
            Ok(())
        })?;
        println!("\n✓ The next meal plan will take this summary into account.");
    }
    Ok(())
}

/// Files to save a freshly generated plan to
struct PlanExports {
    txt: Option<PathBuf>,
    pdf: Option<PathBuf>,
}

fn cmd_plan(
    paths: &Paths,
    config: &Config,
    scope: PlanScope,
    ingredients: String,
    images: &[PathBuf],
    exports: PlanExports,
) -> Result<()> {
    let images = images
        .iter()
        .map(|path| ImageAttachment::from_path(path))
        .collect::<Result<Vec<_>>>()?;
    let request = PlanRequest {
        scope,
        pantry: ingredients,
        images,
    };
    let generator = generator_from_config(&config.generation)?;
    let today = Local::now().date_naive();

    let mut produced = None;
    Session::update(&paths.session, |session| {
        produced = Some(generate_meal_plan(session, &request, generator.as_ref(), today)?);
        Ok(())
    })?;

    let Some(plan) = produced else {
        return Err(Error::Generation("no meal plan was produced".into()));
    };

    println!("Your Personalized Meal Plan");
    println!("{}", plan.meal_plan.trim_start());

    if let Some(path) = exports.txt {
        write_plan_text(&plan, &path)?;
        println!("\n✓ Saved to {}", path.display());
    }
    if let Some(path) = exports.pdf {
        write_plan_pdf(&plan, &path)?;
        println!("\n✓ Saved to {}", path.display());
    }
    Ok(())
}

fn cmd_history(paths: &Paths) -> Result<()> {
    let session = Session::load(&paths.session)?;
    if session.history.is_empty() {
        println!("No meal plans generated yet.");
        return Ok(());
    }

    println!("Previous Meal Plans");
    for (i, plan) in session.history_newest_first().enumerate() {
        println!("\n### Day {} ({})", i + 1, plan.date);
        println!("{}", plan.meal_plan.trim());
    }
    Ok(())
}

fn cmd_export(store: &JsonlStore, paths: &Paths, csv_path: &Path) -> Result<()> {
    let session = Session::load(&paths.session)?;
    let user_id = session.require_profile()?.user_id;
    let entries = list_log_entries(store, user_id)?;

    let count = export_logs_csv(&entries, csv_path)?;
    if count == 0 {
        println!("No meals logged yet - nothing to export.");
    } else {
        println!("✓ Exported {} meals to {}", count, csv_path.display());
    }
    Ok(())
}
