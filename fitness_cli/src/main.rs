use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use fitness_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(about = "Workout history, training schedule and calorie calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily calorie calculator
    Calories {
        #[command(subcommand)]
        action: CaloriesAction,
    },

    /// Workout history
    Workout {
        #[command(subcommand)]
        action: WorkoutAction,
    },

    /// Training calendar
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
}

#[derive(Subcommand)]
enum CaloriesAction {
    /// Estimate daily calories
    Calc(CalcArgs),

    /// Show saved calculations, newest first
    History,

    /// List activity levels and multipliers
    Levels,
}

#[derive(Args)]
struct CalcArgs {
    /// Age in years
    #[arg(long)]
    age: String,

    /// Height in centimetres
    #[arg(long)]
    height: String,

    /// Weight in kilograms
    #[arg(long)]
    weight: String,

    /// male or female (defaults to config)
    #[arg(long)]
    gender: Option<String>,

    /// Activity level, e.g. sedentary, active, very-active (defaults to config)
    #[arg(long)]
    activity: Option<String>,

    /// Save the result to calorie history
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand)]
enum WorkoutAction {
    /// Show the custom plan
    Plan,

    /// Start a plan item, adding it to history
    Start {
        /// Plan item id
        id: u32,
    },

    /// Add a workout to history
    Add {
        #[arg(long)]
        name: String,

        /// Fraction complete, 0.0 to 1.0
        #[arg(long, default_value_t = 0.0)]
        progress: f32,

        #[arg(long, default_value = "workout_default")]
        image: String,
    },

    /// List workout history, newest first
    List,

    /// Increase a workout's progress by one step
    Progress {
        id: i64,
    },

    /// Delete a workout from history
    Delete {
        id: i64,
    },

    /// Export workout history to CSV
    Export {
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Show a month grid with marked days
    Show {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Flip the mark on a date (YYYY-MM-DD)
    Toggle { date: String },

    /// Mark a date (YYYY-MM-DD)
    Mark { date: String },

    /// Remove the mark from a date (YYYY-MM-DD)
    Unmark { date: String },
}

fn main() {
    // Initialize logging
    fitness_core::logging::init_with_level("warn");

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if e.is_storage_fault() {
            eprintln!("Only this action failed; previously saved data is unchanged.");
        }
        std::process::exit(1);
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
    let db_path = data_dir.join(&config.data.database_file);
    tracing::debug!("Using database at {:?}", db_path);

    match cli.command {
        Commands::Calories { action } => cmd_calories(action, &db_path, &config),
        Commands::Workout { action } => cmd_workout(action, &db_path, &config),
        Commands::Schedule { action } => cmd_schedule(action, &db_path),
    }
}

fn cmd_calories(action: CaloriesAction, db_path: &Path, config: &Config) -> Result<()> {
    match action {
        CaloriesAction::Calc(args) => {
            let gender = match args.gender {
                Some(g) => g.parse::<Gender>()?,
                None => config.calories.default_gender,
            };
            let level = match args.activity {
                Some(a) => a.parse::<ActivityLevel>()?,
                None => config.calories.default_activity,
            };

            let query = CalorieQuery::from_fields(&args.age, &args.height, &args.weight, gender, level)?;
            let estimate = estimate_daily_calories(&query)?;

            println!("YOUR TOTAL CALORIES");
            println!("  {:.2} kcal/day", estimate.daily_calories);
            println!("  BMR {:.2} x {} ({})", estimate.bmr, level.multiplier(), level.label());

            if args.save {
                let store = RecordStore::open(db_path)?;
                let entry = store.record_calorie_estimate(&query, &estimate)?;
                println!("✓ Saved to history (#{})", entry.id);
            }
        }
        CaloriesAction::History => {
            let store = RecordStore::open(db_path)?;
            let history = store.calorie_history()?;
            if history.is_empty() {
                println!("No saved calculations.");
            }
            for entry in history {
                println!(
                    "{}  {:>8.2} kcal/day  {} {}y {}cm {}kg  {}",
                    entry.recorded_at.format("%Y-%m-%d %H:%M"),
                    entry.calories,
                    entry.gender,
                    entry.age,
                    entry.height_cm,
                    entry.weight_kg,
                    entry.activity_level
                );
            }
        }
        CaloriesAction::Levels => {
            for level in ActivityLevel::ALL {
                println!(
                    "{:<13} x{:<6} {}",
                    level.label(),
                    level.multiplier(),
                    level.description()
                );
            }
        }
    }
    Ok(())
}

fn cmd_workout(action: WorkoutAction, db_path: &Path, config: &Config) -> Result<()> {
    if let WorkoutAction::Plan = action {
        for item in default_plan() {
            println!("{:>2}  {:<22} {:>3}%", item.id, item.title, (item.progress * 100.0).round());
        }
        return Ok(());
    }

    let store = RecordStore::open(db_path)?;

    match action {
        WorkoutAction::Plan => {}
        WorkoutAction::Start { id } => {
            let item = find_plan_item(id)
                .ok_or_else(|| Error::NotFound(format!("plan item {}", id)))?;
            let record = store.insert_workout(item.start())?;
            println!("✓ Started {} (#{})", record.name, record.id);
        }
        WorkoutAction::Add {
            name,
            progress,
            image,
        } => {
            let record = store.insert_workout(NewWorkout::new(name, progress, image))?;
            println!("✓ Added {} (#{}) at {}%", record.name, record.id, record.percent());
        }
        WorkoutAction::List => {
            let workouts = store.workouts()?;
            if workouts.is_empty() {
                println!("No workouts yet.");
            }
            for w in workouts {
                println!(
                    "#{:<4} {:<22} {:>3}%  {}",
                    w.id,
                    w.name,
                    w.percent(),
                    w.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        WorkoutAction::Progress { id } => {
            let record = store.increment_workout_progress(id, config.progress.increment)?;
            println!("✓ {} is now at {}%", record.name, record.percent());
        }
        WorkoutAction::Delete { id } => {
            if store.delete_workout(id)? {
                println!("✓ Deleted workout #{}", id);
            } else {
                println!("No workout #{}, nothing deleted.", id);
            }
        }
        WorkoutAction::Export { path } => {
            let count = export_workouts_csv(&store.workouts()?, &path)?;
            println!("✓ Exported {} workouts to {}", count, path.display());
        }
    }
    Ok(())
}

fn cmd_schedule(action: ScheduleAction, db_path: &Path) -> Result<()> {
    let store = RecordStore::open(db_path)?;

    match action {
        ScheduleAction::Show { month } => {
            let year_month = match month {
                Some(m) => YearMonth::parse(&m)?,
                None => YearMonth::current()?,
            };
            let month = CalendarMonth::build(year_month, &store.marks_in_month(year_month)?);
            display_month(&month);
        }
        ScheduleAction::Toggle { date } => {
            let date = parse_date(&date)?;
            let year_month = YearMonth::from_date(date)?;
            let marked = toggle_day(&store, year_month, date.day())?;
            if marked {
                println!("✓ Marked {}", format_date(date));
            } else {
                println!("✓ Unmarked {}", format_date(date));
            }
        }
        ScheduleAction::Mark { date } => {
            let date = parse_date(&date)?;
            store.upsert_schedule_mark(date, true)?;
            println!("✓ Marked {}", format_date(date));
        }
        ScheduleAction::Unmark { date } => {
            let date = parse_date(&date)?;
            if store.delete_schedule_mark(date)? {
                println!("✓ Unmarked {}", format_date(date));
            } else {
                println!("{} was not marked.", format_date(date));
            }
        }
    }
    Ok(())
}

fn display_month(month: &CalendarMonth) {
    let title = month
        .year_month
        .first_day()
        .format("%B %Y")
        .to_string()
        .to_uppercase();
    println!("{:^35}", title);
    println!(" Mon  Tue  Wed  Thu  Fri  Sat  Sun");

    for row in month.cells().chunks(7) {
        let line: String = row
            .iter()
            .map(|cell| match cell {
                Some(day) if month.is_marked(*day) => format!(" {:>3}*", day),
                Some(day) => format!(" {:>3} ", day),
                None => "     ".to_string(),
            })
            .collect();
        println!("{}", line.trim_end());
    }

    println!();
    println!("{} marked day(s)", month.marked_days.len());
}
