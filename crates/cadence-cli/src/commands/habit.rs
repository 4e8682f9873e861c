//! Habit tracking commands for CLI.

use clap::Subcommand;

use cadence_core::storage::Database;

use super::parse_date_arg;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Optional free-text rule ("10 min after waking")
        #[arg(long)]
        rule: Option<String>,
    },
    /// List habits in display order
    List,
    /// Log a daily completion (or clear one)
    Log {
        /// Habit ID
        id: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Record the day as not completed instead
        #[arg(long)]
        undone: bool,
    },
    /// Streaks and rolling averages
    Stats {
        /// Habit ID
        id: String,
    },
    /// Entries for a calendar year
    Year {
        /// Habit ID
        id: String,
        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Rename a habit
    Rename {
        /// Habit ID
        id: String,
        /// New name
        name: String,
    },
    /// Delete a habit and its entries
    Rm {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HabitAction::Add { name, rule } => {
            let habit = db.add_habit(&name, rule.as_deref())?;
            println!("Habit created: {} ({})", habit.name, habit.id);
        }
        HabitAction::List => {
            let habits = db.list_habits()?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Log { id, date, undone } => {
            let date = parse_date_arg(date.as_deref())?;
            db.set_entry(&id, date, !undone)?;
            let flag = if undone { "not completed" } else { "completed" };
            println!("Logged {date}: {flag}");
        }
        HabitAction::Stats { id } => {
            let today = chrono::Local::now().date_naive();
            let stats = db.rolling_stats(&id, today)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        HabitAction::Year { id, year } => {
            let year = year.unwrap_or_else(|| {
                use chrono::Datelike;
                chrono::Local::now().year()
            });
            let entries = db.entries_for_year(&id, year)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        HabitAction::Rename { id, name } => {
            db.rename_habit(&id, &name)?;
            println!("Renamed: {name}");
        }
        HabitAction::Rm { id } => {
            db.delete_habit(&id)?;
            println!("Deleted habit {id}");
        }
    }
    Ok(())
}
