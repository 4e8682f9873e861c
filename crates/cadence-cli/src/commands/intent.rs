//! Daily intention commands for CLI.

use clap::Subcommand;

use cadence_core::storage::Database;

use super::parse_date_arg;

#[derive(Subcommand)]
pub enum IntentAction {
    /// Commit today's intentions, replacing any earlier list for the day
    Commit {
        /// Intention texts
        #[arg(required = true)]
        texts: Vec<String>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// List intentions for a day
    List {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark an intention done
    Done {
        /// Intention ID
        id: String,
    },
}

pub fn run(action: IntentAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        IntentAction::Commit { texts, date } => {
            let date = parse_date_arg(date.as_deref())?;
            let committed = db.commit_intentions(date, &texts)?;
            println!("Committed {} intentions for {date}", committed.len());
        }
        IntentAction::List { date } => {
            let date = parse_date_arg(date.as_deref())?;
            let intentions = db.intentions_for(date)?;
            println!("{}", serde_json::to_string_pretty(&intentions)?);
        }
        IntentAction::Done { id } => {
            db.set_intention_completed(&id, true)?;
            println!("Done: {id}");
        }
    }
    Ok(())
}
