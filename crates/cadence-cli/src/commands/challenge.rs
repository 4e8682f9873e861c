//! Weekly challenge commands for CLI.

use clap::Subcommand;

use cadence_core::storage::{week_of, Config, Database};

use super::parse_date_arg;

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Show this week's challenges
    Show {
        /// Any date inside the week (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Regenerate the week from current habits, priorities, and OKRs
    Regen {
        /// Any date inside the week (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Random seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Reroll a single slot, keeping its protocol
    Reroll {
        /// Slot index (0-based)
        slot: usize,
        /// Any date inside the week (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Random seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Mark a slot complete
    Done {
        /// Slot index (0-based)
        slot: usize,
        /// Any date inside the week (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: ChallengeAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;

    match action {
        ChallengeAction::Show { date } => {
            let week_start = week_of(parse_date_arg(date.as_deref())?);
            let week = db.fetch_week(week_start)?;
            println!("{}", serde_json::to_string_pretty(&week)?);
        }
        ChallengeAction::Regen { date, seed } => {
            let today = parse_date_arg(date.as_deref())?;
            let week = db.regenerate_week(&config, week_of(today), today, seed)?;
            println!("{}", serde_json::to_string_pretty(&week)?);
        }
        ChallengeAction::Reroll { slot, date, seed } => {
            let today = parse_date_arg(date.as_deref())?;
            let challenge = db.reroll_slot(&config, week_of(today), slot, today, seed)?;
            println!("{}", serde_json::to_string_pretty(&challenge)?);
        }
        ChallengeAction::Done { slot, date } => {
            let week_start = week_of(parse_date_arg(date.as_deref())?);
            db.set_challenge_completed(week_start, slot, true)?;
            println!("Completed slot {slot}");
        }
    }
    Ok(())
}
