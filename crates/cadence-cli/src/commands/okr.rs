//! OKR commands for CLI.

use clap::Subcommand;

use cadence_core::okr::{KrDirection, KrKind, Pillar};
use cadence_core::storage::Database;

use super::parse_date_arg;

#[derive(Subcommand)]
pub enum OkrAction {
    /// Create an objective
    Add {
        /// Pillar: power, passion, purpose, or production
        pillar: String,
        /// Objective text
        objective: String,
        /// Quarter start (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Quarter end (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },
    /// Add a key result to an objective
    Kr {
        /// Objective ID
        objective_id: String,
        /// Key result description
        description: String,
        /// Kind: boolean, percent, or numeric (default: numeric)
        #[arg(long, default_value = "numeric")]
        kind: String,
        /// Direction: increasing or decreasing (default: increasing)
        #[arg(long, default_value = "increasing")]
        direction: String,
        /// Target value
        #[arg(long, default_value = "0")]
        target: f64,
        /// Baseline value (for decreasing KRs)
        #[arg(long)]
        baseline: Option<f64>,
    },
    /// List objectives with normalized progress
    List {
        /// Only objectives whose quarter contains this date (YYYY-MM-DD)
        #[arg(long)]
        quarter: Option<String>,
        /// Include archived objectives
        #[arg(long)]
        archived: bool,
    },
    /// Update a key result's current value
    Update {
        /// Key result ID
        kr_id: String,
        /// New current value
        value: f64,
    },
    /// Punt (deprioritize) a key result
    Punt {
        /// Key result ID
        kr_id: String,
    },
    /// Bring a punted key result back
    Unpunt {
        /// Key result ID
        kr_id: String,
    },
    /// Archive an objective (soft delete)
    Archive {
        /// Objective ID
        id: String,
    },
}

fn parse_pillar(raw: &str) -> Result<Pillar, Box<dyn std::error::Error>> {
    match raw {
        "power" => Ok(Pillar::Power),
        "passion" => Ok(Pillar::Passion),
        "purpose" => Ok(Pillar::Purpose),
        "production" => Ok(Pillar::Production),
        _ => Err(format!("unknown pillar '{raw}'").into()),
    }
}

fn parse_kind(raw: &str) -> Result<KrKind, Box<dyn std::error::Error>> {
    match raw {
        "boolean" => Ok(KrKind::Boolean),
        "percent" => Ok(KrKind::Percent),
        "numeric" => Ok(KrKind::Numeric),
        _ => Err(format!("unknown kind '{raw}'").into()),
    }
}

fn parse_direction(raw: &str) -> Result<KrDirection, Box<dyn std::error::Error>> {
    match raw {
        "increasing" => Ok(KrDirection::Increasing),
        "decreasing" => Ok(KrDirection::Decreasing),
        _ => Err(format!("unknown direction '{raw}'").into()),
    }
}

pub fn run(action: OkrAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        OkrAction::Add {
            pillar,
            objective,
            start,
            end,
        } => {
            let obj = db.create_objective(
                parse_pillar(&pillar)?,
                &objective,
                parse_date_arg(Some(&start))?,
                parse_date_arg(Some(&end))?,
            )?;
            println!("Objective created: {} ({})", obj.objective, obj.id);
        }
        OkrAction::Kr {
            objective_id,
            description,
            kind,
            direction,
            target,
            baseline,
        } => {
            let kr = db.add_key_result(
                &objective_id,
                &description,
                parse_kind(&kind)?,
                parse_direction(&direction)?,
                target,
                baseline,
            )?;
            println!("Key result created: {} ({})", kr.description, kr.id);
        }
        OkrAction::List { quarter, archived } => {
            let quarter = match quarter {
                Some(raw) => Some(parse_date_arg(Some(&raw))?),
                None => None,
            };
            let objectives = db.list_objectives(quarter, archived)?;
            let view: Vec<serde_json::Value> = objectives
                .iter()
                .map(|o| {
                    serde_json::json!({
                        "id": o.id,
                        "pillar": o.pillar,
                        "objective": o.objective,
                        "progress_pct": o.progress_pct(),
                        "key_results": o.key_results.iter().map(|kr| {
                            serde_json::json!({
                                "id": kr.id,
                                "description": kr.description,
                                "progress_pct": kr.progress_pct(),
                                "punted": kr.punted,
                            })
                        }).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OkrAction::Update { kr_id, value } => {
            db.update_kr_current(&kr_id, value)?;
            println!("Updated {kr_id}");
        }
        OkrAction::Punt { kr_id } => {
            db.punt_kr(&kr_id, true)?;
            println!("Punted {kr_id}");
        }
        OkrAction::Unpunt { kr_id } => {
            db.punt_kr(&kr_id, false)?;
            println!("Unpunted {kr_id}");
        }
        OkrAction::Archive { id } => {
            db.archive_objective(&id)?;
            println!("Archived {id}");
        }
    }
    Ok(())
}
