//! Configuration commands for CLI.

use clap::Subcommand;

use cadence_core::challenge::{ProtocolKey, SelectionStrategy};
use cadence_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set the selection strategy
    Strategy {
        /// guaranteed_diversity or slot_by_slot
        strategy: String,
    },
    /// Set the total weekly slot count
    Slots {
        slots: usize,
    },
    /// Adjust one protocol's settings
    Protocol {
        /// habits_slipping, priorities_progress, okrs_progress, or placeholder
        key: String,
        /// Enable or disable the protocol
        #[arg(long)]
        enabled: Option<bool>,
        /// Maximum occurrences per week
        #[arg(long)]
        cap: Option<u32>,
        /// Add a habit ID to the enabled set (habits_slipping)
        #[arg(long)]
        add_habit: Option<String>,
        /// Add a key result ID to the enabled set (okrs_progress)
        #[arg(long)]
        add_kr: Option<String>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        ConfigAction::Strategy { strategy } => {
            config.strategy = match strategy.as_str() {
                "guaranteed_diversity" => SelectionStrategy::GuaranteedDiversity,
                "slot_by_slot" => SelectionStrategy::SlotBySlot,
                _ => return Err(format!("unknown strategy '{strategy}'").into()),
            };
        }
        ConfigAction::Slots { slots } => {
            config.slots = slots;
        }
        ConfigAction::Protocol {
            key,
            enabled,
            cap,
            add_habit,
            add_kr,
        } => {
            let key = ProtocolKey::parse(&key)
                .ok_or_else(|| format!("unknown protocol '{key}'"))?;
            let protocol = config.protocol_mut(key);
            if let Some(enabled) = enabled {
                protocol.enabled = enabled;
            }
            if let Some(cap) = cap {
                protocol.max_per_week = cap;
            }
            if let Some(habit_id) = add_habit {
                if !protocol.enabled_habits.contains(&habit_id) {
                    protocol.enabled_habits.push(habit_id);
                }
            }
            if let Some(kr_id) = add_kr {
                if !protocol.enabled_krs.contains(&kr_id) {
                    protocol.enabled_krs.push(kr_id);
                }
            }
        }
    }

    config.save()?;
    println!("Configuration saved");
    Ok(())
}
