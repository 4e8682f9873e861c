//! # Cadence Core Library
//!
//! This library provides the core business logic for Cadence, a local-first
//! personal productivity tracker. It implements a CLI-first philosophy where
//! all operations are available via a standalone CLI binary, with any GUI
//! layer being a thin shell over the same core library.
//!
//! ## Architecture
//!
//! - **Habits**: daily completion calendar with streak and rolling-average
//!   analytics
//! - **OKRs**: quarterly objectives with normalized key-result progress
//! - **Challenges**: weekly challenge slots filled from habit/priority/OKR
//!   pools under a configurable selection strategy
//! - **Storage**: SQLite-based persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`normalize_progress`]: key-result progress normalization
//! - [`SlotSelector`]: weekly challenge slot assignment
//! - [`StreakAnalyzer`]: streak and rolling-stat computation
//! - [`Database`]: habit/OKR/challenge persistence
//! - [`Config`]: selection strategy and protocol configuration

pub mod challenge;
pub mod error;
pub mod events;
pub mod habit;
pub mod intentions;
pub mod okr;
pub mod optimistic;
pub mod storage;

pub use challenge::{
    ProtocolCandidate, ProtocolKey, SelectionStrategy, SlotSelector, StoryItem, WeeklyChallenge,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, EventBus, Notice, NoticeLevel, Subscription};
pub use habit::{Habit, HabitEntry, RollingStats, StreakAnalyzer};
pub use intentions::Intention;
pub use okr::{normalize_progress, KeyResult, KrDirection, KrKind, Objective, Pillar};
pub use optimistic::{Optimistic, TxnState};
pub use storage::{Config, Database, ProtocolConfig};
