//! SQLite-based persistence for habits, OKRs, challenges, and intentions.
//!
//! The database is the single source of truth; callers hold transient
//! copies and re-fetch after mutations. All enum and date columns pass
//! through explicit parse helpers at the boundary -- a row that does not
//! match the expected shape is rejected with
//! [`DatabaseError::MalformedRow`] instead of being defaulted at point of
//! use.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::config::Config;
use super::data_dir;
use super::migrations;
use crate::challenge::{
    placeholder_pool, ProtocolCandidate, ProtocolKey, SlotSelector, StoryItem, WeeklyChallenge,
};
use crate::error::{CoreError, DatabaseError, ValidationError};
use crate::habit::{Habit, HabitEntry, RollingStats, StreakAnalyzer};
use crate::intentions::Intention;
use crate::okr::{KeyResult, KrDirection, KrKind, Objective, Pillar};

// === Row parse/format helpers ===

fn malformed(table: &str, message: impl Into<String>) -> DatabaseError {
    DatabaseError::MalformedRow {
        table: table.to_string(),
        message: message.into(),
    }
}

fn parse_date(table: &str, raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| malformed(table, format!("bad date '{raw}'")))
}

fn parse_datetime(table: &str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| malformed(table, format!("bad timestamp '{raw}'")))
}

fn parse_pillar(raw: &str) -> Result<Pillar, DatabaseError> {
    match raw {
        "power" => Ok(Pillar::Power),
        "passion" => Ok(Pillar::Passion),
        "purpose" => Ok(Pillar::Purpose),
        "production" => Ok(Pillar::Production),
        _ => Err(malformed("objectives", format!("unknown pillar '{raw}'"))),
    }
}

fn format_pillar(pillar: Pillar) -> &'static str {
    match pillar {
        Pillar::Power => "power",
        Pillar::Passion => "passion",
        Pillar::Purpose => "purpose",
        Pillar::Production => "production",
    }
}

fn parse_direction(raw: &str) -> Result<KrDirection, DatabaseError> {
    match raw {
        "increasing" => Ok(KrDirection::Increasing),
        "decreasing" => Ok(KrDirection::Decreasing),
        _ => Err(malformed(
            "key_results",
            format!("unknown direction '{raw}'"),
        )),
    }
}

fn format_direction(direction: KrDirection) -> &'static str {
    match direction {
        KrDirection::Increasing => "increasing",
        KrDirection::Decreasing => "decreasing",
    }
}

fn parse_kind(raw: &str) -> Result<KrKind, DatabaseError> {
    match raw {
        "boolean" => Ok(KrKind::Boolean),
        "percent" => Ok(KrKind::Percent),
        "numeric" => Ok(KrKind::Numeric),
        _ => Err(malformed("key_results", format!("unknown kind '{raw}'"))),
    }
}

fn format_kind(kind: KrKind) -> &'static str {
    match kind {
        KrKind::Boolean => "boolean",
        KrKind::Percent => "percent",
        KrKind::Numeric => "numeric",
    }
}

fn parse_protocol(raw: &str) -> Result<ProtocolKey, DatabaseError> {
    ProtocolKey::parse(raw).ok_or_else(|| {
        malformed("weekly_challenges", format!("unknown protocol '{raw}'"))
    })
}

fn parse_story(raw: &str) -> Result<serde_json::Value, DatabaseError> {
    serde_json::from_str(raw)
        .map_err(|e| malformed("weekly_challenges", format!("bad story payload: {e}")))
}

/// Monday of the week containing `date`.
pub fn week_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// SQLite database for cadence.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/cadence/cadence.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("cadence.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // === Habits ===

    /// Create a habit, appended to the end of the display order.
    pub fn add_habit(&self, name: &str, rule: Option<&str>) -> Result<Habit, DatabaseError> {
        let position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM habits",
            [],
            |row| row.get(0),
        )?;
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            rule: rule.map(str::to_string),
            position,
        };
        self.conn.execute(
            "INSERT INTO habits (id, name, rule, position) VALUES (?1, ?2, ?3, ?4)",
            params![habit.id, habit.name, habit.rule, habit.position],
        )?;
        Ok(habit)
    }

    /// List habits in display order.
    pub fn list_habits(&self) -> Result<Vec<Habit>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, rule, position FROM habits ORDER BY position, name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Habit {
                id: row.get(0)?,
                name: row.get(1)?,
                rule: row.get(2)?,
                position: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_habit(&self, id: &str) -> Result<Habit, DatabaseError> {
        self.conn
            .query_row(
                "SELECT id, name, rule, position FROM habits WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Habit {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        rule: row.get(2)?,
                        position: row.get(3)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| DatabaseError::NotFound(format!("habit {id}")))
    }

    pub fn rename_habit(&self, id: &str, name: &str) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE habits SET name = ?2 WHERE id = ?1",
            params![id, name],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("habit {id}")));
        }
        Ok(())
    }

    /// Delete a habit and (via cascade) its entries.
    pub fn delete_habit(&self, id: &str) -> Result<(), DatabaseError> {
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("habit {id}")));
        }
        Ok(())
    }

    /// Upsert a daily completion entry.
    pub fn set_entry(
        &self,
        habit_id: &str,
        date: NaiveDate,
        completed: bool,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO habit_entries (habit_id, date, completed)
             VALUES (?1, ?2, ?3)",
            params![habit_id, date.format("%Y-%m-%d").to_string(), completed],
        )?;
        Ok(())
    }

    /// Entries for one habit within a calendar year, ascending by date.
    pub fn entries_for_year(
        &self,
        habit_id: &str,
        year: i32,
    ) -> Result<Vec<HabitEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, completed FROM habit_entries
             WHERE habit_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;
        let raw: Vec<(String, bool)> = stmt
            .query_map(
                params![habit_id, format!("{year}-01-01"), format!("{year}-12-31")],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?
            .collect::<Result<_, _>>()?;

        raw.into_iter()
            .map(|(date, completed)| {
                Ok(HabitEntry {
                    date: parse_date("habit_entries", &date)?,
                    completed,
                })
            })
            .collect()
    }

    /// All dates on which the habit was completed.
    pub fn completion_dates(&self, habit_id: &str) -> Result<Vec<NaiveDate>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM habit_entries
             WHERE habit_id = ?1 AND completed = 1
             ORDER BY date",
        )?;
        let raw: Vec<String> = stmt
            .query_map(params![habit_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        raw.iter()
            .map(|d| parse_date("habit_entries", d))
            .collect()
    }

    /// Streaks and rolling averages for one habit as of `today`.
    pub fn rolling_stats(
        &self,
        habit_id: &str,
        today: NaiveDate,
    ) -> Result<RollingStats, DatabaseError> {
        let dates = self.completion_dates(habit_id)?;
        Ok(StreakAnalyzer::new(today).analyze(&dates))
    }

    // === OKRs ===

    /// Create an objective with no key results yet.
    ///
    /// The quarter window must be well-formed: `quarter_end` may not
    /// precede `quarter_start`.
    pub fn create_objective(
        &self,
        pillar: Pillar,
        objective: &str,
        quarter_start: NaiveDate,
        quarter_end: NaiveDate,
    ) -> Result<Objective, CoreError> {
        if quarter_end < quarter_start {
            return Err(ValidationError::InvalidDateRange {
                start: quarter_start,
                end: quarter_end,
            }
            .into());
        }
        let obj = Objective {
            id: Uuid::new_v4().to_string(),
            pillar,
            objective: objective.to_string(),
            key_results: Vec::new(),
            quarter_start,
            quarter_end,
            archived: false,
        };
        self.conn.execute(
            "INSERT INTO objectives (id, pillar, objective, quarter_start, quarter_end, archived)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                obj.id,
                format_pillar(pillar),
                obj.objective,
                obj.quarter_start.format("%Y-%m-%d").to_string(),
                obj.quarter_end.format("%Y-%m-%d").to_string(),
            ],
        )?;
        Ok(obj)
    }

    /// Append a key result to an objective.
    #[allow(clippy::too_many_arguments)]
    pub fn add_key_result(
        &self,
        objective_id: &str,
        description: &str,
        kind: KrKind,
        direction: KrDirection,
        target_value: f64,
        baseline_value: Option<f64>,
    ) -> Result<KeyResult, DatabaseError> {
        // ensure the parent exists so KRs can't dangle
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM objectives WHERE id = ?1",
                params![objective_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(DatabaseError::NotFound(format!("objective {objective_id}")));
        }

        let order: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(kr_order), -1) + 1 FROM key_results WHERE objective_id = ?1",
            params![objective_id],
            |row| row.get(0),
        )?;
        let kr = KeyResult {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            current_value: 0.0,
            target_value,
            baseline_value,
            direction,
            kind,
            progress: None,
            punted: false,
        };
        self.conn.execute(
            "INSERT INTO key_results
             (id, objective_id, description, current_value, target_value, baseline_value,
              direction, kind, progress, punted, kr_order)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7, NULL, 0, ?8)",
            params![
                kr.id,
                objective_id,
                kr.description,
                kr.target_value,
                kr.baseline_value,
                format_direction(direction),
                format_kind(kind),
                order,
            ],
        )?;
        Ok(kr)
    }

    fn key_results_for(&self, objective_id: &str) -> Result<Vec<KeyResult>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, current_value, target_value, baseline_value,
                    direction, kind, progress, punted
             FROM key_results WHERE objective_id = ?1 ORDER BY kr_order",
        )?;
        type RawKr = (
            String,
            String,
            f64,
            f64,
            Option<f64>,
            String,
            String,
            Option<f64>,
            bool,
        );
        let raw: Vec<RawKr> = stmt
            .query_map(params![objective_id], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ))
            })?
            .collect::<Result<_, _>>()?;

        raw.into_iter()
            .map(
                |(id, description, current, target, baseline, direction, kind, progress, punted)| {
                    Ok(KeyResult {
                        id,
                        description,
                        current_value: current,
                        target_value: target,
                        baseline_value: baseline,
                        direction: parse_direction(&direction)?,
                        kind: parse_kind(&kind)?,
                        progress,
                        punted,
                    })
                },
            )
            .collect()
    }

    /// List objectives with their key results, sorted by the canonical
    /// pillar order. When `quarter` is given, only objectives whose
    /// quarter window contains that date are returned. Archived
    /// objectives are excluded unless asked for.
    pub fn list_objectives(
        &self,
        quarter: Option<NaiveDate>,
        include_archived: bool,
    ) -> Result<Vec<Objective>, DatabaseError> {
        let quarter_str = quarter.map(|d| d.format("%Y-%m-%d").to_string());
        let mut stmt = self.conn.prepare(
            "SELECT id, pillar, objective, quarter_start, quarter_end, archived
             FROM objectives
             WHERE archived IN (0, ?1)
               AND (?2 IS NULL OR (quarter_start <= ?2 AND quarter_end >= ?2))",
        )?;
        let raw: Vec<(String, String, String, String, String, bool)> = stmt
            .query_map(params![include_archived, quarter_str], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<_, _>>()?;

        let mut objectives = raw
            .into_iter()
            .map(|(id, pillar, objective, start, end, archived)| {
                let key_results = self.key_results_for(&id)?;
                Ok(Objective {
                    pillar: parse_pillar(&pillar)?,
                    objective,
                    key_results,
                    quarter_start: parse_date("objectives", &start)?,
                    quarter_end: parse_date("objectives", &end)?,
                    archived,
                    id,
                })
            })
            .collect::<Result<Vec<_>, DatabaseError>>()?;
        crate::okr::sort_by_pillar(&mut objectives);
        Ok(objectives)
    }

    pub fn update_kr_current(&self, kr_id: &str, value: f64) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE key_results SET current_value = ?2 WHERE id = ?1",
            params![kr_id, value],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("key result {kr_id}")));
        }
        Ok(())
    }

    /// Set or clear the explicit progress override.
    pub fn update_kr_progress(
        &self,
        kr_id: &str,
        progress: Option<f64>,
    ) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE key_results SET progress = ?2 WHERE id = ?1",
            params![kr_id, progress],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("key result {kr_id}")));
        }
        Ok(())
    }

    /// Punt or unpunt a key result. Progress is preserved either way.
    pub fn punt_kr(&self, kr_id: &str, punted: bool) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE key_results SET punted = ?2 WHERE id = ?1",
            params![kr_id, punted],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("key result {kr_id}")));
        }
        Ok(())
    }

    /// Soft-delete an objective.
    pub fn archive_objective(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE objectives SET archived = 1 WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("objective {id}")));
        }
        Ok(())
    }

    // === Weekly challenges ===

    /// Challenges for one week, sorted by slot index.
    pub fn fetch_week(
        &self,
        week_start: NaiveDate,
    ) -> Result<Vec<WeeklyChallenge>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT slot, protocol, action, story, completed
             FROM weekly_challenges WHERE week_start = ?1 ORDER BY slot",
        )?;
        let raw: Vec<(i64, String, String, String, bool)> = stmt
            .query_map(params![week_start.format("%Y-%m-%d").to_string()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })?
            .collect::<Result<_, _>>()?;

        raw.into_iter()
            .map(|(slot, protocol, action, story, completed)| {
                Ok(WeeklyChallenge {
                    slot: slot as usize,
                    protocol: parse_protocol(&protocol)?,
                    action,
                    story: parse_story(&story)?,
                    completed,
                    week_start,
                })
            })
            .collect()
    }

    fn write_slot(&self, challenge: &WeeklyChallenge) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO weekly_challenges
             (week_start, slot, protocol, action, story, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                challenge.week_start.format("%Y-%m-%d").to_string(),
                challenge.slot as i64,
                challenge.protocol.as_str(),
                challenge.action,
                challenge.story.to_string(),
                challenge.completed,
            ],
        )?;
        Ok(())
    }

    /// Replace the whole week atomically.
    pub fn replace_week(
        &self,
        week_start: NaiveDate,
        challenges: &[WeeklyChallenge],
    ) -> Result<(), DatabaseError> {
        self.conn.execute_batch("BEGIN")?;
        let result = (|| {
            self.conn.execute(
                "DELETE FROM weekly_challenges WHERE week_start = ?1",
                params![week_start.format("%Y-%m-%d").to_string()],
            )?;
            for challenge in challenges {
                self.write_slot(challenge)?;
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Mark one slot complete or incomplete.
    pub fn set_challenge_completed(
        &self,
        week_start: NaiveDate,
        slot: usize,
        completed: bool,
    ) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE weekly_challenges SET completed = ?3
             WHERE week_start = ?1 AND slot = ?2",
            params![
                week_start.format("%Y-%m-%d").to_string(),
                slot as i64,
                completed
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!(
                "challenge slot {slot} in week of {week_start}"
            )));
        }
        Ok(())
    }

    /// Assemble this week's protocol candidates from configuration and
    /// current store state. Completed (>= 100%) and punted KRs never enter
    /// the pool, independent of caps.
    pub fn build_candidates(
        &self,
        config: &Config,
        today: NaiveDate,
    ) -> Result<Vec<ProtocolCandidate>, DatabaseError> {
        let mut candidates = Vec::with_capacity(4);
        for key in ProtocolKey::PRIORITY_ORDER {
            let protocol = config.protocol(key);
            let pool = match key {
                ProtocolKey::HabitsSlipping => {
                    self.slipping_habits(&protocol.enabled_habits, today)?
                }
                ProtocolKey::PrioritiesProgress => {
                    self.priority_pool(&protocol.enabled_pillars)?
                }
                ProtocolKey::OkrsProgress => self.kr_pool(&protocol.enabled_krs)?,
                ProtocolKey::Placeholder => placeholder_pool(),
            };
            candidates.push(ProtocolCandidate {
                key,
                enabled: protocol.enabled,
                max_per_week: protocol.max_per_week,
                pool,
            });
        }
        Ok(candidates)
    }

    /// Enabled habits with a lapsed (or never started) streak.
    fn slipping_habits(
        &self,
        enabled: &[String],
        today: NaiveDate,
    ) -> Result<Vec<StoryItem>, DatabaseError> {
        let mut pool = Vec::new();
        for habit_id in enabled {
            let habit = match self.get_habit(habit_id) {
                Ok(h) => h,
                Err(DatabaseError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let stats = self.rolling_stats(habit_id, today)?;
            if stats.current_streak == 0 {
                pool.push(StoryItem {
                    id: habit.id.clone(),
                    title: habit.name.clone(),
                    payload: serde_json::json!({
                        "cold_days": stats.cold_days,
                        "longest_streak": stats.longest_streak,
                    }),
                });
            }
        }
        Ok(pool)
    }

    /// Active objectives in enabled pillars that still have ground to cover.
    fn priority_pool(&self, enabled_pillars: &[Pillar]) -> Result<Vec<StoryItem>, DatabaseError> {
        let pool = self
            .list_objectives(None, false)?
            .into_iter()
            .filter(|o| enabled_pillars.contains(&o.pillar))
            .filter(|o| o.progress_pct() < 100)
            .map(|o| StoryItem {
                payload: serde_json::json!({
                    "pillar": format_pillar(o.pillar),
                    "progress": o.progress_pct(),
                }),
                title: o.objective,
                id: o.id,
            })
            .collect();
        Ok(pool)
    }

    /// Enabled key results that are neither completed nor punted.
    fn kr_pool(&self, enabled_krs: &[String]) -> Result<Vec<StoryItem>, DatabaseError> {
        let mut pool = Vec::new();
        for objective in self.list_objectives(None, false)? {
            for kr in &objective.key_results {
                if !enabled_krs.contains(&kr.id) || kr.punted || kr.is_completed() {
                    continue;
                }
                pool.push(StoryItem {
                    id: kr.id.clone(),
                    title: kr.description.clone(),
                    payload: serde_json::json!({
                        "objective": objective.objective,
                        "progress": kr.progress_pct(),
                    }),
                });
            }
        }
        Ok(pool)
    }

    /// Regenerate the whole week from the current configuration and store
    /// state, replacing whatever was there.
    pub fn regenerate_week(
        &self,
        config: &Config,
        week_start: NaiveDate,
        today: NaiveDate,
        seed: Option<u64>,
    ) -> Result<Vec<WeeklyChallenge>, DatabaseError> {
        let candidates = self.build_candidates(config, today)?;
        let mut selector = SlotSelector::new(config.slots, config.strategy);
        selector.seed = seed;
        let challenges = selector.generate_week(week_start, candidates);
        self.replace_week(week_start, &challenges)?;
        Ok(challenges)
    }

    /// Regenerate content for a single slot. Slot index and protocol key
    /// stay fixed; items already used by the week's other slots of the same
    /// protocol are excluded from the draw.
    pub fn reroll_slot(
        &self,
        config: &Config,
        week_start: NaiveDate,
        slot: usize,
        today: NaiveDate,
        seed: Option<u64>,
    ) -> Result<WeeklyChallenge, DatabaseError> {
        let week = self.fetch_week(week_start)?;
        let current = week
            .iter()
            .find(|c| c.slot == slot)
            .ok_or_else(|| {
                DatabaseError::NotFound(format!("challenge slot {slot} in week of {week_start}"))
            })?
            .clone();

        let used: Vec<&str> = week
            .iter()
            .filter(|c| c.protocol == current.protocol)
            .filter_map(|c| c.story.get("item_id").and_then(|v| v.as_str()))
            .collect();

        let candidates = self.build_candidates(config, today)?;
        let full_pool = candidates
            .into_iter()
            .find(|c| c.key == current.protocol)
            .map(|c| c.pool)
            .unwrap_or_default();
        let mut pool: Vec<StoryItem> = full_pool
            .iter()
            .filter(|item| !used.contains(&item.id.as_str()))
            .cloned()
            .collect();
        if pool.is_empty() {
            // nothing unused left; allow a fresh draw from the full pool
            pool = full_pool;
        }

        let mut selector = SlotSelector::new(config.slots, config.strategy);
        selector.seed = seed;
        let rerolled = selector.reroll(&current, pool).ok_or_else(|| {
            DatabaseError::NotFound(format!(
                "no content available for protocol {}",
                current.protocol.as_str()
            ))
        })?;
        self.write_slot(&rerolled)?;
        Ok(rerolled)
    }

    // === Intentions ===

    /// Commit a day's intentions, replacing any previous list for that day.
    pub fn commit_intentions(
        &self,
        date: NaiveDate,
        texts: &[String],
    ) -> Result<Vec<Intention>, DatabaseError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "DELETE FROM intentions WHERE date = ?1",
            params![date_str],
        )?;
        let mut committed = Vec::with_capacity(texts.len());
        for text in texts {
            let intent = Intention::new(date, text.clone());
            self.conn.execute(
                "INSERT INTO intentions (id, date, text, committed_at, completed)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![intent.id, date_str, intent.text, intent.committed_at.to_rfc3339()],
            )?;
            committed.push(intent);
        }
        Ok(committed)
    }

    pub fn intentions_for(&self, date: NaiveDate) -> Result<Vec<Intention>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, committed_at, completed FROM intentions
             WHERE date = ?1 ORDER BY committed_at, id",
        )?;
        let raw: Vec<(String, String, String, bool)> = stmt
            .query_map(params![date.format("%Y-%m-%d").to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<Result<_, _>>()?;

        raw.into_iter()
            .map(|(id, text, committed_at, completed)| {
                Ok(Intention {
                    id,
                    date,
                    text,
                    committed_at: parse_datetime("intentions", &committed_at)?,
                    completed,
                })
            })
            .collect()
    }

    pub fn set_intention_completed(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE intentions SET completed = ?2 WHERE id = ?1",
            params![id, completed],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("intention {id}")));
        }
        Ok(())
    }

    // === KV store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_of_truncates_to_monday() {
        // 2026-08-28 is a Friday
        let friday = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(week_of(friday), monday);
        assert_eq!(week_of(monday), monday);
        assert_eq!(
            week_of(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()),
            monday
        );
    }

    #[test]
    fn habit_entry_round_trip() {
        let db = Database::open_memory().unwrap();
        let habit = db.add_habit("Meditate", Some("10 min after waking")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        db.set_entry(&habit.id, date, true).unwrap();

        let entries = db.entries_for_year(&habit.id, 2026).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, date);
        assert!(entries[0].completed);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn malformed_pillar_is_rejected_not_defaulted() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO objectives (id, pillar, objective, quarter_start, quarter_end)
                 VALUES ('o1', 'vigor', 'broken', '2026-07-01', '2026-09-30')",
                [],
            )
            .unwrap();
        let err = db.list_objectives(None, false).unwrap_err();
        assert!(matches!(err, DatabaseError::MalformedRow { .. }));
    }
}
