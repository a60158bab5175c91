pub mod queries;

use crate::store::{
    ChallengeKind, ChallengeParty, ChallengeRecord, ChallengeStore, HabitRecord, HabitStore,
    LogRecord, LogStore,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, params_from_iter};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub users: i64,
    pub habits: i64,
    pub logs: i64,
    pub challenges: i64,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;

        let database = Self { conn };
        database.init_schema()?;

        Ok(database)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    pub fn create_user(
        &self,
        username: &str,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO users (username, display_name, avatar_url, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![username, display_name, avatar_url, Utc::now().timestamp()],
            )
            .with_context(|| format!("Failed to create user '{username}'"))?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, display_name, avatar_url, created_at FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        display_name: row.get(2)?,
                        avatar_url: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .ok();

        Ok(row)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_habit(
        &self,
        user_id: i64,
        name: &str,
        emoji: Option<&str>,
        color: Option<&str>,
        category: Option<&str>,
        kind: Option<&str>,
        unit: Option<&str>,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO habits (user_id, name, emoji, color, category, kind, unit, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![user_id, name, emoji, color, category, kind, unit, Utc::now().timestamp()],
            )
            .with_context(|| format!("Failed to create habit '{name}'"))?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_habits(&self, user_id: i64) -> Result<Vec<HabitRecord>> {
        let mut statement = self.conn.prepare(
            "SELECT id, user_id, name, emoji, color, category, kind, unit
             FROM habits
             WHERE user_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;

        let rows = statement
            .query_map(params![user_id], |row| {
                Ok(HabitRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    emoji: row.get(3)?,
                    color: row.get(4)?,
                    category: row.get(5)?,
                    kind: row.get(6)?,
                    unit: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query habits")?;

        Ok(rows)
    }

    pub fn create_log(
        &self,
        user_id: i64,
        habit_id: i64,
        recorded_at: DateTime<Utc>,
        value: Option<&Value>,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO logs (user_id, habit_id, recorded_at, value) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, habit_id, recorded_at, value.map(Value::to_string)],
            )
            .context("Failed to insert log")?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_challenge(
        &self,
        title: &str,
        kind: &str,
        owner_id: i64,
        opponent_id: Option<i64>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO challenges (title, kind, owner_id, opponent_id, end_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![title, kind, owner_id, opponent_id, end_date, Utc::now().timestamp()],
            )
            .with_context(|| format!("Failed to create challenge '{title}'"))?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn archive_challenge(&self, id: i64) -> Result<bool> {
        let updated = self
            .conn
            .execute(
                "UPDATE challenges SET archived = 1 WHERE id = ?1",
                params![id],
            )
            .context("Failed to archive challenge")?;

        Ok(updated > 0)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<i64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .with_context(|| format!("Failed to count rows in {table}"))
        };

        Ok(StoreStats {
            users: count("users")?,
            habits: count("habits")?,
            logs: count("logs")?,
            challenges: count("challenges")?,
        })
    }
}

impl HabitStore for Database {
    fn habits_for(&self, user_id: i64, filter: Option<&[i64]>) -> Result<Vec<HabitRecord>> {
        let mut habits = self.list_habits(user_id)?;

        if let Some(ids) = filter {
            habits.retain(|habit| ids.contains(&habit.id));
        }

        Ok(habits)
    }
}

impl LogStore for Database {
    fn logs_for(&self, user_id: i64, habit_ids: &[i64]) -> Result<Vec<LogRecord>> {
        if habit_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; habit_ids.len()].join(", ");
        let mut statement = self.conn.prepare(&format!(
            "SELECT id, habit_id, recorded_at, value
             FROM logs
             WHERE user_id = ? AND habit_id IN ({placeholders})
             ORDER BY recorded_at ASC, id ASC"
        ))?;

        let rows = statement
            .query_map(
                params_from_iter(std::iter::once(user_id).chain(habit_ids.iter().copied())),
                |row| {
                    let raw: Option<String> = row.get(3)?;
                    Ok(LogRecord {
                        id: row.get(0)?,
                        habit_id: row.get(1)?,
                        recorded_at: row.get(2)?,
                        // Stored as JSON text; anything unparseable is kept
                        // as a plain string for the aggregator to coerce.
                        value: raw.map(|text| {
                            serde_json::from_str(&text).unwrap_or(Value::String(text))
                        }),
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query logs")?;

        Ok(rows)
    }
}

impl ChallengeStore for Database {
    fn active_for(&self, user_id: i64) -> Result<Vec<ChallengeRecord>> {
        let mut statement = self.conn.prepare(
            "SELECT c.id, c.title, c.kind, c.end_date,
                    o.id, o.display_name, o.avatar_url,
                    p.id, p.display_name, p.avatar_url
             FROM challenges c
             JOIN users o ON o.id = c.owner_id
             LEFT JOIN users p ON p.id = c.opponent_id
             WHERE c.archived = 0 AND (c.owner_id = ?1 OR c.opponent_id = ?1)
             ORDER BY c.created_at ASC, c.id ASC",
        )?;

        let rows = statement
            .query_map(params![user_id], |row| {
                let kind: String = row.get(2)?;
                let opponent = match row.get::<_, Option<i64>>(7)? {
                    Some(id) => Some(ChallengeParty {
                        user_id: id,
                        display_name: row.get(8)?,
                        avatar_url: row.get(9)?,
                    }),
                    None => None,
                };

                Ok(ChallengeRecord {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    kind: ChallengeKind::from_raw(&kind),
                    owner: ChallengeParty {
                        user_id: row.get(4)?,
                        display_name: row.get(5)?,
                        avatar_url: row.get(6)?,
                    },
                    opponent,
                    end_date: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query challenges")?;

        Ok(rows)
    }
}
