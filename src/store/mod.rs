use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Serialize)]
pub struct HabitRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub id: i64,
    pub habit_id: i64,
    pub recorded_at: DateTime<Utc>,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Personal,
    Friend,
}

impl ChallengeKind {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "friend" => Self::Friend,
            _ => Self::Personal,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeParty {
    pub user_id: i64,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeRecord {
    pub id: i64,
    pub title: String,
    pub kind: ChallengeKind,
    pub owner: ChallengeParty,
    pub opponent: Option<ChallengeParty>,
    pub end_date: Option<DateTime<Utc>>,
}

pub trait HabitStore {
    // Stored order; an id filter narrows the result.
    fn habits_for(&self, user_id: i64, filter: Option<&[i64]>) -> Result<Vec<HabitRecord>>;
}

pub trait LogStore {
    // May over-return records outside the filter; callers discard them.
    fn logs_for(&self, user_id: i64, habit_ids: &[i64]) -> Result<Vec<LogRecord>>;
}

pub trait ChallengeStore {
    // Non-archived challenges where the user is owner or opponent.
    fn active_for(&self, user_id: i64) -> Result<Vec<ChallengeRecord>>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    habits: Vec<HabitRecord>,
    logs: Vec<LogRecord>,
    challenges: Vec<ChallengeRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|error| anyhow!("memory store lock poisoned: {error}"))
    }

    pub fn push_habit(&self, habit: HabitRecord) -> Result<()> {
        self.locked()?.habits.push(habit);
        Ok(())
    }

    pub fn push_log(&self, log: LogRecord) -> Result<()> {
        self.locked()?.logs.push(log);
        Ok(())
    }

    pub fn push_challenge(&self, challenge: ChallengeRecord) -> Result<()> {
        self.locked()?.challenges.push(challenge);
        Ok(())
    }
}

impl HabitStore for MemoryStore {
    fn habits_for(&self, user_id: i64, filter: Option<&[i64]>) -> Result<Vec<HabitRecord>> {
        Ok(self
            .locked()?
            .habits
            .iter()
            .filter(|habit| habit.user_id == user_id)
            .filter(|habit| filter.is_none_or(|ids| ids.contains(&habit.id)))
            .cloned()
            .collect())
    }
}

impl LogStore for MemoryStore {
    // Over-returns on purpose: every stored log, whatever the filter.
    fn logs_for(&self, _user_id: i64, _habit_ids: &[i64]) -> Result<Vec<LogRecord>> {
        Ok(self.locked()?.logs.clone())
    }
}

impl ChallengeStore for MemoryStore {
    fn active_for(&self, user_id: i64) -> Result<Vec<ChallengeRecord>> {
        Ok(self
            .locked()?
            .challenges
            .iter()
            .filter(|challenge| {
                challenge.owner.user_id == user_id
                    || challenge
                        .opponent
                        .as_ref()
                        .is_some_and(|party| party.user_id == user_id)
            })
            .cloned()
            .collect())
    }
}
