pub mod calendar;
pub mod challenge;
pub mod metadata;
pub mod summary;

use crate::store::{ChallengeStore, HabitStore, LogStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use challenge::ChallengeSummary;
pub use summary::HabitSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub habits: Vec<HabitSummary>,
    pub challenges: Vec<ChallengeSummary>,
}

pub fn compose(
    habit_store: &dyn HabitStore,
    log_store: &dyn LogStore,
    challenge_store: &dyn ChallengeStore,
    user_id: i64,
    habit_filter: Option<&[i64]>,
    now: DateTime<Utc>,
) -> Result<Dashboard> {
    let today = calendar::day_key(now);

    let habits = habit_store.habits_for(user_id, habit_filter)?;
    // A user without habits skips the log round trip entirely.
    let habit_summaries = if habits.is_empty() {
        Vec::new()
    } else {
        let ids = habits.iter().map(|habit| habit.id).collect::<Vec<_>>();
        let logs = log_store.logs_for(user_id, &ids)?;
        summary::aggregate(&habits, &logs, today)
    };

    let challenges = challenge_store.active_for(user_id)?;

    Ok(Dashboard {
        habits: habit_summaries,
        challenges: challenge::challenge_summaries(user_id, &challenges, now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChallengeKind, ChallengeParty, ChallengeRecord, HabitRecord, LogRecord, MemoryStore};
    use anyhow::anyhow;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-11-15T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[derive(Default)]
    struct CountingLogStore {
        calls: AtomicUsize,
    }

    impl LogStore for CountingLogStore {
        fn logs_for(&self, _user_id: i64, _habit_ids: &[i64]) -> Result<Vec<LogRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct FailingChallengeStore;

    impl ChallengeStore for FailingChallengeStore {
        fn active_for(&self, _user_id: i64) -> Result<Vec<ChallengeRecord>> {
            Err(anyhow!("challenge table is locked"))
        }
    }

    fn habit(id: i64, user_id: i64, name: &str) -> HabitRecord {
        HabitRecord {
            id,
            user_id,
            name: name.to_string(),
            emoji: None,
            color: None,
            category: None,
            kind: Some("count".to_string()),
            unit: None,
        }
    }

    #[test]
    fn without_habits_the_log_store_is_never_queried() {
        let habits = MemoryStore::new();
        let logs = CountingLogStore::default();
        let challenges = MemoryStore::new();

        let dashboard = compose(&habits, &logs, &challenges, 1, None, now()).unwrap();

        assert!(dashboard.habits.is_empty());
        assert!(dashboard.challenges.is_empty());
        assert_eq!(logs.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn with_habits_the_log_store_is_queried_once() {
        let habits = MemoryStore::new();
        habits.push_habit(habit(1, 1, "Leer 30m")).unwrap();
        let logs = CountingLogStore::default();
        let challenges = MemoryStore::new();

        let dashboard = compose(&habits, &logs, &challenges, 1, None, now()).unwrap();

        assert_eq!(dashboard.habits.len(), 1);
        assert_eq!(logs.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn store_failures_surface_unchanged() {
        let habits = MemoryStore::new();
        let logs = CountingLogStore::default();

        let error = compose(&habits, &logs, &FailingChallengeStore, 1, None, now())
            .expect_err("challenge store failure must propagate");

        assert_eq!(error.to_string(), "challenge table is locked");
    }

    #[test]
    fn composes_habits_and_challenges_end_to_end() {
        let store = MemoryStore::new();
        store.push_habit(habit(1, 1, "Leer 30m")).unwrap();
        store
            .push_log(LogRecord {
                id: 1,
                habit_id: 1,
                recorded_at: now(),
                value: Some(json!(30.0)),
            })
            .unwrap();
        store
            .push_challenge(ChallengeRecord {
                id: 5,
                title: "Reto lectura".to_string(),
                kind: ChallengeKind::Friend,
                owner: ChallengeParty {
                    user_id: 1,
                    display_name: Some("Ana".to_string()),
                    avatar_url: None,
                },
                opponent: Some(ChallengeParty {
                    user_id: 2,
                    display_name: Some("Luis".to_string()),
                    avatar_url: None,
                }),
                end_date: Some(now() + chrono::Duration::days(4)),
            })
            .unwrap();

        let dashboard = compose(&store, &store, &store, 1, None, now()).unwrap();

        assert_eq!(dashboard.habits.len(), 1);
        assert!(dashboard.habits[0].completed_today);
        assert_eq!(dashboard.challenges.len(), 1);
        assert_eq!(dashboard.challenges[0].days_left, 4);
        assert_eq!(dashboard.challenges[0].opponent_name.as_deref(), Some("Luis"));
    }

    #[test]
    fn habit_filter_reaches_the_store() {
        let store = MemoryStore::new();
        store.push_habit(habit(1, 1, "Leer 30m")).unwrap();
        store.push_habit(habit(2, 1, "Run 5k")).unwrap();

        let dashboard = compose(&store, &store, &store, 1, Some(&[2]), now()).unwrap();

        assert_eq!(dashboard.habits.len(), 1);
        assert_eq!(dashboard.habits[0].name, "Run 5k");
    }
}
