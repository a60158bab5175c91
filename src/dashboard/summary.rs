use crate::dashboard::calendar::{self, HISTORY_WINDOW_DAYS};
use crate::dashboard::metadata::{self, Category, Color, HabitKind};
use crate::store::{HabitRecord, LogRecord};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDay {
    pub date: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitSummary {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub color: Color,
    pub category: Category,
    pub kind: HabitKind,
    pub unit: String,
    pub total_this_month: f64,
    pub hours_this_month: f64,
    pub completed_today: bool,
    pub streak: u32,
    pub history: Vec<HistoryDay>,
}

// One summary per habit, in the caller-provided order.
pub fn aggregate(habits: &[HabitRecord], logs: &[LogRecord], today: NaiveDate) -> Vec<HabitSummary> {
    let month_start = calendar::month_start(today);
    let requested = habits.iter().map(|habit| habit.id).collect::<HashSet<_>>();

    let mut day_totals: HashMap<i64, HashMap<NaiveDate, f64>> = HashMap::new();
    let mut month_totals: HashMap<i64, f64> = HashMap::new();

    for log in logs {
        if !requested.contains(&log.habit_id) {
            // Log for a habit outside the requested set.
            continue;
        }

        let value = numeric_value(log.value.as_ref());
        if value <= 0.0 {
            // Logged but not completed.
            continue;
        }

        let day = calendar::day_key(log.recorded_at);
        *day_totals
            .entry(log.habit_id)
            .or_default()
            .entry(day)
            .or_insert(0.0) += value;

        if day >= month_start {
            *month_totals.entry(log.habit_id).or_insert(0.0) += value;
        }
    }

    let no_days = HashMap::new();
    habits
        .iter()
        .map(|habit| {
            let days = day_totals.get(&habit.id).unwrap_or(&no_days);
            let month_total = month_totals.get(&habit.id).copied().unwrap_or(0.0);
            summarize(habit, days, month_total, today)
        })
        .collect()
}

fn summarize(
    habit: &HabitRecord,
    days: &HashMap<NaiveDate, f64>,
    month_total: f64,
    today: NaiveDate,
) -> HabitSummary {
    let kind = metadata::normalize_kind(habit.kind.as_deref());
    let emoji = habit
        .emoji
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| metadata::guess_emoji(&habit.name).to_string());

    let history = calendar::history_window(today, HISTORY_WINDOW_DAYS)
        .into_iter()
        .map(|day| HistoryDay {
            date: day.format("%Y-%m-%d").to_string(),
            completed: days.get(&day).copied().unwrap_or(0.0) > 0.0,
        })
        .collect::<Vec<_>>();

    HabitSummary {
        id: habit.id,
        name: habit.name.clone(),
        emoji,
        color: metadata::normalize_color(habit.color.as_deref()),
        category: metadata::normalize_category(
            habit.category.as_deref(),
            metadata::guess_category(&habit.name),
        ),
        kind,
        unit: metadata::normalize_unit(habit.unit.as_deref()),
        total_this_month: month_total,
        // The month total doubles as hours for time habits; values are
        // assumed to be logged in hours already.
        hours_this_month: if kind == HabitKind::Time { month_total } else { 0.0 },
        completed_today: days.get(&today).copied().unwrap_or(0.0) > 0.0,
        streak: calendar::streak(days, today),
        history,
    }
}

// Numbers pass through, finite numeric strings parse, anything else counts
// as 0. `f64::from_str` accepts "nan" and "inf", neither of which is a
// loggable amount.
pub fn numeric_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;
    use serde_json::json;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    fn timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn habit(id: i64, name: &str) -> HabitRecord {
        HabitRecord {
            id,
            user_id: 1,
            name: name.to_string(),
            emoji: None,
            color: None,
            category: None,
            kind: None,
            unit: None,
        }
    }

    fn log(habit_id: i64, at: &str, value: Value) -> LogRecord {
        LogRecord {
            id: 0,
            habit_id,
            recorded_at: timestamp(at),
            value: Some(value),
        }
    }

    #[test]
    fn time_habit_with_three_day_run() {
        let mut leer = habit(1, "Leer 30m");
        leer.kind = Some("time".to_string());

        let logs = vec![
            log(1, "2024-11-13T08:00:00Z", json!(30)),
            log(1, "2024-11-14T21:30:00Z", json!(30)),
            log(1, "2024-11-15T07:15:00Z", json!(30)),
            log(1, "2024-10-31T09:00:00Z", json!(15)),
        ];

        let summaries = aggregate(&[leer], &logs, date("2024-11-15"));
        assert_eq!(summaries.len(), 1);

        let summary = &summaries[0];
        assert_eq!(summary.total_this_month, 90.0, "October log is excluded");
        assert_eq!(summary.hours_this_month, 90.0);
        assert!(summary.completed_today);
        assert_eq!(summary.streak, 3);
        assert_eq!(summary.history.len(), 7);
        assert_eq!(
            summary.history.iter().filter(|day| day.completed).count(),
            3
        );
        assert_eq!(summary.history[6].date, "2024-11-15");
    }

    #[test]
    fn invalid_metadata_is_normalized_with_guessed_fallbacks() {
        let run = HabitRecord {
            id: 1,
            user_id: 1,
            name: "Run 5k".to_string(),
            emoji: None,
            color: Some("magenta".to_string()),
            category: None,
            kind: Some("unknown".to_string()),
            unit: Some(" ".to_string()),
        };

        let summaries = aggregate(&[run], &[], date("2024-11-15"));
        let summary = &summaries[0];

        assert_eq!(summary.color, Color::Zinc);
        assert_eq!(summary.category, Category::Fitness);
        assert_eq!(summary.kind, HabitKind::Number);
        assert_eq!(summary.unit, "u");
        assert_eq!(summary.emoji, "💪");
    }

    #[test]
    fn explicit_metadata_wins_over_guesses() {
        let mut reading = habit(1, "Leer 30m");
        reading.emoji = Some("🦉".to_string());
        reading.color = Some("teal".to_string());
        reading.category = Some("mindfulness".to_string());
        reading.unit = Some("min".to_string());

        let summary = &aggregate(&[reading], &[], date("2024-11-15"))[0];

        assert_eq!(summary.emoji, "🦉");
        assert_eq!(summary.color, Color::Teal);
        assert_eq!(summary.category, Category::Mindfulness);
        assert_eq!(summary.unit, "min");
    }

    #[test]
    fn non_positive_and_garbage_values_never_count() {
        let logs = vec![
            log(1, "2024-11-15T08:00:00Z", json!(0)),
            log(1, "2024-11-15T09:00:00Z", json!(-5)),
            log(1, "2024-11-15T10:00:00Z", json!("not a number")),
            log(1, "2024-11-14T10:00:00Z", Value::Null),
            LogRecord {
                id: 0,
                habit_id: 1,
                recorded_at: timestamp("2024-11-14T11:00:00Z"),
                value: None,
            },
        ];

        let summary = &aggregate(&[habit(1, "Leer 30m")], &logs, date("2024-11-15"))[0];

        assert!(!summary.completed_today);
        assert_eq!(summary.streak, 0);
        assert_eq!(summary.total_this_month, 0.0);
        assert!(summary.history.iter().all(|day| !day.completed));
    }

    #[test]
    fn non_finite_strings_never_reach_the_totals() {
        let logs = vec![
            log(1, "2024-11-15T08:00:00Z", json!("nan")),
            log(1, "2024-11-15T09:00:00Z", json!("inf")),
            log(1, "2024-11-14T08:00:00Z", json!("-inf")),
        ];

        let summary = &aggregate(&[habit(1, "Leer 30m")], &logs, date("2024-11-15"))[0];

        assert_eq!(summary.total_this_month, 0.0);
        assert!(!summary.completed_today);
        assert_eq!(summary.streak, 0);
    }

    #[test]
    fn string_values_are_coerced_to_numbers() {
        let logs = vec![
            log(1, "2024-11-15T08:00:00Z", json!("30")),
            log(1, "2024-11-15T09:00:00Z", json!(" 12.5 ")),
        ];

        let summary = &aggregate(&[habit(1, "Leer 30m")], &logs, date("2024-11-15"))[0];

        assert!(summary.completed_today);
        assert_eq!(summary.total_this_month, 42.5);
    }

    #[test]
    fn logs_for_unrequested_habits_are_dropped() {
        let logs = vec![
            log(1, "2024-11-15T08:00:00Z", json!(1)),
            log(99, "2024-11-15T08:00:00Z", json!(500)),
        ];

        let summaries = aggregate(&[habit(1, "Leer 30m")], &logs, date("2024-11-15"));
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_this_month, 1.0);
    }

    #[test]
    fn month_total_includes_the_first_of_the_month() {
        let logs = vec![
            log(1, "2024-11-01T00:00:00Z", json!(10)),
            log(1, "2024-10-31T23:59:59Z", json!(10)),
        ];

        let summary = &aggregate(&[habit(1, "Leer 30m")], &logs, date("2024-11-15"))[0];
        assert_eq!(summary.total_this_month, 10.0);
    }

    #[test]
    fn hours_are_zero_for_non_time_habits() {
        let mut counting = habit(1, "Push-ups");
        counting.kind = Some("count".to_string());
        let logs = vec![log(1, "2024-11-15T08:00:00Z", json!(20))];

        let summary = &aggregate(&[counting], &logs, date("2024-11-15"))[0];
        assert_eq!(summary.total_this_month, 20.0);
        assert_eq!(summary.hours_this_month, 0.0);
    }

    #[test]
    fn habit_without_logs_yields_an_empty_summary() {
        let summary = &aggregate(&[habit(7, "Meditar")], &[], date("2024-11-15"))[0];

        assert_eq!(summary.total_this_month, 0.0);
        assert_eq!(summary.streak, 0);
        assert!(!summary.completed_today);
        assert_eq!(summary.history.len(), 7);
        assert!(summary.history.iter().all(|day| !day.completed));
    }

    #[test]
    fn aggregate_is_idempotent_for_fixed_inputs() {
        let habits = vec![habit(1, "Leer 30m"), habit(2, "Run 5k")];
        let logs = vec![
            log(1, "2024-11-15T08:00:00Z", json!(30)),
            log(2, "2024-11-14T08:00:00Z", json!("5")),
        ];
        let today = date("2024-11-15");

        assert_eq!(aggregate(&habits, &logs, today), aggregate(&habits, &logs, today));
    }

    proptest! {
        #[test]
        fn one_summary_per_habit_in_caller_order(ids in proptest::collection::hash_set(1i64..10_000, 0..20)) {
            let habits = ids
                .iter()
                .map(|id| habit(*id, "Leer 30m"))
                .collect::<Vec<_>>();

            let summaries = aggregate(&habits, &[], date("2024-11-15"));

            prop_assert_eq!(summaries.len(), habits.len());
            for (summary, habit) in summaries.iter().zip(&habits) {
                prop_assert_eq!(summary.id, habit.id);
            }
        }

        #[test]
        fn non_positive_values_are_a_no_op(values in proptest::collection::vec(-100.0f64..=0.0, 0..20)) {
            let logs = values
                .iter()
                .map(|value| log(1, "2024-11-15T08:00:00Z", json!(value)))
                .collect::<Vec<_>>();

            let summary = &aggregate(&[habit(1, "Leer 30m")], &logs, date("2024-11-15"))[0];

            prop_assert!(!summary.completed_today);
            prop_assert_eq!(summary.streak, 0);
            prop_assert_eq!(summary.total_this_month, 0.0);
        }
    }
}
