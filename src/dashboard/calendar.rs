use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::HashMap;

pub const HISTORY_WINDOW_DAYS: usize = 7;

// Days are bucketed in the UTC calendar.
pub fn day_key(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn history_window(today: NaiveDate, len: usize) -> Vec<NaiveDate> {
    (0..len)
        .rev()
        .map(|offset| today - Duration::days(offset as i64))
        .collect()
}

// Consecutive positive days ending at `today`; an absent day ends the walk.
pub fn streak(day_totals: &HashMap<NaiveDate, f64>, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = today;

    while day_totals.get(&day).copied().unwrap_or(0.0) > 0.0 {
        count += 1;
        let Some(previous) = day.pred_opt() else {
            break;
        };
        day = previous;
    }

    count
}
