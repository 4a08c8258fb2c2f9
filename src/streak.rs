//! Daily training streak
//!
//! Any finished session counts as "trained today", however short.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted streak record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive calendar days with at least one finished session
    pub streak: u32,
    /// Day of the last finished session
    pub last_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn new(streak: u32, last_date: NaiveDate) -> Self {
        Self {
            streak,
            last_date: Some(last_date),
        }
    }
}

/// Fold one finished session on `today` into the streak
///
/// Same day keeps the count, the next day extends it, anything else
/// (a gap, no prior record, or a clock that went backwards) restarts at 1.
pub fn record_training(state: StreakState, today: NaiveDate) -> StreakState {
    let streak = match state.last_date {
        Some(last) if last == today => state.streak.max(1),
        Some(last) if last.succ_opt() == Some(today) => state.streak + 1,
        _ => 1,
    };
    StreakState {
        streak,
        last_date: Some(today),
    }
}

/// Source of "today" for streak bookkeeping
pub trait Calendar {
    fn today(&self) -> NaiveDate;
}

/// The device's local calendar day
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCalendar;

impl Calendar for LocalCalendar {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A calendar pinned to one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCalendar(pub NaiveDate);

impl FixedCalendar {
    /// `None` for an invalid date
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl Calendar for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_day_extends() {
        let state = StreakState::new(4, day(2024, 1, 1));
        let next = record_training(state, day(2024, 1, 2));
        assert_eq!(next.streak, 5);
        assert_eq!(next.last_date, Some(day(2024, 1, 2)));
    }

    #[test]
    fn test_gap_resets() {
        let state = StreakState::new(4, day(2024, 1, 1));
        assert_eq!(record_training(state, day(2024, 1, 5)).streak, 1);
    }

    #[test]
    fn test_same_day_unchanged() {
        let state = StreakState::new(3, day(2024, 1, 1));
        assert_eq!(record_training(state, day(2024, 1, 1)), state);
    }

    #[test]
    fn test_first_session_starts_at_one() {
        let next = record_training(StreakState::default(), day(2024, 3, 9));
        assert_eq!(next, StreakState::new(1, day(2024, 3, 9)));
    }

    #[test]
    fn test_month_and_leap_boundaries() {
        let state = StreakState::new(1, day(2024, 2, 28));
        assert_eq!(record_training(state, day(2024, 2, 29)).streak, 2);
        let state = StreakState::new(1, day(2023, 12, 31));
        assert_eq!(record_training(state, day(2024, 1, 1)).streak, 2);
    }

    #[test]
    fn test_backwards_clock_resets() {
        let state = StreakState::new(6, day(2024, 5, 10));
        assert_eq!(record_training(state, day(2024, 5, 9)).streak, 1);
    }

    #[test]
    fn test_streak_json_shape() {
        let state = StreakState::new(2, day(2024, 1, 2));
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"streak":2,"last_date":"2024-01-02"}"#);
    }
}
