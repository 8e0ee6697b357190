// src/domain/changes.rs

use crate::domain::financial::{round_money, round_to};
use crate::domain::listing::TrackedState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One price change in a listing's history. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub old_price: f64,
    pub new_price: f64,
    /// Negative for a reduction.
    pub change_amount: f64,
    /// Relative to the old price, in percent.
    pub change_percent: f64,
}

impl PriceHistoryEntry {
    pub fn new(old_price: f64, new_price: f64, timestamp: DateTime<Utc>) -> Self {
        let change_amount = round_money(new_price - old_price);
        let change_percent = if old_price != 0.0 {
            round_to(change_amount / old_price * 100.0, 2)
        } else {
            0.0
        };
        Self {
            timestamp,
            old_price,
            new_price,
            change_amount,
            change_percent,
        }
    }

    pub fn is_reduction(&self) -> bool {
        self.change_amount < 0.0
    }
}

/// What a tracking pass decided. Each `Some` is a write the caller must make;
/// `None` means leave the stored value alone.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChangeOutcome {
    pub original_price: Option<f64>,
    pub price_change_count: Option<i64>,
    /// The full history including the new entry, when one was appended.
    pub price_history: Option<Vec<PriceHistoryEntry>>,
    pub last_price_change_date: Option<NaiveDate>,
    pub previous_price: Option<f64>,
    pub status_change_date: Option<NaiveDate>,
    pub previous_status: Option<String>,
}

impl ChangeOutcome {
    pub fn price_changed(&self) -> bool {
        self.price_history.is_some()
    }

    pub fn status_changed(&self) -> bool {
        self.status_change_date.is_some()
    }
}

/// Compares the current price and status with the stored trackers and
/// decides which guard-once and append-only fields change.
pub struct ChangeTracker;

impl ChangeTracker {
    pub fn track(
        state: &TrackedState,
        price: Option<f64>,
        status: Option<&str>,
        now: DateTime<Utc>,
    ) -> ChangeOutcome {
        let today = now.date_naive();
        let mut outcome = ChangeOutcome::default();

        if let Some(price) = price.filter(|p| *p > 0.0) {
            if state.original_price.is_none() {
                outcome.original_price = Some(price);
                if state.price_history.is_empty() {
                    outcome.price_change_count = Some(state.price_change_count);
                }
            }

            // The very first price write is not a change.
            if let Some(previous) = state.previous_price.filter(|p| *p > 0.0) {
                if previous != price {
                    let mut history = state.price_history.clone();
                    history.push(PriceHistoryEntry::new(previous, price, now));

                    outcome.price_change_count = Some(state.price_change_count + 1);
                    outcome.price_history = Some(history);
                    outcome.last_price_change_date = Some(today);
                }
            }

            if state.previous_price != Some(price) {
                outcome.previous_price = Some(price);
            }
        }

        if let Some(status) = status {
            if state.previous_status.as_deref() != Some(status) {
                outcome.status_change_date = Some(today);
                outcome.previous_status = Some(status.to_string());
            }
        }

        outcome
    }
}

impl TrackedState {
    /// Folds an outcome back in, as the store would after the writes land.
    pub fn apply(&mut self, outcome: &ChangeOutcome) {
        if let Some(p) = outcome.original_price {
            self.original_price = Some(p);
        }
        if let Some(c) = outcome.price_change_count {
            self.price_change_count = c;
        }
        if let Some(h) = &outcome.price_history {
            self.price_history = h.clone();
        }
        if let Some(p) = outcome.previous_price {
            self.previous_price = Some(p);
        }
        if let Some(s) = &outcome.previous_status {
            self.previous_status = Some(s.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn first_price_sets_original_without_counting_a_change() {
        let state = TrackedState::default();
        let outcome = ChangeTracker::track(&state, Some(400_000.0), None, at(1));

        assert_eq!(outcome.original_price, Some(400_000.0));
        assert_eq!(outcome.previous_price, Some(400_000.0));
        assert_eq!(outcome.price_change_count, Some(0));
        assert!(!outcome.price_changed());
    }

    #[test]
    fn price_sequence_builds_history() {
        let mut state = TrackedState::default();

        let first = ChangeTracker::track(&state, Some(400_000.0), None, at(1));
        state.apply(&first);

        let second = ChangeTracker::track(&state, Some(380_000.0), None, at(2));
        assert_eq!(second.original_price, None);
        assert_eq!(second.price_change_count, Some(1));
        let history = second.price_history.clone().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change_amount, -20_000.0);
        assert_eq!(history[0].change_percent, -5.0);
        assert!(history[0].is_reduction());
        assert_eq!(second.last_price_change_date, Some(at(2).date_naive()));
        state.apply(&second);

        let third = ChangeTracker::track(&state, Some(390_000.0), None, at(3));
        assert_eq!(third.price_change_count, Some(2));
        assert_eq!(third.price_history.as_ref().map(Vec::len), Some(2));
        state.apply(&third);

        assert_eq!(state.original_price, Some(400_000.0));
        assert_eq!(state.price_change_count, 2);
    }

    #[test]
    fn unchanged_price_writes_nothing() {
        let state = TrackedState {
            original_price: Some(250_000.0),
            previous_price: Some(250_000.0),
            previous_status: Some("active".into()),
            ..Default::default()
        };
        let outcome = ChangeTracker::track(&state, Some(250_000.0), Some("active"), at(5));
        assert_eq!(outcome, ChangeOutcome::default());
    }

    #[test]
    fn zero_price_leaves_trackers_alone() {
        let state = TrackedState {
            previous_price: Some(250_000.0),
            ..Default::default()
        };
        let outcome = ChangeTracker::track(&state, Some(0.0), None, at(5));
        assert_eq!(outcome, ChangeOutcome::default());
    }

    #[test]
    fn status_change_records_the_date() {
        let state = TrackedState {
            previous_status: Some("active".into()),
            ..Default::default()
        };
        let outcome = ChangeTracker::track(&state, None, Some("pending"), at(9));
        assert!(outcome.status_changed());
        assert_eq!(outcome.status_change_date, Some(at(9).date_naive()));
        assert_eq!(outcome.previous_status.as_deref(), Some("pending"));
    }

    #[test]
    fn first_status_counts_as_a_change() {
        let outcome = ChangeTracker::track(&TrackedState::default(), None, Some("active"), at(1));
        assert!(outcome.status_changed());
    }

    #[test]
    fn price_increase_has_positive_percent() {
        let entry = PriceHistoryEntry::new(380_000.0, 390_000.0, at(3));
        assert_eq!(entry.change_amount, 10_000.0);
        assert_eq!(entry.change_percent, 2.63);
        assert!(!entry.is_reduction());
    }
}
