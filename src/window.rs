//! Cyclic sliding windows over a finite record sequence.
//!
//! A window of `window_size` records is cut at the cursor. When the window
//! would run past the end of the data, the cursor resets to the start and the
//! window is cut from there instead; the tail is never spliced onto the head.
//! After each cut the cursor moves forward by exactly one record, whatever the
//! window size.

use crate::error::AppError;
use std::ops::Range;
use std::sync::Mutex;

/// Number of five-minute records in one hour.
pub const RECORDS_PER_HOUR: usize = 12;

/// Time span requested by a client, one record per five minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowRange {
    #[default]
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
}

impl WindowRange {
    /// Maps a query value to a range. Unknown or missing values use one hour.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("3h") => Self::ThreeHours,
            Some("6h") => Self::SixHours,
            Some("12h") => Self::TwelveHours,
            _ => Self::OneHour,
        }
    }

    pub fn hours(self) -> usize {
        match self {
            Self::OneHour => 1,
            Self::ThreeHours => 3,
            Self::SixHours => 6,
            Self::TwelveHours => 12,
        }
    }

    pub fn window_size(self) -> usize {
        self.hours() * RECORDS_PER_HOUR
    }
}

/// Where the next window lands, and where the cursor goes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowStep {
    pub range: Range<usize>,
    pub next_position: usize,
}

/// Pure windowing step for a cursor at `position` over `len` records.
pub fn step(position: usize, window_size: usize, len: usize) -> WindowStep {
    let start = match position.checked_add(window_size) {
        Some(end) if end <= len => position,
        _ => 0,
    };
    let end = start.saturating_add(window_size).min(len);
    let next_position = if len == 0 { 0 } else { (start + 1) % len };

    WindowStep {
        range: start..end,
        next_position,
    }
}

/// Shared cursor into the live-feed dataset.
///
/// Reading the position and advancing it happen under one lock, so two
/// concurrent callers never receive a window from the same starting record.
#[derive(Debug, Default)]
pub struct WindowCursor {
    position: Mutex<usize>,
}

impl WindowCursor {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(position: usize) -> Self {
        Self {
            position: Mutex::new(position),
        }
    }

    pub fn position(&self) -> Result<usize, AppError> {
        let guard = self.position.lock().map_err(|_| AppError::StateLock)?;
        Ok(*guard)
    }

    /// Cuts the next window for a dataset of `len` records and advances by one.
    pub fn advance(&self, window_size: usize, len: usize) -> Result<Range<usize>, AppError> {
        let mut guard = self.position.lock().map_err(|_| AppError::StateLock)?;
        let next = step(*guard, window_size, len);
        *guard = next.next_position;
        Ok(next.range)
    }

    /// Same window `advance` would return, without moving the cursor.
    pub fn peek(&self, window_size: usize, len: usize) -> Result<Range<usize>, AppError> {
        let guard = self.position.lock().map_err(|_| AppError::StateLock)?;
        Ok(step(*guard, window_size, len).range)
    }

    pub fn reset(&self) -> Result<(), AppError> {
        let mut guard = self.position.lock().map_err(|_| AppError::StateLock)?;
        *guard = 0;
        Ok(())
    }

    /// Cursor whose lock was poisoned by a panicking holder.
    #[cfg(test)]
    pub(crate) fn poisoned() -> Self {
        let cursor = Self::new();
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = cursor.position.lock().expect("lock for poison");
                    panic!("poison lock");
                })
                .join();
        });
        cursor
    }
}

/// Lazy, infinite window sequence over a borrowed slice.
#[derive(Debug, Clone)]
pub struct Windows<'a, T> {
    records: &'a [T],
    window_size: usize,
    position: usize,
}

impl<'a, T> Windows<'a, T> {
    pub fn new(records: &'a [T], window_size: usize) -> Self {
        Self {
            records,
            window_size,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewinds to the first record.
    pub fn restart(&mut self) {
        self.position = 0;
    }
}

impl<'a, T> Iterator for Windows<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        let next = step(self.position, self.window_size, self.records.len());
        self.position = next.next_position;
        Some(&self.records[next.range])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_maps_to_five_minute_record_counts() {
        assert_eq!(WindowRange::from_query(Some("1h")).window_size(), 12);
        assert_eq!(WindowRange::from_query(Some("3h")).window_size(), 36);
        assert_eq!(WindowRange::from_query(Some("6h")).window_size(), 72);
        assert_eq!(WindowRange::from_query(Some("12h")).window_size(), 144);
    }

    #[test]
    fn unknown_or_missing_range_defaults_to_one_hour() {
        assert_eq!(WindowRange::from_query(None), WindowRange::OneHour);
        assert_eq!(WindowRange::from_query(Some("24h")), WindowRange::OneHour);
        assert_eq!(WindowRange::from_query(Some("")), WindowRange::OneHour);
    }

    #[test]
    fn window_that_fits_starts_at_cursor() {
        let next = step(3, 12, 20);
        assert_eq!(next.range, 3..15);
        assert_eq!(next.next_position, 4);
    }

    #[test]
    fn window_ending_exactly_at_len_is_not_reset() {
        let next = step(8, 12, 20);
        assert_eq!(next.range, 8..20);
        assert_eq!(next.next_position, 9);
    }

    #[test]
    fn overflowing_window_resets_to_start() {
        let next = step(9, 12, 20);
        assert_eq!(next.range, 0..12);
        assert_eq!(next.next_position, 1);
    }

    #[test]
    fn window_larger_than_dataset_returns_everything() {
        let next = step(0, 144, 20);
        assert_eq!(next.range, 0..20);
        assert_eq!(next.next_position, 1);
    }

    #[test]
    fn single_record_dataset_keeps_cursor_at_zero() {
        let next = step(0, 12, 1);
        assert_eq!(next.range, 0..1);
        assert_eq!(next.next_position, 0);
    }

    #[test]
    fn empty_dataset_yields_empty_window() {
        let next = step(5, 12, 0);
        assert_eq!(next.range, 0..0);
        assert_eq!(next.next_position, 0);
    }

    #[test]
    fn cursor_past_shrunk_dataset_resyncs() {
        let cursor = WindowCursor::starting_at(50);

        let range = cursor.advance(12, 20).expect("advance");

        assert_eq!(range, 0..12);
        assert_eq!(cursor.position().expect("position"), 1);
    }

    #[test]
    fn cursor_advances_one_record_per_call() {
        let cursor = WindowCursor::new();

        let first = cursor.advance(12, 20).expect("first");
        let second = cursor.advance(36, 40).expect("second");

        assert_eq!(first, 0..12);
        assert_eq!(second, 1..37);
        assert_eq!(cursor.position().expect("position"), 2);
    }

    #[test]
    fn peek_does_not_move_cursor() {
        let cursor = WindowCursor::starting_at(4);

        let peeked = cursor.peek(12, 20).expect("peek");
        let taken = cursor.advance(12, 20).expect("advance");

        assert_eq!(peeked, taken);
        assert_eq!(cursor.position().expect("position"), 5);
    }

    #[test]
    fn reset_rewinds_cursor() {
        let cursor = WindowCursor::starting_at(7);

        cursor.reset().expect("reset");

        assert_eq!(cursor.position().expect("position"), 0);
    }

    #[test]
    fn poisoned_lock_is_reported_as_state_lock_error() {
        let cursor = WindowCursor::poisoned();

        assert!(matches!(cursor.advance(12, 20), Err(AppError::StateLock)));
        assert!(matches!(cursor.peek(12, 20), Err(AppError::StateLock)));
        assert!(matches!(cursor.reset(), Err(AppError::StateLock)));
        assert!(matches!(cursor.position(), Err(AppError::StateLock)));
    }

    #[test]
    fn windows_iterator_matches_scenario_over_twenty_records() {
        let records: Vec<u32> = (0..20).collect();
        let mut windows = Windows::new(&records, 12);

        let starts: Vec<u32> = windows.by_ref().take(10).map(|w| w[0]).collect();

        assert_eq!(starts, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 0]);
        assert_eq!(windows.position(), 1);
    }

    #[test]
    fn windows_iterator_restarts_from_first_record() {
        let records: Vec<u32> = (0..5).collect();
        let mut windows = Windows::new(&records, 2);
        let _ = windows.nth(2);

        windows.restart();

        assert_eq!(windows.next(), Some(&records[0..2]));
    }

    #[test]
    fn concurrent_callers_never_share_a_start() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let cursor = Arc::new(WindowCursor::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cursor = Arc::clone(&cursor);
                std::thread::spawn(move || {
                    (0..10)
                        .map(|_| cursor.advance(1, 1000).expect("advance").start)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut starts = HashSet::new();
        for handle in handles {
            for start in handle.join().expect("join") {
                assert!(starts.insert(start), "duplicate window start {start}");
            }
        }
        assert_eq!(starts.len(), 80);
        assert_eq!(cursor.position().expect("position"), 80);
    }
}
