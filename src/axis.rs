//! Shared date axis for all task bars.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::clock::Clock;
use crate::config::TimelineConfig;
use crate::error::Result;
use crate::model::{Axis, AxisHeader, Task, ViewMode};

pub const DEFAULT_PADDING_DAYS: i64 = 7;
/// Largest padding accepted on either side of the task range.
pub const MAX_PADDING_DAYS: i64 = 3_660;

/// Builds an [`Axis`] from a task set.
pub struct AxisBuilder<'a> {
    padding_days: i64,
    clock: &'a dyn Clock,
}

impl<'a> AxisBuilder<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            padding_days: DEFAULT_PADDING_DAYS,
            clock,
        }
    }

    pub fn from_config(config: &TimelineConfig, clock: &'a dyn Clock) -> Self {
        Self::new(clock).with_padding(config.range_padding_days)
    }

    /// Padding is clamped to `0..=MAX_PADDING_DAYS`.
    pub fn with_padding(mut self, days: i64) -> Self {
        self.padding_days = days.clamp(0, MAX_PADDING_DAYS);
        self
    }

    /// Padded range around all tasks, with one header per bucket.
    ///
    /// With no tasks the range collapses to today on both ends.
    pub fn build(&self, tasks: &[Task], view_mode: ViewMode) -> Axis {
        let today = self.clock.today();
        let padding = Days::new(self.padding_days.unsigned_abs());
        let (range_start, range_end) = match (
            tasks.iter().map(|t| t.start).min(),
            tasks.iter().map(|t| t.end).max(),
        ) {
            // saturate at the ends of the calendar
            (Some(min), Some(max)) => (
                min.checked_sub_days(padding).unwrap_or(NaiveDate::MIN),
                max.checked_add_days(padding).unwrap_or(NaiveDate::MAX),
            ),
            _ => (today, today),
        };

        let headers = bucket_headers(view_mode, range_start, range_end, today);
        tracing::debug!(
            %view_mode,
            %range_start,
            %range_end,
            headers = headers.len(),
            "built timeline axis"
        );

        Axis {
            view_mode,
            range_start,
            range_end,
            headers,
        }
    }
}

/// Build an axis with the default padding.
pub fn build_axis(tasks: &[Task], view_mode: ViewMode, clock: &dyn Clock) -> Axis {
    AxisBuilder::new(clock).build(tasks, view_mode)
}

/// Like [`build_axis`], taking the view mode as its wire name
/// (`"days"`, `"weeks"` or `"months"`). Anything else is an
/// [`InvalidArgument`](crate::TimelineError::InvalidArgument).
pub fn build_axis_named(tasks: &[Task], view_mode: &str, clock: &dyn Clock) -> Result<Axis> {
    let mode: ViewMode = view_mode.parse()?;
    Ok(build_axis(tasks, mode, clock))
}

fn bucket_headers(mode: ViewMode, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Vec<AxisHeader> {
    let mut headers = Vec::new();
    let mut date = mode.bucket_start(start);
    while date <= end {
        headers.push(AxisHeader {
            date,
            is_weekend: mode == ViewMode::Days && is_weekend(date),
            is_today: bucket_contains(mode, date, today),
        });
        match mode.next_bucket(date) {
            Some(next) => date = next,
            None => break,
        }
    }
    headers
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn bucket_contains(mode: ViewMode, bucket: NaiveDate, date: NaiveDate) -> bool {
    match mode {
        ViewMode::Days => bucket == date,
        ViewMode::Weeks => date >= bucket && (date - bucket).num_days() < 7,
        ViewMode::Months => bucket.year() == date.year() && bucket.month() == date.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::TimelineError;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task::new(id, id, start, end)
    }

    #[test]
    fn range_is_padded_by_a_week() {
        let clock = FixedClock::at_date(date(2024, 1, 15));
        let tasks = vec![
            task("a", date(2024, 1, 1), date(2024, 1, 31)),
            task("b", date(2024, 1, 20), date(2024, 2, 19)),
        ];
        let axis = build_axis(&tasks, ViewMode::Days, &clock);
        assert_eq!(axis.range_start, date(2023, 12, 25));
        assert_eq!(axis.range_end, date(2024, 2, 26));
        assert_eq!(axis.headers.len() as i64, axis.span_days() + 1);
    }

    #[test]
    fn empty_tasks_collapse_to_today() {
        let today = date(2024, 3, 6);
        let clock = FixedClock::at_date(today);
        for mode in ViewMode::ALL {
            let axis = build_axis(&[], mode, &clock);
            assert_eq!(axis.range_start, today);
            assert_eq!(axis.range_end, today);
            assert_eq!(axis.headers.len(), 1);
            assert!(axis.headers[0].is_today);
        }
    }

    #[test]
    fn day_headers_flag_weekends_and_today() {
        let clock = FixedClock::at_date(date(2024, 1, 10));
        // 2024-01-08 is a Monday
        let tasks = vec![task("a", date(2024, 1, 8), date(2024, 1, 8))];
        let axis = AxisBuilder::new(&clock).with_padding(0).build(&tasks, ViewMode::Days);
        assert_eq!(axis.headers.len(), 1);

        let tasks = vec![task("a", date(2024, 1, 8), date(2024, 1, 14))];
        let axis = AxisBuilder::new(&clock).with_padding(0).build(&tasks, ViewMode::Days);
        let weekends: Vec<bool> = axis.headers.iter().map(|h| h.is_weekend).collect();
        assert_eq!(weekends, vec![false, false, false, false, false, true, true]);
        let today: Vec<NaiveDate> = axis.headers.iter().filter(|h| h.is_today).map(|h| h.date).collect();
        assert_eq!(today, vec![date(2024, 1, 10)]);
    }

    #[test]
    fn week_headers_start_on_monday() {
        let clock = FixedClock::at_date(date(2024, 1, 10));
        // Wednesday to Wednesday, padding moves start to 2024-01-03 (Wed)
        let tasks = vec![task("a", date(2024, 1, 10), date(2024, 1, 24))];
        let axis = build_axis(&tasks, ViewMode::Weeks, &clock);
        assert_eq!(axis.headers[0].date, date(2024, 1, 1));
        assert!(axis.headers.iter().all(|h| h.date.weekday() == Weekday::Mon));
        assert!(axis.headers.iter().all(|h| !h.is_weekend));
        for pair in axis.headers.windows(2) {
            assert_eq!((pair[1].date - pair[0].date).num_days(), 7);
        }
        let last = axis.headers.last().unwrap().date;
        assert!(last <= axis.range_end && last + Duration::days(7) > axis.range_end);
        assert_eq!(axis.headers.iter().filter(|h| h.is_today).count(), 1);
        assert!(axis.headers[1].is_today);
    }

    #[test]
    fn month_headers_cover_both_ends() {
        let clock = FixedClock::at_date(date(2023, 6, 1));
        let tasks = vec![task("a", date(2023, 11, 20), date(2024, 2, 3))];
        let axis = build_axis(&tasks, ViewMode::Months, &clock);
        let dates: Vec<NaiveDate> = axis.headers.iter().map(|h| h.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2023, 11, 1),
                date(2023, 12, 1),
                date(2024, 1, 1),
                date(2024, 2, 1),
            ]
        );
        assert!(axis.headers.iter().all(|h| !h.is_today && !h.is_weekend));
    }

    #[test]
    fn named_view_mode() {
        let clock = FixedClock::at_date(date(2024, 1, 1));
        let tasks = vec![task("a", date(2024, 1, 1), date(2024, 1, 2))];
        let axis = build_axis_named(&tasks, "months", &clock).unwrap();
        assert_eq!(axis.view_mode, ViewMode::Months);
        let err = build_axis_named(&tasks, "fortnights", &clock).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidArgument(_)));
    }

    #[test]
    fn identical_inputs_give_identical_axes() {
        let clock = FixedClock::at_date(date(2024, 5, 5));
        let tasks = vec![task("a", date(2024, 4, 1), date(2024, 6, 1))];
        for mode in ViewMode::ALL {
            assert_eq!(build_axis(&tasks, mode, &clock), build_axis(&tasks, mode, &clock));
        }
    }

    #[test]
    fn range_saturates_at_the_end_of_the_calendar() {
        let clock = FixedClock::at_date(date(2024, 1, 1));
        let last = NaiveDate::MAX;
        let tasks = vec![task("late", last - Duration::days(3), last)];
        for mode in ViewMode::ALL {
            let axis = build_axis(&tasks, mode, &clock);
            assert_eq!(axis.range_end, last);
            assert_eq!(axis.range_start, last - Duration::days(10));
            assert!(!axis.headers.is_empty());
        }
    }

    #[test]
    fn padding_is_clamped() {
        let clock = FixedClock::at_date(date(2024, 1, 1));
        let tasks = vec![task("a", date(2024, 1, 1), date(2024, 1, 1))];
        let axis = AxisBuilder::new(&clock)
            .with_padding(i64::MAX)
            .build(&tasks, ViewMode::Months);
        assert_eq!(
            axis.range_start,
            date(2024, 1, 1) - Duration::days(MAX_PADDING_DAYS)
        );
        let axis = AxisBuilder::new(&clock).with_padding(-5).build(&tasks, ViewMode::Days);
        assert_eq!(axis.span_days(), 0);
    }
}
