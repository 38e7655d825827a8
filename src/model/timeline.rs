use std::str::FromStr;

use chrono::{Datelike, Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

/// Controls what granularity the timeline axis displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Days,
    #[default]
    Weeks,
    Months,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Days, ViewMode::Weeks, ViewMode::Months];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }

    /// First date of the bucket containing `date`.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Days => date,
            Self::Weeks => {
                let weekday = date.weekday().num_days_from_monday();
                date.checked_sub_days(Days::new(weekday as u64)).unwrap_or(date)
            }
            Self::Months => date.with_day(1).unwrap_or(date),
        }
    }

    /// First date of the bucket following the one that starts at `date`,
    /// or `None` past the last representable date.
    pub fn next_bucket(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Days => date.succ_opt(),
            Self::Weeks => date.checked_add_days(Days::new(7)),
            Self::Months => {
                let (y, m) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(y, m, 1)
            }
        }
    }

    /// Short header text for a bucket starting at `date`.
    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Days => date.format("%d").to_string(),
            Self::Weeks => date.format("W%V").to_string(),
            Self::Months => date.format("%b %Y").to_string(),
        }
    }
}

impl FromStr for ViewMode {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(Self::Days),
            "weeks" => Ok(Self::Weeks),
            "months" => Ok(Self::Months),
            other => Err(TimelineError::invalid_argument(format!(
                "unknown view mode '{other}', expected one of: days, weeks, months"
            ))),
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bucket on the timeline axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisHeader {
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub is_today: bool,
}

/// The shared date range and bucketing every bar is positioned against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub view_mode: ViewMode,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub headers: Vec<AxisHeader>,
}

impl Axis {
    /// Days between range start and end; 0 for a degenerate axis.
    pub fn span_days(&self) -> i64 {
        (self.range_end - self.range_start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.range_start && date <= self.range_end
    }
}

/// Maps dates to horizontal layout units for one axis.
///
/// One day occupies `unit_width * zoom` units; `origin` sits at x = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineScale {
    pub origin: NaiveDate,
    pub unit_width: f32,
    pub zoom: f32,
}

impl TimelineScale {
    pub fn new(origin: NaiveDate, unit_width: f32, zoom: f32) -> Self {
        Self {
            origin,
            unit_width,
            zoom,
        }
    }

    /// Layout units per day at the current zoom.
    pub fn pixels_per_day(&self) -> f32 {
        self.unit_width * self.zoom
    }

    /// Convert a date to an x offset from the origin.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        (date - self.origin).num_days() as f32 * self.pixels_per_day()
    }

    /// Convert an x offset back to the nearest date.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        let days = (x / self.pixels_per_day()).round() as i64;
        Duration::try_days(days)
            .and_then(|d| self.origin.checked_add_signed(d))
            .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
    }

    /// Width of the inclusive range `origin..=end`.
    pub fn total_width(&self, end: NaiveDate) -> f32 {
        self.date_to_x(end) + self.pixels_per_day()
    }

    /// Zoom in by `step`, never beyond `max`.
    pub fn zoom_in(&mut self, step: f32, max: f32) {
        self.zoom = (self.zoom * step).min(max);
    }

    /// Zoom out by `step`, never below `min`.
    pub fn zoom_out(&mut self, step: f32, min: f32) {
        self.zoom = (self.zoom / step).max(min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_known_view_modes() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.as_str().parse::<ViewMode>().unwrap(), mode);
        }
    }

    #[test]
    fn unknown_view_mode_is_invalid_argument() {
        let err = "quarters".parse::<ViewMode>().unwrap_err();
        assert!(matches!(err, TimelineError::InvalidArgument(_)));
        assert!("Days".parse::<ViewMode>().is_err());
    }

    #[test]
    fn bucket_starts() {
        // 2024-05-15 is a Wednesday
        let d = date(2024, 5, 15);
        assert_eq!(ViewMode::Days.bucket_start(d), d);
        assert_eq!(ViewMode::Weeks.bucket_start(d), date(2024, 5, 13));
        assert_eq!(ViewMode::Months.bucket_start(d), date(2024, 5, 1));
    }

    #[test]
    fn month_stepping_wraps_year() {
        assert_eq!(ViewMode::Months.next_bucket(date(2024, 12, 1)), Some(date(2025, 1, 1)));
        assert_eq!(ViewMode::Months.next_bucket(date(2024, 1, 1)), Some(date(2024, 2, 1)));
    }

    #[test]
    fn stepping_stops_at_the_last_representable_date() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.next_bucket(NaiveDate::MAX), None);
        }
        assert_eq!(ViewMode::Weeks.bucket_start(NaiveDate::MIN), NaiveDate::MIN);
        let scale = TimelineScale::new(date(2024, 1, 1), 1.0, 1.0);
        assert_eq!(scale.x_to_date(f32::MAX), NaiveDate::MAX);
        assert_eq!(scale.x_to_date(f32::MIN), NaiveDate::MIN);
    }

    #[test]
    fn labels() {
        let d = date(2024, 1, 8);
        assert_eq!(ViewMode::Days.label(d), "08");
        assert_eq!(ViewMode::Weeks.label(d), "W02");
        assert_eq!(ViewMode::Months.label(d), "Jan 2024");
    }

    #[test]
    fn scale_round_trips_whole_days() {
        let scale = TimelineScale::new(date(2024, 1, 1), 25.0, 2.0);
        assert_eq!(scale.date_to_x(date(2024, 1, 3)), 100.0);
        assert_eq!(scale.x_to_date(100.0), date(2024, 1, 3));
        assert_eq!(scale.x_to_date(124.0), date(2024, 1, 3));
        assert_eq!(scale.total_width(date(2024, 1, 1)), 50.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut scale = TimelineScale::new(date(2024, 1, 1), 10.0, 1.0);
        for _ in 0..50 {
            scale.zoom_in(1.2, 8.0);
        }
        assert_eq!(scale.zoom, 8.0);
        for _ in 0..100 {
            scale.zoom_out(1.2, 0.1);
        }
        assert_eq!(scale.zoom, 0.1);
    }
}
