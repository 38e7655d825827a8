//! Timeline settings, persisted as JSON in the OS config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::axis::MAX_PADDING_DAYS;
use crate::error::{Result, TimelineError};
use crate::model::ViewMode;
use crate::normalize::DependencySource;

const SETTINGS_FILE: &str = "settings.json";

/// Upper bound for `default_duration_days`, about a century.
pub const MAX_DEFAULT_DURATION_DAYS: i64 = 36_600;

/// Layout units per day for each view mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitWidths {
    pub days: f32,
    pub weeks: f32,
    pub months: f32,
}

impl Default for UnitWidths {
    fn default() -> Self {
        Self {
            days: 40.0,
            weeks: 18.0,
            months: 6.0,
        }
    }
}

impl UnitWidths {
    pub fn for_mode(&self, mode: ViewMode) -> f32 {
        match mode {
            ViewMode::Days => self.days,
            ViewMode::Weeks => self.weeks,
            ViewMode::Months => self.months,
        }
    }
}

/// User-adjustable timeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub view_mode: ViewMode,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Multiplier applied per zoom-in / zoom-out step.
    pub zoom_step: f32,
    pub unit_width: UnitWidths,
    /// Vertical distance between task rows.
    pub row_spacing: f32,
    /// Days of padding added on both sides of the task range.
    pub range_padding_days: i64,
    /// Span given to records that carry no end date.
    pub default_duration_days: i64,
    pub dependency_source: DependencySource,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Weeks,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 8.0,
            zoom_step: 1.2,
            unit_width: UnitWidths::default(),
            row_spacing: 32.0,
            range_padding_days: 7,
            default_duration_days: 30,
            dependency_source: DependencySource::Sequential,
        }
    }
}

impl TimelineConfig {
    /// Location of the settings file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "GanttTimeline")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load settings from the default location, falling back to defaults
    /// when the file is missing or unreadable.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                tracing::warn!("no config directory available, using default settings");
                Self::default()
            }
        }
    }

    /// Like [`load_from`](Self::load_from) but never fails.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    /// Read and validate settings from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path().ok_or_else(|| {
            TimelineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory available",
            ))
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject settings the layout engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("zoom", self.zoom),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("unit_width.days", self.unit_width.days),
            ("unit_width.weeks", self.unit_width.weeks),
            ("unit_width.months", self.unit_width.months),
            ("row_spacing", self.row_spacing),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TimelineError::invalid_argument(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(TimelineError::invalid_argument(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(TimelineError::invalid_argument(format!(
                "min_zoom ({}) exceeds max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(0..=MAX_PADDING_DAYS).contains(&self.range_padding_days) {
            return Err(TimelineError::invalid_argument(format!(
                "range_padding_days must be within 0..={MAX_PADDING_DAYS}, got {}",
                self.range_padding_days
            )));
        }
        if !(0..=MAX_DEFAULT_DURATION_DAYS).contains(&self.default_duration_days) {
            return Err(TimelineError::invalid_argument(format!(
                "default_duration_days must be within 0..={MAX_DEFAULT_DURATION_DAYS}, got {}",
                self.default_duration_days
            )));
        }
        Ok(())
    }

    /// Units per day for the configured view mode.
    pub fn unit_width(&self) -> f32 {
        self.unit_width.for_mode(self.view_mode)
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * self.zoom_step).min(self.max_zoom);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / self.zoom_step).max(self.min_zoom);
    }
}
