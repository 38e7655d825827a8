//! Raw API records to timeline tasks.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::model::{compute_progress, RawProject, Task, TaskId, TaskPriority, TaskStatus};

/// Decides which tasks a record depends on.
///
/// The normalizer is the only place dependency policy lives; the graph and
/// layout stages only ever see the resulting `Task::dependencies`.
pub trait DependencyResolver: Send + Sync {
    fn dependencies(&self, index: usize, records: &[RawProject]) -> Vec<TaskId>;
}

/// Built-in dependency policies, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencySource {
    /// Each record depends on the one listed before it. This mirrors the
    /// upstream app, which has no dependency data of its own.
    #[default]
    Sequential,
    /// Use the record's own `dependencies` field.
    Explicit,
    /// Use the record's `dependencies` when present, else `Sequential`.
    ExplicitOrSequential,
    /// No dependencies; every task stands alone.
    None,
}

impl DependencyResolver for DependencySource {
    fn dependencies(&self, index: usize, records: &[RawProject]) -> Vec<TaskId> {
        let previous = || {
            index
                .checked_sub(1)
                .and_then(|i| records.get(i))
                .map(|r| vec![r.id.clone()])
                .unwrap_or_default()
        };
        let explicit = || records.get(index).map(|r| r.dependencies.clone()).unwrap_or_default();
        match self {
            Self::Sequential => previous(),
            Self::Explicit => explicit(),
            Self::ExplicitOrSequential => {
                let deps = explicit();
                if deps.is_empty() {
                    previous()
                } else {
                    deps
                }
            }
            Self::None => Vec::new(),
        }
    }
}

/// Dependency edges supplied by an upstream system, keyed by dependent task.
impl DependencyResolver for HashMap<TaskId, Vec<TaskId>> {
    fn dependencies(&self, index: usize, records: &[RawProject]) -> Vec<TaskId> {
        records
            .get(index)
            .and_then(|r| self.get(&r.id))
            .cloned()
            .unwrap_or_default()
    }
}

/// Converts raw records into [`Task`]s.
pub struct Normalizer<'a> {
    resolver: &'a dyn DependencyResolver,
    default_duration_days: i64,
    clock: &'a dyn Clock,
}

impl<'a> Normalizer<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            resolver: &DependencySource::Sequential,
            default_duration_days: 30,
            clock,
        }
    }

    pub fn from_config(config: &'a TimelineConfig, clock: &'a dyn Clock) -> Self {
        Self {
            resolver: &config.dependency_source,
            default_duration_days: config.default_duration_days,
            clock,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn DependencyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_default_duration(mut self, days: i64) -> Self {
        self.default_duration_days = days;
        self
    }

    /// Normalize every record, failing on the first invalid one.
    pub fn normalize(&self, records: &[RawProject]) -> Result<Vec<Task>> {
        let now = self.clock.now();
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        let mut tasks = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let label = record_label(index, record);

            if record.id.trim().is_empty() {
                return Err(TimelineError::validation(label, "id", "missing identifier"));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(TimelineError::validation(label, "id", "duplicate identifier"));
            }

            let start = match record.start_date.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => parse_date(s).ok_or_else(|| {
                    TimelineError::validation(&label, "start_date", format!("unparseable date '{s}'"))
                })?,
                _ => {
                    return Err(TimelineError::validation(label, "start_date", "missing start date"))
                }
            };

            let end = match record.end_date.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => parse_date(s).ok_or_else(|| {
                    TimelineError::validation(&label, "end_date", format!("unparseable date '{s}'"))
                })?,
                _ => Duration::try_days(self.default_duration_days)
                    .and_then(|span| start.checked_add_signed(span))
                    .ok_or_else(|| {
                        TimelineError::validation(
                            &label,
                            "end_date",
                            format!(
                                "default duration of {} days from {start} is out of range",
                                self.default_duration_days
                            ),
                        )
                    })?,
            };
            let end = if end < start {
                tracing::warn!(record = %label, %start, %end, "end date before start, clamping to start");
                start
            } else {
                end
            };

            let status = if record.status.trim().is_empty() {
                TaskStatus::ToDo
            } else {
                TaskStatus::parse(&record.status).ok_or_else(|| {
                    TimelineError::validation(
                        &label,
                        "status",
                        format!("unknown status '{}'", record.status),
                    )
                })?
            };

            let priority = match record.priority.as_deref() {
                Some(p) => TaskPriority::parse(p).unwrap_or_else(|| {
                    tracing::warn!(record = %label, priority = p, "unknown priority, using medium");
                    TaskPriority::Medium
                }),
                None => TaskPriority::Medium,
            };

            tasks.push(Task {
                id: record.id.clone(),
                name: record.name.clone(),
                start,
                end,
                progress: compute_progress(status, start, end, now),
                status,
                priority,
                dependencies: self.resolver.dependencies(index, records),
                project_id: record.project_id.clone().unwrap_or_else(|| record.id.clone()),
                project_name: record
                    .project_name
                    .clone()
                    .unwrap_or_else(|| record.name.clone()),
                client_name: record.client_name.clone(),
            });
        }

        tracing::debug!(count = tasks.len(), "normalized records");
        Ok(tasks)
    }
}

/// Normalize `records` with the dependency policy and default duration
/// from `config`.
pub fn normalize(
    records: &[RawProject],
    config: &TimelineConfig,
    clock: &dyn Clock,
) -> Result<Vec<Task>> {
    Normalizer::from_config(config, clock).normalize(records)
}

fn record_label(index: usize, record: &RawProject) -> String {
    if record.id.trim().is_empty() {
        format!("#{index}")
    } else {
        record.id.clone()
    }
}

/// Years a parsed date may fall in. Wider ranges, such as chrono's
/// expanded `+262142-12-20` form, are rejected.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parse a date in ISO-8601 form (date, date-time, or RFC 3339), falling
/// back to the common day-first spellings spreadsheets produce. Dates
/// outside [`SUPPORTED_YEARS`] are treated as unparseable.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_any_date(s.trim()).filter(|d| SUPPORTED_YEARS.contains(&d.year()))
}

fn parse_any_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}
