use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier of a task, carried over from the source record.
pub type TaskId = String;

/// Cap applied to the elapsed-time progress of active tasks.
///
/// This is a business rule inherited from the source system, not a property
/// of scheduling: an active task never shows more than 80% done until it is
/// marked completed.
pub const ACTIVE_PROGRESS_CAP: f32 = 0.8;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    Active,
    Completed,
    Cancelled,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::ToDo,
        TaskStatus::Active,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
        TaskStatus::OnHold,
    ];

    /// Parse a status string as the source system writes it. Matching is
    /// case-insensitive and tolerates a few spelling variants.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "to do" | "todo" => Some(Self::ToDo),
            "active" | "in progress" => Some(Self::Active),
            "completed" | "complete" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "on hold" | "onhold" => Some(Self::OnHold),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::OnHold => "On Hold",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority level for a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" | "normal" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "urgent" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A normalized task on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub start: NaiveDate,
    /// Inclusive last day; never earlier than `start`.
    pub end: NaiveDate,
    /// Progress from 0.0 (not started) to 1.0 (complete).
    pub progress: f32,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Tasks that come before this one, in source order.
    pub dependencies: Vec<TaskId>,
    pub project_id: String,
    pub project_name: String,
    pub client_name: String,
}

impl Task {
    /// Create a task with default metadata and no dependencies.
    pub fn new(
        id: impl Into<TaskId>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let id = id.into();
        let name = name.into();
        Self {
            project_id: id.clone(),
            project_name: name.clone(),
            id,
            name,
            start,
            end: end.max(start),
            progress: 0.0,
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            dependencies: Vec::new(),
            client_name: String::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the status and recompute progress against `now`.
    pub fn with_status(mut self, status: TaskStatus, now: NaiveDateTime) -> Self {
        self.status = status;
        self.progress = compute_progress(status, self.start, self.end, now);
        self
    }

    /// Number of calendar days covered, counting both ends.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn is_milestone(&self) -> bool {
        self.start == self.end
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}

/// Derive progress from status and elapsed time.
///
/// Completed tasks are done, active tasks report the elapsed fraction of
/// their span (capped at [`ACTIVE_PROGRESS_CAP`]), everything else is 0.
/// The result is always within `[0, 1]`.
pub fn compute_progress(
    status: TaskStatus,
    start: NaiveDate,
    end: NaiveDate,
    now: NaiveDateTime,
) -> f32 {
    let progress = match status {
        TaskStatus::Completed => 1.0,
        TaskStatus::Active => {
            let started = start.and_time(NaiveTime::MIN);
            let elapsed = (now - started).num_seconds().max(0) as f64 / 86_400.0;
            let total = (end - start).num_days() as f64;
            let ratio = if total > 0.0 {
                elapsed / total
            } else if elapsed > 0.0 {
                1.0
            } else {
                0.0
            };
            ratio.min(ACTIVE_PROGRESS_CAP as f64) as f32
        }
        TaskStatus::ToDo | TaskStatus::Cancelled | TaskStatus::OnHold => 0.0,
    };
    progress.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(d: NaiveDate) -> NaiveDateTime {
        d.and_time(NaiveTime::MIN)
    }

    #[test]
    fn active_progress_is_elapsed_fraction() {
        let today = date(2024, 6, 15);
        let p = compute_progress(
            TaskStatus::Active,
            today - Duration::days(10),
            today + Duration::days(10),
            midnight(today),
        );
        assert!((p - 0.5).abs() < 1e-6);
    }

    #[test]
    fn active_progress_is_capped() {
        let today = date(2024, 6, 15);
        let p = compute_progress(
            TaskStatus::Active,
            today - Duration::days(100),
            today - Duration::days(1),
            midnight(today),
        );
        assert_eq!(p, ACTIVE_PROGRESS_CAP);
    }

    #[test]
    fn active_task_not_yet_started_has_no_progress() {
        let today = date(2024, 6, 15);
        let p = compute_progress(
            TaskStatus::Active,
            today + Duration::days(3),
            today + Duration::days(9),
            midnight(today),
        );
        assert_eq!(p, 0.0);
    }

    #[test]
    fn single_day_active_task() {
        let day = date(2024, 6, 15);
        assert_eq!(compute_progress(TaskStatus::Active, day, day, midnight(day)), 0.0);
        let later = midnight(day) + Duration::hours(5);
        assert_eq!(compute_progress(TaskStatus::Active, day, day, later), ACTIVE_PROGRESS_CAP);
    }

    #[test]
    fn status_drives_progress() {
        let day = date(2024, 1, 1);
        let now = midnight(day + Duration::days(5));
        let end = day + Duration::days(10);
        assert_eq!(compute_progress(TaskStatus::Completed, day, end, now), 1.0);
        assert_eq!(compute_progress(TaskStatus::ToDo, day, end, now), 0.0);
        assert_eq!(compute_progress(TaskStatus::Cancelled, day, end, now), 0.0);
        assert_eq!(compute_progress(TaskStatus::OnHold, day, end, now), 0.0);
    }

    #[test]
    fn status_parsing_is_lenient_on_case() {
        assert_eq!(TaskStatus::parse("to do"), Some(TaskStatus::ToDo));
        assert_eq!(TaskStatus::parse("On-Hold"), Some(TaskStatus::OnHold));
        assert_eq!(TaskStatus::parse("COMPLETED"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("archived"), None);
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn status_spelling_variants_are_accepted() {
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("Complete"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("In Progress"), Some(TaskStatus::Active));
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::Active));
        assert_eq!(TaskStatus::parse("canceled"), Some(TaskStatus::Cancelled));
        assert_eq!(TaskStatus::parse("todo"), Some(TaskStatus::ToDo));
        assert_eq!(TaskStatus::parse("started"), None);
    }

    #[test]
    fn status_serializes_with_display_names() {
        let json = serde_json::to_string(&TaskStatus::OnHold).unwrap();
        assert_eq!(json, "\"On Hold\"");
        let back: TaskStatus = serde_json::from_str("\"To Do\"").unwrap();
        assert_eq!(back, TaskStatus::ToDo);
    }

    #[test]
    fn new_task_never_ends_before_it_starts() {
        let t = Task::new("a", "A", date(2024, 3, 10), date(2024, 3, 1));
        assert_eq!(t.end, t.start);
        assert!(t.is_milestone());
        assert_eq!(t.duration_days(), 1);
    }
}
