pub mod raw;
pub mod task;
pub mod timeline;

pub use raw::RawProject;
pub use task::{compute_progress, Task, TaskId, TaskPriority, TaskStatus, ACTIVE_PROGRESS_CAP};
pub use timeline::{Axis, AxisHeader, TimelineScale, ViewMode};
