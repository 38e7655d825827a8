//! Project timeline engine.
//!
//! The pipeline runs in four stages, each usable on its own:
//!
//! 1. [`normalize`] turns loosely typed [`RawProject`] records into [`Task`]s.
//! 2. [`find_critical_path`] picks the longest chain of dependent tasks.
//! 3. [`build_axis`] derives the padded date range and header buckets.
//! 4. [`layout_task`], [`layout_dependency_arrow`] and [`layout_chart`]
//!    place bars and connectors in layout units.
//!
//! Every stage that needs "now" takes a [`Clock`], so results are
//! reproducible under [`FixedClock`].

pub mod axis;
pub mod clock;
pub mod config;
pub mod error;
pub mod graph;
pub mod io;
pub mod layout;
pub mod model;
pub mod normalize;

pub use axis::{build_axis, build_axis_named, AxisBuilder};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{TimelineConfig, UnitWidths};
pub use error::{Result, TimelineError};
pub use graph::{find_critical_path, is_valid_chain, DependencyGraph};
pub use layout::{
    layout_chart, layout_chart_as, layout_dependency_arrow, layout_headers, layout_task,
    today_offset, ArrowGeometry, BarGeometry, ChartLayout, DependencyArrow, HeaderGeometry, Point,
    RowBar, TaskBar,
};
pub use model::{
    compute_progress, Axis, AxisHeader, RawProject, Task, TaskId, TaskPriority, TaskStatus,
    TimelineScale, ViewMode, ACTIVE_PROGRESS_CAP,
};
pub use normalize::{normalize, parse_date, DependencyResolver, DependencySource, Normalizer};
