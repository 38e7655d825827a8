//! Bar, header and dependency-arrow geometry in layout units.
//!
//! Horizontal positions are measured from the axis range start; one day
//! spans `unit_width * zoom` units. Vertical positions are row based: row
//! `r` occupies `[r * row_spacing, (r + 1) * row_spacing)`. Converting to
//! device pixels is left to the renderer.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::axis::AxisBuilder;
use crate::clock::Clock;
use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::graph::DependencyGraph;
use crate::model::{Axis, Task, TaskId, TimelineScale, ViewMode};

/// Horizontal extent of a task bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub left: f32,
    pub width: f32,
}

impl BarGeometry {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

/// A bar placed on a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBar {
    pub row: usize,
    pub bar: BarGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Connector from a prerequisite's right edge to its dependent's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowGeometry {
    pub start: Point,
    pub end: Point,
}

impl ArrowGeometry {
    /// Horizontal run; zero for adjacent bars, negative when the dependent
    /// starts before its prerequisite ends.
    pub fn width(&self) -> f32 {
        self.end.x - self.start.x
    }

    /// Orthogonal route: out, across at the horizontal midpoint, in.
    pub fn elbow_points(&self) -> [Point; 4] {
        let mid_x = (self.start.x + self.end.x) / 2.0;
        [
            self.start,
            Point { x: mid_x, y: self.start.y },
            Point { x: mid_x, y: self.end.y },
            self.end,
        ]
    }
}

/// A header bucket clipped to the axis range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderGeometry {
    pub date: NaiveDate,
    pub label: String,
    pub x: f32,
    pub width: f32,
    pub is_weekend: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBar {
    pub id: TaskId,
    pub row: usize,
    pub geometry: BarGeometry,
    /// Width of the progress overlay, from the bar's left edge.
    pub progress_width: f32,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyArrow {
    pub from: TaskId,
    pub to: TaskId,
    pub geometry: ArrowGeometry,
    pub critical: bool,
}

/// Everything a renderer needs for one frame of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub axis: Axis,
    pub headers: Vec<HeaderGeometry>,
    pub bars: Vec<TaskBar>,
    pub arrows: Vec<DependencyArrow>,
    pub critical_path: Vec<TaskId>,
    pub today_x: Option<f32>,
    pub total_width: f32,
    pub total_height: f32,
}

fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TimelineError::invalid_argument(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn scale_for(axis: &Axis, unit_width: f32, zoom: f32) -> Result<TimelineScale> {
    ensure_positive("zoom", zoom)?;
    ensure_positive("unit_width", unit_width)?;
    Ok(TimelineScale::new(axis.range_start, unit_width, zoom))
}

/// Place a task on the axis.
///
/// `left` is the (non-negative) distance from the range start. `width`
/// counts both the first and last day, so a one-day task is one unit wide.
pub fn layout_task(task: &Task, axis: &Axis, unit_width: f32, zoom: f32) -> Result<BarGeometry> {
    let scale = scale_for(axis, unit_width, zoom)?;
    Ok(bar_geometry(task, &scale))
}

fn bar_geometry(task: &Task, scale: &TimelineScale) -> BarGeometry {
    let days = ((task.end - task.start).num_days() + 1).max(1);
    BarGeometry {
        left: scale.date_to_x(task.start).max(0.0),
        width: days as f32 * scale.pixels_per_day(),
    }
}

/// Arrow from the right edge of `from` to the left edge of `to`, each at
/// its row's vertical midpoint.
///
/// Takes [`RowBar`] rather than bare [`BarGeometry`]: the endpoints' `y`
/// comes from each bar's row index, which geometry alone does not carry.
pub fn layout_dependency_arrow(from: RowBar, to: RowBar, row_spacing: f32) -> Result<ArrowGeometry> {
    ensure_positive("row_spacing", row_spacing)?;
    let mid = |row: usize| row as f32 * row_spacing + row_spacing / 2.0;
    Ok(ArrowGeometry {
        start: Point {
            x: from.bar.right(),
            y: mid(from.row),
        },
        end: Point {
            x: to.bar.left,
            y: mid(to.row),
        },
    })
}

/// Header buckets positioned on the axis. Partial buckets at either end are
/// clipped so headers tile `range_start..=range_end` exactly.
pub fn layout_headers(axis: &Axis, unit_width: f32, zoom: f32) -> Result<Vec<HeaderGeometry>> {
    let scale = scale_for(axis, unit_width, zoom)?;
    // exclusive end; the last representable day is dropped rather than overflow
    let limit = axis.range_end.succ_opt().unwrap_or(axis.range_end);
    Ok(axis
        .headers
        .iter()
        .map(|h| {
            let visible_start = h.date.max(axis.range_start);
            let visible_end = axis
                .view_mode
                .next_bucket(h.date)
                .map_or(limit, |next| next.min(limit));
            HeaderGeometry {
                date: h.date,
                label: axis.view_mode.label(h.date),
                x: scale.date_to_x(visible_start),
                width: (visible_end - visible_start).num_days().max(0) as f32
                    * scale.pixels_per_day(),
                is_weekend: h.is_weekend,
                is_today: h.is_today,
            }
        })
        .collect())
}

/// Offset of `today` on the axis, or `None` when it falls outside the range.
pub fn today_offset(axis: &Axis, today: NaiveDate, unit_width: f32, zoom: f32) -> Result<Option<f32>> {
    let scale = scale_for(axis, unit_width, zoom)?;
    Ok(axis.contains(today).then(|| scale.date_to_x(today)))
}

/// Lay out a whole chart: axis, headers, one bar per task in row order,
/// and an arrow for every dependency edge between tasks in the set.
pub fn layout_chart(tasks: &[Task], config: &TimelineConfig, clock: &dyn Clock) -> Result<ChartLayout> {
    config.validate()?;
    let axis = AxisBuilder::from_config(config, clock).build(tasks, config.view_mode);
    layout_on_axis(tasks, axis, config, clock.today())
}

/// Same as [`layout_chart`] with a view mode other than the configured one.
pub fn layout_chart_as(
    tasks: &[Task],
    view_mode: ViewMode,
    config: &TimelineConfig,
    clock: &dyn Clock,
) -> Result<ChartLayout> {
    let config = TimelineConfig {
        view_mode,
        ..config.clone()
    };
    layout_chart(tasks, &config, clock)
}

fn layout_on_axis(
    tasks: &[Task],
    axis: Axis,
    config: &TimelineConfig,
    today: NaiveDate,
) -> Result<ChartLayout> {
    let unit_width = config.unit_width();
    let zoom = config.zoom;
    let scale = scale_for(&axis, unit_width, zoom)?;

    let graph = DependencyGraph::new(tasks);
    let critical_path = graph.critical_path();
    let critical_tasks: HashSet<&str> = critical_path.iter().map(String::as_str).collect();
    let critical_edges: HashSet<(&str, &str)> = critical_path
        .windows(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect();

    let bars: Vec<TaskBar> = tasks
        .iter()
        .enumerate()
        .map(|(row, task)| {
            let geometry = bar_geometry(task, &scale);
            TaskBar {
                id: task.id.clone(),
                row,
                geometry,
                progress_width: geometry.width * task.progress.clamp(0.0, 1.0),
                critical: critical_tasks.contains(task.id.as_str()),
            }
        })
        .collect();

    let mut arrows = Vec::new();
    for (prerequisite, dependent) in graph.edges() {
        let from = &bars[prerequisite];
        let to = &bars[dependent];
        let geometry = layout_dependency_arrow(
            RowBar {
                row: from.row,
                bar: from.geometry,
            },
            RowBar {
                row: to.row,
                bar: to.geometry,
            },
            config.row_spacing,
        )?;
        arrows.push(DependencyArrow {
            from: from.id.clone(),
            to: to.id.clone(),
            geometry,
            critical: critical_edges.contains(&(from.id.as_str(), to.id.as_str())),
        });
    }

    let headers = layout_headers(&axis, unit_width, zoom)?;
    let today_x = axis.contains(today).then(|| scale.date_to_x(today));
    let total_width = scale.total_width(axis.range_end);
    let total_height = tasks.len() as f32 * config.row_spacing;

    tracing::debug!(
        bars = bars.len(),
        arrows = arrows.len(),
        critical = critical_path.len(),
        total_width,
        "laid out chart"
    );

    Ok(ChartLayout {
        axis,
        headers,
        bars,
        arrows,
        critical_path,
        today_x,
        total_width,
        total_height,
    })
}
