use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use gantt_timeline::{ChartLayout, DependencyArrow, HeaderGeometry, Task, TaskBar, TaskId};

use crate::ui::theme;

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// +1 to zoom in, -1 to zoom out, 0 for no change.
    pub zoom_delta: i32,
}

/// Render a computed layout (central panel).
pub fn show_gantt_chart(
    layout: &ChartLayout,
    tasks: &[Task],
    selected_task: &mut Option<TaskId>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();
    let chart_width = layout.total_width.max(available.x);
    let chart_height = HEADER_HEIGHT + layout.total_height + 40.0;
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let row_height = if tasks.is_empty() {
        0.0
    } else {
        layout.total_height / tasks.len() as f32
    };

    // Zoom with Ctrl + scroll wheel
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        if scroll_delta.y > 0.0 {
            interaction.zoom_delta = 1;
        } else if scroll_delta.y < 0.0 {
            interaction.zoom_delta = -1;
        }
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::click(),
            );
            let origin = response.rect.min;
            let body_top = origin.y + HEADER_HEIGHT;
            let body_bottom = response.rect.bottom();
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            draw_header_columns(&painter, origin, &layout.headers, body_bottom);

            // Row separators
            for row in 0..=tasks.len() {
                let y = body_top + row as f32 * row_height;
                painter.line_segment(
                    [Pos2::new(origin.x, y), Pos2::new(origin.x + chart_width, y)],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );
            }

            for arrow in &layout.arrows {
                draw_arrow(&painter, Pos2::new(origin.x, body_top), arrow);
            }

            for bar in &layout.bars {
                let Some(task) = by_id.get(bar.id.as_str()) else {
                    continue;
                };
                let top = body_top + bar.row as f32 * row_height;
                let is_selected = selected_task.as_deref() == Some(bar.id.as_str());
                let bar_rect = draw_task_bar(&painter, origin.x, top, row_height, bar, task, is_selected);

                let bar_response = ui.interact(
                    bar_rect,
                    ui.make_persistent_id(("task-bar", &bar.id)),
                    Sense::click(),
                );
                if bar_response.clicked() {
                    *selected_task = Some(bar.id.clone());
                    consumed_click = true;
                }
                if bar_response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new(("task-tip", &bar.id)),
                        |ui| {
                            ui.strong(&task.name);
                            ui.label(format!(
                                "{} → {}",
                                task.start.format("%d/%m/%Y"),
                                task.end.format("%d/%m/%Y"),
                            ));
                            ui.label(format!("{} · {}", task.status, task.priority.as_str()));
                            ui.label(format!("Progress: {}%", (task.progress * 100.0).round() as i32));
                            if !task.client_name.is_empty() {
                                ui.label(format!("Client: {}", task.client_name));
                            }
                            if bar.critical {
                                ui.colored_label(theme::CRITICAL, "On the critical path");
                            }
                        },
                    );
                }
            }

            // Header is painted last so it stays above the grid.
            draw_header(&painter, origin, &layout.headers, chart_width);

            if let Some(x) = layout.today_x {
                draw_today_line(&painter, origin, x, body_bottom);
            }

            // Empty click on background clears selection
            if response.clicked() && !consumed_click {
                *selected_task = None;
            }
        });

    interaction
}

fn draw_header_columns(
    painter: &egui::Painter,
    origin: Pos2,
    headers: &[HeaderGeometry],
    bottom: f32,
) {
    for header in headers {
        let x = origin.x + header.x;
        let column = Rect::from_min_max(
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x + header.width, bottom),
        );
        if header.is_weekend {
            painter.rect_filled(column, 0.0, theme::BG_WEEKEND);
        }
        if header.is_today {
            painter.rect_filled(column, 0.0, theme::BG_TODAY_BUCKET);
        }
        painter.line_segment(
            [Pos2::new(x, origin.y + HEADER_HEIGHT), Pos2::new(x, bottom)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }
}

fn draw_header(painter: &egui::Painter, origin: Pos2, headers: &[HeaderGeometry], width: f32) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    for header in headers {
        let x = origin.x + header.x;
        let color = if header.is_today {
            theme::ACCENT
        } else if header.is_weekend {
            theme::TEXT_DIM
        } else {
            theme::TEXT_SECONDARY
        };

        // Skip labels that cannot fit their column.
        let galley = painter.layout_no_wrap(header.label.clone(), theme::font_sub(), color);
        if galley.size().x + 4.0 <= header.width {
            painter.galley(
                Pos2::new(x + 3.0, origin.y + 28.0 - galley.size().y / 2.0),
                galley,
                Color32::TRANSPARENT,
            );
        }
        painter.line_segment(
            [Pos2::new(x, origin.y + 18.0), Pos2::new(x, origin.y + HEADER_HEIGHT)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }

    if let Some(first) = headers.first() {
        painter.text(
            Pos2::new(origin.x + first.x + 3.0, origin.y + 10.0),
            egui::Align2::LEFT_CENTER,
            first.date.format("%b %Y").to_string(),
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }
}

fn draw_today_line(painter: &egui::Painter, origin: Pos2, today_x: f32, bottom: f32) {
    let x = origin.x + today_x;
    painter.line_segment(
        [Pos2::new(x, origin.y + HEADER_HEIGHT), Pos2::new(x, bottom)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_task_bar(
    painter: &egui::Painter,
    origin_x: f32,
    row_top: f32,
    row_height: f32,
    bar: &TaskBar,
    task: &Task,
    is_selected: bool,
) -> Rect {
    let inset = theme::BAR_INSET.min(row_height / 4.0);
    let bar_rect = Rect::from_min_size(
        Pos2::new(origin_x + bar.geometry.left, row_top + inset),
        Vec2::new(bar.geometry.width, row_height - inset * 2.0),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar_rect, rounding, theme::status_color(task.status));

    if bar.progress_width > 0.0 {
        let progress_rect =
            Rect::from_min_size(bar_rect.min, Vec2::new(bar.progress_width, bar_rect.height()));
        painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);
    }

    if bar.critical {
        painter.rect_stroke(bar_rect, rounding, Stroke::new(1.5, theme::CRITICAL));
    }
    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Task name on bar, clipped to bar bounds
    if bar.geometry.width > 30.0 {
        let galley = painter.layout_no_wrap(task.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        painter.with_clip_rect(bar_rect).galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }

    bar_rect
}

fn draw_arrow(painter: &egui::Painter, body_origin: Pos2, arrow: &DependencyArrow) {
    let (color, width) = if arrow.critical {
        (theme::CRITICAL, 1.8)
    } else {
        (theme::ARROW, 1.0)
    };
    let points: Vec<Pos2> = arrow
        .geometry
        .elbow_points()
        .iter()
        .map(|p| Pos2::new(body_origin.x + p.x, body_origin.y + p.y))
        .collect();
    let Some(&tip) = points.last() else {
        return;
    };
    painter.add(Shape::line(points, Stroke::new(width, color)));

    let head = theme::ARROW_HEAD;
    painter.add(Shape::convex_polygon(
        vec![
            tip,
            Pos2::new(tip.x - head, tip.y - head * 0.7),
            Pos2::new(tip.x - head, tip.y + head * 0.7),
        ],
        color,
        Stroke::NONE,
    ));
}
