use std::path::PathBuf;

use chrono::Duration;
use gantt_timeline::{
    io, layout_chart, normalize, ChartLayout, Clock, DependencySource, RawProject, SystemClock,
    Task, TaskId, TimelineConfig, ViewMode,
};

use crate::ui;

/// Main application state.
pub struct TimelineApp {
    pub records: Vec<RawProject>,
    pub tasks: Vec<Task>,
    pub layout: Option<ChartLayout>,
    pub config: TimelineConfig,
    pub clock: SystemClock,
    pub file_path: Option<PathBuf>,
    pub selected_task: Option<TaskId>,

    pub show_about: bool,

    // Status message
    pub status_message: String,
}

impl TimelineApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let clock = SystemClock;
        let mut app = Self {
            records: Self::sample_records(&clock),
            tasks: Vec::new(),
            layout: None,
            config: TimelineConfig::load(),
            clock,
            file_path: None,
            selected_task: None,
            show_about: false,
            status_message: "Ready".to_string(),
        };
        app.recompute();
        app
    }

    /// A small project around today for first launch.
    fn sample_records(clock: &dyn Clock) -> Vec<RawProject> {
        let today = clock.today();
        let day = |offset: i64| (today + Duration::days(offset)).format("%Y-%m-%d").to_string();

        vec![
            RawProject::new("kickoff", "Project Kickoff", day(-12))
                .with_end(day(-9))
                .with_status("Completed"),
            RawProject::new("requirements", "Requirements", day(-8))
                .with_end(day(2))
                .with_status("Active")
                .with_client("Acme"),
            RawProject::new("design", "UI Design", day(3))
                .with_end(day(15))
                .with_dependencies(["requirements"]),
            RawProject::new("backend", "Backend Development", day(3))
                .with_end(day(26))
                .with_dependencies(["requirements"]),
            RawProject::new("qa", "Testing & QA", day(27))
                .with_end(day(34))
                .with_dependencies(["design", "backend"]),
            RawProject::new("launch", "Launch", day(35)).with_end(day(35)),
        ]
    }

    /// Run the pipeline again after records or settings changed.
    pub fn recompute(&mut self) {
        let result = normalize(&self.records, &self.config, &self.clock).and_then(|tasks| {
            let layout = layout_chart(&tasks, &self.config, &self.clock)?;
            Ok((tasks, layout))
        });
        match result {
            Ok((tasks, layout)) => {
                self.tasks = tasks;
                self.layout = Some(layout);
            }
            Err(e) => {
                tracing::warn!(error = %e, "timeline recompute failed");
                self.tasks.clear();
                self.layout = None;
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    // --- File operations ---

    pub fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Projects", &["json", "csv", "txt"])
            .pick_file()
        {
            match io::load_any(&path) {
                Ok((records, skipped)) => {
                    let count = records.len();
                    self.records = records;
                    self.file_path = Some(path);
                    self.selected_task = None;
                    self.status_message = if skipped > 0 {
                        format!("Loaded {} records ({} rows skipped)", count, skipped)
                    } else {
                        format!("Loaded {} records", count)
                    };
                    self.recompute();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn reload(&mut self) {
        let Some(path) = self.file_path.clone() else {
            self.status_message = "Nothing to reload".to_string();
            return;
        };
        match io::load_any(&path) {
            Ok((records, _)) => {
                self.records = records;
                self.status_message = "Reloaded".to_string();
                self.recompute();
            }
            Err(e) => self.status_message = format!("Error loading: {}", e),
        }
    }

    pub fn export_csv(&mut self) {
        if self.tasks.is_empty() {
            self.status_message = "Nothing to export, the timeline has no tasks".to_string();
            return;
        }
        let critical = self
            .layout
            .as_ref()
            .map(|l| l.critical_path.clone())
            .unwrap_or_default();

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(format!("{}.csv", self.document_name()))
            .save_file()
        {
            match io::export_csv(&self.tasks, &critical, &path) {
                Ok(count) => self.status_message = format!("Exported {} tasks to CSV", count),
                Err(e) => self.status_message = format!("CSV export failed: {}", e),
            }
        }
    }

    pub fn export_layout(&mut self) {
        let Some(layout) = &self.layout else {
            self.status_message = "Nothing to export".to_string();
            return;
        };
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Layout JSON", &["json"])
            .set_file_name(format!("{}.layout.json", self.document_name()))
            .save_file()
        {
            match io::save_layout(layout, &path) {
                Ok(()) => self.status_message = "Layout exported".to_string(),
                Err(e) => self.status_message = format!("Export failed: {}", e),
            }
        }
    }

    // --- View operations ---

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.config.view_mode != mode {
            self.config.view_mode = mode;
            self.settings_changed();
        }
    }

    pub fn set_dependency_source(&mut self, source: DependencySource) {
        if self.config.dependency_source != source {
            self.config.dependency_source = source;
            self.settings_changed();
        }
    }

    pub fn zoom_in(&mut self) {
        self.config.zoom_in();
        self.settings_changed();
    }

    pub fn zoom_out(&mut self) {
        self.config.zoom_out();
        self.settings_changed();
    }

    pub fn reset_zoom(&mut self) {
        self.config.zoom = 1.0;
        self.settings_changed();
    }

    fn settings_changed(&mut self) {
        if let Err(e) = self.config.save() {
            tracing::warn!(error = %e, "could not save settings");
        }
        self.recompute();
    }

    pub fn document_name(&self) -> String {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("timeline")
            .to_string()
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        // Keyboard shortcuts outside closures to avoid borrow issues
        let should_open = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::O));
        let should_reload = ctx.input(|i| i.key_pressed(egui::Key::F5));
        if should_open {
            self.open_file();
        }
        if should_reload {
            self.reload();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        let critical_len = self.layout.as_ref().map_or(0, |l| l.critical_path.len());
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_sub())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · Critical: {} · {} · Zoom: {:.0}%",
                                self.tasks.len(),
                                critical_len,
                                self.config.view_mode,
                                self.config.zoom * 100.0
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let mut interaction = ui::gantt_chart::ChartInteraction::default();
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            match &self.layout {
                Some(layout) => {
                    interaction = ui::gantt_chart::show_gantt_chart(
                        layout,
                        &self.tasks,
                        &mut self.selected_task,
                        ui,
                    );
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("No timeline to show")
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                }
            }
        });

        if interaction.zoom_delta > 0 {
            self.zoom_in();
        } else if interaction.zoom_delta < 0 {
            self.zoom_out();
        }

        if self.show_about {
            egui::Window::new("About")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.strong("Gantt Timeline");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.label("Highlighted bars and arrows mark the critical path.");
                });
        }
    }
}
