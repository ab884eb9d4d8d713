use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use phase_timeline::timeline::ScrollBehavior;
use phase_timeline::{config, CalendarRange, Phase, TimelineAction, TimelineEngine};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ui;
use crate::ui::timeline_view::EguiBackend;

/// Working copy of a phase while the edit dialog is open.
#[derive(Debug, Clone)]
pub struct PhaseEditor {
    pub phase_id: Uuid,
    pub name: String,
    pub has_dates: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Main application state. Holds the plan in memory only.
pub struct PlanApp {
    pub plan_name: String,
    pub phases: Vec<Phase>,
    pub range: CalendarRange,
    pub engine: Option<TimelineEngine<EguiBackend>>,

    // Dialog state
    pub phase_editor: Option<PhaseEditor>,
    pub show_about: bool,
    pub goto_date: NaiveDate,

    // Status message
    pub status_message: String,
}

impl PlanApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let today = chrono::Local::now().date_naive();
        let phases = Self::sample_phases(today);
        let range = plan_range(&phases, today);
        let backend = EguiBackend::new(cc.egui_ctx.clone());

        let engine = TimelineEngine::new(
            config::load(),
            backend,
            &range,
            phases.clone(),
            today,
            Instant::now(),
        );
        let (engine, status_message) = match engine {
            Ok(engine) => (Some(engine), "Ready".to_string()),
            Err(e) => {
                warn!("timeline unavailable: {e}");
                (None, format!("Timeline unavailable: {e}"))
            }
        };

        Self {
            plan_name: "Sample Plan".to_string(),
            phases,
            range,
            engine,
            phase_editor: None,
            show_about: false,
            goto_date: today,
            status_message,
        }
    }

    /// A few phases around today, plus one without dates.
    fn sample_phases(today: NaiveDate) -> Vec<Phase> {
        let days = chrono::Duration::days;
        vec![
            Phase::new("Discovery").with_dates(today - days(21), today - days(4)),
            Phase::new("Design").with_dates(today - days(3), today + days(17)),
            Phase::new("Build")
                .with_dates(today + days(14), today + days(75))
                .with_color("#FB8C00"),
            Phase::new("Launch"),
        ]
    }

    pub fn add_phase(&mut self) {
        let name = format!("Phase {}", self.phases.len() + 1);
        self.status_message = format!("Added '{name}'");
        self.phases.push(Phase::new(name));
        self.sync_engine();
    }

    pub fn scroll_to(&mut self, date: NaiveDate, behavior: ScrollBehavior) {
        if let Some(engine) = self.engine.as_mut() {
            engine.scroll_to_date(date, behavior);
        }
    }

    fn open_phase_editor(&mut self, phase_id: Uuid) {
        let Some(phase) = self.phases.iter().find(|p| p.id == phase_id) else {
            return;
        };
        let today = chrono::Local::now().date_naive();
        let (start, end) = phase.date_range().unwrap_or((today, today));
        self.phase_editor = Some(PhaseEditor {
            phase_id,
            name: phase.name.clone(),
            has_dates: phase.date_range().is_some(),
            start,
            end,
        });
    }

    /// Write the dialog's values back to the plan and close it.
    pub fn apply_phase_editor(&mut self) {
        let Some(editor) = self.phase_editor.take() else {
            return;
        };
        let Some(phase) = self.phases.iter_mut().find(|p| p.id == editor.phase_id) else {
            return;
        };
        phase.name = editor.name;
        if editor.has_dates {
            phase.set_dates(editor.start, editor.end);
        } else {
            phase.start_date = None;
            phase.end_date = None;
        }
        self.status_message = format!("Updated '{}'", phase.name);
        self.sync_engine();
    }

    fn handle_action(&mut self, action: TimelineAction) {
        match action {
            TimelineAction::PhaseRangeChanged {
                phase_id,
                start,
                end,
            } => {
                let Some(phase) = self.phases.iter_mut().find(|p| p.id == phase_id) else {
                    return;
                };
                phase.set_dates(start, end);
                info!(phase = %phase.name, %start, %end, "phase rescheduled");
                self.status_message = format!(
                    "Updated '{}' ({} → {})",
                    phase.name,
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                );
                self.sync_engine();
            }
            TimelineAction::EditPhase(phase_id) => self.open_phase_editor(phase_id),
        }
    }

    /// Push the plan to the engine, widening the calendar if its years changed.
    fn sync_engine(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.set_phases(self.phases.clone());
        self.range = plan_range(&self.phases, chrono::Local::now().date_naive());
        if let Err(e) = engine.set_calendar_range(&self.range, Instant::now()) {
            warn!("calendar range rejected: {e}");
            self.status_message = format!("Calendar not updated: {e}");
        }
    }
}

/// Span of every dated phase, or the current year when nothing is scheduled.
fn plan_range(phases: &[Phase], today: NaiveDate) -> CalendarRange {
    let dated = phases.iter().filter_map(Phase::date_range);
    let (start, end) = dated.fold((None, None), |(lo, hi): (Option<NaiveDate>, Option<NaiveDate>), (s, e)| {
        (
            Some(lo.map_or(s, |lo| lo.min(s))),
            Some(hi.map_or(e, |hi| hi.max(e))),
        )
    });
    let fallback = NaiveDate::from_yo_opt(today.year(), 1).unwrap_or(today);
    let start = start.unwrap_or(fallback);
    let end = end.unwrap_or(today).max(start);
    CalendarRange::new(
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}

impl eframe::App for PlanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
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
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Phases: {}", self.phases.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        if let Some(engine) = &self.engine {
                            let window = engine.window();
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} – {} · ",
                                    window.start().format("%Y-%m-%d"),
                                    window.end().format("%Y-%m-%d")
                                ))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                            );
                        }
                    });
                });
            });

        if let Some(engine) = self.engine.as_mut() {
            engine.set_today(chrono::Local::now().date_naive());
        }

        // Central panel: timeline
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let actions = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| match self.engine.as_mut() {
                Some(engine) => ui::timeline_view::show_timeline(engine, ui),
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new(&self.status_message).color(ui::theme::TEXT_DIM));
                    });
                    Vec::new()
                }
            })
            .inner;
        for action in actions {
            self.handle_action(action);
        }

        // Dialogs
        if self.phase_editor.is_some() {
            ui::dialogs::show_phase_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}

impl Drop for PlanApp {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.teardown();
        }
    }
}
