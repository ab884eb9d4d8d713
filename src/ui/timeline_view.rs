use std::time::Instant;

use chrono::{Datelike, Months};
use egui::{Align2, Painter, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use phase_timeline::timeline::segments::is_weekend;
use phase_timeline::timeline::{PreviewHandle, PreviewRect, RenderBackend, ScrollBehavior};
use phase_timeline::{TimelineAction, TimelineEngine};

use crate::ui::theme;

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// Retained preview state. The engine mutates it at most once per frame; the
/// view paints whatever it holds on top of the bars.
#[derive(Debug, Default, Clone, Copy)]
pub struct EguiPreview {
    rect: PreviewRect,
    visible: bool,
}

impl PreviewHandle for EguiPreview {
    fn set_rect(&mut self, rect: PreviewRect) {
        self.rect = rect;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Bridges the engine to egui: layout is captured while the chart is laid out,
/// frame requests become repaints and scroll requests are applied on the next
/// pass through [`show_timeline`].
pub struct EguiBackend {
    ctx: egui::Context,
    content_left: f32,
    viewport_width: f32,
    laid_out: bool,
    pending_scroll: Option<(f32, ScrollBehavior)>,
}

impl EguiBackend {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            content_left: 0.0,
            viewport_width: 0.0,
            laid_out: false,
            pending_scroll: None,
        }
    }

    fn set_layout(&mut self, content_left: f32, viewport_width: f32) {
        self.content_left = content_left;
        self.viewport_width = viewport_width;
        self.laid_out = true;
    }

    fn take_scroll(&mut self) -> Option<(f32, ScrollBehavior)> {
        self.pending_scroll.take()
    }
}

impl RenderBackend for EguiBackend {
    type Surface = EguiPreview;

    fn mount_preview(&mut self) -> Option<EguiPreview> {
        // The chart has to have been laid out once before there is anywhere
        // to put the preview.
        self.laid_out.then(EguiPreview::default)
    }

    fn content_left(&self) -> f32 {
        self.content_left
    }

    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn request_frame(&mut self) {
        self.ctx.request_repaint();
    }

    fn request_scroll(&mut self, offset_x: f32, behavior: ScrollBehavior) {
        self.pending_scroll = Some((offset_x, behavior));
        self.ctx.request_repaint();
    }
}

/// Render the timeline (central panel) and feed it this frame's pointer input.
pub fn show_timeline(engine: &mut TimelineEngine<EguiBackend>, ui: &mut Ui) -> Vec<TimelineAction> {
    let now = Instant::now();
    let mut actions = Vec::new();
    let viewport_width = ui.available_width();
    let content_width = engine.window().total_width();
    let content_height = HEADER_HEIGHT + engine.mapper().lanes_height(engine.phases().len());

    let scroll = engine.backend_mut().take_scroll();
    let mut area = egui::ScrollArea::horizontal()
        .id_salt("timeline_scroll")
        .auto_shrink([false, false])
        .drag_to_scroll(false);
    if let Some((offset, ScrollBehavior::Immediate)) = scroll {
        area = area.horizontal_scroll_offset(offset);
    }

    area.show(ui, |ui| {
        let (response, painter) = ui.allocate_painter(
            Vec2::new(content_width, content_height.max(ui.available_height())),
            Sense::click_and_drag(),
        );
        let origin = response.rect.min;
        let lanes_origin = origin + Vec2::new(0.0, HEADER_HEIGHT);
        engine.backend_mut().set_layout(origin.x, viewport_width);

        if let Some((offset, ScrollBehavior::Smooth)) = scroll {
            let x = origin.x + offset + viewport_width / 2.0;
            ui.scroll_to_rect(
                Rect::from_min_size(Pos2::new(x, origin.y), Vec2::splat(1.0)),
                Some(egui::Align::Center),
            );
        }

        forward_pointer(engine, ui, response.rect, lanes_origin, now, &mut actions);
        actions.extend(engine.tick(now));
        engine.on_frame(now);

        painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
        draw_lanes(&painter, engine, lanes_origin);
        draw_header(&painter, engine, origin, response.rect.bottom());
        draw_bars(&painter, engine, lanes_origin);
        draw_preview(&painter, engine, lanes_origin);
        draw_today_line(&painter, engine, origin, response.rect.bottom());
    });

    // Drag promotion, held commits and preview mounting are timer driven.
    let waiting = engine.has_held_commit() || !engine.preview().is_mounted();
    if waiting || ui.input(|i| i.pointer.primary_down()) {
        ui.ctx()
            .request_repaint_after(engine.config().drag_start_delay() / 2);
    }

    actions
}

fn forward_pointer(
    engine: &mut TimelineEngine<EguiBackend>,
    ui: &Ui,
    chart: Rect,
    lanes_origin: Pos2,
    now: Instant,
    actions: &mut Vec<TimelineAction>,
) {
    let (pressed, released, moved, pos) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.delta() != Vec2::ZERO,
            i.pointer.interact_pos(),
        )
    });
    let Some(pos) = pos else {
        if released {
            actions.extend(engine.pointer_up(now));
        }
        return;
    };

    if pressed && chart.contains(pos) && ui.clip_rect().contains(pos) {
        if let Some(lane) = engine.mapper().lane_at(pos.y - lanes_origin.y) {
            actions.extend(engine.pointer_down(pos.x, lane, now));
        }
    }
    if moved {
        engine.pointer_move(pos.x, now);
    }
    if released {
        actions.extend(engine.pointer_up(now));
    }
}

fn draw_header(painter: &Painter, engine: &TimelineEngine<EguiBackend>, origin: Pos2, bottom: f32) {
    let width = engine.window().total_width();
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

    let mapper = engine.mapper();
    let window = engine.window();
    let mut date = window.start();
    while date <= window.end() {
        let x = origin.x + mapper.index_to_x(mapper.clamp_index(mapper.date_to_index(date)));
        painter.line_segment(
            [Pos2::new(x, origin.y + HEADER_HEIGHT), Pos2::new(x, bottom)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        if date.month() == 1 {
            painter.text(
                Pos2::new(x + 5.0, origin.y + 12.0),
                Align2::LEFT_CENTER,
                date.year().to_string(),
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }
        painter.text(
            Pos2::new(x + 5.0, origin.y + 30.0),
            Align2::LEFT_CENTER,
            date.format("%b").to_string(),
            theme::font_sub(),
            theme::TEXT_SECONDARY,
        );

        let Some(next) = date.checked_add_months(Months::new(1)) else {
            break;
        };
        date = next;
    }
}

fn draw_lanes(painter: &Painter, engine: &TimelineEngine<EguiBackend>, lanes_origin: Pos2) {
    let mapper = engine.mapper();
    let width = engine.window().total_width();
    let height = mapper.lanes_height(engine.phases().len());

    // Weekend shading, only for the visible columns.
    let clip = painter.clip_rect();
    let first = mapper.day_index_at(clip.left() - lanes_origin.x);
    let last = mapper.day_index_at(clip.right() - lanes_origin.x);
    for index in first..=last {
        if is_weekend(mapper.index_to_date(index)) {
            painter.rect_filled(
                Rect::from_min_size(
                    Pos2::new(lanes_origin.x + mapper.index_to_x(index), lanes_origin.y),
                    Vec2::new(mapper.px_per_day(), height),
                ),
                0.0,
                theme::BG_WEEKEND,
            );
        }
    }

    for lane in 0..engine.phases().len() {
        let y = lanes_origin.y + mapper.lane_top(lane) + mapper.track_height();
        painter.line_segment(
            [Pos2::new(lanes_origin.x, y), Pos2::new(lanes_origin.x + width, y)],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
        if engine.bar_range(lane).is_none() {
            painter.text(
                Pos2::new(clip.left() + 8.0, y - mapper.track_height() / 2.0),
                Align2::LEFT_CENTER,
                "Drag to set dates",
                theme::font_small(),
                theme::TEXT_DIM,
            );
        }
    }
}

fn draw_bars(painter: &Painter, engine: &TimelineEngine<EguiBackend>, lanes_origin: Pos2) {
    let mapper = engine.mapper();
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    for bar in engine.bars() {
        let rect = bar.rect.translate(lanes_origin.to_vec2());
        // Weekends show through as a faded span behind the weekday segments.
        painter.rect_filled(rect, rounding, bar.color.gamma_multiply(0.3));
        for segment in &bar.segments {
            let left = lanes_origin.x + mapper.index_to_x(segment.start);
            let right = lanes_origin.x + mapper.index_to_x(segment.end());
            painter.rect_filled(
                Rect::from_x_y_ranges(left..=right, rect.y_range()),
                0.0,
                bar.color,
            );
        }

        let Some(phase) = engine.phases().get(bar.lane_index) else {
            continue;
        };
        painter.with_clip_rect(rect.intersect(painter.clip_rect())).text(
            rect.left_center() + Vec2::new(6.0, 0.0),
            Align2::LEFT_CENTER,
            &phase.name,
            theme::font_bar(),
            theme::TEXT_ON_BAR,
        );
    }
}

fn draw_preview(painter: &Painter, engine: &TimelineEngine<EguiBackend>, lanes_origin: Pos2) {
    let Some(preview) = engine.preview().handle() else {
        return;
    };
    if !preview.visible {
        return;
    }
    let rect = Rect::from_min_size(
        lanes_origin + Vec2::new(preview.rect.left, preview.rect.top),
        Vec2::new(preview.rect.width, preview.rect.height),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    painter.rect_filled(rect, rounding, theme::PREVIEW_FILL);
    painter.rect_stroke(rect, rounding, Stroke::new(1.5, theme::ACCENT));
}

fn draw_today_line(painter: &Painter, engine: &TimelineEngine<EguiBackend>, origin: Pos2, bottom: f32) {
    let Some(index) = engine.today_index() else {
        return;
    };
    let mapper = engine.mapper();
    let x = origin.x + mapper.index_to_x(index) + mapper.px_per_day() / 2.0;

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
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        egui::Color32::WHITE,
    );
}
