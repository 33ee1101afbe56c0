use chrono::Datelike;
use egui::{Align2, Color32, CursorIcon, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use uuid::Uuid;

use crate::model::{
    DragController, DropOutcome, Granularity, ItemShape, PlacedItem, RescheduleRequest, TimelineItem,
    TimelineLayout, TimelineWindow,
};
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// What happened in the chart this frame.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// A ticket was dropped on the timeline.
    pub reschedule: Option<RescheduleRequest>,
    /// A drag ended off the timeline.
    pub cancelled: bool,
}

/// Render the timeline: header, label column, lanes, today line and items.
pub fn show_timeline_chart(
    layout: &TimelineLayout<'_>,
    drag: &mut DragController,
    selected: &mut Option<Uuid>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let geometry = drag.geometry();
    let available = ui.available_size();
    let lane_height = ROW_HEIGHT + ROW_PADDING;
    let chart_width = (geometry.label_column_width + layout.content_width).max(available.x);
    let chart_height = (HEADER_HEIGHT + layout.lanes.len() as f32 * lane_height + 40.0).max(available.y);

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(Vec2::new(chart_width, chart_height), Sense::click());
            let surface = response.rect;
            let origin = surface.min;
            let content_left = geometry.content_left(surface.left());
            let mut consumed_click = false;

            painter.rect_filled(surface, 0.0, theme::BG_DARK);

            // Alternating lane backgrounds
            for i in 0..layout.lanes.len() {
                let y = origin.y + HEADER_HEIGHT + i as f32 * lane_height;
                let row_bg = if i % 2 == 0 { theme::BG_PANEL } else { theme::BG_ROW_ALT };
                painter.rect_filled(
                    Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(chart_width, lane_height)),
                    0.0,
                    row_bg,
                );
                painter.line_segment(
                    [
                        Pos2::new(origin.x, y + lane_height),
                        Pos2::new(origin.x + chart_width, y + lane_height),
                    ],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );
            }

            draw_timeline_header(&painter, content_left, origin.y, &layout.window, chart_height);
            draw_label_column(&painter, origin, geometry.label_column_width, chart_height, layout);

            if layout.today_visible() {
                draw_today_line(&painter, content_left + layout.today, origin.y, chart_height);
            }

            // Items before the window start have negative offsets; keep them
            // (and their hit areas) off the label column and header.
            let content_clip = Rect::from_min_max(Pos2::new(content_left, origin.y + HEADER_HEIGHT), surface.max);
            let item_painter = painter.with_clip_rect(content_clip);

            for (i, lane) in layout.lanes.iter().enumerate() {
                let y = origin.y + HEADER_HEIGHT + i as f32 * lane_height + ROW_PADDING;
                for placed in &lane.items {
                    let item_rect = screen_rect(placed, content_left, y);
                    let is_selected = *selected == Some(placed.item.id());
                    let dragging_this = drag.session_for(placed.item.id()).is_some();
                    draw_item(&item_painter, placed, item_rect, is_selected, dragging_this);

                    let hit_rect = item_rect.expand(2.0).intersect(item_painter.clip_rect());
                    if !hit_rect.is_positive() {
                        continue;
                    }
                    let sense = match placed.item {
                        TimelineItem::Ticket(_) => Sense::click_and_drag(),
                        _ => Sense::click(),
                    };
                    let item_response = ui.interact(
                        hit_rect,
                        ui.make_persistent_id(("timeline-item", placed.item.id())),
                        sense,
                    );

                    if item_response.clicked() {
                        *selected = Some(placed.item.id());
                        consumed_click = true;
                    }

                    if let TimelineItem::Ticket(ticket) = placed.item {
                        if item_response.hovered() && !drag.is_dragging() {
                            ui.ctx().set_cursor_icon(CursorIcon::Grab);
                        }

                        if item_response.drag_started() {
                            let ptr_x = item_response
                                .interact_pointer_pos()
                                .map(|p| p.x)
                                .unwrap_or(item_rect.left());
                            match drag.begin(ticket, ptr_x, item_rect.left(), &layout.window) {
                                Ok(()) => {
                                    *selected = Some(ticket.id);
                                    consumed_click = true;
                                }
                                Err(e) => tracing::debug!(error = %e, "ignoring drag start"),
                            }
                        }

                        if dragging_this && item_response.dragged() {
                            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
                            let ptr_x = item_response.interact_pointer_pos().map(|p| p.x);
                            if let Some(offset) =
                                ptr_x.and_then(|x| drag.drop_offset(x, surface.left(), &layout.window))
                            {
                                draw_drop_preview(&item_painter, &layout.window, content_left, offset, item_rect);
                            }
                        }

                        if dragging_this && item_response.drag_stopped() {
                            let pointer = ui.ctx().input(|i| i.pointer.latest_pos());
                            let on_content = pointer
                                .filter(|p| surface.contains(*p) && p.x >= content_left && p.y >= origin.y + HEADER_HEIGHT);
                            let outcome = match on_content {
                                Some(p) => drag.drop_at(p.x, surface.left(), &layout.window),
                                None => drag.cancel(),
                            };
                            match outcome {
                                DropOutcome::Reschedule(request) => interaction.reschedule = Some(request),
                                DropOutcome::Cancelled => interaction.cancelled = true,
                            }
                        }

                        if item_response.hovered() && !drag.is_dragging() {
                            egui::show_tooltip_at_pointer(
                                ui.ctx(),
                                ui.layer_id(),
                                egui::Id::new(("ticket-tip", ticket.id)),
                                |ui| {
                                    ui.strong(&ticket.label);
                                    let when = match &ticket.scheduled_time {
                                        Some(time) => format!("{} {}", ticket.scheduled_date.format("%d/%m/%Y"), time),
                                        None => ticket.scheduled_date.format("%d/%m/%Y").to_string(),
                                    };
                                    ui.label(when);
                                    ui.label(format!("Status: {}", ticket.status.label()));
                                    if let Some(name) = &ticket.assignee_name {
                                        ui.label(format!("Agent: {name}"));
                                    }
                                },
                            );
                        }
                    } else if item_response.hovered() {
                        egui::show_tooltip_at_pointer(
                            ui.ctx(),
                            ui.layer_id(),
                            egui::Id::new(("item-tip", placed.item.id())),
                            |ui| {
                                ui.strong(placed.item.label());
                                match placed.item {
                                    TimelineItem::ProjectSpan(span) => {
                                        ui.label(format!(
                                            "{} → {}",
                                            span.start_date.format("%d/%m/%Y"),
                                            span.end_date.format("%d/%m/%Y"),
                                        ));
                                    }
                                    TimelineItem::Milestone(milestone) => {
                                        ui.label(milestone.due_date.format("%d/%m/%Y").to_string());
                                        ui.label(format!("Status: {}", milestone.status.label()));
                                    }
                                    TimelineItem::Ticket(_) => {}
                                }
                            },
                        );
                    }
                }
            }

            // Empty click on background clears selection
            if response.clicked() && !consumed_click {
                *selected = None;
            }
        });

    interaction
}

/// Cancel a drag still open once every pointer button is up.
///
/// Call after [`show_timeline_chart`] has handled the frame: a normal
/// release has become a drop by then, so whatever remains lost its ticket
/// mid-drag (e.g. a refresh removed it) and will never see a release.
pub fn cancel_orphaned_drag(drag: &mut DragController, ctx: &egui::Context) -> bool {
    if drag.is_dragging() && !ctx.input(|i| i.pointer.any_down()) {
        drag.cancel();
        return true;
    }
    false
}

fn screen_rect(placed: &PlacedItem<'_>, content_left: f32, y: f32) -> Rect {
    let inset = theme::BAR_INSET;
    let height = ROW_HEIGHT - inset * 2.0;
    match placed.shape {
        ItemShape::Diamond => Rect::from_center_size(
            Pos2::new(content_left + placed.rect.center(), y + ROW_HEIGHT / 2.0),
            Vec2::splat(placed.rect.width),
        ),
        ItemShape::Bar | ItemShape::Block => Rect::from_min_size(
            Pos2::new(content_left + placed.rect.left, y + inset),
            Vec2::new(placed.rect.width, height),
        ),
    }
}

fn draw_timeline_header(painter: &egui::Painter, content_left: f32, top: f32, window: &TimelineWindow, height: f32) {
    let width = window.content_width();
    painter.rect_filled(
        Rect::from_min_size(Pos2::new(content_left, top), Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(content_left, top + HEADER_HEIGHT),
            Pos2::new(content_left + width, top + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    for column in window.columns() {
        let x = content_left + column.left;
        painter.line_segment(
            [Pos2::new(x, top + HEADER_HEIGHT), Pos2::new(x, top + height)],
            Stroke::new(0.5, theme::GRID_LINE),
        );

        let date = column.start;
        match window.granularity {
            Granularity::Day => {
                let is_weekend = date.weekday().num_days_from_monday() >= 5;
                let day_color = if is_weekend { theme::TEXT_DIM } else { theme::TEXT_SECONDARY };
                painter.text(
                    Pos2::new(x + 3.0, top + 28.0),
                    Align2::LEFT_CENTER,
                    date.format("%d").to_string(),
                    theme::font_sub(),
                    day_color,
                );
                if date.day() == 1 || date == window.start {
                    painter.text(
                        Pos2::new(x + 3.0, top + 12.0),
                        Align2::LEFT_CENTER,
                        date.format("%b %Y").to_string(),
                        theme::font_header(),
                        theme::TEXT_PRIMARY,
                    );
                }
            }
            Granularity::Week => {
                painter.text(
                    Pos2::new(x + 3.0, top + 28.0),
                    Align2::LEFT_CENTER,
                    date.format("W%V").to_string(),
                    theme::font_sub(),
                    theme::TEXT_SECONDARY,
                );
                if date.day() <= 7 {
                    painter.text(
                        Pos2::new(x + 3.0, top + 12.0),
                        Align2::LEFT_CENTER,
                        date.format("%b %Y").to_string(),
                        theme::font_header(),
                        theme::TEXT_PRIMARY,
                    );
                }
            }
            Granularity::Month => {
                painter.text(
                    Pos2::new(x + 5.0, top + 18.0),
                    Align2::LEFT_CENTER,
                    date.format("%b %Y").to_string(),
                    theme::font_header(),
                    theme::TEXT_PRIMARY,
                );
            }
        }
    }
}

fn draw_label_column(painter: &egui::Painter, origin: Pos2, width: f32, height: f32, layout: &TimelineLayout<'_>) {
    let column = Rect::from_min_size(origin, Vec2::new(width, height));
    painter.rect_filled(column, 0.0, theme::BG_LABELS);
    painter.line_segment(
        [Pos2::new(column.right(), origin.y), Pos2::new(column.right(), origin.y + height)],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let clipped = painter.with_clip_rect(column.shrink2(Vec2::new(6.0, 0.0)));
    for (i, lane) in layout.lanes.iter().enumerate() {
        let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING) + ROW_PADDING + ROW_HEIGHT / 2.0;
        let color = if lane.key.is_unassigned() { theme::TEXT_DIM } else { theme::TEXT_SECONDARY };
        clipped.text(
            Pos2::new(origin.x + 8.0, y),
            Align2::LEFT_CENTER,
            &lane.title,
            theme::font_bar(),
            color,
        );
    }
}

fn draw_today_line(painter: &egui::Painter, x: f32, top: f32, height: f32) {
    painter.line_segment(
        [Pos2::new(x, top + HEADER_HEIGHT), Pos2::new(x, top + height)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, top + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_item(painter: &egui::Painter, placed: &PlacedItem<'_>, rect: Rect, is_selected: bool, dragging: bool) {
    let mut color = theme::item_color(placed.item);
    if dragging {
        color = color.gamma_multiply(0.45);
    }
    let rounding = theme::shape_rounding(placed.shape);

    match placed.shape {
        ItemShape::Bar | ItemShape::Block => {
            painter.rect_filled(rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
            painter.rect_filled(rect, rounding, color);
            if is_selected {
                painter.rect_stroke(
                    rect.expand(1.5),
                    Rounding::same(theme::BAR_ROUNDING + 1.5),
                    Stroke::new(2.0, theme::BORDER_ACCENT),
                );
            }
            if rect.width() > 30.0 {
                let clipped = painter.with_clip_rect(rect);
                clipped.text(
                    Pos2::new(rect.left() + 6.0, rect.center().y),
                    Align2::LEFT_CENTER,
                    placed.item.label(),
                    theme::font_bar(),
                    theme::TEXT_ON_BAR,
                );
            }
        }
        ItemShape::Diamond => {
            let center = rect.center();
            let size = rect.width() / 2.0;
            let points = vec![
                Pos2::new(center.x, center.y - size),
                Pos2::new(center.x + size, center.y),
                Pos2::new(center.x, center.y + size),
                Pos2::new(center.x - size, center.y),
            ];
            let stroke = if is_selected {
                Stroke::new(2.0, theme::BORDER_ACCENT)
            } else {
                Stroke::NONE
            };
            painter.add(egui::Shape::convex_polygon(points, color, stroke));
            painter.text(
                Pos2::new(rect.right() + 6.0, center.y),
                Align2::LEFT_CENTER,
                placed.item.label(),
                theme::font_bar(),
                theme::TEXT_SECONDARY,
            );
        }
    }
}

/// Ghost block where the ticket would land, plus the date it resolves to.
fn draw_drop_preview(painter: &egui::Painter, window: &TimelineWindow, content_left: f32, offset: f32, block: Rect) {
    let ghost = Rect::from_min_size(Pos2::new(content_left + offset, block.top()), block.size());
    painter.rect_filled(ghost, Rounding::same(3.0), theme::BG_DROP_HINT);
    painter.rect_stroke(ghost, Rounding::same(3.0), Stroke::new(1.0, theme::ACCENT));
    painter.text(
        Pos2::new(ghost.left(), ghost.top() - 2.0),
        Align2::LEFT_BOTTOM,
        window.to_date(offset).format("%a %d %b").to_string(),
        theme::font_small(),
        theme::TEXT_PRIMARY,
    );
}
