use egui::style::WidgetVisuals;
use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::{ItemShape, MilestoneStatus, TicketStatus, TimelineItem};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_LABELS: Color32 = Color32::from_rgb(28, 29, 38);
pub const BG_ROW_ALT: Color32 = Color32::from_rgb(27, 27, 36);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);
pub const BG_DROP_HINT: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 60);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);

pub const PROJECT_BAR: Color32 = Color32::from_rgb(70, 120, 180);

pub const TOAST_SUCCESS: Color32 = Color32::from_rgb(46, 125, 80);
pub const TOAST_FAILURE: Color32 = Color32::from_rgb(170, 52, 52);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const ROW_HEIGHT: f32 = 30.0;
pub const ROW_GAP: f32 = 2.0;
pub const HEADER_HEIGHT: f32 = 44.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const BAR_INSET: f32 = 3.0; // vertical inset so bars don't touch row edges
pub const STATUS_BAR_HEIGHT: f32 = 24.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

// ── Status colours ───────────────────────────────────────────────────────────

pub fn ticket_color(status: &TicketStatus) -> Color32 {
    match status {
        TicketStatus::Open => Color32::from_rgb(3, 169, 244),
        TicketStatus::Scheduled => Color32::from_rgb(66, 133, 244),
        TicketStatus::InProgress => Color32::from_rgb(251, 140, 0),
        TicketStatus::OnHold => Color32::from_rgb(171, 71, 188),
        TicketStatus::Completed => Color32::from_rgb(52, 168, 83),
        TicketStatus::Cancelled => Color32::from_rgb(120, 120, 130),
        TicketStatus::Other(_) => Color32::from_rgb(0, 188, 212),
    }
}

pub fn milestone_color(status: &MilestoneStatus) -> Color32 {
    match status {
        MilestoneStatus::Pending => Color32::from_rgb(255, 193, 7),
        MilestoneStatus::InProgress => Color32::from_rgb(255, 165, 0),
        MilestoneStatus::Completed => Color32::from_rgb(52, 168, 83),
        MilestoneStatus::Missed => Color32::from_rgb(229, 57, 53),
        MilestoneStatus::Other(_) => Color32::from_rgb(200, 200, 210),
    }
}

/// Fill colour for an item and the shape it is drawn as.
pub fn item_color(item: &TimelineItem) -> Color32 {
    match item {
        TimelineItem::ProjectSpan(_) => PROJECT_BAR,
        TimelineItem::Milestone(milestone) => milestone_color(&milestone.status),
        TimelineItem::Ticket(ticket) => ticket_color(&ticket.status),
    }
}

pub fn shape_rounding(shape: ItemShape) -> Rounding {
    match shape {
        ItemShape::Bar => Rounding::same(BAR_ROUNDING),
        ItemShape::Block => Rounding::same(3.0),
        ItemShape::Diamond => Rounding::ZERO,
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

fn widget_state(widget: &mut WidgetVisuals, fill: Color32, border: Color32, text: Stroke) {
    widget.bg_fill = fill;
    widget.weak_bg_fill = fill;
    widget.bg_stroke = Stroke::new(1.0, border);
    widget.fg_stroke = text;
    widget.rounding = Rounding::same(4.0);
}

/// Dark visuals for the toolbar menus, buttons, date picker and tooltips.
pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;

    // Menus, the date picker popup and tooltips are all windows.
    visuals.window_fill = BG_HEADER;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.window_rounding = Rounding::same(6.0);

    let widgets = &mut visuals.widgets;
    widget_state(&mut widgets.noninteractive, BG_PANEL, BORDER_SUBTLE, Stroke::new(1.0, TEXT_SECONDARY));
    widget_state(&mut widgets.inactive, BG_ROW_ALT, BORDER_SUBTLE, Stroke::new(1.0, TEXT_PRIMARY));
    widget_state(&mut widgets.hovered, BG_LABELS, ACCENT, Stroke::new(1.0, TEXT_PRIMARY));
    widget_state(&mut widgets.active, BG_HEADER, ACCENT, Stroke::new(2.0, TEXT_ON_BAR));
    widget_state(&mut widgets.open, BG_HEADER, ACCENT, Stroke::new(1.0, TEXT_PRIMARY));

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_statuses_fall_back_to_their_own_colour() {
        let other = TicketStatus::Other("awaiting_parts".into());
        assert_ne!(ticket_color(&other), ticket_color(&TicketStatus::Scheduled));
        assert_eq!(ticket_color(&other), ticket_color(&TicketStatus::Other("x".into())));
    }

    #[test]
    fn theme_styles_popups_and_buttons() {
        let ctx = egui::Context::default();
        apply_theme(&ctx);
        let visuals = ctx.style().visuals.clone();
        assert_eq!(visuals.window_fill, BG_HEADER);
        assert_eq!(visuals.widgets.hovered.bg_stroke.color, ACCENT);
        assert_eq!(visuals.widgets.inactive.weak_bg_fill, BG_ROW_ALT);
        assert_eq!(visuals.override_text_color, Some(TEXT_PRIMARY));
    }
}
