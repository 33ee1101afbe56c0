use egui::{Align2, Context, Frame, Margin, RichText, Rounding};

use crate::notify::{Notification, NotificationKind};
use crate::ui::theme;

/// Stack live notifications in the bottom-right corner.
pub fn show_toasts(ctx: &Context, toasts: &[Notification]) {
    if toasts.is_empty() {
        return;
    }
    egui::Area::new(egui::Id::new("toasts"))
        .anchor(Align2::RIGHT_BOTTOM, [-12.0, -(theme::STATUS_BAR_HEIGHT + 12.0)])
        .interactable(false)
        .show(ctx, |ui| {
            for toast in toasts {
                let fill = match toast.kind {
                    NotificationKind::Success => theme::TOAST_SUCCESS,
                    NotificationKind::Failure => theme::TOAST_FAILURE,
                };
                Frame::default()
                    .fill(fill)
                    .rounding(Rounding::same(6.0))
                    .inner_margin(Margin::symmetric(10.0, 6.0))
                    .show(ui, |ui| {
                        ui.label(RichText::new(&toast.message).color(theme::TEXT_ON_BAR));
                    });
                ui.add_space(4.0);
            }
        });
}
