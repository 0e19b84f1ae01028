use eframe::egui;

use crate::common::{Sender, ViewKind, format_timestamp};
use crate::ui::state::ChatState;

const ADMIN_COLOR: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
const USER_COLOR: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);

/// Admin bubbles sit left in blue, user bubbles right in green. Any other
/// sender is left-aligned with the default text color.
pub fn render(ui: &mut egui::Ui, state: &mut ChatState) {
    if state.messages.is_empty() {
        let hint = match state.view {
            ViewKind::Visitor => "No messages yet. Say hello 👋",
            ViewKind::Admin => "No messages yet.",
        };
        ui.label(egui::RichText::new(hint).weak());
        return;
    }

    let bubble_width = ui.available_width() * 0.85;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for message in &state.messages {
                let (layout, color) = match message.sender {
                    Sender::Admin => (
                        egui::Layout::left_to_right(egui::Align::Min),
                        Some(ADMIN_COLOR),
                    ),
                    Sender::User => (
                        egui::Layout::right_to_left(egui::Align::Min),
                        Some(USER_COLOR),
                    ),
                    Sender::Other(_) => (egui::Layout::left_to_right(egui::Align::Min), None),
                };

                ui.with_layout(layout, |ui| {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.vertical(|ui| {
                            ui.set_max_width(bubble_width);
                            let text = egui::RichText::new(message.message.as_str());
                            ui.label(match color {
                                Some(color) => text.color(color),
                                None => text,
                            });
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} • {}",
                                    state.view.label_for(&message.sender),
                                    format_timestamp(&message.timestamp)
                                ))
                                .small()
                                .weak(),
                            );
                        });
                    });
                });
                ui.add_space(4.0);
            }

            if state.scroll_to_bottom {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                state.scroll_to_bottom = false;
            }
        });
}
