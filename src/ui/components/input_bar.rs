use eframe::egui;

/// Draft field plus send button. Returns `true` when the user asked to send.
///
/// The draft is left untouched here; it is only cleared once the server
/// accepted the message.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, enabled: bool, is_sending: bool) -> bool {
    let mut send = false;
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        let label = if is_sending { "Sending…" } else { "Send" };
        if ui
            .add_enabled(enabled && !is_sending, egui::Button::new(label))
            .clicked()
        {
            send = true;
        }

        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Type your message…")
                .desired_width(f32::INFINITY),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    send && enabled && !is_sending
}
