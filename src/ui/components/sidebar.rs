use crate::ui::state::ChatState;
use eframe::egui;

#[derive(Default)]
pub struct SidebarActions {
    pub refresh: bool,
    pub selected_session: Option<String>,
}

pub fn render(ui: &mut egui::Ui, state: &ChatState) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.horizontal(|ui| {
        ui.heading("Sessions");
        if ui.button("Refresh").clicked() {
            actions.refresh = true;
        }
    });
    ui.separator();

    if state.sessions.is_empty() {
        ui.label("No sessions yet.");
        return actions;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for session_id in &state.sessions {
            let selected = state.selected_session.as_deref() == Some(session_id.as_str());
            if ui
                .selectable_label(selected, session_id.as_str())
                .on_hover_text("Click to open")
                .clicked()
            {
                actions.selected_session = Some(session_id.clone());
            }
        }
    });

    actions
}
