use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{ChatCommand, ChatEvent, ViewKind};

use super::components::{
    chat_area, input_bar,
    sidebar::{self, SidebarActions},
};
use super::state::ChatState;

/// Events arrive from a background task; repaint often enough to show them.
const REPAINT_EVERY: Duration = Duration::from_millis(250);

pub struct ChatApp {
    state: ChatState,
    command_sender: mpsc::Sender<ChatCommand>,
    event_receiver: mpsc::Receiver<ChatEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        state: ChatState,
        command_sender: mpsc::Sender<ChatCommand>,
        event_receiver: mpsc::Receiver<ChatEvent>,
    ) -> Self {
        let app = Self {
            state,
            command_sender,
            event_receiver,
        };
        for command in app.state.activate() {
            app.send_command(command);
        }
        app
    }

    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            if let Some(command) = self.state.apply(event) {
                self.send_command(command);
            }
        }
    }

    fn send_command(&self, command: ChatCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to chat client: {err}");
        }
    }

    fn title(&self) -> String {
        match (self.state.view, &self.state.selected_session) {
            (ViewKind::Visitor, _) => "Live Thread".to_string(),
            (ViewKind::Admin, Some(session_id)) => format!("Session: {session_id}"),
            (ViewKind::Admin, None) => "Chat Admin Console".to_string(),
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();
        let mut outgoing = Vec::new();

        if self.state.view.polls_sessions() {
            egui::SidePanel::left("session_sidebar")
                .resizable(true)
                .default_width(280.0)
                .show(ctx, |ui| {
                    let actions: SidebarActions = sidebar::render(ui, &self.state);
                    if actions.refresh {
                        outgoing.extend(self.state.refresh_sessions());
                    }
                    if let Some(session_id) = actions.selected_session {
                        outgoing.extend(self.state.select_session(session_id));
                    }
                });
        }

        let has_session = self.state.selected_session.is_some();
        egui::TopBottomPanel::bottom("input_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            if input_bar::render(
                ui,
                &mut self.state.input_text,
                has_session,
                self.state.is_sending,
            ) {
                outgoing.extend(self.state.begin_send());
            }
            if let Some(error) = &self.state.error {
                ui.label(egui::RichText::new(error.as_str()).weak());
            }
            ui.add_space(6.0);
        });

        let title = self.title();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(title);
                if has_session && ui.small_button("Refresh").clicked() {
                    outgoing.extend(self.state.refresh_history());
                }
            });
            ui.separator();
            if has_session {
                chat_area::render(ui, &mut self.state);
            } else {
                ui.label(egui::RichText::new("Select a session to view messages.").weak());
            }
        });

        for command in outgoing {
            self.send_command(command);
        }
        ctx.request_repaint_after(REPAINT_EVERY);
    }
}

impl Drop for ChatApp {
    fn drop(&mut self) {
        // The client also stops once this sender is dropped.
        let _ = self.command_sender.try_send(ChatCommand::Deactivate);
    }
}
