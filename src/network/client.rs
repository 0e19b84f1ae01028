use std::time::Duration;

use tokio::sync::mpsc;

use crate::common::{ChatCommand, ChatEvent, Sender, ViewKind};
use crate::config::ClientConfig;

use super::api::ChatApi;
use super::poller::{PollSource, PollingSubscription, next_tick};

/// Background task that owns a view's polling subscriptions.
///
/// Every fetch runs as its own spawned task so a slow response never holds
/// up the next tick or a send. Results go back to the view as [`ChatEvent`]s.
pub struct ChatClient {
    api: ChatApi,
    sessions_every: Duration,
    history_every: Duration,
    event_sender: mpsc::Sender<ChatEvent>,
    command_receiver: mpsc::Receiver<ChatCommand>,
    sessions_poll: Option<PollingSubscription>,
    history_poll: Option<PollingSubscription>,
}

impl ChatClient {
    pub fn new(
        api: ChatApi,
        view: ViewKind,
        config: &ClientConfig,
        event_sender: mpsc::Sender<ChatEvent>,
        command_receiver: mpsc::Receiver<ChatCommand>,
    ) -> Self {
        Self::with_intervals(
            api,
            config.sessions_poll(),
            view.history_poll(config),
            event_sender,
            command_receiver,
        )
    }

    pub fn with_intervals(
        api: ChatApi,
        sessions_every: Duration,
        history_every: Duration,
        event_sender: mpsc::Sender<ChatEvent>,
        command_receiver: mpsc::Receiver<ChatCommand>,
    ) -> Self {
        Self {
            api,
            sessions_every,
            history_every,
            event_sender,
            command_receiver,
            sessions_poll: None,
            history_poll: None,
        }
    }

    /// Runs until the view sends [`ChatCommand::Deactivate`] or drops its sender.
    pub async fn run(mut self) {
        log::info!("Chat client started against {}", self.api.base());

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(ChatCommand::Deactivate) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                _ = next_tick(&mut self.sessions_poll) => {
                    self.spawn_sessions_fetch();
                }
                _ = next_tick(&mut self.history_poll) => {
                    self.spawn_history_fetch();
                }
            }
        }

        self.sessions_poll = None;
        self.history_poll = None;
        log::info!("Chat client stopped");
    }

    fn handle_command(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::WatchSessions => {
                if self.sessions_poll.is_none() {
                    log::debug!("Polling session list every {:?}", self.sessions_every);
                    self.sessions_poll = Some(PollingSubscription::new(
                        PollSource::Sessions,
                        0,
                        self.sessions_every,
                    ));
                }
            }
            ChatCommand::RefreshSessions => self.spawn_sessions_fetch(),
            ChatCommand::WatchHistory {
                session_id,
                generation,
            } => {
                log::debug!(
                    "Polling history of {session_id} every {:?} (generation {generation})",
                    self.history_every
                );
                // Replacing the subscription drops the old interval.
                self.history_poll = Some(PollingSubscription::new(
                    PollSource::History { session_id },
                    generation,
                    self.history_every,
                ));
            }
            ChatCommand::RefreshHistory => self.spawn_history_fetch(),
            ChatCommand::SendMessage {
                session_id,
                message,
                sender,
                generation,
            } => self.spawn_send(session_id, message, sender, generation),
            ChatCommand::Deactivate => {}
        }
    }

    fn spawn_sessions_fetch(&self) {
        let api = self.api.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            let event = match api.list_sessions().await {
                Ok(sessions) => {
                    log::debug!("Fetched {} sessions", sessions.len());
                    ChatEvent::SessionsLoaded(sessions)
                }
                Err(err) => {
                    log::warn!("Session list fetch failed: {err}");
                    ChatEvent::SessionsFailed(err.to_string())
                }
            };
            emit(&events, event).await;
        });
    }

    fn spawn_history_fetch(&self) {
        let Some(subscription) = &self.history_poll else {
            return;
        };
        let Some(session_id) = subscription.session_id() else {
            return;
        };

        let api = self.api.clone();
        let events = self.event_sender.clone();
        let session_id = session_id.to_string();
        let generation = subscription.generation();
        tokio::spawn(async move {
            fetch_history(&api, &events, &session_id, generation).await;
        });
    }

    fn spawn_send(&self, session_id: String, message: String, sender: Sender, generation: u64) {
        let api = self.api.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            match api.send(&session_id, &message, &sender).await {
                Ok(()) => {
                    log::info!("Sent {sender} message to {session_id}");
                    emit(&events, ChatEvent::SendSucceeded).await;
                    fetch_history(&api, &events, &session_id, generation).await;
                }
                Err(err) => {
                    log::warn!("Send to {session_id} failed: {err}");
                    emit(&events, ChatEvent::SendFailed(err.to_string())).await;
                }
            }
        });
    }
}

async fn fetch_history(
    api: &ChatApi,
    events: &mpsc::Sender<ChatEvent>,
    session_id: &str,
    generation: u64,
) {
    let event = match api.history(session_id).await {
        Ok(messages) => {
            log::debug!("Fetched {} messages for {session_id}", messages.len());
            ChatEvent::HistoryLoaded {
                generation,
                messages,
            }
        }
        Err(err) => {
            log::warn!("History fetch for {session_id} failed: {err}");
            ChatEvent::HistoryFailed {
                generation,
                reason: err.to_string(),
            }
        }
    };
    emit(events, event).await;
}

async fn emit(events: &mpsc::Sender<ChatEvent>, event: ChatEvent) {
    if events.send(event).await.is_err() {
        log::debug!("View closed; dropping chat event");
    }
}
