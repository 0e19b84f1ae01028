use crate::common::{ChatCommand, ChatEvent, ChatMessage, ViewKind};

/// Local state of one chat view (visitor thread or admin console).
///
/// Pure state machine: user actions and network events go in, the
/// commands the network task should run come out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState {
    pub view: ViewKind,
    /// Admin only: server-ordered session ids.
    pub sessions: Vec<String>,
    pub selected_session: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub input_text: String,
    pub is_sending: bool,
    pub error: Option<String>,
    /// Set when the message list grew; the chat area consumes it.
    pub scroll_to_bottom: bool,
    history_generation: u64,
}

impl ChatState {
    pub fn new(view: ViewKind) -> Self {
        Self {
            view,
            sessions: Vec::new(),
            selected_session: None,
            messages: Vec::new(),
            input_text: String::new(),
            is_sending: false,
            error: None,
            scroll_to_bottom: false,
            history_generation: 0,
        }
    }

    /// Commands to issue when the view becomes visible.
    pub fn activate(&self) -> Vec<ChatCommand> {
        let mut commands = Vec::new();
        if self.view.polls_sessions() {
            commands.push(ChatCommand::WatchSessions);
        }
        if let Some(session_id) = &self.selected_session {
            commands.push(self.watch_command(session_id));
        }
        commands
    }

    pub fn history_generation(&self) -> u64 {
        self.history_generation
    }

    /// Makes `session_id` the active conversation.
    ///
    /// Returns the command that replaces the history subscription, or `None`
    /// when that session is already active.
    pub fn select_session(&mut self, session_id: String) -> Option<ChatCommand> {
        if session_id.is_empty() || self.selected_session.as_deref() == Some(session_id.as_str())
        {
            return None;
        }

        self.history_generation += 1;
        self.messages.clear();
        self.scroll_to_bottom = false;
        let command = self.watch_command(&session_id);
        self.selected_session = Some(session_id);
        Some(command)
    }

    /// Validates the draft and marks a send in flight.
    ///
    /// Returns `None`, leaving the state untouched, when the draft is blank,
    /// no session is active, or a send is already running.
    pub fn begin_send(&mut self) -> Option<ChatCommand> {
        let message = self.input_text.trim();
        if message.is_empty() || self.is_sending {
            return None;
        }
        let session_id = self.selected_session.clone()?;

        let command = ChatCommand::SendMessage {
            session_id,
            message: message.to_string(),
            sender: self.view.sender(),
            generation: self.history_generation,
        };
        self.is_sending = true;
        self.error = None;
        Some(command)
    }

    pub fn refresh_sessions(&self) -> Option<ChatCommand> {
        self.view
            .polls_sessions()
            .then_some(ChatCommand::RefreshSessions)
    }

    /// Out-of-cadence reload of the active conversation.
    pub fn refresh_history(&self) -> Option<ChatCommand> {
        self.selected_session
            .as_ref()
            .map(|_| ChatCommand::RefreshHistory)
    }

    /// Folds a network event into the state, possibly asking for follow-up work.
    pub fn apply(&mut self, event: ChatEvent) -> Option<ChatCommand> {
        match event {
            ChatEvent::SessionsLoaded(sessions) => {
                self.error = None;
                let first = sessions.first().cloned();
                self.sessions = sessions;
                match first {
                    Some(first) if self.selected_session.is_none() => self.select_session(first),
                    _ => None,
                }
            }
            ChatEvent::SessionsFailed(reason) => {
                log::debug!("Keeping last session list: {reason}");
                self.error = Some(self.view.sessions_error().to_string());
                None
            }
            ChatEvent::HistoryLoaded {
                generation,
                messages,
            } => {
                if !self.is_current(generation) {
                    return None;
                }
                if messages.len() > self.messages.len() {
                    self.scroll_to_bottom = true;
                }
                self.messages = messages;
                self.error = None;
                None
            }
            ChatEvent::HistoryFailed { generation, reason } => {
                if !self.is_current(generation) {
                    return None;
                }
                log::debug!("Keeping last history: {reason}");
                self.error = Some(self.view.history_error().to_string());
                None
            }
            ChatEvent::SendSucceeded => {
                self.is_sending = false;
                self.input_text.clear();
                self.error = None;
                None
            }
            ChatEvent::SendFailed(reason) => {
                log::debug!("Keeping draft after failed send: {reason}");
                self.is_sending = false;
                self.error = Some(self.view.send_error().to_string());
                None
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation == self.history_generation {
            true
        } else {
            log::debug!(
                "Ignoring history from generation {generation} (current {})",
                self.history_generation
            );
            false
        }
    }

    fn watch_command(&self, session_id: &str) -> ChatCommand {
        ChatCommand::WatchHistory {
            session_id: session_id.to_string(),
            generation: self.history_generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Sender;

    fn msg(sender: Sender, text: &str) -> ChatMessage {
        ChatMessage {
            sender,
            message: text.to_string(),
            timestamp: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    fn visitor_with_session() -> ChatState {
        let mut state = ChatState::new(ViewKind::Visitor);
        state.select_session("visitor-1".into());
        state
    }

    fn loaded(state: &ChatState, messages: Vec<ChatMessage>) -> ChatEvent {
        ChatEvent::HistoryLoaded {
            generation: state.history_generation(),
            messages,
        }
    }

    #[test]
    fn history_replaces_instead_of_merging() {
        let mut state = visitor_with_session();
        let a = vec![msg(Sender::User, "a1"), msg(Sender::Admin, "a2")];
        let b = vec![msg(Sender::Admin, "b1")];

        state.apply(loaded(&state, a));
        state.apply(loaded(&state, b.clone()));
        assert_eq!(state.messages, b);
    }

    #[test]
    fn empty_history_clears_list_without_error() {
        let mut state = visitor_with_session();
        state.apply(loaded(&state, vec![msg(Sender::User, "x")]));
        state.error = Some("stale".into());

        state.apply(loaded(&state, Vec::new()));
        assert!(state.messages.is_empty());
        assert_eq!(state.error, None);
    }

    #[test]
    fn history_failure_keeps_messages_and_sets_error() {
        let mut state = visitor_with_session();
        let shown = vec![msg(Sender::User, "kept")];
        state.apply(loaded(&state, shown.clone()));

        state.apply(ChatEvent::HistoryFailed {
            generation: state.history_generation(),
            reason: "history 500".into(),
        });
        assert_eq!(state.messages, shown);
        assert_eq!(
            state.error.as_deref(),
            Some(ViewKind::Visitor.history_error())
        );
    }

    #[test]
    fn growth_requests_scroll_to_bottom() {
        let mut state = visitor_with_session();
        state.apply(loaded(&state, vec![msg(Sender::User, "1")]));
        assert!(state.scroll_to_bottom);

        state.scroll_to_bottom = false;
        state.apply(loaded(&state, vec![msg(Sender::User, "1")]));
        assert!(!state.scroll_to_bottom);
    }

    #[test]
    fn send_guard_blocks_blank_drafts() {
        let mut state = visitor_with_session();
        state.input_text = "   \n\t".into();
        let before = state.clone();
        assert_eq!(state.begin_send(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn send_guard_blocks_missing_session() {
        let mut state = ChatState::new(ViewKind::Visitor);
        state.input_text = "hello".into();
        let before = state.clone();
        assert_eq!(state.begin_send(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn send_guard_blocks_while_in_flight() {
        let mut state = visitor_with_session();
        state.input_text = "first".into();
        assert!(state.begin_send().is_some());

        state.input_text = "second".into();
        let before = state.clone();
        assert_eq!(state.begin_send(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn send_trims_and_tags_the_message() {
        let mut state = ChatState::new(ViewKind::Admin);
        state.select_session("s1".into());
        state.input_text = "  We received your documents.  ".into();
        state.error = Some("old".into());

        let command = state.begin_send().unwrap();
        assert_eq!(
            command,
            ChatCommand::SendMessage {
                session_id: "s1".into(),
                message: "We received your documents.".into(),
                sender: Sender::Admin,
                generation: state.history_generation(),
            }
        );
        assert!(state.is_sending);
        assert_eq!(state.error, None);
    }

    #[test]
    fn send_success_clears_draft_and_busy_flag() {
        let mut state = visitor_with_session();
        state.input_text = "hello".into();
        state.begin_send().unwrap();

        state.apply(ChatEvent::SendSucceeded);
        assert!(state.input_text.is_empty());
        assert!(!state.is_sending);
        assert_eq!(state.error, None);
    }

    #[test]
    fn send_failure_keeps_draft() {
        let mut state = visitor_with_session();
        state.input_text = "please call me".into();
        state.begin_send().unwrap();

        state.apply(ChatEvent::SendFailed("send 500".into()));
        assert_eq!(state.input_text, "please call me");
        assert!(!state.is_sending);
        assert_eq!(state.error.as_deref(), Some(ViewKind::Visitor.send_error()));
    }

    #[test]
    fn first_session_is_auto_selected_once() {
        let mut state = ChatState::new(ViewKind::Admin);
        let command = state.apply(ChatEvent::SessionsLoaded(vec!["s1".into(), "s2".into()]));
        assert_eq!(state.selected_session.as_deref(), Some("s1"));
        assert!(matches!(
            command,
            Some(ChatCommand::WatchHistory { ref session_id, .. }) if session_id == "s1"
        ));

        let command = state.apply(ChatEvent::SessionsLoaded(vec!["s3".into(), "s1".into()]));
        assert_eq!(command, None);
        assert_eq!(state.selected_session.as_deref(), Some("s1"));
        assert_eq!(state.sessions, vec!["s3".to_string(), "s1".to_string()]);
    }

    #[test]
    fn selection_survives_session_disappearing() {
        let mut state = ChatState::new(ViewKind::Admin);
        state.apply(ChatEvent::SessionsLoaded(vec!["s1".into()]));
        state.apply(ChatEvent::SessionsLoaded(vec!["s2".into()]));
        assert_eq!(state.selected_session.as_deref(), Some("s1"));
    }

    #[test]
    fn session_list_failure_keeps_last_list() {
        let mut state = ChatState::new(ViewKind::Admin);
        state.apply(ChatEvent::SessionsLoaded(vec!["s1".into(), "s2".into()]));
        state.apply(ChatEvent::SessionsFailed("sessions 503".into()));
        assert_eq!(state.sessions.len(), 2);
        assert_eq!(
            state.error.as_deref(),
            Some(ViewKind::Admin.sessions_error())
        );

        state.apply(ChatEvent::SessionsLoaded(vec!["s1".into()]));
        assert_eq!(state.error, None);
    }

    #[test]
    fn empty_session_list_selects_nothing() {
        let mut state = ChatState::new(ViewKind::Admin);
        assert_eq!(state.apply(ChatEvent::SessionsLoaded(Vec::new())), None);
        assert_eq!(state.selected_session, None);
    }

    #[test]
    fn stale_history_is_ignored_after_switch() {
        let mut state = ChatState::new(ViewKind::Admin);
        state.select_session("s1".into());
        let old_generation = state.history_generation();

        state.select_session("s2".into());
        let current = vec![msg(Sender::User, "from s2")];
        state.apply(loaded(&state, current.clone()));

        state.apply(ChatEvent::HistoryLoaded {
            generation: old_generation,
            messages: vec![msg(Sender::User, "late s1 reply")],
        });
        state.apply(ChatEvent::HistoryFailed {
            generation: old_generation,
            reason: "late failure".into(),
        });
        assert_eq!(state.messages, current);
        assert_eq!(state.error, None);
    }

    #[test]
    fn reselecting_the_same_session_is_a_no_op() {
        let mut state = ChatState::new(ViewKind::Admin);
        assert!(state.select_session("s1".into()).is_some());
        let generation = state.history_generation();
        assert_eq!(state.select_session("s1".into()), None);
        assert_eq!(state.history_generation(), generation);
    }

    #[test]
    fn activation_depends_on_view() {
        let admin = ChatState::new(ViewKind::Admin);
        assert_eq!(admin.activate(), vec![ChatCommand::WatchSessions]);
        assert_eq!(admin.refresh_sessions(), Some(ChatCommand::RefreshSessions));

        let visitor = visitor_with_session();
        assert_eq!(
            visitor.activate(),
            vec![ChatCommand::WatchHistory {
                session_id: "visitor-1".into(),
                generation: visitor.history_generation(),
            }]
        );
        assert_eq!(visitor.refresh_sessions(), None);
    }

    #[test]
    fn history_refresh_needs_an_active_session() {
        let admin = ChatState::new(ViewKind::Admin);
        assert_eq!(admin.refresh_history(), None);

        let visitor = visitor_with_session();
        assert_eq!(visitor.refresh_history(), Some(ChatCommand::RefreshHistory));
    }
}
