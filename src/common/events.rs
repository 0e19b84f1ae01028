use super::types::ChatMessage;

/// Outcomes the network task reports back to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    SessionsLoaded(Vec<String>),
    SessionsFailed(String),
    HistoryLoaded {
        generation: u64,
        messages: Vec<ChatMessage>,
    },
    HistoryFailed {
        generation: u64,
        reason: String,
    },
    SendSucceeded,
    SendFailed(String),
}
