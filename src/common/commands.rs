use super::types::Sender;

/// Requests the UI sends down to the network task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Start polling the session list (admin view).
    WatchSessions,
    /// One-shot session list fetch, e.g. the sidebar "Refresh" button.
    RefreshSessions,
    /// Replace the history subscription with one for `session_id`.
    /// Responses are tagged with `generation` so the view can drop stale ones.
    WatchHistory { session_id: String, generation: u64 },
    /// Fetch the active history right now, outside the poll cadence.
    RefreshHistory,
    /// Submit one message; on success history is refreshed immediately.
    SendMessage {
        session_id: String,
        message: String,
        sender: Sender,
        generation: u64,
    },
    /// The view went away: stop every subscription and exit.
    Deactivate,
}
