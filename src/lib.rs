//! Polling chat client for the Redline visitor thread and staff console.

pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod storage;
pub mod ui;

pub use common::{ChatCommand, ChatEvent, ChatMessage, Sender, ViewKind};
pub use config::ClientConfig;
pub use error::{ChatError, Result};
pub use network::{ChatApi, ChatClient};
pub use ui::ChatState;
