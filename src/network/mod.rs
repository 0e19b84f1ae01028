pub mod api;
pub mod client;
pub mod poller;

pub use api::ChatApi;
pub use client::ChatClient;
pub use poller::{PollSource, PollingSubscription};
