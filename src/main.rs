use std::error::Error;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use redline_chat::config::{self, ClientConfig};
use redline_chat::storage::{self, SessionStore};
use redline_chat::ui::ChatApp;
use redline_chat::{ChatApi, ChatClient, ChatState, ViewKind};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "redline-chat",
    version,
    about = "Redline client chat: visitor thread and staff console"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Chat API base URL (overrides config file and REDLINE_API_BASE)
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,
    /// SQLite file holding the visitor session id
    #[arg(long, value_name = "FILE")]
    database: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Visitor thread bound to this device's session (default)
    Visitor,
    /// Staff console listing every session
    Admin,
}

impl From<Mode> for ViewKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Visitor => ViewKind::Visitor,
            Mode::Admin => ViewKind::Admin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    app_config.apply_env();
    if let Some(base) = &cli.api_base {
        app_config.override_api_base(base);
    }
    if let Some(database) = cli.database {
        app_config.database_path = database;
    }

    let view = cli.mode.unwrap_or(Mode::Visitor).into();
    let api = ChatApi::from_config(&app_config)?;

    let mut state = ChatState::new(view);
    if view == ViewKind::Visitor {
        let store = storage::open_session_store(&app_config.database_path);
        let session_id =
            storage::resolve_session_id(store.as_ref().map(|db| db as &dyn SessionStore));
        state.select_session(session_id);
    }

    run_view(api, app_config, state).await?;
    Ok(())
}

async fn run_view(
    api: ChatApi,
    app_config: ClientConfig,
    state: ChatState,
) -> Result<(), eframe::Error> {
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let view = state.view;
    let client = ChatClient::new(api, view, &app_config, event_tx, cmd_rx);
    tokio::spawn(client.run());

    let title = match view {
        ViewKind::Visitor => "Redline Chat",
        ViewKind::Admin => "Redline Chat Admin",
    };
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let mut state = Some(state);

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx.take().ok_or("chat view initialized twice")?;
            let state = state.take().ok_or("chat view initialized twice")?;

            log::info!("Opening {view:?} view");

            Ok(Box::new(ChatApp::new(cc, state, cmd_tx.clone(), event_receiver)))
        }),
    )
}
