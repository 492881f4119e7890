use std::sync::Arc;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use rtc_engine::{PermissionProvider, StaticPermissions};
use session_core::{load_settings, SessionConfig};
use shared::domain::ClientRole;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::ui::LiveViewApp;

#[derive(Parser, Debug)]
#[command(about = "Live broadcast screen backed by the simulated engine")]
struct Args {
    #[arg(long)]
    app_id: Option<String>,
    #[arg(long)]
    channel: Option<String>,
    #[arg(long)]
    token: Option<String>,
    /// Start as audience instead of broadcaster.
    #[arg(long)]
    audience: bool,
    /// Behave as if camera and microphone access were refused.
    #[arg(long)]
    deny_permissions: bool,
    /// Hide the simulated peer join/leave buttons.
    #[arg(long)]
    no_simulation: bool,
}

impl Args {
    fn apply(&self, config: &mut SessionConfig) {
        if let Some(app_id) = &self.app_id {
            config.app_id = app_id.clone();
        }
        if let Some(channel) = &self.channel {
            config.channel_name = channel.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if self.audience {
            config.initial_role = ClientRole::Audience;
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut config = load_settings();
    args.apply(&mut config);
    tracing::info!(
        channel = %config.channel_name,
        role = %config.initial_role,
        "starting live view"
    );

    let permissions: Arc<dyn PermissionProvider> = if args.deny_permissions {
        Arc::new(StaticPermissions::denied())
    } else {
        Arc::new(StaticPermissions::granted())
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    let worker = runtime::launch(config, permissions, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Live Broadcast")
            .with_inner_size([480.0, 800.0])
            .with_min_inner_size([320.0, 480.0]),
        ..Default::default()
    };
    let app_tx = cmd_tx.clone();
    let show_simulation = !args.no_simulation;
    let result = eframe::run_native(
        "Live Broadcast",
        options,
        Box::new(move |_cc| Ok(Box::new(LiveViewApp::new(app_tx, ui_rx, show_simulation)))),
    );

    let _ = cmd_tx.send(BackendCommand::Shutdown);
    if worker.join().is_err() {
        tracing::error!("session worker panicked during shutdown");
    }
    result
}
