use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod settings;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime::spawn_backend_thread};
use crate::controller::events::UiEvent;
use crate::ui::DesktopGuiApp;

const WINDOW_TITLE: &str = "Solana Devnet Wallet Demo";

#[derive(Debug, Parser)]
#[command(name = "desktop_gui", about = "Devnet account funding and transfer demo")]
struct Args {
    /// TOML settings file (defaults to ./demo.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON-RPC endpoint, overriding file and environment
    #[arg(long)]
    rpc_url: Option<String>,
    /// Exported Phantom keypair acting as the installed wallet
    #[arg(long)]
    wallet_keypair: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = settings::load_settings(args.config.as_deref())?;
    if let Some(rpc_url) = args.rpc_url {
        settings.rpc_url = rpc_url;
    }
    if let Some(path) = args.wallet_keypair {
        settings.wallet_keypair = Some(path);
    }
    settings.validate()?;
    tracing::info!(
        rpc_url = %settings.rpc_url,
        commitment = %settings.commitment,
        wallet_configured = settings.wallet_keypair.is_some(),
        "starting desktop gui"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    let rpc_url = settings.rpc_url.clone();
    spawn_backend_thread(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([560.0, 480.0])
            .with_min_inner_size([420.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DesktopGuiApp::new(cmd_tx, ui_rx, rpc_url)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop gui exited with error: {err}"))
}
