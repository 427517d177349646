//! Main window: three action buttons over the interaction state.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiEvent, UserAction};
use crate::controller::orchestration::trigger;
use crate::controller::state::InteractionState;

const BUSY_REPAINT: Duration = Duration::from_millis(50);
const IDLE_REPAINT: Duration = Duration::from_millis(250);

const SUCCESS_GREEN: egui::Color32 = egui::Color32::from_rgb(67, 160, 71);

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: InteractionState,
    rpc_url: String,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        rpc_url: impl Into<String>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state: InteractionState::default(),
            rpc_url: rpc_url.into(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.state.apply(event);
        }
    }

    fn trigger(&mut self, action: UserAction) {
        trigger(&self.cmd_tx, action, &mut self.state);
    }

    fn show_actions(&mut self, ui: &mut egui::Ui) {
        let can_act = self.state.can_act();
        let button_size = egui::vec2(ui.available_width().min(360.0), 36.0);

        if ui
            .add_enabled(
                can_act,
                egui::Button::new("Create a new Solana account").min_size(button_size),
            )
            .clicked()
        {
            self.trigger(UserAction::CreateAccount);
        }

        if ui
            .add_enabled(
                can_act,
                egui::Button::new("Connect to Phantom Wallet").min_size(button_size),
            )
            .clicked()
        {
            self.trigger(UserAction::ConnectWallet);
        }

        if ui
            .add_enabled(
                self.state.can_transfer(),
                egui::Button::new("Transfer SOL to Phantom Wallet").min_size(button_size),
            )
            .on_disabled_hover_text("Create an account and connect Phantom wallet first")
            .clicked()
        {
            self.trigger(UserAction::Transfer);
        }
    }

    fn show_identities(&self, ui: &mut egui::Ui) {
        egui::Grid::new("identities")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label(egui::RichText::new("Account").strong());
                match &self.state.account {
                    Some(account) => {
                        ui.horizontal(|ui| {
                            ui.monospace(&account.public_key);
                            if ui.small_button("Copy").clicked() {
                                ui.ctx().copy_text(account.public_key.clone());
                            }
                        });
                    }
                    None => {
                        ui.weak("not created");
                    }
                }
                ui.end_row();

                if let Some(account) = &self.state.account {
                    ui.label("Created");
                    ui.label(account.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
                    ui.end_row();

                    ui.label("Balance");
                    match self.state.account_balance {
                        Some(balance) => ui.label(balance.to_string()),
                        None => ui.weak("unknown"),
                    };
                    ui.end_row();
                }

                ui.label(egui::RichText::new("Phantom wallet").strong());
                match &self.state.wallet {
                    Some(wallet) => {
                        ui.monospace(wallet.as_str());
                    }
                    None => {
                        ui.weak("not connected");
                    }
                }
                ui.end_row();
            });
    }

    fn show_messages(&self, ui: &mut egui::Ui) {
        if self.state.is_busy() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(&self.state.busy);
            });
        }
        if !self.state.error.is_empty() {
            ui.colored_label(ui.visuals().error_fg_color, &self.state.error);
        }
        if !self.state.success.is_empty() {
            ui.colored_label(SUCCESS_GREEN, &self.state.success);
        }
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("endpoint").show(ctx, |ui| {
            ui.weak(format!("RPC endpoint: {}", self.rpc_url));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Solana Devnet Wallet Demo");
            ui.add_space(12.0);
            self.show_actions(ui);
            ui.add_space(12.0);
            ui.separator();
            self.show_identities(ui);
            ui.separator();
            self.show_messages(ui);
        });

        if self.state.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;
    use shared::domain::WalletAddress;

    use super::*;

    #[test]
    fn queued_events_are_folded_into_state() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(4);
        let mut app = DesktopGuiApp::new(cmd_tx, ui_rx, "http://127.0.0.1:8899");

        app.trigger(UserAction::ConnectWallet);
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::ConnectWallet)));
        assert!(app.state.is_busy());

        ui_tx
            .send(UiEvent::WalletConnected(WalletAddress("Wa11et".into())))
            .expect("send");
        app.process_ui_events();

        assert!(!app.state.is_busy());
        assert_eq!(app.state.wallet, Some(WalletAddress("Wa11et".into())));
        assert_eq!(app.state.success, "Successfully connected to Phantom wallet!");
    }
}
