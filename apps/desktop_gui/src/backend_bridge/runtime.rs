//! Backend worker thread: owns the tokio runtime and runs queued commands.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use ledger_client::DevnetLedger;
use tracing::Instrument;
use uuid::Uuid;
use wallet_provider::WalletEnvironment;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::actions::{execute, ActionContext};
use crate::controller::events::UiEvent;
use crate::settings::Settings;

pub fn spawn_backend_thread(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: Settings,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                    "Ledger worker failed to start: {err}"
                )));
                return;
            }
        };

        let ctx = ActionContext {
            ledger: Arc::new(DevnetLedger::new(settings.ledger_config())),
            wallets: WalletEnvironment::detect(settings.wallet_keypair.as_deref()),
            airdrop_sol: settings.airdrop_sol,
            transfer_sol: settings.transfer_sol,
        };
        tracing::info!(rpc_url = %settings.rpc_url, "backend worker ready");

        runtime.block_on(process_commands(cmd_rx, ui_tx, ctx));
        tracing::info!("backend worker stopped");
    })
}

/// Runs commands one at a time until the UI side hangs up.
pub async fn process_commands(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    ctx: ActionContext,
) {
    loop {
        let cmd_rx = cmd_rx.clone();
        let next = tokio::task::spawn_blocking(move || cmd_rx.recv().ok()).await;
        let Ok(Some(cmd)) = next else {
            break;
        };

        let span = tracing::info_span!(
            "action",
            command = cmd.name(),
            action_id = %Uuid::new_v4()
        );
        let event = execute(cmd, &ctx).instrument(span).await;
        if ui_tx.send(event).is_err() {
            tracing::debug!("ui event receiver dropped");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use crossbeam_channel::bounded;
    use ledger_client::LedgerFacade;
    use shared::domain::{Account, Lamports, TxSignature, WalletAddress};
    use shared::error::{ProvisioningError, TransferError};

    use super::*;

    struct StaticLedger;

    #[async_trait]
    impl LedgerFacade for StaticLedger {
        async fn create_funded_account(&self) -> Result<Account, ProvisioningError> {
            Ok(Account::new("Stat1cPubkey", vec![1; 64]))
        }

        async fn transfer(
            &self,
            _from_credential: &[u8],
            _to_address: &str,
            _amount_sol: u64,
        ) -> Result<TxSignature, TransferError> {
            Ok(TxSignature("Stat1cSig".into()))
        }

        async fn balance(&self, _address: &str) -> anyhow::Result<Lamports> {
            anyhow::bail!("balance unavailable")
        }
    }

    #[tokio::test]
    async fn commands_are_answered_in_order_and_loop_ends_on_hangup() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let ctx = ActionContext {
            ledger: Arc::new(StaticLedger),
            wallets: WalletEnvironment::empty(),
            airdrop_sol: 2,
            transfer_sol: 1,
        };

        cmd_tx.send(BackendCommand::CreateAccount).expect("queue");
        cmd_tx.send(BackendCommand::ConnectWallet).expect("queue");
        cmd_tx
            .send(BackendCommand::Transfer {
                from: Account::new("Stat1cPubkey", vec![1; 64]),
                to: WalletAddress("Wa11et".into()),
            })
            .expect("queue");
        drop(cmd_tx);

        process_commands(cmd_rx, ui_tx, ctx).await;

        let events: Vec<UiEvent> = ui_rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            UiEvent::AccountCreated { balance: None, .. }
        ));
        assert!(matches!(&events[1], UiEvent::ActionFailed(_)));
        match &events[2] {
            UiEvent::TransferCompleted {
                signature,
                amount_sol,
            } => {
                assert_eq!(signature.as_str(), "Stat1cSig");
                assert_eq!(*amount_sol, 1);
            }
            _ => panic!("expected transfer outcome"),
        }
    }
}
