//! Async side of each user action, run on the backend worker.

use std::error::Error as StdError;
use std::sync::Arc;

use ledger_client::LedgerFacade;
use shared::domain::{Account, WalletAddress};
use shared::error::WalletError;
use tracing::{info, warn};
use wallet_provider::WalletEnvironment;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{log_failure, UiError, UiEvent, UserAction};

pub struct ActionContext {
    pub ledger: Arc<dyn LedgerFacade>,
    pub wallets: WalletEnvironment,
    pub airdrop_sol: u64,
    pub transfer_sol: u64,
}

pub async fn execute(command: BackendCommand, ctx: &ActionContext) -> UiEvent {
    match command {
        BackendCommand::CreateAccount => create_account(ctx).await,
        BackendCommand::ConnectWallet => connect_wallet(ctx).await,
        BackendCommand::Transfer { from, to } => transfer(ctx, &from, &to).await,
    }
}

async fn create_account(ctx: &ActionContext) -> UiEvent {
    let account = match ctx.ledger.create_funded_account().await {
        Ok(account) => account,
        Err(err) => return failed(UserAction::CreateAccount, &err),
    };

    let balance = match ctx.ledger.balance(&account.public_key).await {
        Ok(balance) => Some(balance),
        Err(err) => {
            warn!(public_key = %account.public_key, "balance lookup failed: {err:#}");
            None
        }
    };

    info!(public_key = %account.public_key, "account created");
    UiEvent::AccountCreated {
        account,
        funded_sol: ctx.airdrop_sol,
        balance,
    }
}

async fn connect_wallet(ctx: &ActionContext) -> UiEvent {
    let Some(provider) = ctx.wallets.phantom() else {
        return failed(UserAction::ConnectWallet, &WalletError::NotInstalled);
    };

    match provider.connect().await {
        Ok(response) => {
            info!(wallet = %response.public_key, "wallet connected");
            UiEvent::WalletConnected(response.public_key)
        }
        Err(err) => failed(UserAction::ConnectWallet, &err),
    }
}

async fn transfer(ctx: &ActionContext, from: &Account, to: &WalletAddress) -> UiEvent {
    match ctx
        .ledger
        .transfer(from.credential(), to.as_str(), ctx.transfer_sol)
        .await
    {
        Ok(signature) => UiEvent::TransferCompleted {
            signature,
            amount_sol: ctx.transfer_sol,
        },
        Err(err) => failed(UserAction::Transfer, &err),
    }
}

fn failed(action: UserAction, err: &(dyn StdError + 'static)) -> UiEvent {
    let ui_error = UiError::from_error(action, err);
    log_failure(&ui_error);
    UiEvent::ActionFailed(ui_error)
}
