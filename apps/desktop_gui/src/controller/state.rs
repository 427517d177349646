//! Reducer over the window's ephemeral interaction state.

use shared::domain::{Account, Lamports, WalletAddress};
use shared::error::TransferError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{log_failure, UiError, UiEvent, UserAction};

pub const MISSING_PREREQUISITES_MESSAGE: &str =
    "Please create an account and connect Phantom wallet first.";
pub const WALLET_CONNECTED_MESSAGE: &str = "Successfully connected to Phantom wallet!";

#[derive(Debug, Default)]
pub struct InteractionState {
    pub account: Option<Account>,
    pub account_balance: Option<Lamports>,
    pub wallet: Option<WalletAddress>,
    pub busy: String,
    pub error: String,
    pub success: String,
}

impl InteractionState {
    pub fn is_busy(&self) -> bool {
        !self.busy.is_empty()
    }

    pub fn can_act(&self) -> bool {
        !self.is_busy()
    }

    pub fn can_transfer(&self) -> bool {
        self.can_act() && self.account.is_some() && self.wallet.is_some()
    }

    /// Starts `action`. Returns the command to run, or `None` when the action
    /// was settled locally without touching the backend.
    pub fn begin(&mut self, action: UserAction) -> Option<BackendCommand> {
        let command = match action {
            UserAction::CreateAccount => BackendCommand::CreateAccount,
            UserAction::ConnectWallet => BackendCommand::ConnectWallet,
            UserAction::Transfer => match (&self.account, &self.wallet) {
                (Some(account), Some(wallet)) => BackendCommand::Transfer {
                    from: account.clone(),
                    to: wallet.clone(),
                },
                _ => {
                    log_failure(&UiError::from_error(
                        action,
                        &TransferError::MissingPrerequisites,
                    ));
                    self.success.clear();
                    self.error = MISSING_PREREQUISITES_MESSAGE.to_string();
                    return None;
                }
            },
        };

        self.busy = action.busy_message().to_string();
        self.error.clear();
        self.success.clear();
        Some(command)
    }

    /// Records the outcome of the running action. Busy is always cleared.
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::AccountCreated {
                account,
                funded_sol,
                balance,
            } => {
                self.account = Some(account);
                self.account_balance = balance;
                self.success = format!("New account created and funded with {funded_sol} SOL!");
            }
            UiEvent::WalletConnected(address) => {
                self.wallet = Some(address);
                self.success = WALLET_CONNECTED_MESSAGE.to_string();
            }
            UiEvent::TransferCompleted {
                signature,
                amount_sol,
            } => {
                self.success = format!(
                    "Successfully transferred {amount_sol} SOL! Transaction signature: {signature}"
                );
            }
            UiEvent::ActionFailed(err) => {
                self.error = err.user_message().to_string();
            }
            UiEvent::BackendUnavailable(message) => {
                self.error = message;
            }
        }
        self.busy.clear();
    }

    /// Settles the running action when its command never reached the backend.
    pub fn abort(&mut self, message: impl Into<String>) {
        self.error = message.into();
        self.busy.clear();
    }
}
