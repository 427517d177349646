//! Backend commands queued from UI to backend worker.

use shared::domain::{Account, WalletAddress};

pub enum BackendCommand {
    CreateAccount,
    ConnectWallet,
    Transfer { from: Account, to: WalletAddress },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::CreateAccount => "create_account",
            BackendCommand::ConnectWallet => "connect_wallet",
            BackendCommand::Transfer { .. } => "transfer",
        }
    }
}
