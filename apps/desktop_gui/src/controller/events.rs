//! Backend outcome events and error modeling for the desktop GUI controller.

use std::error::Error as StdError;

use ledger_client::{ConfirmError, RpcError};
use shared::domain::{Account, Lamports, TxSignature, WalletAddress};
use shared::error::{TransferError, WalletError};

pub enum UiEvent {
    AccountCreated {
        account: Account,
        funded_sol: u64,
        balance: Option<Lamports>,
    },
    WalletConnected(WalletAddress),
    TransferCompleted {
        signature: TxSignature,
        amount_sol: u64,
    },
    ActionFailed(UiError),
    BackendUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    CreateAccount,
    ConnectWallet,
    Transfer,
}

impl UserAction {
    pub fn busy_message(self) -> &'static str {
        match self {
            UserAction::CreateAccount => "Creating new account and airdropping SOL...",
            UserAction::ConnectWallet => "Connecting to Phantom wallet...",
            UserAction::Transfer => "Transferring SOL...",
        }
    }

    /// Fixed user-facing text; the underlying cause is only logged.
    pub fn failure_message(self) -> &'static str {
        match self {
            UserAction::CreateAccount => "Failed to create account. Please try again.",
            UserAction::ConnectWallet => {
                "Failed to connect to Phantom wallet. Please make sure it's installed."
            }
            UserAction::Transfer => "Failed to transfer SOL. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    RateLimited,
    Funds,
    WalletMissing,
    Validation,
    Transport,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct UiError {
    action: UserAction,
    category: UiErrorCategory,
    detail: String,
}

impl UiError {
    /// Classifies by the typed errors in `err`'s source chain, falling back to
    /// keywords in the rendered chain.
    pub fn from_error(action: UserAction, err: &(dyn StdError + 'static)) -> Self {
        let detail = error_chain(err);
        let category = typed_category(err).unwrap_or_else(|| keyword_category(&detail));
        Self {
            action,
            category,
            detail,
        }
    }

    pub fn action(&self) -> UserAction {
        self.action
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn user_message(&self) -> &'static str {
        self.action.failure_message()
    }
}

/// Records a failed action in the log; the user only sees `failure_message`.
pub fn log_failure(ui_error: &UiError) {
    tracing::error!(
        action = ?ui_error.action(),
        category = ?ui_error.category(),
        "{}",
        ui_error.detail()
    );
}

fn typed_category(err: &(dyn StdError + 'static)) -> Option<UiErrorCategory> {
    let mut current = Some(err);
    while let Some(link) = current {
        if let Some(category) = link_category(link) {
            return Some(category);
        }
        current = link.source();
    }
    None
}

fn link_category(link: &(dyn StdError + 'static)) -> Option<UiErrorCategory> {
    if let Some(err) = link.downcast_ref::<TransferError>() {
        return match err {
            TransferError::MissingPrerequisites
            | TransferError::InvalidDestination { .. }
            | TransferError::InvalidCredential(_)
            | TransferError::InvalidAmount(_) => Some(UiErrorCategory::Validation),
            TransferError::InsufficientFunds(_) => Some(UiErrorCategory::Funds),
            TransferError::Blockhash(_)
            | TransferError::Submission(_)
            | TransferError::Confirmation(_) => None,
        };
    }
    if let Some(WalletError::NotInstalled) = link.downcast_ref::<WalletError>() {
        return Some(UiErrorCategory::WalletMissing);
    }
    if let Some(err) = link.downcast_ref::<ConfirmError>() {
        return match err {
            ConfirmError::Rpc(rpc) => rpc_category(rpc),
            ConfirmError::TimedOut { .. } => Some(UiErrorCategory::Transport),
            ConfirmError::Failed { .. } => None,
        };
    }
    link.downcast_ref::<RpcError>().and_then(rpc_category)
}

fn rpc_category(err: &RpcError) -> Option<UiErrorCategory> {
    match err {
        RpcError::Server { code: 429, .. } | RpcError::Http { status: 429, .. } => {
            Some(UiErrorCategory::RateLimited)
        }
        RpcError::Server { .. } if err.is_insufficient_funds() => Some(UiErrorCategory::Funds),
        RpcError::Transport { .. } | RpcError::Http { .. } => Some(UiErrorCategory::Transport),
        RpcError::Server { .. } | RpcError::EmptyResponse { .. } | RpcError::Decode { .. } => None,
    }
}

fn keyword_category(detail: &str) -> UiErrorCategory {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("rate limit") || lower.contains("too many requests") {
        UiErrorCategory::RateLimited
    } else if lower.contains("insufficient") || lower.contains("prior credit") {
        UiErrorCategory::Funds
    } else if lower.contains("not installed") {
        UiErrorCategory::WalletMissing
    } else if lower.contains("invalid") || lower.contains("malformed") || lower.contains("required")
    {
        UiErrorCategory::Validation
    } else if lower.contains("request failed")
        || lower.contains("connection")
        || lower.contains("timed out")
    {
        UiErrorCategory::Transport
    } else {
        UiErrorCategory::Unknown
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
