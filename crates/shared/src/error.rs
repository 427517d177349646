use thiserror::Error;

/// Account creation or faucet funding failed.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("airdrop request failed")]
    Airdrop(#[source] anyhow::Error),
    #[error("airdrop confirmation failed")]
    Confirmation(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("an account and a connected wallet are required before transferring")]
    MissingPrerequisites,
    #[error("invalid destination address '{address}': {reason}")]
    InvalidDestination { address: String, reason: String },
    #[error("invalid signing credential: {0}")]
    InvalidCredential(String),
    #[error("transfer amount of {0} SOL overflows lamports")]
    InvalidAmount(u64),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("failed to fetch a recent blockhash")]
    Blockhash(#[source] anyhow::Error),
    #[error("transaction submission failed")]
    Submission(#[source] anyhow::Error),
    #[error("transaction confirmation failed")]
    Confirmation(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Phantom wallet is not installed!")]
    NotInstalled,
    #[error("wallet provider failure")]
    Provider(#[source] anyhow::Error),
}
