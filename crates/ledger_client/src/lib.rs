use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use shared::{
    domain::{Account, Commitment, Lamports, TxSignature},
    error::{ProvisioningError, TransferError},
};
use tracing::{info, warn};
use zeroize::Zeroizing;

pub mod confirm;
pub mod keypair;
pub mod rpc;
pub mod transaction;

pub use confirm::{wait_for_confirmation, ConfirmError, ConfirmOptions};
pub use keypair::{Blockhash, KeyError, Keypair, Pubkey};
pub use rpc::{RpcClient, RpcError};
pub use transaction::Transaction;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_AIRDROP_SOL: u64 = 2;
pub const DEFAULT_TRANSFER_SOL: u64 = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[async_trait]
pub trait LedgerFacade: Send + Sync {
    /// Generates a keypair, requests faucet funds for it and waits for the
    /// credit to reach the configured commitment.
    async fn create_funded_account(&self) -> Result<Account, ProvisioningError>;

    /// Signs and submits a transfer of `amount_sol` whole units, then waits for
    /// confirmation. Returns the transaction signature.
    async fn transfer(
        &self,
        from_credential: &[u8],
        to_address: &str,
        amount_sol: u64,
    ) -> Result<TxSignature, TransferError>;

    async fn balance(&self, address: &str) -> anyhow::Result<Lamports>;
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub commitment: Commitment,
    pub poll_interval: Duration,
    pub confirm_timeout: Option<Duration>,
    pub airdrop_sol: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: Commitment::Confirmed,
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirm_timeout: None,
            airdrop_sol: DEFAULT_AIRDROP_SOL,
        }
    }
}

impl LedgerConfig {
    fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            commitment: self.commitment,
            poll_interval: self.poll_interval,
            timeout: self.confirm_timeout,
        }
    }
}

/// `LedgerFacade` backed by the ledger's JSON-RPC endpoint.
pub struct DevnetLedger {
    rpc: RpcClient,
    config: LedgerConfig,
}

impl DevnetLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            rpc: RpcClient::new(config.rpc_url.clone()),
            config,
        }
    }
}

#[async_trait]
impl LedgerFacade for DevnetLedger {
    async fn create_funded_account(&self) -> Result<Account, ProvisioningError> {
        let keypair = Keypair::generate();
        let pubkey = keypair.pubkey();
        let lamports = Lamports::from_sol(self.config.airdrop_sol)
            .ok_or_else(|| ProvisioningError::Airdrop(anyhow!("airdrop amount overflows")))?;

        info!(public_key = %pubkey, %lamports, "requesting airdrop");
        let signature = self
            .rpc
            .request_airdrop(&pubkey, lamports, self.config.commitment)
            .await
            .with_context(|| format!("requesting {lamports} for {pubkey}"))
            .map_err(ProvisioningError::Airdrop)?;

        wait_for_confirmation(&self.rpc, &signature, &self.config.confirm_options())
            .await
            .with_context(|| format!("waiting for airdrop {signature}"))
            .map_err(ProvisioningError::Confirmation)?;

        info!(public_key = %pubkey, %signature, "account funded");
        let secret = Zeroizing::new(keypair.to_bytes());
        Ok(Account::new(pubkey.to_string(), secret.to_vec()))
    }

    async fn transfer(
        &self,
        from_credential: &[u8],
        to_address: &str,
        amount_sol: u64,
    ) -> Result<TxSignature, TransferError> {
        let from = Keypair::from_bytes(from_credential)
            .map_err(|err| TransferError::InvalidCredential(err.to_string()))?;
        let to: Pubkey = to_address
            .parse()
            .map_err(|err: KeyError| TransferError::InvalidDestination {
                address: to_address.to_string(),
                reason: err.to_string(),
            })?;
        let lamports =
            Lamports::from_sol(amount_sol).ok_or(TransferError::InvalidAmount(amount_sol))?;

        let blockhash = self
            .rpc
            .get_latest_blockhash(self.config.commitment)
            .await
            .context("getLatestBlockhash")
            .map_err(TransferError::Blockhash)?;
        let recent_blockhash: Blockhash = blockhash
            .blockhash
            .parse()
            .with_context(|| format!("ledger returned malformed blockhash {}", blockhash.blockhash))
            .map_err(TransferError::Blockhash)?;

        let transaction = Transaction::new_signed_transfer(&from, &to, lamports, recent_blockhash);
        info!(from = %from.pubkey(), to = %to, %lamports, "submitting transfer");

        let signature = match self
            .rpc
            .send_transaction(&transaction, self.config.commitment)
            .await
        {
            Ok(signature) => signature,
            Err(err) if err.is_insufficient_funds() => {
                warn!(from = %from.pubkey(), "transfer rejected for insufficient funds");
                return Err(TransferError::InsufficientFunds(err.to_string()));
            }
            Err(err) => return Err(TransferError::Submission(err.into())),
        };

        if transaction.signature().as_ref() != Some(&signature) {
            warn!(%signature, "ledger echoed an unexpected transaction signature");
        }

        wait_for_confirmation(&self.rpc, &signature, &self.config.confirm_options())
            .await
            .with_context(|| format!("waiting for transfer {signature}"))
            .map_err(TransferError::Confirmation)?;

        info!(%signature, "transfer confirmed");
        Ok(signature)
    }

    async fn balance(&self, address: &str) -> anyhow::Result<Lamports> {
        let pubkey: Pubkey = address
            .parse()
            .with_context(|| format!("invalid address {address}"))?;
        Ok(self
            .rpc
            .get_balance(&pubkey, self.config.commitment)
            .await?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
