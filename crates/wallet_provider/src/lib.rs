use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use ledger_client::Keypair;
use shared::{domain::WalletAddress, error::WalletError};
use tracing::{debug, info};
use zeroize::Zeroize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectResponse {
    pub public_key: WalletAddress,
}

/// Contract of an injected wallet: an identity flag plus `connect()`.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn is_phantom(&self) -> bool;
    async fn connect(&self) -> Result<ConnectResponse, WalletError>;
}

/// The provider slot the host exposes. Empty when no wallet is installed.
#[derive(Clone, Default)]
pub struct WalletEnvironment {
    injected: Option<Arc<dyn WalletProvider>>,
}

impl WalletEnvironment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            injected: Some(provider),
        }
    }

    /// Installs a keypair-file wallet when `path` names an existing file.
    pub fn detect(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.is_file() => {
                info!(path = %path.display(), "wallet keypair found");
                Self::with_provider(Arc::new(KeypairFileWallet::new(path)))
            }
            Some(path) => {
                debug!(path = %path.display(), "configured wallet keypair does not exist");
                Self::empty()
            }
            None => Self::empty(),
        }
    }

    /// The injected provider, if present and identifying as Phantom.
    pub fn phantom(&self) -> Option<Arc<dyn WalletProvider>> {
        self.injected
            .as_ref()
            .filter(|provider| provider.is_phantom())
            .cloned()
    }
}

/// Wallet backed by an exported keypair file: either the CLI's JSON byte
/// array or the base58 string the browser extension exports.
pub struct KeypairFileWallet {
    path: PathBuf,
}

impl KeypairFileWallet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WalletProvider for KeypairFileWallet {
    fn is_phantom(&self) -> bool {
        true
    }

    async fn connect(&self) -> Result<ConnectResponse, WalletError> {
        let mut raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading wallet keypair {}", self.path.display()))
            .map_err(WalletError::Provider)?;
        let parsed = parse_keypair_file(&raw);
        raw.zeroize();

        let keypair = parsed
            .with_context(|| format!("parsing wallet keypair {}", self.path.display()))
            .map_err(WalletError::Provider)?;
        Ok(ConnectResponse {
            public_key: WalletAddress(keypair.pubkey().to_string()),
        })
    }
}

fn parse_keypair_file(raw: &str) -> anyhow::Result<Keypair> {
    let trimmed = raw.trim();
    let mut bytes: Vec<u8> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("keypair JSON must be an array of bytes")?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .map_err(|err| anyhow!("keypair is neither a JSON array nor base58: {err}"))?
    };
    let keypair = Keypair::from_bytes(&bytes);
    bytes.zeroize();
    Ok(keypair?)
}
