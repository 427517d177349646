use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use ledger_client::{
    LedgerConfig, DEFAULT_AIRDROP_SOL, DEFAULT_POLL_INTERVAL, DEFAULT_RPC_URL,
    DEFAULT_TRANSFER_SOL,
};
use serde::Deserialize;
use shared::domain::Commitment;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "demo.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub rpc_url: String,
    pub commitment: Commitment,
    pub poll_interval_ms: u64,
    pub confirm_timeout_secs: Option<u64>,
    pub airdrop_sol: u64,
    pub transfer_sol: u64,
    pub wallet_keypair: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            commitment: Commitment::Confirmed,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            confirm_timeout_secs: None,
            airdrop_sol: DEFAULT_AIRDROP_SOL,
            transfer_sol: DEFAULT_TRANSFER_SOL,
            wallet_keypair: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.rpc_url)
            .with_context(|| format!("invalid rpc_url '{}'", self.rpc_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("rpc_url must use http or https, got '{}'", url.scheme());
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be positive");
        }
        if self.confirm_timeout_secs == Some(0) {
            bail!("confirm_timeout_secs must be positive when set");
        }
        if self.airdrop_sol == 0 {
            bail!("airdrop_sol must be positive");
        }
        if self.transfer_sol == 0 {
            bail!("transfer_sol must be positive");
        }
        Ok(())
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            rpc_url: self.rpc_url.clone(),
            commitment: self.commitment,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            confirm_timeout: self.confirm_timeout_secs.map(Duration::from_secs),
            airdrop_sol: self.airdrop_sol,
        }
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicit `path` must exist; the default `demo.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.is_file() {
                read_settings_file(default_path)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
    settings.validate()?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(v) = get("DEMO_RPC_URL") {
        settings.rpc_url = v;
    }
    if let Some(v) = get("APP__RPC_URL") {
        settings.rpc_url = v;
    }

    if let Some(v) = get("APP__COMMITMENT") {
        settings.commitment = v
            .parse()
            .map_err(|err: String| anyhow::anyhow!("APP__COMMITMENT: {err}"))?;
    }

    if let Some(v) = get("APP__POLL_INTERVAL_MS") {
        settings.poll_interval_ms = parse_number("APP__POLL_INTERVAL_MS", &v)?;
    }
    if let Some(v) = get("APP__CONFIRM_TIMEOUT_SECS") {
        settings.confirm_timeout_secs = Some(parse_number("APP__CONFIRM_TIMEOUT_SECS", &v)?);
    }
    if let Some(v) = get("APP__AIRDROP_SOL") {
        settings.airdrop_sol = parse_number("APP__AIRDROP_SOL", &v)?;
    }
    if let Some(v) = get("APP__TRANSFER_SOL") {
        settings.transfer_sol = parse_number("APP__TRANSFER_SOL", &v)?;
    }

    if let Some(v) = get("APP__WALLET_KEYPAIR") {
        settings.wallet_keypair = Some(PathBuf::from(v));
    }

    Ok(())
}

fn parse_number(name: &str, value: &str) -> anyhow::Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a non-negative integer, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn temp_path(name: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        env::temp_dir().join(format!("desktop_gui_{name}_{suffix}.toml"))
    }

    #[test]
    fn defaults_target_devnet_with_confirmed_commitment() {
        let settings = Settings::default();
        assert_eq!(settings.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(settings.commitment, Commitment::Confirmed);
        assert_eq!(settings.airdrop_sol, 2);
        assert_eq!(settings.transfer_sol, 1);
        assert_eq!(settings.confirm_timeout_secs, None);
        settings.validate().expect("defaults are valid");

        let ledger = settings.ledger_config();
        assert_eq!(ledger.poll_interval, Duration::from_millis(500));
        assert_eq!(ledger.confirm_timeout, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_path("file");
        fs::write(
            &path,
            "rpc_url = \"http://127.0.0.1:8899\"\ncommitment = \"finalized\"\nconfirm_timeout_secs = 30\n",
        )
        .expect("write settings");

        let settings = read_settings_file(&path).expect("parse");
        assert_eq!(settings.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(settings.commitment, Commitment::Finalized);
        assert_eq!(settings.confirm_timeout_secs, Some(30));
        assert_eq!(settings.transfer_sol, 1);

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let path = temp_path("unknown");
        fs::write(&path, "rpc_urll = \"http://127.0.0.1:8899\"\n").expect("write settings");

        assert!(read_settings_file(&path).is_err());

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = temp_path("missing");
        assert!(load_settings(Some(&missing)).is_err());
    }

    #[test]
    fn app_prefixed_env_wins_over_legacy_name() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            lookup_from(&[
                ("DEMO_RPC_URL", "http://legacy:8899"),
                ("APP__RPC_URL", "http://preferred:8899"),
                ("APP__COMMITMENT", "Processed"),
                ("APP__POLL_INTERVAL_MS", "250"),
                ("APP__WALLET_KEYPAIR", "/tmp/phantom.json"),
            ]),
        )
        .expect("overrides");

        assert_eq!(settings.rpc_url, "http://preferred:8899");
        assert_eq!(settings.commitment, Commitment::Processed);
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(
            settings.wallet_keypair,
            Some(PathBuf::from("/tmp/phantom.json"))
        );
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, lookup_from(&[("APP__RPC_URL", "  ")]))
            .expect("overrides");
        assert_eq!(settings.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn malformed_env_numbers_are_errors() {
        let mut settings = Settings::default();
        let err = apply_env_overrides(
            &mut settings,
            lookup_from(&[("APP__AIRDROP_SOL", "two")]),
        )
        .expect_err("not a number");
        assert!(err.to_string().contains("APP__AIRDROP_SOL"));
    }

    #[test]
    fn validation_rejects_bad_url_and_zero_amounts() {
        let bad_scheme = Settings {
            rpc_url: "ftp://api.devnet.solana.com".into(),
            ..Settings::default()
        };
        assert!(bad_scheme.validate().is_err());

        let not_a_url = Settings {
            rpc_url: "devnet".into(),
            ..Settings::default()
        };
        assert!(not_a_url.validate().is_err());

        let zero_transfer = Settings {
            transfer_sol: 0,
            ..Settings::default()
        };
        assert!(zero_transfer.validate().is_err());
    }
}
