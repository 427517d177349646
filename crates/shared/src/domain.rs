use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_newtype!(WalletAddress);
string_newtype!(TxSignature);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lamports(pub u64);

impl Lamports {
    /// Whole SOL to lamports; `None` on overflow.
    pub fn from_sol(sol: u64) -> Option<Self> {
        sol.checked_mul(LAMPORTS_PER_SOL).map(Self)
    }

    pub fn as_sol(self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SOL", self.as_sol())
    }
}

/// Ledger confirmation level. Declaration order is the strength order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    /// A status observed at `self` is good enough for a caller waiting on `target`.
    pub fn satisfies(self, target: Commitment) -> bool {
        self >= target
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level '{other}'")),
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Freshly generated, funded keypair. Lives only in session memory.
#[derive(Clone)]
pub struct Account {
    pub public_key: String,
    secret_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(public_key: impl Into<String>, secret_key: Vec<u8>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key,
            created_at: Utc::now(),
        }
    }

    /// Raw signing credential (secret half followed by public half).
    pub fn credential(&self) -> &[u8] {
        &self.secret_key
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Drop for Account {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_order_matches_strength() {
        assert!(Commitment::Finalized.satisfies(Commitment::Confirmed));
        assert!(Commitment::Confirmed.satisfies(Commitment::Confirmed));
        assert!(!Commitment::Processed.satisfies(Commitment::Confirmed));
    }

    #[test]
    fn commitment_parses_case_insensitively() {
        assert_eq!("Confirmed".parse::<Commitment>(), Ok(Commitment::Confirmed));
        assert!("eventually".parse::<Commitment>().is_err());
    }

    #[test]
    fn lamport_conversion_rejects_overflow() {
        assert_eq!(Lamports::from_sol(2), Some(Lamports(2 * LAMPORTS_PER_SOL)));
        assert_eq!(Lamports::from_sol(u64::MAX), None);
    }

    #[test]
    fn account_debug_redacts_credential() {
        let account = Account::new("Pubkey111", vec![7; 64]);
        let rendered = format!("{account:?}");
        assert!(rendered.contains("Pubkey111"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("[7, 7"));
    }
}
