use std::{fmt, str::FromStr};

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, KEYPAIR_LENGTH};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("not valid base58: {0}")]
    Base58(String),
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("public key does not match secret key")]
    Mismatch,
}

macro_rules! base58_bytes32 {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = KeyError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let decoded = bs58::decode(value.trim())
                    .into_vec()
                    .map_err(|err| KeyError::Base58(err.to_string()))?;
                let actual = decoded.len();
                let bytes: [u8; 32] = decoded
                    .try_into()
                    .map_err(|_| KeyError::Length { expected: 32, actual })?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&bs58::encode(self.0).into_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

base58_bytes32!(Pubkey);
base58_bytes32!(Blockhash);

/// The native system program, which owns plain wallet accounts.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new([0; 32]);

impl Pubkey {
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        VerifyingKey::from_bytes(&self.0)
            .map(|key| key.verify(message, signature).is_ok())
            .unwrap_or(false)
    }
}

pub struct Keypair(SigningKey);

impl Keypair {
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Rebuilds a keypair from the 64-byte secret||public layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: &[u8; KEYPAIR_LENGTH] = bytes.try_into().map_err(|_| KeyError::Length {
            expected: KEYPAIR_LENGTH,
            actual: bytes.len(),
        })?;
        SigningKey::from_keypair_bytes(bytes)
            .map(Self)
            .map_err(|_| KeyError::Mismatch)
    }

    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.0.to_keypair_bytes()
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.0.sign(message)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keypair").field(&self.pubkey()).finish()
    }
}

pub fn encode_signature(signature: &Signature) -> String {
    bs58::encode(signature.to_bytes()).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_id_renders_as_all_ones() {
        assert_eq!(
            SYSTEM_PROGRAM_ID.to_string(),
            "11111111111111111111111111111111"
        );
        assert_eq!(
            "11111111111111111111111111111111".parse::<Pubkey>(),
            Ok(SYSTEM_PROGRAM_ID)
        );
    }

    #[test]
    fn keypair_bytes_rebuild_the_same_identity() {
        let keypair = Keypair::generate();
        let rebuilt = Keypair::from_bytes(&keypair.to_bytes()).expect("rebuild");
        assert_eq!(rebuilt.pubkey(), keypair.pubkey());

        let signature = rebuilt.sign(b"payload");
        assert!(keypair.pubkey().verify(b"payload", &signature));
        assert!(!keypair.pubkey().verify(b"other payload", &signature));
    }

    #[test]
    fn keypair_rejects_wrong_length_and_mismatched_halves() {
        assert_eq!(
            Keypair::from_bytes(&[1; 32]).expect_err("short").to_string(),
            "expected 64 bytes, got 32"
        );

        let mut bytes = Keypair::generate().to_bytes();
        bytes[32..].copy_from_slice(Keypair::generate().pubkey().as_bytes());
        assert_eq!(
            Keypair::from_bytes(&bytes).expect_err("mismatch"),
            KeyError::Mismatch
        );
    }

    #[test]
    fn pubkey_parse_rejects_bad_input() {
        assert!(matches!(
            "not-base58-0OIl".parse::<Pubkey>(),
            Err(KeyError::Base58(_))
        ));
        assert_eq!(
            "2g".parse::<Pubkey>(),
            Err(KeyError::Length {
                expected: 32,
                actual: 1
            })
        );
    }
}
