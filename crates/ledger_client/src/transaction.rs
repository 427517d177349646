//! Legacy transaction wire format, limited to the system transfer this client sends.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::Signature;
use shared::domain::{Lamports, TxSignature};

use crate::keypair::{encode_signature, Blockhash, Keypair, Pubkey, SYSTEM_PROGRAM_ID};

const SYSTEM_TRANSFER_DISCRIMINATOR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Single system-program transfer paid and signed by `from`.
    pub fn new_transfer(
        from: &Pubkey,
        to: &Pubkey,
        lamports: Lamports,
        recent_blockhash: Blockhash,
    ) -> Self {
        let mut account_keys = vec![*from];
        if to != from {
            account_keys.push(*to);
        }
        let to_index = (account_keys.len() - 1) as u8;
        account_keys.push(SYSTEM_PROGRAM_ID);
        let program_id_index = (account_keys.len() - 1) as u8;

        Self {
            header: MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            },
            account_keys,
            recent_blockhash,
            instructions: vec![CompiledInstruction {
                program_id_index,
                accounts: vec![0, to_index],
                data: system_transfer_data(lamports),
            }],
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = vec![
            self.header.num_required_signatures,
            self.header.num_readonly_signed_accounts,
            self.header.num_readonly_unsigned_accounts,
        ];
        encode_compact_u16(self.account_keys.len(), &mut out);
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(self.recent_blockhash.as_bytes());
        encode_compact_u16(self.instructions.len(), &mut out);
        for instruction in &self.instructions {
            out.push(instruction.program_id_index);
            encode_compact_u16(instruction.accounts.len(), &mut out);
            out.extend_from_slice(&instruction.accounts);
            encode_compact_u16(instruction.data.len(), &mut out);
            out.extend_from_slice(&instruction.data);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    pub fn new_signed_transfer(
        from: &Keypair,
        to: &Pubkey,
        lamports: Lamports,
        recent_blockhash: Blockhash,
    ) -> Self {
        let message = Message::new_transfer(&from.pubkey(), to, lamports, recent_blockhash);
        let mut transaction = Self::new_unsigned(message);
        transaction.sign(from);
        transaction
    }

    pub fn new_unsigned(message: Message) -> Self {
        Self {
            signatures: Vec::new(),
            message,
        }
    }

    /// Replaces any existing signatures with the fee payer's signature over the message.
    pub fn sign(&mut self, payer: &Keypair) {
        self.signatures = vec![payer.sign(&self.message.serialize())];
    }

    /// The first signature doubles as the transaction identifier.
    pub fn signature(&self) -> Option<TxSignature> {
        self.signatures
            .first()
            .map(|signature| TxSignature(encode_signature(signature)))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_compact_u16(self.signatures.len(), &mut out);
        for signature in &self.signatures {
            out.extend_from_slice(&signature.to_bytes());
        }
        out.extend_from_slice(&self.message.serialize());
        out
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.serialize())
    }
}

pub fn system_transfer_data(lamports: Lamports) -> Vec<u8> {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_DISCRIMINATOR.to_le_bytes());
    data.extend_from_slice(&lamports.0.to_le_bytes());
    data
}

/// Variable-length length prefix: 7 bits per byte, high bit means "more".
fn encode_compact_u16(len: usize, out: &mut Vec<u8>) {
    let mut rem = len as u16;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            break;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode_compact_u16(len, &mut out);
        out
    }

    #[test]
    fn compact_u16_boundaries() {
        assert_eq!(compact(0), vec![0x00]);
        assert_eq!(compact(0x7f), vec![0x7f]);
        assert_eq!(compact(0x80), vec![0x80, 0x01]);
        assert_eq!(compact(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(compact(0x4000), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn transfer_message_layout() {
        let from = Keypair::generate().pubkey();
        let to = Keypair::generate().pubkey();
        let blockhash = Blockhash::new([9; 32]);
        let message = Message::new_transfer(&from, &to, Lamports(1_000_000_000), blockhash);

        assert_eq!(message.account_keys, vec![from, to, SYSTEM_PROGRAM_ID]);
        assert_eq!(message.instructions.len(), 1);
        let instruction = &message.instructions[0];
        assert_eq!(instruction.program_id_index, 2);
        assert_eq!(instruction.accounts, vec![0, 1]);
        assert_eq!(&instruction.data[..4], &2u32.to_le_bytes());
        assert_eq!(&instruction.data[4..], &1_000_000_000u64.to_le_bytes());

        let bytes = message.serialize();
        assert_eq!(&bytes[..4], &[1, 0, 1, 3]);
        assert_eq!(&bytes[4..36], from.as_bytes());
        assert_eq!(&bytes[100..132], &[9; 32]);
        assert_eq!(bytes.len(), 3 + 1 + 3 * 32 + 32 + 1 + 1 + 1 + 2 + 1 + 12);
    }

    #[test]
    fn self_transfer_does_not_duplicate_account_keys() {
        let from = Keypair::generate().pubkey();
        let message = Message::new_transfer(&from, &from, Lamports(5), Blockhash::default());
        assert_eq!(message.account_keys, vec![from, SYSTEM_PROGRAM_ID]);
        assert_eq!(message.instructions[0].accounts, vec![0, 0]);
        assert_eq!(message.instructions[0].program_id_index, 1);
    }

    #[test]
    fn signed_transfer_verifies_against_message_bytes() {
        let from = Keypair::generate();
        let to = Keypair::generate().pubkey();
        let tx = Transaction::new_signed_transfer(&from, &to, Lamports(42), Blockhash::default());

        let wire = tx.serialize();
        assert_eq!(wire[0], 1);
        let message_bytes = &wire[65..];
        assert_eq!(message_bytes, tx.message.serialize().as_slice());
        assert!(from.pubkey().verify(message_bytes, &tx.signatures[0]));
        assert_eq!(
            tx.signature().map(|s| s.0),
            Some(bs58::encode(&wire[1..65]).into_string())
        );
    }

    #[test]
    fn unsigned_transaction_has_no_identifier_until_signed() {
        let payer = Keypair::generate();
        let message = Message::new_transfer(
            &payer.pubkey(),
            &Keypair::generate().pubkey(),
            Lamports(1),
            Blockhash::default(),
        );
        let mut tx = Transaction::new_unsigned(message);
        assert!(tx.signature().is_none());

        tx.sign(&payer);
        tx.sign(&payer);
        assert_eq!(tx.signatures.len(), 1);
        assert!(payer
            .pubkey()
            .verify(&tx.message.serialize(), &tx.signatures[0]));
    }
}
