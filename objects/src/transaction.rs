// Copyright (C) 2024 The ferrocoin developers
// This file is part of the ferrocoin library.

// The ferrocoin library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The ferrocoin library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the ferrocoin library. If not, see <https://www.gnu.org/licenses/>.

use crate::{now_millis, ObjectError};
use ferrocoin_crypto::{keys_equal, random_id_hex, sign, verify};

use serde::{Deserialize, Serialize};

/// Width of a transaction id in bytes (256 bits, hex-encoded on the wire).
pub const TRANSACTION_ID_BYTES: usize = 32;

/// A signed value transfer.
///
/// `sender` is `None` exactly when `is_coinbase` is set; a coinbase mints the
/// block reward to `recipient` and is signed by the recipient's key, every
/// other transaction is signed by its sender. Field order is wire-stable:
/// the canonical signing form serializes the fields in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub sender: Option<String>,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub is_coinbase: bool,
}

/// The canonical signing form: every signed field in fixed order, the
/// signature itself excluded.
#[derive(Serialize)]
struct SigningPayload<'a> {
    id: &'a str,
    sender: Option<&'a str>,
    recipient: &'a str,
    amount: f64,
    timestamp: i64,
    is_coinbase: bool,
}

impl Transaction {
    /// Creates an unsigned transfer from `sender` to `recipient` with a fresh
    /// random id and the current timestamp.
    pub fn new(sender: String, recipient: String, amount: f64) -> Self {
        Self {
            id: random_id_hex(TRANSACTION_ID_BYTES),
            sender: Some(sender),
            recipient,
            amount,
            timestamp: now_millis(),
            signature: None,
            is_coinbase: false,
        }
    }

    /// Creates an unsigned coinbase minting `amount` to `recipient`.
    pub fn coinbase(recipient: String, amount: f64) -> Self {
        Self {
            id: random_id_hex(TRANSACTION_ID_BYTES),
            sender: None,
            recipient,
            amount,
            timestamp: now_millis(),
            signature: None,
            is_coinbase: true,
        }
    }

    /// Returns the canonical byte encoding that signatures commit to.
    pub fn signing_payload(&self) -> Result<Vec<u8>, ObjectError> {
        let payload = SigningPayload {
            id: &self.id,
            sender: self.sender.as_deref(),
            recipient: &self.recipient,
            amount: self.amount,
            timestamp: self.timestamp,
            is_coinbase: self.is_coinbase,
        };

        Ok(serde_json::to_vec(&payload)?)
    }

    /// Signs the canonical form with the given PEM private key and stores the
    /// detached hex signature.
    pub fn sign_with(&mut self, private_key_pem: &str) -> Result<(), ObjectError> {
        let payload = self.signing_payload()?;
        self.signature = Some(sign(private_key_pem, &payload)?);

        Ok(())
    }

    /// Verifies the stored signature.
    ///
    /// Coinbase signatures verify against the recipient's key, ordinary ones
    /// against the sender's. A missing signature, a missing sender on a
    /// non-coinbase transaction, or an unencodable payload all verify false.
    pub fn verify_signature(&self) -> bool {
        let signature = match &self.signature {
            Some(signature) => signature,
            None => return false,
        };

        let key = if self.is_coinbase {
            &self.recipient
        } else {
            match &self.sender {
                Some(sender) => sender,
                None => return false,
            }
        };

        match self.signing_payload() {
            Ok(payload) => verify(key, &payload, signature),
            Err(_) => false,
        }
    }

    /// Returns true if the given address is this transaction's sender.
    pub fn is_from(&self, address: &str) -> bool {
        self.sender.as_deref().map(|sender| keys_equal(sender, address)).unwrap_or(false)
    }

    /// Returns true if the given address is this transaction's recipient.
    pub fn is_to(&self, address: &str) -> bool {
        keys_equal(&self.recipient, address)
    }

    /// Returns true if the given address appears as sender or recipient.
    pub fn involves(&self, address: &str) -> bool {
        self.is_from(address) || self.is_to(address)
    }
}
