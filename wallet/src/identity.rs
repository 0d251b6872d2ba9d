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

use crate::WalletError;
use ferrocoin_consensus::SigningAuthority;
use ferrocoin_crypto::{random_id_hex, sign, CryptoError, KeyPair};
use ferrocoin_objects::now_millis;

use serde::{Deserialize, Serialize};

/// Width of an identity id in bytes (128 bits, hex-encoded).
pub const IDENTITY_ID_BYTES: usize = 16;

/// A key pair with metadata, as stored in the encrypted keystore.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub public_key: String,
    pub private_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<i64>,
}

impl Identity {
    /// Generates a fresh RSA-2048 identity.
    pub fn generate(name: Option<String>) -> Result<Self, WalletError> {
        let pair = KeyPair::generate()?;

        Ok(Self {
            id: random_id_hex(IDENTITY_ID_BYTES),
            public_key: pair.public_key,
            private_key: pair.private_key,
            name,
            created_at: now_millis(),
            last_used: None,
        })
    }

    /// Records a use of this identity.
    pub fn touch(&mut self) {
        self.last_used = Some(now_millis());
    }
}

/// Mining and transaction construction borrow the identity's signing key
/// through this capability; the private key never leaves the wallet.
impl SigningAuthority for Identity {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, message: &[u8]) -> Result<String, CryptoError> {
        sign(&self.private_key, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrocoin_crypto::verify;

    #[test]
    fn generated_identity_has_metadata() {
        let identity = Identity::generate(Some("alice".into())).unwrap();

        assert_eq!(identity.id.len(), IDENTITY_ID_BYTES * 2);
        assert_eq!(identity.name.as_deref(), Some("alice"));
        assert!(identity.created_at > 0);
        assert!(identity.last_used.is_none());
    }

    #[test]
    fn touch_records_last_use() {
        let mut identity = Identity::generate(None).unwrap();
        identity.touch();
        assert!(identity.last_used.is_some());
    }

    #[test]
    fn identity_signs_as_authority() {
        let identity = Identity::generate(None).unwrap();

        let signature = SigningAuthority::sign(&identity, b"payload").unwrap();
        assert!(verify(&identity.public_key, b"payload", &signature));
    }
}
