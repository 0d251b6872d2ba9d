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

//! Shared fixtures for integration tests.
//!
//! RSA-2048 generation is expensive, so tests draw from a small pool of
//! lazily generated key pairs instead of minting fresh ones.

#![forbid(unsafe_code)]

use ferrocoin_consensus::{Blockchain, ConsensusParameters, SigningAuthority};
use ferrocoin_crypto::{sign, CryptoError, KeyPair};
use ferrocoin_objects::Transaction;

use once_cell::sync::Lazy;
use std::sync::Arc;

const FIXTURE_KEYS: usize = 4;

static KEY_POOL: Lazy<Vec<KeyPair>> = Lazy::new(|| {
    (0..FIXTURE_KEYS)
        .map(|_| KeyPair::generate().expect("fixture key generation"))
        .collect()
});

/// A cached key pair; indices beyond the pool wrap around.
pub fn test_keypair(index: usize) -> &'static KeyPair {
    &KEY_POOL[index % FIXTURE_KEYS]
}

/// A signed transfer from `sender` to `recipient`.
pub fn signed_transfer(sender: &KeyPair, recipient: &str, amount: f64) -> Transaction {
    let mut tx = Transaction::new(sender.public_key.clone(), recipient.to_string(), amount);
    tx.sign_with(&sender.private_key).expect("fixture signing");
    tx
}

/// A signed coinbase minting `amount` to the pair's public key.
pub fn signed_coinbase(recipient: &KeyPair, amount: f64) -> Transaction {
    let mut tx = Transaction::coinbase(recipient.public_key.clone(), amount);
    tx.sign_with(&recipient.private_key).expect("fixture signing");
    tx
}

/// A signing authority over a fixture key pair, for driving miners in tests.
pub struct TestAuthority {
    pair: KeyPair,
}

impl TestAuthority {
    pub fn from_pair(pair: &KeyPair) -> Arc<Self> {
        Arc::new(Self { pair: pair.clone() })
    }
}

impl SigningAuthority for TestAuthority {
    fn public_key(&self) -> &str {
        &self.pair.public_key
    }

    fn sign(&self, message: &[u8]) -> Result<String, CryptoError> {
        sign(&self.pair.private_key, message)
    }
}

/// A chain of `blocks` mined blocks, each paying its reward to `recipient`.
/// Use difficulty 1 parameters to keep the nonce searches fast.
pub fn mined_chain(parameters: ConsensusParameters, blocks: usize, recipient: &KeyPair) -> Blockchain {
    let mut chain = Blockchain::new(parameters);

    for _ in 0..blocks {
        let index = chain.len() as u64;
        let reward = chain.parameters().block_reward(index);
        let coinbase = signed_coinbase(recipient, reward);

        chain
            .create_block(vec![coinbase], recipient.public_key.clone(), reward)
            .expect("fixture mining");
    }

    chain
}
