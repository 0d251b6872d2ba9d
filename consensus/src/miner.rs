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

use crate::{ConsensusError, ConsensusParameters};
use ferrocoin_crypto::CryptoError;
use ferrocoin_objects::{Block, Transaction};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::debug;

/// The signing capability a miner borrows from its wallet: reward recipient
/// key plus detached signing. Wallets keep the private key to themselves.
pub trait SigningAuthority: Send + Sync {
    fn public_key(&self) -> &str;
    fn sign(&self, message: &[u8]) -> Result<String, CryptoError>;
}

/// Compiles mempool transactions into candidate blocks and runs the
/// proof-of-work nonce search. The search is cooperative: a shared
/// terminator flag aborts it at the next hashing iteration.
pub struct Miner {
    parameters: ConsensusParameters,
    authority: Arc<dyn SigningAuthority>,
}

impl Miner {
    pub fn new(parameters: ConsensusParameters, authority: Arc<dyn SigningAuthority>) -> Self {
        Self { parameters, authority }
    }

    /// The address mining rewards are assigned to.
    pub fn coinbase_address(&self) -> &str {
        self.authority.public_key()
    }

    /// Builds and signs the coinbase for a block at the given height.
    pub fn build_coinbase(&self, block_index: u64) -> Result<Transaction, ConsensusError> {
        let reward = self.parameters.block_reward(block_index);
        let mut coinbase = Transaction::coinbase(self.authority.public_key().to_string(), reward);

        let payload = coinbase.signing_payload()?;
        coinbase.signature = Some(self.authority.sign(&payload)?);

        Ok(coinbase)
    }

    /// Assembles an unmined candidate on top of `tip`: the signed coinbase
    /// first, then the given pending transactions.
    pub fn establish_candidate(
        &self,
        tip: &Block,
        pending: Vec<Transaction>,
    ) -> Result<Block, ConsensusError> {
        let index = tip.index + 1;
        let coinbase = self.build_coinbase(index)?;
        let reward = coinbase.amount;
        let miner = self.authority.public_key().to_string();

        let mut transactions = Vec::with_capacity(pending.len() + 1);
        transactions.push(coinbase);
        transactions.extend(pending);

        Ok(Block::candidate(index, tip.hash.clone(), transactions, miner, reward))
    }

    /// Runs the nonce search until the difficulty target is met or the
    /// terminator flips. Returns `None` when preempted.
    pub fn find_block(
        &self,
        mut candidate: Block,
        terminator: &AtomicBool,
    ) -> Result<Option<Block>, ConsensusError> {
        loop {
            if terminator.load(Ordering::SeqCst) {
                debug!("nonce search preempted at nonce {}", candidate.nonce);
                return Ok(None);
            }

            candidate.hash = candidate.compute_hash()?;
            if candidate.meets_difficulty(self.parameters.difficulty) {
                debug!("found block {} at nonce {}", candidate.index, candidate.nonce);
                return Ok(Some(candidate));
            }
            candidate.nonce = candidate.nonce.wrapping_add(1);
        }
    }
}
