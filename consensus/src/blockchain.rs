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
use ferrocoin_crypto::{key_fingerprint, normalize_key};
use ferrocoin_objects::{now_millis, Block, Transaction};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Cached balance of one address. `confirmed` is derived from the chain;
/// `pending` is filled in by the owning node from its mempool view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub confirmed: f64,
    pub pending: f64,
    pub last_updated: i64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    /// Included in the chain with fewer than the required confirmations.
    Confirmed,
    /// Included with at least the required confirmations.
    Final,
}

/// Where a transaction landed in the chain and how deep it is buried.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationEntry {
    pub block_height: u64,
    pub confirmations: u64,
    pub status: ConfirmationStatus,
}

/// The append-only ledger: an ordered block sequence plus derived balance and
/// confirmation indices. The sequence is authoritative; the indices are
/// caches rebuilt whenever the sequence changes.
pub struct Blockchain {
    parameters: ConsensusParameters,
    chain: Vec<Block>,
    balances: HashMap<String, AccountBalance>,
    confirmations: HashMap<String, ConfirmationEntry>,
}

impl Blockchain {
    pub fn new(parameters: ConsensusParameters) -> Self {
        let genesis = Block::genesis(parameters.difficulty);
        info!("chain initialized at genesis {}", &genesis.hash[..12]);

        let mut chain = Self {
            parameters,
            chain: vec![genesis],
            balances: HashMap::new(),
            confirmations: HashMap::new(),
        };
        chain.rebuild_confirmations();
        chain
    }

    pub fn parameters(&self) -> &ConsensusParameters {
        &self.parameters
    }

    pub fn difficulty(&self) -> usize {
        self.parameters.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// The index of the current tip.
    pub fn height(&self) -> u64 {
        self.latest_block().index
    }

    pub fn latest_block(&self) -> &Block {
        self.chain.last().expect("chain always contains genesis")
    }

    /// Mines and appends a new block from the given transactions.
    ///
    /// The nonce search is uncancellable here; the network miner drives the
    /// cancellable variant through [`crate::Miner`].
    pub fn create_block(
        &mut self,
        transactions: Vec<Transaction>,
        miner: String,
        reward: f64,
    ) -> Result<Block, ConsensusError> {
        let tip = self.latest_block();
        let mut candidate = Block::candidate(
            tip.index + 1,
            tip.hash.clone(),
            transactions,
            miner,
            reward,
        );

        loop {
            candidate.hash = candidate.compute_hash()?;
            if candidate.meets_difficulty(self.parameters.difficulty) {
                break;
            }
            candidate.nonce += 1;
        }

        self.append_block(candidate.clone())?;
        Ok(candidate)
    }

    /// Validates a block as the next head and appends it, refreshing the
    /// derived indices in the same critical section.
    pub fn append_block(&mut self, block: Block) -> Result<(), ConsensusError> {
        let expected_index = self.chain.len() as u64;
        let tip = self.latest_block();

        if block.index != expected_index {
            return Err(ConsensusError::InvalidBlock(
                block.index,
                format!("expected index {expected_index}"),
            ));
        }
        if block.previous_hash != tip.hash {
            return Err(ConsensusError::InvalidBlock(block.index, "broken linkage to tip".into()));
        }
        self.check_block_integrity(&block)?;
        self.check_block_transactions(&block, CoverCheck::ConfirmedBalances)?;

        debug!(
            "appending block {} ({} transactions, reward {})",
            block.index,
            block.transactions.len(),
            block.reward
        );

        self.apply_block_balances(&block);
        self.chain.push(block);
        self.rebuild_confirmations();

        Ok(())
    }

    /// Validates a full candidate chain structurally: genesis equality, then
    /// linkage, proof of work, hash integrity and transaction validity per
    /// block. Balance cover is the reorg walk's concern, not this one's.
    pub fn validate_chain(&self, candidate: &[Block]) -> Result<(), ConsensusError> {
        let genesis = Block::genesis(self.parameters.difficulty);
        match candidate.first() {
            Some(first) if *first == genesis => {}
            Some(_) => return Err(ConsensusError::InvalidChain(0, "genesis mismatch".into())),
            None => return Err(ConsensusError::InvalidChain(0, "empty chain".into())),
        }

        for (height, window) in candidate.windows(2).enumerate() {
            let (previous, block) = (&window[0], &window[1]);
            let height = (height + 1) as u64;

            if block.index != height {
                return Err(ConsensusError::InvalidChain(height, "index out of sequence".into()));
            }
            if block.previous_hash != previous.hash {
                return Err(ConsensusError::InvalidChain(height, "broken hash linkage".into()));
            }
            self.check_block_integrity(block)
                .map_err(|error| ConsensusError::InvalidChain(height, error.to_string()))?;
            self.check_block_transactions(block, CoverCheck::Skip)
                .map_err(|error| ConsensusError::InvalidChain(height, error.to_string()))?;
        }

        Ok(())
    }

    /// Whether this chain currently satisfies its own consensus rules.
    pub fn is_valid(&self) -> bool {
        self.validate_chain(&self.chain).is_ok()
    }

    /// Replaces the local chain with a strictly longer valid one.
    ///
    /// The replacement is walked block by block against a scratch balance
    /// map; any overdraft aborts with the offending height and no partial
    /// state is committed. On success the scratch map becomes the balance
    /// index and the confirmation index is rebuilt.
    pub fn replace_chain(&mut self, new_chain: Vec<Block>) -> Result<(), ConsensusError> {
        if new_chain.len() <= self.chain.len() {
            return Err(ConsensusError::ChainNotLonger(new_chain.len(), self.chain.len()));
        }
        self.validate_chain(&new_chain)?;

        let mut scratch: HashMap<String, f64> = HashMap::new();
        for block in new_chain.iter().skip(1) {
            // A block's coinbase matures with the block: transfers settle
            // against earlier blocks only, the same rule `append_block`
            // applies, and the reward is credited afterwards.
            for tx in block.transactions.iter().filter(|tx| !tx.is_coinbase) {
                let sender = tx.sender.as_deref().ok_or_else(|| {
                    ConsensusError::InvalidChain(block.index, format!("transaction {} has no sender", tx.id))
                })?;
                let sender_key = normalize_key(sender);
                let available = scratch.get(&sender_key).copied().unwrap_or(0.0);
                if available < tx.amount {
                    return Err(ConsensusError::InvalidChain(
                        block.index,
                        format!(
                            "sender {} overdrawn: has {}, spends {}",
                            key_fingerprint(sender),
                            available,
                            tx.amount
                        ),
                    ));
                }

                *scratch.entry(sender_key).or_default() -= tx.amount;
                *scratch.entry(normalize_key(&tx.recipient)).or_default() += tx.amount;
            }

            for tx in block.transactions.iter().filter(|tx| tx.is_coinbase) {
                *scratch.entry(normalize_key(&tx.recipient)).or_default() += tx.amount;
            }
        }

        info!(
            "replacing chain: height {} -> {}",
            self.chain.len() - 1,
            new_chain.len() - 1
        );

        let now = now_millis();
        self.balances = scratch
            .into_iter()
            .map(|(address, confirmed)| {
                (
                    address,
                    AccountBalance {
                        confirmed,
                        pending: 0.0,
                        last_updated: now,
                    },
                )
            })
            .collect();
        self.chain = new_chain;
        self.rebuild_confirmations();

        Ok(())
    }

    /// Validates one transaction against current chain state.
    ///
    /// Coinbases are judged for the next block height; ordinary transactions
    /// need a sender, a recipient, a positive amount, a good signature and a
    /// confirmed balance covering the spend.
    pub fn validate_transaction(&self, tx: &Transaction) -> bool {
        if tx.is_coinbase {
            return self.validate_coinbase(tx, self.chain.len() as u64);
        }

        if !self.validate_transaction_stateless(tx) {
            return false;
        }

        let sender = match tx.sender.as_deref() {
            Some(sender) => sender,
            None => return false,
        };
        let confirmed = self.confirmed_balance(sender);
        if confirmed < tx.amount {
            debug!(
                "transaction {} rejected: sender {} has {}, needs {}",
                tx.id,
                key_fingerprint(sender),
                confirmed,
                tx.amount
            );
            return false;
        }

        true
    }

    /// The stateless half of transaction validation: shape and signature,
    /// no balance lookup. Used when judging foreign chains.
    pub fn validate_transaction_stateless(&self, tx: &Transaction) -> bool {
        if tx.is_coinbase {
            return false;
        }
        if tx.sender.is_none() {
            debug!("transaction {} rejected: missing sender", tx.id);
            return false;
        }
        if tx.recipient.trim().is_empty() {
            debug!("transaction {} rejected: empty recipient", tx.id);
            return false;
        }
        if !(tx.amount > 0.0) {
            debug!("transaction {} rejected: non-positive amount", tx.id);
            return false;
        }
        if !tx.verify_signature() {
            debug!("transaction {} rejected: bad signature", tx.id);
            return false;
        }

        true
    }

    /// Validates a coinbase for a specific block height: correct shape, the
    /// scheduled reward amount, and a signature under the recipient's key.
    pub fn validate_coinbase(&self, tx: &Transaction, block_index: u64) -> bool {
        if !tx.is_coinbase || tx.sender.is_some() {
            debug!("coinbase {} rejected: malformed shape", tx.id);
            return false;
        }

        let expected = self.parameters.block_reward(block_index);
        if tx.amount != expected {
            debug!(
                "coinbase {} rejected: amount {} but height {} pays {}",
                tx.id, tx.amount, block_index, expected
            );
            return false;
        }
        if !tx.verify_signature() {
            debug!("coinbase {} rejected: bad signature", tx.id);
            return false;
        }

        true
    }

    /// The confirmed balance of an address, computed from the chain.
    pub fn confirmed_balance(&self, address: &str) -> f64 {
        let address = normalize_key(address);
        let mut balance = 0.0;

        for block in &self.chain {
            for tx in &block.transactions {
                if normalize_key(&tx.recipient) == address {
                    balance += tx.amount;
                }
                if let Some(sender) = &tx.sender {
                    if normalize_key(sender) == address {
                        balance -= tx.amount;
                    }
                }
            }
        }

        balance
    }

    /// Recomputes and caches the balance entry for an address.
    pub fn get_account_balance(&mut self, address: &str) -> AccountBalance {
        let key = normalize_key(address);
        let entry = AccountBalance {
            confirmed: self.confirmed_balance(&key),
            pending: 0.0,
            last_updated: now_millis(),
        };

        self.balances.insert(key, entry.clone());
        entry
    }

    /// Every transaction touching the address, in chain order.
    pub fn get_transaction_history(&self, address: &str) -> Vec<Transaction> {
        self.chain
            .iter()
            .flat_map(|block| block.transactions.iter())
            .filter(|tx| tx.involves(address))
            .cloned()
            .collect()
    }

    pub fn get_transaction_confirmation(&self, tx_id: &str) -> Option<ConfirmationEntry> {
        self.confirmations.get(tx_id).cloned()
    }

    /// Ids of all transactions currently confirmed in the chain.
    pub fn confirmed_transaction_ids(&self) -> Vec<String> {
        self.confirmations.keys().cloned().collect()
    }

    fn check_block_integrity(&self, block: &Block) -> Result<(), ConsensusError> {
        let recomputed = block.compute_hash()?;
        if block.hash != recomputed {
            return Err(ConsensusError::InvalidBlock(block.index, "stored hash does not match contents".into()));
        }
        if !block.meets_difficulty(self.parameters.difficulty) {
            return Err(ConsensusError::InvalidBlock(
                block.index,
                format!("hash misses difficulty {}", self.parameters.difficulty),
            ));
        }

        Ok(())
    }

    fn check_block_transactions(&self, block: &Block, cover: CoverCheck) -> Result<(), ConsensusError> {
        let coinbase_count = block.transactions.iter().filter(|tx| tx.is_coinbase).count();
        if coinbase_count != 1 {
            return Err(ConsensusError::InvalidBlock(
                block.index,
                format!("expected one coinbase, found {coinbase_count}"),
            ));
        }

        for tx in &block.transactions {
            let valid = if tx.is_coinbase {
                self.validate_coinbase(tx, block.index)
            } else {
                match cover {
                    CoverCheck::ConfirmedBalances => self.validate_transaction(tx),
                    CoverCheck::Skip => self.validate_transaction_stateless(tx),
                }
            };

            if !valid {
                return Err(ConsensusError::InvalidBlock(
                    block.index,
                    format!("transaction {} failed validation", tx.id),
                ));
            }
        }

        Ok(())
    }

    fn apply_block_balances(&mut self, block: &Block) {
        let now = now_millis();

        for tx in &block.transactions {
            let recipient = self
                .balances
                .entry(normalize_key(&tx.recipient))
                .or_default();
            recipient.confirmed += tx.amount;
            recipient.last_updated = now;

            if let Some(sender) = &tx.sender {
                let sender = self.balances.entry(normalize_key(sender)).or_default();
                sender.confirmed -= tx.amount;
                sender.last_updated = now;
            }
        }
    }

    fn rebuild_confirmations(&mut self) {
        let tip = self.latest_block().index;
        self.confirmations.clear();

        for block in &self.chain {
            let confirmations = tip - block.index + 1;
            let status = if confirmations >= self.parameters.required_confirmations {
                ConfirmationStatus::Final
            } else {
                ConfirmationStatus::Confirmed
            };

            for tx in &block.transactions {
                self.confirmations.insert(
                    tx.id.clone(),
                    ConfirmationEntry {
                        block_height: block.index,
                        confirmations,
                        status,
                    },
                );
            }
        }
    }
}

#[derive(Clone, Copy)]
enum CoverCheck {
    /// Require senders' confirmed balances to cover their spends.
    ConfirmedBalances,
    /// Structural validation only; balances are walked elsewhere.
    Skip,
}
