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

use crate::{
    Blockchain,
    ConsensusError,
    MAX_TRANSACTIONS_PER_BLOCK,
    MEMPOOL_MAX_TRANSACTIONS,
    TRANSACTION_TIMEOUT_MILLIS,
};
use ferrocoin_crypto::normalize_key;
use ferrocoin_objects::{now_millis, Transaction};

use indexmap::IndexMap;
use tracing::{debug, trace};

/// Unconfirmed transactions awaiting inclusion, keyed by id and kept in
/// arrival order. Selection is oldest-first by transaction timestamp, which
/// is the network's whole ordering policy: there is no fee market.
pub struct MemoryPool {
    transactions: IndexMap<String, Transaction>,
    capacity: usize,
    timeout_millis: i64,
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPool {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRANSACTIONS_PER_BLOCK)
    }

    /// Creates a pool bounded at `capacity`, clamped to the hard cap.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transactions: IndexMap::new(),
            capacity: capacity.min(MEMPOOL_MAX_TRANSACTIONS),
            timeout_millis: TRANSACTION_TIMEOUT_MILLIS,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn contains(&self, tx_id: &str) -> bool {
        self.transactions.contains_key(tx_id)
    }

    /// Admits a transaction, or reports why it cannot be admitted.
    ///
    /// Besides per-transaction validity against the chain, the sender's
    /// already-pending debits plus the new amount must not exceed its
    /// confirmed balance. Pending credits are deliberately not counted.
    pub fn add_transaction(&mut self, tx: Transaction, chain: &Blockchain) -> Result<(), ConsensusError> {
        if self.transactions.len() >= self.capacity {
            return Err(ConsensusError::MempoolFull(self.transactions.len()));
        }
        if self.transactions.contains_key(&tx.id) {
            return Err(ConsensusError::DuplicateTransaction(tx.id));
        }
        if tx.is_coinbase {
            return Err(ConsensusError::CoinbaseNotAllowed);
        }
        if now_millis() - tx.timestamp > self.timeout_millis {
            return Err(ConsensusError::TransactionExpired(tx.id));
        }
        if !chain.validate_transaction(&tx) {
            return Err(ConsensusError::InvalidTransaction(
                tx.id,
                "chain validation failed".into(),
            ));
        }

        let sender = match tx.sender.as_deref() {
            Some(sender) => normalize_key(sender),
            None => {
                return Err(ConsensusError::InvalidTransaction(tx.id, "missing sender".into()));
            }
        };
        let pending = self.pending_debits(&sender);
        let confirmed = chain.confirmed_balance(&sender);
        if pending + tx.amount > confirmed {
            return Err(ConsensusError::InsufficientBalance(
                ferrocoin_crypto::key_fingerprint(&sender),
                tx.amount,
                confirmed,
                pending,
            ));
        }

        trace!("admitted transaction {} into the mempool", tx.id);
        self.transactions.insert(tx.id.clone(), tx);

        Ok(())
    }

    /// Sum of pending outgoing amounts for a sender address.
    pub fn pending_debits(&self, address: &str) -> f64 {
        let address = normalize_key(address);
        self.transactions
            .values()
            .filter(|tx| tx.is_from(&address))
            .map(|tx| tx.amount)
            .sum()
    }

    /// The `limit` oldest pending transactions, ascending by timestamp.
    pub fn get_candidates(&self, limit: usize) -> Vec<Transaction> {
        let mut candidates: Vec<Transaction> = self.transactions.values().cloned().collect();
        candidates.sort_by_key(|tx| tx.timestamp);
        candidates.truncate(limit);
        candidates
    }

    /// All pending transactions in arrival order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.values().cloned().collect()
    }

    pub fn remove_transaction(&mut self, tx_id: &str) -> Option<Transaction> {
        self.transactions.shift_remove(tx_id)
    }

    /// Clears entries on block inclusion.
    pub fn remove_transactions<'a>(&mut self, tx_ids: impl IntoIterator<Item = &'a str>) {
        for tx_id in tx_ids {
            if self.transactions.shift_remove(tx_id).is_some() {
                trace!("evicted included transaction {}", tx_id);
            }
        }
    }

    /// Drops entries older than the timeout. Returns how many were dropped.
    pub fn cleanup(&mut self) -> usize {
        let cutoff = now_millis() - self.timeout_millis;
        let before = self.transactions.len();
        self.transactions.retain(|_, tx| tx.timestamp >= cutoff);

        let dropped = before - self.transactions.len();
        if dropped > 0 {
            debug!("mempool cleanup dropped {} expired transactions", dropped);
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConsensusParameters;

    fn chain_with_difficulty_one() -> Blockchain {
        Blockchain::new(ConsensusParameters::with_difficulty(1))
    }

    fn unsigned_transfer(sender: &str, amount: f64) -> Transaction {
        Transaction::new(sender.to_string(), "recipient".to_string(), amount)
    }

    #[test]
    fn coinbase_is_never_admitted() {
        let chain = chain_with_difficulty_one();
        let mut pool = MemoryPool::new();

        let coinbase = Transaction::coinbase("miner".into(), 50.0);
        assert!(matches!(
            pool.add_transaction(coinbase, &chain),
            Err(ConsensusError::CoinbaseNotAllowed)
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn expired_transaction_is_rejected() {
        let chain = chain_with_difficulty_one();
        let mut pool = MemoryPool::new();

        let mut tx = unsigned_transfer("sender", 1.0);
        tx.timestamp = now_millis() - TRANSACTION_TIMEOUT_MILLIS - 1_000;

        assert!(matches!(
            pool.add_transaction(tx, &chain),
            Err(ConsensusError::TransactionExpired(_))
        ));
    }

    #[test]
    fn unsigned_transaction_fails_chain_validation() {
        let chain = chain_with_difficulty_one();
        let mut pool = MemoryPool::new();

        let tx = unsigned_transfer("sender", 1.0);
        assert!(matches!(
            pool.add_transaction(tx, &chain),
            Err(ConsensusError::InvalidTransaction(..))
        ));
    }

    #[test]
    fn capacity_is_clamped_to_the_hard_cap() {
        let pool = MemoryPool::with_capacity(MEMPOOL_MAX_TRANSACTIONS * 10);
        assert_eq!(pool.capacity, MEMPOOL_MAX_TRANSACTIONS);
    }

    #[test]
    fn cleanup_drops_only_stale_entries() {
        let mut pool = MemoryPool::new();

        let fresh = unsigned_transfer("a", 1.0);
        let mut stale = unsigned_transfer("b", 1.0);
        stale.timestamp = now_millis() - TRANSACTION_TIMEOUT_MILLIS - 1;

        // Inserted directly: admission would refuse the stale one up front.
        pool.transactions.insert(fresh.id.clone(), fresh.clone());
        pool.transactions.insert(stale.id.clone(), stale);

        assert_eq!(pool.cleanup(), 1);
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(&fresh.id));
    }

    #[test]
    fn candidates_are_oldest_first() {
        let mut pool = MemoryPool::new();

        let mut newer = unsigned_transfer("a", 1.0);
        let mut older = unsigned_transfer("b", 1.0);
        newer.timestamp = 2_000;
        older.timestamp = 1_000;

        pool.transactions.insert(newer.id.clone(), newer.clone());
        pool.transactions.insert(older.id.clone(), older.clone());

        let candidates = pool.get_candidates(10);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, older.id);
        assert_eq!(candidates[1].id, newer.id);

        assert_eq!(pool.get_candidates(1).len(), 1);
    }

    #[test]
    fn removal_by_inclusion_list() {
        let mut pool = MemoryPool::new();

        let a = unsigned_transfer("a", 1.0);
        let b = unsigned_transfer("b", 1.0);
        pool.transactions.insert(a.id.clone(), a.clone());
        pool.transactions.insert(b.id.clone(), b.clone());

        pool.remove_transactions([a.id.as_str()]);
        assert!(!pool.contains(&a.id));
        assert!(pool.contains(&b.id));
    }
}
