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

use crate::{now_millis, ObjectError, Transaction};
use ferrocoin_crypto::sha256_hex;

use serde::{Deserialize, Serialize};

/// The fixed timestamp of the genesis block.
pub const GENESIS_TIMESTAMP: i64 = 1_700_000_000_000;

/// The miner field of the genesis block; not a real key.
pub const GENESIS_MINER: &str = "GENESIS";

/// A mined batch of transactions, hash-linked to its predecessor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
    pub hash: String,
    pub miner: String,
    pub reward: f64,
}

/// The canonical hashing form: every field in fixed order, the hash itself
/// excluded. Transactions serialize in their full wire shape.
#[derive(Serialize)]
struct HashPayload<'a> {
    index: u64,
    previous_hash: &'a str,
    timestamp: i64,
    transactions: &'a [Transaction],
    nonce: u64,
    miner: &'a str,
    reward: f64,
}

impl Block {
    /// Assembles an unmined candidate: `nonce` 0 and an empty hash, stamped
    /// with the current time.
    pub fn candidate(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        miner: String,
        reward: f64,
    ) -> Self {
        Self {
            index,
            previous_hash,
            timestamp: now_millis(),
            transactions,
            nonce: 0,
            hash: String::new(),
            miner,
            reward,
        }
    }

    /// The deterministic index-0 block every chain begins with.
    ///
    /// Its previous hash is a marker that depends only on the difficulty:
    /// `difficulty` zeros, a one, zero-padded to 64 hex digits. The genesis
    /// hash is computed, not mined, and is exempt from the difficulty target.
    pub fn genesis(difficulty: usize) -> Self {
        let previous_hash = format!("{}1{}", "0".repeat(difficulty), "0".repeat(63 - difficulty));

        let mut block = Self {
            index: 0,
            previous_hash,
            timestamp: GENESIS_TIMESTAMP,
            transactions: Vec::new(),
            nonce: 0,
            hash: String::new(),
            miner: GENESIS_MINER.to_string(),
            reward: 0.0,
        };
        block.hash = block.compute_hash().expect("genesis block always encodes");
        block
    }

    /// Returns the canonical byte encoding that the block hash commits to.
    pub fn hash_payload(&self) -> Result<Vec<u8>, ObjectError> {
        let payload = HashPayload {
            index: self.index,
            previous_hash: &self.previous_hash,
            timestamp: self.timestamp,
            transactions: &self.transactions,
            nonce: self.nonce,
            miner: &self.miner,
            reward: self.reward,
        };

        Ok(serde_json::to_vec(&payload)?)
    }

    /// Recomputes the SHA-256 hash of the canonical form.
    pub fn compute_hash(&self) -> Result<String, ObjectError> {
        Ok(sha256_hex(&self.hash_payload()?))
    }

    /// Returns true if the stored hash meets the proof-of-work target of
    /// `difficulty` leading hex zeros.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        self.hash.len() >= difficulty && self.hash.as_bytes()[..difficulty].iter().all(|byte| *byte == b'0')
    }

    /// Returns the coinbase transaction, if exactly one is present.
    pub fn coinbase(&self) -> Option<&Transaction> {
        let mut coinbases = self.transactions.iter().filter(|tx| tx.is_coinbase);
        let first = coinbases.next()?;

        match coinbases.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_deterministic() {
        let a = Block::genesis(4);
        let b = Block::genesis(4);

        assert_eq!(a, b);
        assert_eq!(a.index, 0);
        assert_eq!(a.timestamp, GENESIS_TIMESTAMP);
        assert_eq!(a.nonce, 0);
        assert_eq!(a.miner, GENESIS_MINER);
        assert_eq!(a.reward, 0.0);
        assert!(a.transactions.is_empty());
    }

    #[test]
    fn genesis_previous_hash_marker() {
        let block = Block::genesis(4);
        assert_eq!(block.previous_hash.len(), 64);
        assert!(block.previous_hash.starts_with("00001"));
        assert!(block.previous_hash.ends_with('0'));

        let easy = Block::genesis(1);
        assert!(easy.previous_hash.starts_with("01"));
        assert_eq!(easy.previous_hash.len(), 64);
    }

    #[test]
    fn hash_commits_to_every_field() {
        let block = Block::genesis(4);
        assert_eq!(block.hash, block.compute_hash().unwrap());

        let mut tampered = block.clone();
        tampered.nonce = 1;
        assert_ne!(tampered.compute_hash().unwrap(), block.hash);

        let mut tampered = block.clone();
        tampered.reward = 1.0;
        assert_ne!(tampered.compute_hash().unwrap(), block.hash);

        let mut tampered = block;
        tampered.transactions.push(Transaction::coinbase("x".into(), 50.0));
        assert_ne!(tampered.compute_hash().unwrap(), tampered.hash);
    }

    #[test]
    fn hash_payload_excludes_the_hash_field() {
        let mut block = Block::genesis(4);
        let before = block.hash_payload().unwrap();
        block.hash = "ff".repeat(32);
        assert_eq!(block.hash_payload().unwrap(), before);
    }

    #[test]
    fn difficulty_check_inspects_leading_nibbles() {
        let mut block = Block::genesis(4);

        block.hash = format!("0000{}", "a".repeat(60));
        assert!(block.meets_difficulty(4));
        assert!(!block.meets_difficulty(5));

        block.hash = format!("000a{}", "a".repeat(60));
        assert!(!block.meets_difficulty(4));
        assert!(block.meets_difficulty(3));

        block.hash = String::new();
        assert!(!block.meets_difficulty(1));
    }

    #[test]
    fn coinbase_lookup_requires_exactly_one() {
        let mut block = Block::genesis(4);
        assert!(block.coinbase().is_none());

        block.transactions.push(Transaction::coinbase("miner".into(), 50.0));
        assert!(block.coinbase().is_some());

        block.transactions.push(Transaction::coinbase("miner".into(), 50.0));
        assert!(block.coinbase().is_none());
    }
}
