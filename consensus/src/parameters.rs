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

/// The block reward at height 0, halved every `HALVING_INTERVAL` blocks.
pub const INITIAL_REWARD: f64 = 50.0;

/// Blocks between reward halvings.
pub const HALVING_INTERVAL: u64 = 210_000;

/// Leading hex zeros required of a block hash.
pub const INITIAL_DIFFICULTY: usize = 4;

/// Nominal seconds between blocks. There is no difficulty retarget; the
/// constant documents the network's design point.
pub const TARGET_BLOCK_TIME_SECS: u64 = 600;

/// Upper bound on transactions per block, coinbase included.
pub const MAX_TRANSACTIONS_PER_BLOCK: usize = 2_000;

/// Confirmations after which a transaction is considered final.
pub const REQUIRED_CONFIRMATIONS: u64 = 6;

/// Smallest transferable amount.
pub const MIN_TRANSACTION: f64 = 1e-8;

/// Total issuance ceiling implied by the halving schedule.
pub const MAX_SUPPLY: f64 = 21_000_000.0;

/// Hard cap on mempool capacity.
pub const MEMPOOL_MAX_TRANSACTIONS: usize = 5_000;

/// Age in milliseconds past which an unconfirmed transaction is dropped.
pub const TRANSACTION_TIMEOUT_MILLIS: i64 = 3_600_000;

/// The consensus rule set of one node. Difficulty is fixed for the lifetime
/// of the chain.
#[derive(Clone, Debug)]
pub struct ConsensusParameters {
    pub difficulty: usize,
    pub max_transactions_per_block: usize,
    pub required_confirmations: u64,
}

impl Default for ConsensusParameters {
    fn default() -> Self {
        Self {
            difficulty: INITIAL_DIFFICULTY,
            max_transactions_per_block: MAX_TRANSACTIONS_PER_BLOCK,
            required_confirmations: REQUIRED_CONFIRMATIONS,
        }
    }
}

impl ConsensusParameters {
    pub fn with_difficulty(difficulty: usize) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// The coinbase amount for a block at the given height.
    pub fn block_reward(&self, index: u64) -> f64 {
        let halvings = (index / HALVING_INTERVAL) as i32;
        INITIAL_REWARD / f64::powi(2.0, halvings)
    }
}
