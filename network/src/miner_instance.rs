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

use crate::{NetworkError, Node, MINING_INTERVAL_SECS};
use ferrocoin_consensus::{Miner, SigningAuthority};

use std::{sync::atomic::Ordering, sync::Arc, time::Duration};
use tokio::{task, task::JoinHandle, time};
use tracing::{debug, info, warn};

/// Drives periodic mining passes against a node's chain and mempool.
///
/// The driver composes a [`Node`] with a [`Miner`]: every tick it captures
/// the tip, compiles a candidate from the mempool, runs the nonce search on
/// a blocking worker and, on success, appends and broadcasts the block. A
/// foreign block landing mid-search flips the node's terminator and the
/// search abandons its stale tip.
pub struct MinerInstance {
    node: Node,
    miner: Arc<Miner>,
}

impl MinerInstance {
    pub fn new(node: Node, authority: Arc<dyn SigningAuthority>) -> Self {
        let parameters = node.chain.read().parameters().clone();
        Self {
            node,
            miner: Arc::new(Miner::new(parameters, authority)),
        }
    }

    /// Spawns the mining loop. Each pass starts on a fixed tick; a pass
    /// preempted by a peer block simply waits for the next tick, which then
    /// mines against the adopted tip.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(
            "mining every {}s to {}",
            MINING_INTERVAL_SECS,
            ferrocoin_crypto::key_fingerprint(self.miner.coinbase_address())
        );

        task::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(MINING_INTERVAL_SECS));
            interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                match self.mine_once().await {
                    Ok(true) => {}
                    Ok(false) => debug!("mining pass yielded no block"),
                    Err(error) => warn!("mining pass failed: {}", error),
                }
            }
        })
    }

    /// Runs one full mining pass. Returns true if a block was appended and
    /// broadcast.
    pub async fn mine_once(&self) -> Result<bool, NetworkError> {
        self.node.terminator.store(false, Ordering::SeqCst);

        let candidate = {
            let chain = self.node.chain.read();
            let mempool = self.node.mempool.read();

            let limit = chain.parameters().max_transactions_per_block - 1;
            let pending = mempool.get_candidates(limit);
            self.miner.establish_candidate(chain.latest_block(), pending)?
        };

        debug!(
            "mining candidate {} with {} transactions",
            candidate.index,
            candidate.transactions.len()
        );

        let miner = self.miner.clone();
        let terminator = self.node.terminator.clone();
        let mined = task::spawn_blocking(move || miner.find_block(candidate, &terminator))
            .await
            .map_err(|error| NetworkError::Message(format!("mining worker died: {error}")))??;

        let block = match mined {
            Some(block) => block,
            None => {
                debug!("nonce search preempted by an incoming block");
                return Ok(false);
            }
        };

        // Re-validate as if received; a peer block may have won the race
        // between candidate capture and completion.
        let appended = {
            let mut chain = self.node.chain.write();
            match chain.append_block(block.clone()) {
                Ok(()) => {
                    let mut mempool = self.node.mempool.write();
                    let included: Vec<&str> = block
                        .transactions
                        .iter()
                        .filter(|tx| !tx.is_coinbase)
                        .map(|tx| tx.id.as_str())
                        .collect();
                    mempool.remove_transactions(included);
                    true
                }
                Err(error) => {
                    debug!("discarding stale mined block {}: {}", block.index, error);
                    false
                }
            }
        };

        if !appended {
            return Ok(false);
        }

        info!(
            "mined block {} ({} transactions, reward {})",
            block.index,
            block.transactions.len(),
            block.reward
        );
        self.node.propagate_block(block, None).await;

        Ok(true)
    }
}
