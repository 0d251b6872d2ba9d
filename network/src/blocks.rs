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

use crate::{Node, Payload};
use ferrocoin_objects::Block;

use tracing::{debug, info};

impl Node {
    /// Sends a block to every full peer except `excluded`, typically the
    /// peer it came from. Wallet attachments never receive fan-out.
    pub async fn propagate_block(&self, block: Block, excluded: Option<&str>) {
        debug!("propagating block {} to peers", block.index);
        self.broadcast_except(Payload::Block(block), excluded).await;
    }

    /// A peer sent a freshly mined block.
    ///
    /// The block must extend the current tip exactly; anything else (stale
    /// height, broken linkage, bad proof of work, invalid transactions) is
    /// logged and dropped without response. An accepted block evicts its
    /// transactions from the mempool, preempts the local miner and is
    /// re-broadcast to everyone but the sender.
    pub(crate) async fn received_block(&self, peer_id: &str, block: Block) {
        let accepted = {
            let mut chain = self.chain.write();
            match chain.append_block(block.clone()) {
                Ok(()) => {
                    let mut mempool = self.mempool.write();
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
                    debug!("rejected block {} from {}: {}", block.index, peer_id, error);
                    false
                }
            }
        };

        if accepted {
            info!(
                "accepted block {} from {} ({} transactions)",
                block.index,
                peer_id,
                block.transactions.len()
            );
            self.preempt_miner();
            self.propagate_block(block, Some(peer_id)).await;
        }
    }
}
