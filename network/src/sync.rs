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
    /// A peer asked for our chain; reply with all of it.
    pub(crate) async fn received_chain_request(&self, peer_id: &str) {
        let chain = self.chain_snapshot();
        debug!("sending {} blocks to {}", chain.len(), peer_id);

        if let Err(error) = self.send_to(peer_id, Payload::ChainResponse { chain }).await {
            debug!("chain response to {} failed: {}", peer_id, error);
        }
    }

    /// A peer sent its chain. Adopt it if it is valid and strictly longer;
    /// otherwise keep ours and drop the response.
    ///
    /// On adoption, transactions now confirmed leave the mempool and any
    /// in-flight nonce search is preempted: its tip no longer exists.
    pub(crate) fn received_chain_response(&self, peer_id: &str, blocks: Vec<Block>) {
        let adopted = {
            let mut chain = self.chain.write();
            match chain.replace_chain(blocks) {
                Ok(()) => {
                    let confirmed = chain.confirmed_transaction_ids();
                    let mut mempool = self.mempool.write();
                    mempool.remove_transactions(confirmed.iter().map(String::as_str));
                    Some(chain.height())
                }
                Err(error) => {
                    debug!("keeping local chain over {}'s: {}", peer_id, error);
                    None
                }
            }
        };

        if let Some(height) = adopted {
            info!("adopted chain from {} at height {}", peer_id, height);
            self.preempt_miner();
        }
    }
}
