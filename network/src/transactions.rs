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
use ferrocoin_objects::Transaction;

use tracing::{debug, trace};

impl Node {
    /// Sends a transaction to every full peer except `excluded`.
    pub async fn propagate_transaction(&self, tx: Transaction, excluded: Option<&str>) {
        trace!("propagating transaction {} to peers", tx.id);
        self.broadcast_except(Payload::Transaction(tx), excluded).await;
    }

    /// A peer or wallet submitted a transaction. Admission failures are
    /// expected gossip noise (duplicates echo back constantly) and are only
    /// logged; an admitted transaction is re-broadcast to everyone but the
    /// sender.
    pub(crate) async fn received_transaction(&self, peer_id: &str, tx: Transaction) {
        let admitted = {
            let chain = self.chain.read();
            let mut mempool = self.mempool.write();
            mempool.add_transaction(tx.clone(), &chain)
        };

        match admitted {
            Ok(()) => {
                debug!("admitted transaction {} from {}", tx.id, peer_id);
                self.propagate_transaction(tx, Some(peer_id)).await;
            }
            Err(error) => trace!("transaction {} from {} not admitted: {}", tx.id, peer_id, error),
        }
    }

    /// A wallet asked for the mempool contents.
    pub(crate) async fn received_mempool_request(&self, peer_id: &str) {
        let transactions = self.mempool.read().transactions();
        debug!("sending {} pending transactions to {}", transactions.len(), peer_id);

        if let Err(error) = self
            .send_to(peer_id, Payload::MempoolResponse { transactions })
            .await
        {
            debug!("mempool response to {} failed: {}", peer_id, error);
        }
    }
}
