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

use crate::{is_wallet_sentinel, Node};

use tracing::debug;

impl Node {
    /// A peer advertised listening addresses it knows about.
    ///
    /// Each address is claimed optimistically before the dial; a failed dial
    /// releases the claim so a later advertisement can retry it. Own and
    /// wallet-sentinel addresses are never dialed.
    pub(crate) async fn received_peer_discovery(&self, peers: Vec<String>) {
        for address in peers {
            if address == self.listening_address() || is_wallet_sentinel(&address) {
                continue;
            }
            if self.peer_book.is_known_address(&address) {
                continue;
            }

            let node = self.clone();
            tokio::spawn(async move {
                // connect_to claims the address and releases it on failure.
                if let Err(error) = node.connect_to(&address).await {
                    debug!("discovery dial to {} failed: {}", address, error);
                }
            });
        }
    }
}
