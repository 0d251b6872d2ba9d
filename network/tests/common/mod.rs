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

use ferrocoin_consensus::ConsensusParameters;
use ferrocoin_network::Node;

use std::time::Duration;

/// Starts a node on an ephemeral local port and returns it with its
/// advertised listening address.
pub async fn started_node(difficulty: usize) -> (Node, String) {
    let node = Node::new(
        "127.0.0.1:0".to_string(),
        ConsensusParameters::with_difficulty(difficulty),
    );
    node.start().await.expect("test node starts");

    let address = node.listening_address();
    (node, address)
}

/// Polls `condition` every 25 ms until it holds or `secs` elapse.
pub async fn wait_until(secs: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(secs);

    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    false
}
