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

mod codec;
pub use codec::*;

use ferrocoin_objects::{now_millis, Block, Transaction};

use serde::{Deserialize, Serialize};

/// One wire frame: a typed payload plus the sending node's id and a
/// millisecond timestamp. Encodes as the JSON object
/// `{type, payload, sender, timestamp}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Frame {
    #[serde(flatten)]
    pub payload: Payload,
    pub sender: String,
    pub timestamp: i64,
}

impl Frame {
    pub fn new(payload: Payload, sender: String) -> Self {
        Self {
            payload,
            sender,
            timestamp: now_millis(),
        }
    }
}

/// Every message type of the gossip protocol.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Payload {
    /// First frame on every connection: the peer introduces itself.
    #[serde(rename = "HANDSHAKE")]
    Handshake {
        node_id: String,
        listening_address: String,
    },
    /// Listening addresses of newly learned peers.
    #[serde(rename = "PEER_DISCOVERY")]
    PeerDiscovery { peers: Vec<String> },
    /// Ask a peer for its entire chain.
    #[serde(rename = "CHAIN_REQUEST")]
    ChainRequest,
    /// The entire chain of the responding peer.
    #[serde(rename = "CHAIN_RESPONSE")]
    ChainResponse { chain: Vec<Block> },
    /// A freshly mined block.
    #[serde(rename = "BLOCK")]
    Block(Block),
    /// An unconfirmed transaction.
    #[serde(rename = "TRANSACTION")]
    Transaction(Transaction),
    /// Ask a peer for its mempool contents.
    #[serde(rename = "MEMPOOL_REQUEST")]
    MempoolRequest,
    /// The responding peer's pending transactions.
    #[serde(rename = "MEMPOOL_RESPONSE")]
    MempoolResponse { transactions: Vec<Transaction> },
}

impl Payload {
    /// Returns the wire name of the payload, for log lines.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Handshake { .. } => "HANDSHAKE",
            Self::PeerDiscovery { .. } => "PEER_DISCOVERY",
            Self::ChainRequest => "CHAIN_REQUEST",
            Self::ChainResponse { .. } => "CHAIN_RESPONSE",
            Self::Block(..) => "BLOCK",
            Self::Transaction(..) => "TRANSACTION",
            Self::MempoolRequest => "MEMPOOL_REQUEST",
            Self::MempoolResponse { .. } => "MEMPOOL_RESPONSE",
        }
    }
}
