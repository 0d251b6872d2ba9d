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

use crate::WalletError;
use ferrocoin_crypto::random_id_hex;
use ferrocoin_network::{
    Frame,
    FrameCodec,
    Payload,
    CHAIN_SYNC_TIMEOUT_SECS,
    HANDSHAKE_TIMEOUT_SECS,
    WALLET_SENTINEL_ADDRESS,
};
use ferrocoin_objects::{Block, Transaction};

use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::{net::TcpStream, time::timeout};
use tokio_util::codec::Framed;
use tracing::{debug, trace};

/// A wallet's attachment to one node.
///
/// This is the suppressed-gossip connection class: it handshakes with the
/// `localhost:0` sentinel so the node files it as a wallet, never reacts to
/// peer discovery, and never receives block or transaction fan-out. All
/// traffic is request/response initiated from this side.
pub struct NodeClient {
    framed: Framed<TcpStream, FrameCodec>,
    client_id: String,
    node_id: String,
}

impl NodeClient {
    /// Dials a node and completes the wallet handshake within the 5 second
    /// connect window.
    pub async fn connect(node_address: &str) -> Result<Self, WalletError> {
        let client_id = random_id_hex(16);

        let connect = async {
            let stream = TcpStream::connect(node_address).await?;
            let mut framed = Framed::new(stream, FrameCodec);

            framed
                .send(Frame::new(
                    Payload::Handshake {
                        node_id: client_id.clone(),
                        listening_address: WALLET_SENTINEL_ADDRESS.to_string(),
                    },
                    client_id.clone(),
                ))
                .await
                .map_err(WalletError::from)?;

            let first = framed
                .next()
                .await
                .ok_or(WalletError::PeerDisconnected)?
                .map_err(WalletError::from)?;

            match first.payload {
                Payload::Handshake { node_id, .. } => Ok::<_, WalletError>((framed, node_id)),
                other => Err(WalletError::Message(format!(
                    "expected HANDSHAKE from node, got {}",
                    other.name()
                ))),
            }
        };

        let (framed, node_id) = timeout(Duration::from_secs(HANDSHAKE_TIMEOUT_SECS), connect)
            .await
            .map_err(|_| {
                WalletError::ConnectFailed(node_address.to_string(), "timed out".to_string())
            })??;

        debug!("wallet {} attached to node {}", client_id, node_id);

        Ok(Self {
            framed,
            client_id,
            node_id,
        })
    }

    /// The id of the node this wallet is attached to.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Fetches the node's entire chain, waiting up to the sync timeout.
    pub async fn request_chain(&mut self) -> Result<Vec<Block>, WalletError> {
        self.send(Payload::ChainRequest).await?;

        self.await_response("CHAIN_RESPONSE", |payload| match payload {
            Payload::ChainResponse { chain } => Some(chain),
            _ => None,
        })
        .await
    }

    /// Fetches the node's pending transactions.
    pub async fn request_mempool(&mut self) -> Result<Vec<Transaction>, WalletError> {
        self.send(Payload::MempoolRequest).await?;

        self.await_response("MEMPOOL_RESPONSE", |payload| match payload {
            Payload::MempoolResponse { transactions } => Some(transactions),
            _ => None,
        })
        .await
    }

    /// Hands a signed transaction to the node for gossip.
    pub async fn send_transaction(&mut self, tx: Transaction) -> Result<(), WalletError> {
        self.send(Payload::Transaction(tx)).await
    }

    async fn send(&mut self, payload: Payload) -> Result<(), WalletError> {
        self.framed
            .send(Frame::new(payload, self.client_id.clone()))
            .await
            .map_err(WalletError::from)
    }

    /// Reads frames until `extract` matches, discarding anything else the
    /// node happens to send in between.
    async fn await_response<T>(
        &mut self,
        expected: &'static str,
        mut extract: impl FnMut(Payload) -> Option<T>,
    ) -> Result<T, WalletError> {
        let deadline = Duration::from_secs(CHAIN_SYNC_TIMEOUT_SECS);

        let wait = async {
            loop {
                let frame = self
                    .framed
                    .next()
                    .await
                    .ok_or(WalletError::PeerDisconnected)?
                    .map_err(WalletError::from)?;

                match extract(frame.payload) {
                    Some(value) => return Ok::<_, WalletError>(value),
                    None => trace!("skipping frame while waiting for {}", expected),
                }
            }
        };

        timeout(deadline, wait)
            .await
            .map_err(|_| WalletError::ResponseTimeout(expected))?
    }
}
