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

use crate::{
    is_wallet_sentinel,
    Frame,
    FrameCodec,
    NetworkError,
    Payload,
    Peer,
    PeerBook,
    HANDSHAKE_TIMEOUT_SECS,
    MEMPOOL_SWEEP_INTERVAL_SECS,
};
use ferrocoin_consensus::{AccountBalance, Blockchain, ConsensusParameters, MemoryPool};
use ferrocoin_crypto::random_id_hex;
use ferrocoin_objects::Block;

use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::{
    future::Future,
    net::SocketAddr,
    ops::Deref,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    time::timeout,
};
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

/// Width of a node id in bytes (128 bits, hex-encoded on the wire).
pub const NODE_ID_BYTES: usize = 16;

/// Outbound frames queued per connection before sends apply backpressure.
const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

/// The gossip manager: one per process, owning the chain, the mempool and
/// the peer table. Cheap to clone; all clones share one inner state.
#[derive(Clone)]
pub struct Node(Arc<InnerNode>);

pub struct InnerNode {
    node_id: String,
    listening_address: RwLock<String>,
    pub chain: RwLock<Blockchain>,
    pub mempool: RwLock<MemoryPool>,
    pub peer_book: PeerBook,
    /// Flipped when a foreign block lands; an in-flight nonce search checks
    /// it every iteration.
    pub terminator: Arc<AtomicBool>,
}

impl Deref for Node {
    type Target = InnerNode;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Node {
    /// Creates a node that will advertise `listening_address` once started.
    pub fn new(listening_address: String, parameters: ConsensusParameters) -> Self {
        Self(Arc::new(InnerNode {
            node_id: random_id_hex(NODE_ID_BYTES),
            listening_address: RwLock::new(listening_address),
            chain: RwLock::new(Blockchain::new(parameters)),
            mempool: RwLock::new(MemoryPool::new()),
            peer_book: PeerBook::new(),
            terminator: Arc::new(AtomicBool::new(false)),
        }))
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn listening_address(&self) -> String {
        self.listening_address.read().clone()
    }

    /// Binds the listener, spawns the accept loop and the periodic mempool
    /// sweep, and returns the bound address.
    ///
    /// Binding to port zero picks an ephemeral port; the advertised address
    /// is patched to the real one before any handshake goes out.
    pub async fn start(&self) -> Result<SocketAddr, NetworkError> {
        let bind_address = self.listening_address();
        let listener = TcpListener::bind(&bind_address)
            .await
            .map_err(|error| NetworkError::Bind(bind_address.clone(), error))?;
        let local_address = listener.local_addr()?;

        if bind_address.ends_with(":0") {
            let advertised = format!(
                "{}:{}",
                bind_address.rsplit_once(':').map(|(host, _)| host).unwrap_or("127.0.0.1"),
                local_address.port()
            );
            *self.listening_address.write() = advertised;
        }

        info!(
            "node {} listening on {} at chain height {}",
            self.node_id,
            local_address,
            self.chain.read().height()
        );

        let node = self.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, remote_address)) => {
                        let node = node.clone();
                        tokio::spawn(async move {
                            if let Err(error) = node.handle_connection(stream, remote_address, None).await {
                                debug!("connection with {} ended: {}", remote_address, error);
                            }
                        });
                    }
                    Err(error) => warn!("failed to accept a connection: {}", error),
                }
            }
        });

        let node = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(MEMPOOL_SWEEP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                node.mempool.write().cleanup();
            }
        });

        Ok(local_address)
    }

    /// Dials a peer by listening address and drives the connection to the
    /// completed handshake. The read loop continues in the background.
    pub fn connect_to<'a>(
        &'a self,
        address: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), NetworkError>> + Send + 'a>> {
        Box::pin(self.connect_to_inner(address))
    }

    async fn connect_to_inner(&self, address: &str) -> Result<(), NetworkError> {
        if address == self.listening_address() {
            return Err(NetworkError::SelfDial(address.to_string()));
        }
        if !self.peer_book.mark_dialing(address) {
            trace!("suppressing duplicate dial to {}", address);
            return Ok(());
        }

        let dial = timeout(
            Duration::from_secs(HANDSHAKE_TIMEOUT_SECS),
            TcpStream::connect(address),
        )
        .await;

        let stream = match dial {
            Ok(Ok(stream)) => stream,
            Ok(Err(error)) => {
                self.peer_book.unmark_dialing(address);
                return Err(NetworkError::Io(error));
            }
            Err(_) => {
                self.peer_book.unmark_dialing(address);
                return Err(NetworkError::Message(format!("dial to {address} timed out")));
            }
        };

        let remote_address = stream.peer_addr()?;
        let node = self.clone();
        let dialed = address.to_string();
        tokio::spawn(async move {
            if let Err(error) = node.handle_connection(stream, remote_address, Some(dialed)).await {
                debug!("connection with {} ended: {}", remote_address, error);
            }
        });

        Ok(())
    }

    /// Runs one connection end to end: handshake, registration, read loop,
    /// teardown. Both the accepting and the dialing side run this
    /// symmetrically; each sends its `HANDSHAKE` first and then waits for
    /// the other's.
    async fn handle_connection(
        &self,
        stream: TcpStream,
        remote_address: SocketAddr,
        dialed_address: Option<String>,
    ) -> Result<(), NetworkError> {
        let result = self.run_connection(stream, remote_address).await;

        if let Some(dialed) = dialed_address {
            self.peer_book.unmark_dialing(&dialed);
        }
        result
    }

    async fn run_connection(
        &self,
        stream: TcpStream,
        remote_address: SocketAddr,
    ) -> Result<(), NetworkError> {
        let mut framed = Framed::new(stream, FrameCodec);

        framed
            .send(Frame::new(
                Payload::Handshake {
                    node_id: self.node_id.clone(),
                    listening_address: self.listening_address(),
                },
                self.node_id.clone(),
            ))
            .await?;

        let first = timeout(Duration::from_secs(HANDSHAKE_TIMEOUT_SECS), framed.next())
            .await
            .map_err(|_| {
                NetworkError::HandshakeFailed(remote_address.to_string(), "timed out".into())
            })?
            .ok_or_else(|| {
                NetworkError::HandshakeFailed(remote_address.to_string(), "connection closed".into())
            })??;

        let (peer_id, peer_listening) = match first.payload {
            Payload::Handshake {
                node_id,
                listening_address,
            } => (node_id, listening_address),
            other => {
                return Err(NetworkError::HandshakeFailed(
                    remote_address.to_string(),
                    format!("expected HANDSHAKE, got {}", other.name()),
                ));
            }
        };

        if peer_id == self.node_id || peer_listening == self.listening_address() {
            return Err(NetworkError::SelfDial(peer_listening));
        }

        let (sender, mut outbound) = mpsc::channel::<Frame>(OUTBOUND_CHANNEL_CAPACITY);
        let peer = Peer::new(peer_id.clone(), peer_listening.clone(), remote_address, sender);
        let is_wallet = is_wallet_sentinel(&peer_listening);

        let registered = if is_wallet {
            self.peer_book.insert_wallet(peer)
        } else {
            self.peer_book.insert_peer(peer)
        };
        if !registered {
            return Err(NetworkError::PeerAlreadyConnected(peer_id));
        }

        if is_wallet {
            info!("wallet {} attached from {}", peer_id, remote_address);
        } else {
            info!(
                "peer {} connected ({} at {}), {} peers total",
                peer_id,
                peer_listening,
                remote_address,
                self.peer_book.peer_count()
            );
        }

        let (mut sink, mut source) = framed.split();
        let writer = tokio::spawn(async move {
            while let Some(frame) = outbound.recv().await {
                if sink.send(frame).await.is_err() {
                    break;
                }
            }
        });

        if !is_wallet {
            self.peer_connected(&peer_id, &peer_listening).await;
        }

        let outcome = loop {
            match source.next().await {
                Some(Ok(frame)) => self.dispatch(&peer_id, frame).await,
                Some(Err(error)) => break Err(error),
                None => break Ok(()),
            }
        };

        self.peer_book.remove(&peer_id);
        writer.abort();

        if is_wallet {
            info!("wallet {} detached", peer_id);
        } else {
            info!(
                "peer {} disconnected, {} peers total",
                peer_id,
                self.peer_book.peer_count()
            );
        }

        outcome
    }

    /// Reacts to a completed full-node handshake: announce the newcomer to
    /// the rest of the table and ask it for its chain.
    async fn peer_connected(&self, peer_id: &str, peer_listening: &str) {
        self.broadcast_except(
            Payload::PeerDiscovery {
                peers: vec![peer_listening.to_string()],
            },
            Some(peer_id),
        )
        .await;

        if let Err(error) = self.send_to(peer_id, Payload::ChainRequest).await {
            debug!("chain request to {} failed: {}", peer_id, error);
        }
    }

    async fn dispatch(&self, peer_id: &str, frame: Frame) {
        trace!("got {} from {}", frame.payload.name(), peer_id);

        match frame.payload {
            Payload::Handshake { .. } => {
                trace!("ignoring repeated handshake from {}", peer_id);
            }
            Payload::PeerDiscovery { peers } => self.received_peer_discovery(peers).await,
            Payload::ChainRequest => self.received_chain_request(peer_id).await,
            Payload::ChainResponse { chain } => self.received_chain_response(peer_id, chain),
            Payload::Block(block) => self.received_block(peer_id, block).await,
            Payload::Transaction(tx) => self.received_transaction(peer_id, tx).await,
            Payload::MempoolRequest => self.received_mempool_request(peer_id).await,
            Payload::MempoolResponse { .. } => {
                trace!("ignoring unsolicited mempool response from {}", peer_id);
            }
        }
    }

    /// Sends a payload to every connected full peer. Wallet attachments are
    /// excluded from fan-out by construction.
    pub async fn broadcast(&self, payload: Payload) {
        self.broadcast_except(payload, None).await;
    }

    /// Broadcast variant that skips one peer, typically the original sender.
    pub async fn broadcast_except(&self, payload: Payload, excluded: Option<&str>) {
        let frame = Frame::new(payload, self.node_id.clone());
        let recipients: Vec<Peer> = self
            .peer_book
            .connected_peers()
            .into_iter()
            .filter(|peer| excluded != Some(peer.node_id.as_str()))
            .collect();

        futures::future::join_all(
            recipients.iter().map(|peer| peer.send(frame.clone())),
        )
        .await;
    }

    /// Sends a payload to one connection, peer or wallet.
    pub async fn send_to(&self, node_id: &str, payload: Payload) -> Result<(), NetworkError> {
        let peer = self
            .peer_book
            .get(node_id)
            .ok_or_else(|| NetworkError::PeerNotConnected(node_id.to_string()))?;

        peer.send(Frame::new(payload, self.node_id.clone())).await;
        Ok(())
    }

    /// A snapshot of the full chain for `CHAIN_RESPONSE` replies.
    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.chain.read().blocks().to_vec()
    }

    /// The cached chain balance of an address with the mempool's pending
    /// view folded in: pending credits minus pending debits.
    pub fn account_balance(&self, address: &str) -> AccountBalance {
        let mut balance = self.chain.write().get_account_balance(address);

        let mempool = self.mempool.read();
        for tx in mempool.transactions() {
            if tx.is_to(address) {
                balance.pending += tx.amount;
            }
            if tx.is_from(address) {
                balance.pending -= tx.amount;
            }
        }

        balance
    }

    /// Signals any in-flight nonce search to abandon its stale tip.
    pub fn preempt_miner(&self) {
        self.terminator.store(true, Ordering::SeqCst);
    }
}
