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

use crate::Frame;

use parking_lot::RwLock;
use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
};
use tokio::sync::mpsc;
use tracing::trace;

/// One connected remote: its self-declared identity and the outbound channel
/// feeding its connection task.
#[derive(Clone, Debug)]
pub struct Peer {
    pub node_id: String,
    pub listening_address: String,
    pub remote_address: SocketAddr,
    sender: mpsc::Sender<Frame>,
}

impl Peer {
    pub fn new(
        node_id: String,
        listening_address: String,
        remote_address: SocketAddr,
        sender: mpsc::Sender<Frame>,
    ) -> Self {
        Self {
            node_id,
            listening_address,
            remote_address,
            sender,
        }
    }

    /// Queues a frame for this peer. A closed channel means the connection
    /// task already died; the disconnect handler will reap the entry.
    pub async fn send(&self, frame: Frame) {
        if self.sender.send(frame).await.is_err() {
            trace!("dropping frame for departed peer {}", self.node_id);
        }
    }
}

/// The peer table: full nodes and wallet attachments in disjoint maps, plus
/// the set of listening addresses that are connected or being dialed.
/// Entries move only on connect and disconnect events.
#[derive(Default)]
pub struct PeerBook {
    peers: RwLock<HashMap<String, Peer>>,
    wallets: RwLock<HashMap<String, Peer>>,
    known_addresses: RwLock<HashSet<String>>,
}

impl PeerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a full peer. Returns false if the node id is already taken.
    pub fn insert_peer(&self, peer: Peer) -> bool {
        let mut peers = self.peers.write();
        if peers.contains_key(&peer.node_id) {
            return false;
        }

        self.known_addresses.write().insert(peer.listening_address.clone());
        peers.insert(peer.node_id.clone(), peer);
        true
    }

    /// Registers a wallet attachment.
    pub fn insert_wallet(&self, peer: Peer) -> bool {
        let mut wallets = self.wallets.write();
        if wallets.contains_key(&peer.node_id) {
            return false;
        }
        wallets.insert(peer.node_id.clone(), peer);
        true
    }

    /// Removes a connection in either set, returning its entry.
    pub fn remove(&self, node_id: &str) -> Option<Peer> {
        if let Some(peer) = self.peers.write().remove(node_id) {
            self.known_addresses.write().remove(&peer.listening_address);
            return Some(peer);
        }
        self.wallets.write().remove(node_id)
    }

    /// Looks up any connection, peer or wallet, by node id.
    pub fn get(&self, node_id: &str) -> Option<Peer> {
        self.peers
            .read()
            .get(node_id)
            .cloned()
            .or_else(|| self.wallets.read().get(node_id).cloned())
    }

    pub fn is_connected(&self, node_id: &str) -> bool {
        self.peers.read().contains_key(node_id) || self.wallets.read().contains_key(node_id)
    }

    /// True if the listening address is connected or already being dialed.
    /// Duplicate dials are suppressed through this set.
    pub fn is_known_address(&self, listening_address: &str) -> bool {
        self.known_addresses.read().contains(listening_address)
    }

    /// Optimistically claims an address ahead of a dial. Returns false if it
    /// was already claimed.
    pub fn mark_dialing(&self, listening_address: &str) -> bool {
        self.known_addresses.write().insert(listening_address.to_string())
    }

    /// Releases a claimed address after a failed dial.
    pub fn unmark_dialing(&self, listening_address: &str) {
        self.known_addresses.write().remove(listening_address);
    }

    /// Snapshot of all full peers.
    pub fn connected_peers(&self) -> Vec<Peer> {
        self.peers.read().values().cloned().collect()
    }

    /// Listening addresses of all full peers.
    pub fn peer_addresses(&self) -> Vec<String> {
        self.peers
            .read()
            .values()
            .map(|peer| peer.listening_address.clone())
            .collect()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(node_id: &str, listening: &str) -> Peer {
        let (sender, _receiver) = mpsc::channel(8);
        Peer::new(
            node_id.into(),
            listening.into(),
            "127.0.0.1:5000".parse().unwrap(),
            sender,
        )
    }

    #[test]
    fn peers_and_wallets_are_disjoint() {
        let book = PeerBook::new();

        assert!(book.insert_peer(peer("a", "127.0.0.1:9001")));
        assert!(book.insert_wallet(peer("w", "localhost:0")));

        assert_eq!(book.peer_count(), 1);
        assert_eq!(book.wallet_count(), 1);
        assert_eq!(book.connected_peers().len(), 1);
        assert_eq!(book.peer_addresses(), vec!["127.0.0.1:9001".to_string()]);
    }

    #[test]
    fn duplicate_node_ids_are_refused() {
        let book = PeerBook::new();

        assert!(book.insert_peer(peer("a", "127.0.0.1:9001")));
        assert!(!book.insert_peer(peer("a", "127.0.0.1:9002")));
        assert_eq!(book.peer_count(), 1);
    }

    #[test]
    fn removal_releases_the_listening_address() {
        let book = PeerBook::new();

        book.insert_peer(peer("a", "127.0.0.1:9001"));
        assert!(book.is_known_address("127.0.0.1:9001"));

        book.remove("a");
        assert!(!book.is_known_address("127.0.0.1:9001"));
        assert!(!book.is_connected("a"));
    }

    #[test]
    fn dialing_claims_are_exclusive() {
        let book = PeerBook::new();

        assert!(book.mark_dialing("127.0.0.1:9009"));
        assert!(!book.mark_dialing("127.0.0.1:9009"));

        book.unmark_dialing("127.0.0.1:9009");
        assert!(book.mark_dialing("127.0.0.1:9009"));
    }
}
