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

mod common;

use common::{started_node, wait_until};

use ferrocoin_consensus::ConsensusParameters;
use ferrocoin_network::MinerInstance;
use ferrocoin_objects::Block;
use ferrocoin_testing::{mined_chain, signed_coinbase, test_keypair, TestAuthority};

use serial_test::serial;

/// Seeds a node's chain to the given height by mining locally.
fn seed_chain(node: &ferrocoin_network::Node, blocks: usize, recipient: &ferrocoin_crypto::KeyPair) {
    let seeded = mined_chain(ConsensusParameters::with_difficulty(1), blocks, recipient);
    node.chain
        .write()
        .replace_chain(seeded.blocks().to_vec())
        .expect("seed chain adoption");
}

#[tokio::test]
#[serial]
async fn cold_node_converges_on_the_longer_chain() {
    let miner_key = test_keypair(0);

    let (node_a, address_a) = started_node(1).await;
    seed_chain(&node_a, 2, miner_key);

    let (node_c, _) = started_node(1).await;
    node_c.connect_to(&address_a).await.unwrap();

    assert!(wait_until(10, || node_c.chain.read().height() == 2).await);

    assert_eq!(node_c.chain_snapshot(), node_a.chain_snapshot());
    assert_eq!(
        node_c.chain.read().confirmed_balance(&miner_key.public_key),
        100.0
    );
    assert!(node_c.chain.read().is_valid());
}

#[tokio::test]
#[serial]
async fn longer_chains_win_in_either_direction() {
    let miner_key = test_keypair(0);

    let (node_a, address_a) = started_node(1).await;
    let (node_b, _) = started_node(1).await;

    seed_chain(&node_a, 1, miner_key);
    seed_chain(&node_b, 3, miner_key);

    // The shorter side dials the longer side; sync must still favor length,
    // not direction.
    node_a.connect_to(&node_b.listening_address()).await.unwrap();
    assert!(wait_until(10, || node_a.chain.read().height() == 3).await);
    assert_eq!(node_a.chain_snapshot(), node_b.chain_snapshot());

    // And a late joiner with a shorter chain adopts from its contact.
    let (node_d, _) = started_node(1).await;
    seed_chain(&node_d, 2, test_keypair(1));
    node_d.connect_to(&address_a).await.unwrap();

    assert!(wait_until(10, || node_d.chain.read().height() == 3).await);
    assert_eq!(node_d.chain_snapshot(), node_a.chain_snapshot());
}

#[tokio::test]
#[serial]
async fn one_mining_pass_grows_and_propagates_a_block() {
    let wallet_key = test_keypair(0);

    let (node_m, address_m) = started_node(1).await;
    let (node_a, _) = started_node(1).await;
    node_a.connect_to(&address_m).await.unwrap();
    assert!(wait_until(5, || node_m.peer_book.peer_count() == 1).await);

    let driver = MinerInstance::new(node_m.clone(), TestAuthority::from_pair(wallet_key));
    assert!(driver.mine_once().await.unwrap());

    // The miner appended locally and the peer received the broadcast.
    assert_eq!(node_m.chain.read().height(), 1);
    assert!(wait_until(5, || node_a.chain.read().height() == 1).await);

    let chain = node_m.chain.read();
    let block = &chain.blocks()[1];
    let coinbase = block.coinbase().unwrap();
    assert_eq!(block.transactions.len(), 1);
    assert_eq!(coinbase.amount, 50.0);
    assert_eq!(coinbase.recipient, wallet_key.public_key);
    assert_eq!(chain.confirmed_balance(&wallet_key.public_key), 50.0);
}

#[tokio::test]
#[serial]
async fn mining_includes_pending_transactions_and_drains_them() {
    let wallet_key = test_keypair(0);
    let receiver_key = test_keypair(1);

    let (node_m, _) = started_node(1).await;
    seed_chain(&node_m, 1, wallet_key);

    let transfer = ferrocoin_testing::signed_transfer(wallet_key, &receiver_key.public_key, 30.0);
    {
        let chain = node_m.chain.read();
        node_m
            .mempool
            .write()
            .add_transaction(transfer.clone(), &chain)
            .unwrap();
    }

    let driver = MinerInstance::new(node_m.clone(), TestAuthority::from_pair(wallet_key));
    assert!(driver.mine_once().await.unwrap());

    let chain = node_m.chain.read();
    assert_eq!(chain.height(), 2);

    let block = &chain.blocks()[2];
    assert_eq!(block.transactions.len(), 2);
    assert!(block.transactions[0].is_coinbase);
    assert_eq!(block.transactions[1].id, transfer.id);

    assert_eq!(chain.confirmed_balance(&wallet_key.public_key), 50.0 + 50.0 - 30.0);
    assert_eq!(chain.confirmed_balance(&receiver_key.public_key), 30.0);
    assert!(node_m.mempool.read().is_empty());
}

#[tokio::test]
#[serial]
async fn adversarial_block_is_dropped_and_mining_continues() {
    let wallet_key = test_keypair(0);

    // Difficulty 4 so a freshly hashed forgery essentially never meets the
    // target.
    let (node, address) = started_node(4).await;
    let (node_b, _) = started_node(4).await;
    node_b.connect_to(&address).await.unwrap();
    assert!(wait_until(5, || node.peer_book.peer_count() == 1).await);

    let tip = node.chain.read().latest_block().clone();
    let mut forged = Block::candidate(
        1,
        tip.hash,
        vec![signed_coinbase(wallet_key, 50.0)],
        wallet_key.public_key.clone(),
        50.0,
    );
    forged.hash = forged.compute_hash().unwrap();
    if forged.meets_difficulty(4) {
        // One-in-65536 fluke; nothing to assert in that case.
        return;
    }

    node_b
        .propagate_block(forged, None)
        .await;

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    // The bad block changed nothing and the tip is still mineable.
    assert_eq!(node.chain.read().height(), 0);
    assert!(node.chain.read().is_valid());
}
