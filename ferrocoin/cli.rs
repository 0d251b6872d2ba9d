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
use ferrocoin_crypto::key_fingerprint;
use ferrocoin_network::{MinerInstance, Node};
use ferrocoin_wallet::{transaction_status, Identity, Keystore, NodeClient, Wallet};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ferrocoin", about = "A minimal proof-of-work cryptocurrency node", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an encrypted wallet file with a fresh identity.
    CreateWallet {
        password: String,
        path: PathBuf,
    },
    /// Run a relay node, optionally dialing an existing peer.
    StartNode {
        port: u16,
        peer: Option<String>,
    },
    /// Attach a wallet to a node and print its view of the chain.
    ConnectWallet {
        path: PathBuf,
        password: String,
        node: String,
    },
    /// Run a mining node paying rewards to the wallet's identity.
    MiningNode {
        port: u16,
        path: PathBuf,
        password: String,
        difficulty: Option<usize>,
        peer: Option<String>,
    },
    /// Print the confirmed balance of the wallet's identity.
    CheckBalance {
        path: PathBuf,
        password: String,
        node: String,
    },
    /// Send an amount to the PEM public key in the recipient file.
    SendTransaction {
        path: PathBuf,
        password: String,
        node: String,
        recipient_key_file: PathBuf,
        amount: f64,
    },
    /// Print a node's pending transactions.
    ViewMempool {
        node: String,
    },
    /// Print the identities held in a wallet file.
    ShowKeys {
        path: PathBuf,
        password: String,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::CreateWallet { password, path } => create_wallet(&password, path),
        Command::StartNode { port, peer } => start_node(port, None, peer, None).await,
        Command::ConnectWallet { path, password, node } => connect_wallet(path, &password, &node).await,
        Command::MiningNode {
            port,
            path,
            password,
            difficulty,
            peer,
        } => {
            let identity = load_identity(&path, &password)?;
            start_node(port, Some(identity), peer, difficulty).await
        }
        Command::CheckBalance { path, password, node } => check_balance(path, &password, &node).await,
        Command::SendTransaction {
            path,
            password,
            node,
            recipient_key_file,
            amount,
        } => send_transaction(path, &password, &node, recipient_key_file, amount).await,
        Command::ViewMempool { node } => view_mempool(&node).await,
        Command::ShowKeys { path, password } => show_keys(path, &password),
    }
}

fn load_identity(path: &PathBuf, password: &str) -> Result<Identity> {
    Keystore::new(path)
        .load_active(password)
        .with_context(|| format!("cannot open identity store at {}", path.display()))
}

fn create_wallet(password: &str, path: PathBuf) -> Result<()> {
    let store = Keystore::new(&path);
    if store.exists() {
        bail!("refusing to overwrite existing wallet at {}", path.display());
    }

    let identity = Identity::generate(None)?;
    store.save(std::slice::from_ref(&identity), password)?;

    println!("created wallet at {}", path.display());
    println!("identity id:      {}", identity.id);
    println!("key fingerprint:  {}", key_fingerprint(&identity.public_key));

    Ok(())
}

async fn start_node(
    port: u16,
    mining_identity: Option<Identity>,
    peer: Option<String>,
    difficulty: Option<usize>,
) -> Result<()> {
    let parameters = match difficulty {
        Some(difficulty) if difficulty == 0 || difficulty > 63 => {
            bail!("difficulty must be between 1 and 63");
        }
        Some(difficulty) => ConsensusParameters::with_difficulty(difficulty),
        None => ConsensusParameters::default(),
    };

    let node = Node::new(format!("127.0.0.1:{port}"), parameters);
    node.start()
        .await
        .map_err(|error| anyhow!("cannot start node: {error}"))?;

    // A failed bootstrap dial is not fatal; the node keeps listening and
    // discovery can still reach it.
    if let Some(peer) = peer {
        if let Err(error) = node.connect_to(&peer).await {
            tracing::warn!("cannot reach peer {}: {}", peer, error);
        }
    }

    if let Some(identity) = mining_identity {
        info!(
            "mining rewards go to identity {} ({})",
            identity.id,
            key_fingerprint(&identity.public_key)
        );
        MinerInstance::new(node.clone(), Arc::new(identity)).spawn();
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    Ok(())
}

async fn connect_wallet(path: PathBuf, password: &str, node: &str) -> Result<()> {
    let identity = load_identity(&path, password)?;
    let mut client = NodeClient::connect(node).await?;

    let chain = client.request_chain().await?;
    let balance = ferrocoin_wallet::balance_from_blocks(&chain, &identity.public_key);
    let history = ferrocoin_wallet::history_from_blocks(&chain, &identity.public_key);

    println!("attached to node  {}", client.node_id());
    println!("chain height:     {}", chain.len() - 1);
    println!("identity:         {}", identity.id);
    println!("confirmed:        {balance}");
    println!("transactions:     {}", history.len());

    Ok(())
}

async fn check_balance(path: PathBuf, password: &str, node: &str) -> Result<()> {
    let identity = load_identity(&path, password)?;
    let mut client = NodeClient::connect(node).await?;

    let wallet = Wallet::new(identity);
    let balance = wallet.check_balance(&mut client).await?;

    println!("{balance}");
    Ok(())
}

async fn send_transaction(
    path: PathBuf,
    password: &str,
    node: &str,
    recipient_key_file: PathBuf,
    amount: f64,
) -> Result<()> {
    let store = Keystore::new(&path);
    let mut identities = store.load(password)?;

    let recipient = std::fs::read_to_string(&recipient_key_file)
        .with_context(|| format!("cannot read recipient key {}", recipient_key_file.display()))?;

    let mut client = NodeClient::connect(node).await?;
    let mut wallet = Wallet::new(identities[0].clone());

    let tx = wallet.submit_transaction(&mut client, &recipient, amount).await?;
    let status = transaction_status(&mut client, &tx.id).await?;

    // Persist the identity's last-used stamp.
    identities[0] = wallet.into_identity();
    store.save(&identities, password)?;

    println!("transaction id:   {}", tx.id);
    println!("amount:           {}", tx.amount);
    println!("recipient:        {}", key_fingerprint(&tx.recipient));
    println!("status:           {status:?}");

    Ok(())
}

async fn view_mempool(node: &str) -> Result<()> {
    let mut client = NodeClient::connect(node).await?;
    let pending = client.request_mempool().await?;

    println!("{} pending transactions", pending.len());
    for tx in pending {
        let sender = tx
            .sender
            .as_deref()
            .map(key_fingerprint)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {} -> {}  amount {}",
            tx.id,
            sender,
            key_fingerprint(&tx.recipient),
            tx.amount
        );
    }

    Ok(())
}

fn show_keys(path: PathBuf, password: &str) -> Result<()> {
    let identities = Keystore::new(&path).load(password)?;

    for identity in identities {
        println!("identity id:      {}", identity.id);
        if let Some(name) = &identity.name {
            println!("name:             {name}");
        }
        println!("created at:       {}", identity.created_at);
        if let Some(last_used) = identity.last_used {
            println!("last used:        {last_used}");
        }
        println!("public key:\n{}", identity.public_key);
        println!("private key:\n{}", identity.private_key);
    }

    Ok(())
}
