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

use crate::{Identity, NodeClient, WalletError};
use ferrocoin_consensus::MIN_TRANSACTION;
use ferrocoin_crypto::normalize_key;
use ferrocoin_objects::{Block, Transaction};

use tracing::info;

/// Where a submitted transaction currently stands, as seen through the
/// attached node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionStatus {
    /// Included in the chain.
    Confirmed,
    /// Waiting in the mempool.
    Pending,
    /// Known to neither the chain nor the mempool.
    Rejected,
}

/// A wallet: one active identity and the operations built on it.
pub struct Wallet {
    identity: Identity,
}

impl Wallet {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }

    pub fn public_key(&self) -> &str {
        &self.identity.public_key
    }

    /// Constructs and signs a transfer from the active identity.
    pub fn create_transaction(&mut self, recipient: &str, amount: f64) -> Result<Transaction, WalletError> {
        if !(amount >= MIN_TRANSACTION) {
            return Err(WalletError::AmountTooSmall(amount));
        }

        let mut tx = Transaction::new(
            self.identity.public_key.clone(),
            normalize_key(recipient),
            amount,
        );
        tx.sign_with(&self.identity.private_key)?;
        self.identity.touch();

        Ok(tx)
    }

    /// Signs a transfer and hands it to the attached node for gossip.
    pub async fn submit_transaction(
        &mut self,
        client: &mut NodeClient,
        recipient: &str,
        amount: f64,
    ) -> Result<Transaction, WalletError> {
        let tx = self.create_transaction(recipient, amount)?;
        client.send_transaction(tx.clone()).await?;

        info!("submitted transaction {} for {}", tx.id, amount);
        Ok(tx)
    }

    /// The confirmed balance of the active identity, computed from a chain
    /// fetched off the attached node.
    pub async fn check_balance(&self, client: &mut NodeClient) -> Result<f64, WalletError> {
        let chain = client.request_chain().await?;
        Ok(balance_from_blocks(&chain, &self.identity.public_key))
    }
}

/// Resolves a transaction's status: the chain first, then the mempool,
/// otherwise rejected.
pub async fn transaction_status(
    client: &mut NodeClient,
    tx_id: &str,
) -> Result<TransactionStatus, WalletError> {
    let chain = client.request_chain().await?;
    let confirmed = chain
        .iter()
        .flat_map(|block| block.transactions.iter())
        .any(|tx| tx.id == tx_id);
    if confirmed {
        return Ok(TransactionStatus::Confirmed);
    }

    let mempool = client.request_mempool().await?;
    if mempool.iter().any(|tx| tx.id == tx_id) {
        return Ok(TransactionStatus::Pending);
    }

    Ok(TransactionStatus::Rejected)
}

/// Sums credits minus debits for an address over a fetched chain.
pub fn balance_from_blocks(blocks: &[Block], address: &str) -> f64 {
    let address = normalize_key(address);
    let mut balance = 0.0;

    for block in blocks {
        for tx in &block.transactions {
            if tx.is_to(&address) {
                balance += tx.amount;
            }
            if tx.is_from(&address) {
                balance -= tx.amount;
            }
        }
    }

    balance
}

/// Every transaction touching an address over a fetched chain, in order.
pub fn history_from_blocks(blocks: &[Block], address: &str) -> Vec<Transaction> {
    blocks
        .iter()
        .flat_map(|block| block.transactions.iter())
        .filter(|tx| tx.involves(address))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_transactions_are_signed_by_the_identity() {
        let identity = Identity::generate(None).unwrap();
        let mut wallet = Wallet::new(identity);

        let tx = wallet.create_transaction("recipient-key", 2.5).unwrap();

        assert_eq!(tx.sender.as_deref(), Some(wallet.public_key()));
        assert!(!tx.is_coinbase);
        assert!(tx.verify_signature());
        assert!(wallet.identity().last_used.is_some());
    }

    #[test]
    fn dust_amounts_are_refused() {
        let identity = Identity::generate(None).unwrap();
        let mut wallet = Wallet::new(identity);

        assert!(matches!(
            wallet.create_transaction("recipient", 0.0),
            Err(WalletError::AmountTooSmall(_))
        ));
        assert!(matches!(
            wallet.create_transaction("recipient", MIN_TRANSACTION / 10.0),
            Err(WalletError::AmountTooSmall(_))
        ));
    }

    #[test]
    fn balance_scan_handles_coinbase_and_transfers() {
        let mut genesis = Block::genesis(1);

        let mut reward = Transaction::coinbase("miner".into(), 50.0);
        reward.signature = Some("sig".into());
        let mut spend = Transaction::new("miner".into(), "shop".into(), 20.0);
        spend.signature = Some("sig".into());

        // Balance scanning is signature-agnostic; validity was the chain's
        // concern at append time.
        genesis.transactions.push(reward);
        genesis.transactions.push(spend);

        let blocks = vec![genesis];
        assert_eq!(balance_from_blocks(&blocks, "miner"), 30.0);
        assert_eq!(balance_from_blocks(&blocks, "shop"), 20.0);
        assert_eq!(balance_from_blocks(&blocks, "stranger"), 0.0);
        assert_eq!(history_from_blocks(&blocks, "miner").len(), 2);
    }
}
