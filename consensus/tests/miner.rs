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

mod miner {
    use ferrocoin_consensus::{
        Blockchain,
        ConsensusParameters,
        MemoryPool,
        Miner,
        SigningAuthority,
    };
    use ferrocoin_crypto::{sign, CryptoError, KeyPair};
    use ferrocoin_testing::{mined_chain, signed_transfer, test_keypair};

    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    struct WalletAuthority {
        pair: KeyPair,
    }

    impl SigningAuthority for WalletAuthority {
        fn public_key(&self) -> &str {
            &self.pair.public_key
        }

        fn sign(&self, message: &[u8]) -> Result<String, CryptoError> {
            sign(&self.pair.private_key, message)
        }
    }

    fn miner_for(pair: &KeyPair) -> Miner {
        let authority = Arc::new(WalletAuthority { pair: pair.clone() });
        Miner::new(ConsensusParameters::with_difficulty(1), authority)
    }

    #[test]
    fn one_mining_pass_extends_the_chain_by_a_coinbase_block() {
        let wallet = test_keypair(0);
        let miner = miner_for(wallet);
        let mut chain = Blockchain::new(ConsensusParameters::with_difficulty(1));

        let candidate = miner
            .establish_candidate(chain.latest_block(), Vec::new())
            .unwrap();
        let block = miner
            .find_block(candidate, &AtomicBool::new(false))
            .unwrap()
            .expect("uncancelled search completes");

        chain.append_block(block.clone()).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(block.transactions.len(), 1);

        let coinbase = block.coinbase().unwrap();
        assert_eq!(coinbase.amount, 50.0);
        assert_eq!(coinbase.recipient, wallet.public_key);
        assert_eq!(chain.confirmed_balance(&wallet.public_key), 50.0);
    }

    #[test]
    fn mined_block_drains_the_mempool_slice() {
        let wallet = test_keypair(0);
        let receiver = test_keypair(1);
        let miner = miner_for(wallet);
        let mut chain = mined_chain(ConsensusParameters::with_difficulty(1), 1, wallet);
        let mut pool = MemoryPool::new();

        let transfer = signed_transfer(wallet, &receiver.public_key, 30.0);
        pool.add_transaction(transfer.clone(), &chain).unwrap();

        let pending = pool.get_candidates(chain.parameters().max_transactions_per_block - 1);
        let candidate = miner.establish_candidate(chain.latest_block(), pending).unwrap();
        let block = miner
            .find_block(candidate, &AtomicBool::new(false))
            .unwrap()
            .expect("uncancelled search completes");

        chain.append_block(block.clone()).unwrap();
        pool.remove_transactions(
            block
                .transactions
                .iter()
                .filter(|tx| !tx.is_coinbase)
                .map(|tx| tx.id.as_str()),
        );

        assert_eq!(block.transactions.len(), 2);
        assert!(block.transactions[0].is_coinbase);
        assert_eq!(block.transactions[1].id, transfer.id);
        assert!(pool.is_empty());

        assert_eq!(chain.confirmed_balance(&wallet.public_key), 50.0 + 50.0 - 30.0);
        assert_eq!(chain.confirmed_balance(&receiver.public_key), 30.0);
    }

    #[test]
    fn preempted_search_leaves_the_chain_untouched() {
        let wallet = test_keypair(0);
        let miner = miner_for(wallet);
        let chain = Blockchain::new(ConsensusParameters::with_difficulty(1));

        let candidate = miner
            .establish_candidate(chain.latest_block(), Vec::new())
            .unwrap();

        let terminator = AtomicBool::new(false);
        terminator.store(true, Ordering::SeqCst);

        assert!(miner.find_block(candidate, &terminator).unwrap().is_none());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn stale_candidate_is_rejected_after_a_peer_block_lands() {
        let wallet = test_keypair(0);
        let miner = miner_for(wallet);
        let mut chain = Blockchain::new(ConsensusParameters::with_difficulty(1));

        // Candidate built against the genesis tip.
        let stale = miner
            .establish_candidate(chain.latest_block(), Vec::new())
            .unwrap();

        // A competing block arrives and is appended first.
        let competing = miner
            .establish_candidate(chain.latest_block(), Vec::new())
            .unwrap();
        let competing = miner
            .find_block(competing, &AtomicBool::new(false))
            .unwrap()
            .unwrap();
        chain.append_block(competing).unwrap();

        // Finishing the stale search now fails new-head validation.
        let stale = miner.find_block(stale, &AtomicBool::new(false)).unwrap().unwrap();
        assert!(chain.append_block(stale).is_err());
        assert_eq!(chain.len(), 2);
    }
}
