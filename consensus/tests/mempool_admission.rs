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

mod mempool_admission {
    use ferrocoin_consensus::{ConsensusError, ConsensusParameters, MemoryPool};
    use ferrocoin_objects::Transaction;
    use ferrocoin_testing::{mined_chain, signed_transfer, test_keypair};

    fn params() -> ConsensusParameters {
        ConsensusParameters::with_difficulty(1)
    }

    #[test]
    fn admission_is_idempotent() {
        let sender = test_keypair(0);
        let chain = mined_chain(params(), 1, sender);
        let mut pool = MemoryPool::new();

        let tx = signed_transfer(sender, &test_keypair(1).public_key, 10.0);

        pool.add_transaction(tx.clone(), &chain).unwrap();
        assert!(matches!(
            pool.add_transaction(tx, &chain),
            Err(ConsensusError::DuplicateTransaction(_))
        ));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn pending_debits_cannot_exceed_confirmed_balance() {
        let sender = test_keypair(0);
        let chain = mined_chain(params(), 1, sender);
        let mut pool = MemoryPool::new();

        // 50 confirmed: 30 + 15 fit, a further 10 does not.
        pool.add_transaction(signed_transfer(sender, &test_keypair(1).public_key, 30.0), &chain)
            .unwrap();
        pool.add_transaction(signed_transfer(sender, &test_keypair(1).public_key, 15.0), &chain)
            .unwrap();

        let result = pool.add_transaction(signed_transfer(sender, &test_keypair(1).public_key, 10.0), &chain);
        assert!(matches!(result, Err(ConsensusError::InsufficientBalance(..))));

        assert_eq!(pool.pending_debits(&sender.public_key), 45.0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn pending_credits_do_not_fund_spends() {
        let funded = test_keypair(0);
        let broke = test_keypair(1);
        let chain = mined_chain(params(), 1, funded);
        let mut pool = MemoryPool::new();

        // An inbound pending transfer does not raise the recipient's cover:
        // only confirmed balance counts.
        pool.add_transaction(signed_transfer(funded, &broke.public_key, 40.0), &chain)
            .unwrap();

        let result = pool.add_transaction(signed_transfer(broke, &funded.public_key, 5.0), &chain);
        assert!(matches!(result, Err(ConsensusError::InvalidTransaction(..))));
    }

    #[test]
    fn signature_from_the_wrong_key_is_rejected() {
        let owner = test_keypair(0);
        let intruder = test_keypair(1);
        let chain = mined_chain(params(), 1, owner);
        let mut pool = MemoryPool::new();

        // A transfer out of the owner's funds, signed by someone else.
        let mut forged = Transaction::new(owner.public_key.clone(), intruder.public_key.clone(), 10.0);
        forged.sign_with(&intruder.private_key).unwrap();

        let result = pool.add_transaction(forged, &chain);
        assert!(matches!(result, Err(ConsensusError::InvalidTransaction(..))));
        assert!(pool.is_empty());
    }

    #[test]
    fn pool_rejects_when_full() {
        let sender = test_keypair(0);
        let chain = mined_chain(params(), 1, sender);
        let mut pool = MemoryPool::with_capacity(2);

        pool.add_transaction(signed_transfer(sender, &test_keypair(1).public_key, 1.0), &chain)
            .unwrap();
        pool.add_transaction(signed_transfer(sender, &test_keypair(1).public_key, 1.0), &chain)
            .unwrap();

        let result = pool.add_transaction(signed_transfer(sender, &test_keypair(1).public_key, 1.0), &chain);
        assert!(matches!(result, Err(ConsensusError::MempoolFull(2))));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn included_transactions_are_evicted() {
        let sender = test_keypair(0);
        let mut chain = mined_chain(params(), 1, sender);
        let mut pool = MemoryPool::new();

        let tx = signed_transfer(sender, &test_keypair(1).public_key, 10.0);
        pool.add_transaction(tx.clone(), &chain).unwrap();

        let reward = chain.parameters().block_reward(2);
        let coinbase = ferrocoin_testing::signed_coinbase(sender, reward);
        let block = chain
            .create_block(vec![coinbase, tx], sender.public_key.clone(), reward)
            .unwrap();

        let included: Vec<&str> = block
            .transactions
            .iter()
            .filter(|tx| !tx.is_coinbase)
            .map(|tx| tx.id.as_str())
            .collect();
        pool.remove_transactions(included);

        assert!(pool.is_empty());
    }
}
