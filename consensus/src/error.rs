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

use ferrocoin_crypto::CryptoError;
use ferrocoin_objects::ObjectError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("received chain of length {} does not exceed local length {}", _0, _1)]
    ChainNotLonger(usize, usize),

    #[error("coinbase transactions are not accepted into the mempool")]
    CoinbaseNotAllowed,

    #[error("{}", _0)]
    CryptoError(CryptoError),

    #[error("transaction {} is already pending", _0)]
    DuplicateTransaction(String),

    #[error("sender {} cannot cover {}: confirmed {}, already pending {}", _0, _1, _2, _3)]
    InsufficientBalance(String, f64, f64, f64),

    #[error("invalid block at height {}: {}", _0, _1)]
    InvalidBlock(u64, String),

    #[error("invalid chain at height {}: {}", _0, _1)]
    InvalidChain(u64, String),

    #[error("invalid transaction {}: {}", _0, _1)]
    InvalidTransaction(String, String),

    #[error("mempool is full ({} transactions)", _0)]
    MempoolFull(usize),

    #[error("{}", _0)]
    Message(String),

    #[error("{}", _0)]
    ObjectError(ObjectError),

    #[error("transaction {} expired before admission", _0)]
    TransactionExpired(String),
}

impl From<CryptoError> for ConsensusError {
    fn from(error: CryptoError) -> Self {
        ConsensusError::CryptoError(error)
    }
}

impl From<ObjectError> for ConsensusError {
    fn from(error: ObjectError) -> Self {
        ConsensusError::ObjectError(error)
    }
}
