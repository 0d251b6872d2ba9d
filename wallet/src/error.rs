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
use ferrocoin_network::NetworkError;
use ferrocoin_objects::ObjectError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("amount {} is below the minimum transferable amount", _0)]
    AmountTooSmall(f64),

    #[error("cannot connect to node {}: {}", _0, _1)]
    ConnectFailed(String, String),

    #[error("identity store at {} is corrupt: {}", _0, _1)]
    CorruptStore(String, String),

    #[error("{}", _0)]
    CryptoError(CryptoError),

    #[error("cannot decrypt identity store (wrong password or corrupt file)")]
    DecryptionFailed,

    #[error("identity store at {} holds no identities", _0)]
    EmptyStore(String),

    #[error("{}", _0)]
    Io(std::io::Error),

    #[error("{}", _0)]
    Message(String),

    #[error("{}", _0)]
    NetworkError(NetworkError),

    #[error("{}", _0)]
    ObjectError(ObjectError),

    #[error("node closed the connection")]
    PeerDisconnected,

    #[error("timed out waiting for {}", _0)]
    ResponseTimeout(&'static str),

    #[error("password must be at least {} characters", _0)]
    WeakPassword(usize),
}

impl From<CryptoError> for WalletError {
    fn from(error: CryptoError) -> Self {
        WalletError::CryptoError(error)
    }
}

impl From<NetworkError> for WalletError {
    fn from(error: NetworkError) -> Self {
        WalletError::NetworkError(error)
    }
}

impl From<ObjectError> for WalletError {
    fn from(error: ObjectError) -> Self {
        WalletError::ObjectError(error)
    }
}

impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        WalletError::Io(error)
    }
}
