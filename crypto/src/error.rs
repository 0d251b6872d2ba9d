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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("{}: {}", _0, _1)]
    Crate(&'static str, String),

    #[error("invalid hex encoding: {}", _0)]
    InvalidHex(String),

    #[error("invalid private key: {}", _0)]
    InvalidPrivateKey(String),

    #[error("invalid public key: {}", _0)]
    InvalidPublicKey(String),

    #[error("invalid signature encoding")]
    InvalidSignature,

    #[error("{}", _0)]
    Message(String),
}

impl From<rsa::Error> for CryptoError {
    fn from(error: rsa::Error) -> Self {
        CryptoError::Crate("rsa", format!("{error:?}"))
    }
}

impl From<rsa::pkcs8::Error> for CryptoError {
    fn from(error: rsa::pkcs8::Error) -> Self {
        CryptoError::InvalidPrivateKey(error.to_string())
    }
}

impl From<rsa::pkcs8::spki::Error> for CryptoError {
    fn from(error: rsa::pkcs8::spki::Error) -> Self {
        CryptoError::InvalidPublicKey(error.to_string())
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(error: hex::FromHexError) -> Self {
        CryptoError::InvalidHex(error.to_string())
    }
}

impl From<rsa::signature::Error> for CryptoError {
    fn from(error: rsa::signature::Error) -> Self {
        CryptoError::Crate("signature", format!("{error:?}"))
    }
}
