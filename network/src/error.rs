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

use ferrocoin_consensus::ConsensusError;
use ferrocoin_objects::ObjectError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("cannot bind listener on {}: {}", _0, _1)]
    Bind(String, std::io::Error),

    #[error("{}", _0)]
    ConsensusError(ConsensusError),

    #[error("handshake with {} did not complete: {}", _0, _1)]
    HandshakeFailed(String, String),

    #[error("frame of {} bytes exceeds the {} byte limit", _0, _1)]
    FrameTooLarge(usize, usize),

    #[error("{}", _0)]
    Io(std::io::Error),

    #[error("malformed frame: {}", _0)]
    MalformedFrame(serde_json::Error),

    #[error("{}", _0)]
    Message(String),

    #[error("{}", _0)]
    ObjectError(ObjectError),

    #[error("peer {} is already connected", _0)]
    PeerAlreadyConnected(String),

    #[error("peer {} is not connected", _0)]
    PeerNotConnected(String),

    #[error("refusing to dial own listening address {}", _0)]
    SelfDial(String),
}

impl From<ConsensusError> for NetworkError {
    fn from(error: ConsensusError) -> Self {
        NetworkError::ConsensusError(error)
    }
}

impl From<ObjectError> for NetworkError {
    fn from(error: ObjectError) -> Self {
        NetworkError::ObjectError(error)
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(error: std::io::Error) -> Self {
        NetworkError::Io(error)
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(error: serde_json::Error) -> Self {
        NetworkError::MalformedFrame(error)
    }
}
