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
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("{}", _0)]
    CryptoError(CryptoError),

    #[error("cannot encode canonical form: {}", _0)]
    Encoding(serde_json::Error),
}

impl From<CryptoError> for ObjectError {
    fn from(error: CryptoError) -> Self {
        ObjectError::CryptoError(error)
    }
}

impl From<serde_json::Error> for ObjectError {
    fn from(error: serde_json::Error) -> Self {
        ObjectError::Encoding(error)
    }
}
