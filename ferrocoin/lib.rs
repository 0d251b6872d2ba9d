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

#![forbid(unsafe_code)]

pub mod cli;

pub use ferrocoin_consensus as consensus;
pub use ferrocoin_crypto as crypto;
pub use ferrocoin_network as network;
pub use ferrocoin_objects as objects;
pub use ferrocoin_wallet as wallet;
