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

use crate::{Frame, NetworkError};

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Upper bound on one frame. A `CHAIN_RESPONSE` carries the whole chain, so
/// the bound is generous; anything larger is treated as hostile.
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Length-prefixed JSON framing: a little-endian u32 byte count followed by
/// the UTF-8 JSON body of one [`Frame`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameCodec;

impl Encoder<Frame> for FrameCodec {
    type Error = NetworkError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = serde_json::to_vec(&frame)?;

        if body.len() > MAX_FRAME_SIZE {
            return Err(NetworkError::FrameTooLarge(body.len(), MAX_FRAME_SIZE));
        }

        // The cast cannot overflow due to the length check above.
        let len_slice = u32::to_le_bytes(body.len() as u32);

        dst.reserve(4 + body.len());
        dst.extend_from_slice(&len_slice);
        dst.extend_from_slice(&body);
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = NetworkError;

    fn decode(&mut self, source: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if source.len() < 4 {
            return Ok(None);
        }

        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&source[..4]);
        let length = u32::from_le_bytes(length_bytes) as usize;

        // Bounded before allocation so a hostile length cannot run the node
        // out of memory.
        if length > MAX_FRAME_SIZE {
            return Err(NetworkError::FrameTooLarge(length, MAX_FRAME_SIZE));
        }

        if source.len() < 4 + length {
            source.reserve(4 + length - source.len());
            return Ok(None);
        }

        let body = source[4..4 + length].to_vec();
        source.advance(4 + length);

        Ok(Some(serde_json::from_slice(&body)?))
    }
}
