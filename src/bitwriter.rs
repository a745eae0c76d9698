// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Bounded bit writer for DEFLATE streams.
//!
//! Bits are packed least-significant-bit first within each byte, as required
//! by RFC 1951. The writer borrows the caller's output buffer and fails with
//! [`Error::BufferTooSmall`] instead of growing it; that error is the single
//! capacity signal that propagates up to the compression facade.

use crate::error::{Error, Result};

/// Writes variable-length bit codes into a fixed-capacity byte slice.
pub struct BitWriter<'a> {
    out: &'a mut [u8],
    pos: usize,
    bitbuf: u64,
    bitcount: u32,
}

impl<'a> BitWriter<'a> {
    pub fn new(out: &'a mut [u8]) -> Self {
        Self {
            out,
            pos: 0,
            bitbuf: 0,
            bitcount: 0,
        }
    }

    /// Append the low `count` bits of `bits`, LSB first.
    ///
    /// `count` must be at most 48 so the accumulator cannot overflow.
    pub fn write_bits(&mut self, bits: u32, count: u32) -> Result<()> {
        debug_assert!(count <= 48);
        debug_assert!(count == 32 || (bits as u64) < (1u64 << count));
        self.bitbuf |= (bits as u64) << self.bitcount;
        self.bitcount += count;
        while self.bitcount >= 8 {
            if self.pos == self.out.len() {
                return Err(Error::BufferTooSmall);
            }
            self.out[self.pos] = self.bitbuf as u8;
            self.pos += 1;
            self.bitbuf >>= 8;
            self.bitcount -= 8;
        }
        Ok(())
    }

    /// Pad with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bitcount > 0 {
            let pad = 8 - self.bitcount;
            self.write_bits(0, pad)?;
        }
        debug_assert_eq!(self.bitcount, 0);
        Ok(())
    }

    /// Copy raw bytes into the stream. The writer must be byte-aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        debug_assert_eq!(self.bitcount, 0);
        if self.pos + bytes.len() > self.out.len() {
            return Err(Error::BufferTooSmall);
        }
        self.out[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Total bits written so far, including bits still in the accumulator.
    pub fn bits_written(&self) -> u64 {
        self.pos as u64 * 8 + self.bitcount as u64
    }

    /// Flush the trailing partial byte and return the total byte count.
    pub fn finish(mut self) -> Result<usize> {
        self.align_to_byte()?;
        Ok(self.pos)
    }
}
