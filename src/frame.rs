// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Container formats around the DEFLATE block stream.
//!
//! The framer only deals in fixed header and trailer bytes; checksums come
//! from [`crate::checksum`] and the block stream from [`crate::block`].

use crate::constants::MAX_MATCH;
use crate::error::{Error, Result};

/// Container format for one compression call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Raw DEFLATE block stream (RFC 1951)
    Raw,
    /// zlib wrapper with Adler-32 trailer (RFC 1950)
    Zlib,
    /// gzip wrapper with CRC-32 and length trailer (RFC 1952)
    Gzip,
}

impl Format {
    pub fn header_len(self) -> usize {
        match self {
            Format::Raw => 0,
            Format::Zlib => 2,
            Format::Gzip => 10,
        }
    }

    pub fn trailer_len(self) -> usize {
        match self {
            Format::Raw => 0,
            Format::Zlib => 4,
            Format::Gzip => 8,
        }
    }
}

/// Lowest input size a non-final block is guaranteed to cover.
///
/// Blocks are cut at 65535 input bytes and a single token spans at most
/// [`MAX_MATCH`] bytes, so this understates the real minimum (65277) with
/// room to spare; `compress_bound` only needs a lower bound on block size.
const MIN_NONFINAL_BLOCK: usize = 60_000;

/// Worst-case compressed size for `input_len` bytes in `format`.
///
/// The estimate assumes every block degrades to a stored chunk: at most 6
/// bytes of framing per block (bit header and alignment, LEN/NLEN) around
/// the raw payload, plus container header and trailer. It is monotonic in
/// `input_len`, and `compress_into` with a buffer of this size cannot fail.
pub fn compress_bound(format: Format, input_len: usize) -> Result<usize> {
    if input_len as u64 > u32::MAX as u64 {
        return Err(Error::TooLarge);
    }
    let max_blocks = input_len / MIN_NONFINAL_BLOCK + 1;
    let raw = input_len + 6 * max_blocks + 4;
    Ok(raw + format.header_len() + format.trailer_len())
}

/// Fixed 10-byte gzip header: magic, method 8 (deflate), no flags, zero
/// mtime, XFL from the level, OS byte 255 (unknown).
pub fn gzip_header(level: u32) -> [u8; 10] {
    let xfl = match level {
        0..=2 => 4, // fastest
        8..=12 => 2, // maximum compression
        _ => 0,
    };
    [0x1f, 0x8b, 8, 0, 0, 0, 0, 0, xfl, 255]
}

/// Two-byte zlib header: CMF 0x78 (deflate, 32K window) and FLG with the
/// level hint, check bits chosen so the 16-bit value is a multiple of 31.
pub fn zlib_header(level: u32) -> [u8; 2] {
    let cmf: u8 = 0x78;
    let flevel: u8 = match level {
        0..=1 => 0,
        2..=5 => 1,
        6..=7 => 2,
        _ => 3,
    };
    let mut flg = flevel << 6;
    let fcheck = 31 - ((u16::from(cmf) << 8 | u16::from(flg)) % 31);
    if fcheck != 31 {
        flg |= fcheck as u8;
    }
    [cmf, flg]
}

// Compile-time tie between the bound math and the match length cap.
const _: () = assert!(MIN_NONFINAL_BLOCK <= 65535 - MAX_MATCH);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_monotonic() {
        let mut prev = 0;
        for len in (0..2_000_000).step_by(61) {
            let bound = compress_bound(Format::Gzip, len).unwrap();
            assert!(bound >= prev, "bound not monotonic at {}", len);
            assert!(bound > len);
            prev = bound;
        }
    }

    #[test]
    fn test_bound_format_overhead() {
        let raw = compress_bound(Format::Raw, 1000).unwrap();
        assert_eq!(compress_bound(Format::Zlib, 1000).unwrap(), raw + 6);
        assert_eq!(compress_bound(Format::Gzip, 1000).unwrap(), raw + 18);
    }

    #[test]
    fn test_bound_rejects_oversized_input() {
        if usize::BITS > 32 {
            let too_big = u32::MAX as usize + 1;
            assert_eq!(compress_bound(Format::Raw, too_big), Err(Error::TooLarge));
        }
        assert!(compress_bound(Format::Raw, u32::MAX as usize).is_ok());
    }

    #[test]
    fn test_gzip_header_fields() {
        let header = gzip_header(6);
        assert_eq!(&header[..4], &[0x1f, 0x8b, 8, 0]);
        assert_eq!(&header[4..8], &[0, 0, 0, 0]);
        assert_eq!(header[9], 255);
        assert_eq!(gzip_header(1)[8], 4);
        assert_eq!(gzip_header(12)[8], 2);
    }

    #[test]
    fn test_zlib_header_check_bits() {
        for level in 0..=12 {
            let header = zlib_header(level);
            assert_eq!(header[0], 0x78);
            let value = u16::from(header[0]) << 8 | u16::from(header[1]);
            assert_eq!(value % 31, 0, "level {}", level);
        }
        // Default level matches the common 0x78 0x9c pair.
        assert_eq!(zlib_header(6), [0x78, 0x9c]);
    }
}
