// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! # miniflate
//!
//! Single-shot DEFLATE compression (RFC 1951) with optional zlib (RFC 1950)
//! and gzip (RFC 1952) framing. The whole input is presented at once and the
//! compressed stream lands in a caller-owned buffer whose worst-case size
//! comes from [`compress_bound`]; the compressor never writes past it.
//!
//! miniflate provides:
//! - Compression levels 0 (stored) through 12 (deepest search)
//! - Hash-chain LZ77 matching with lazy evaluation at higher levels
//! - Per-block choice of stored, fixed-Huffman or dynamic-Huffman coding
//! - Bit-exact CRC-32 / Adler-32 container checksums
//!
//! Decompression and streaming are out of scope; any standards-conformant
//! inflater reads the output.
//!
//! ## Example
//!
//! ```rust
//! use miniflate::{compress_bound, Compressor, Format};
//!
//! let data = b"Hello, World! Hello, World! Hello, World!";
//! let mut compressor = Compressor::new(6).expect("valid level");
//!
//! let mut buf = vec![0u8; compress_bound(Format::Gzip, data.len()).unwrap()];
//! let n = compressor.compress_into(data, &mut buf, Format::Gzip).unwrap();
//! assert!(n <= buf.len());
//! assert_eq!(&buf[..2], &[0x1f, 0x8b]);
//! ```

mod bitwriter;
mod block;
mod checksum;
mod compress;
mod constants;
mod error;
mod frame;
mod huffman;
mod matchfinder;

pub use compress::Compressor;
pub use error::{Error, Result};
pub use frame::{compress_bound, Format};

#[cfg(test)]
mod tests;
