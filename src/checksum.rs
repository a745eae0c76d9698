// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Running checksums for the zlib and gzip containers.
//!
//! CRC-32 (reflected polynomial 0xEDB88320, as required by RFC 1952) is
//! delegated to crc32fast. Adler-32 (RFC 1950) is implemented here with the
//! usual deferred-modulo scheme. Both accumulators are incremental and
//! independent of block boundaries; the compressor feeds them as it consumes
//! input and finalizes them once into the container trailer.

use crc32fast::Hasher;

/// Largest run of bytes for which the Adler-32 sums cannot overflow a u32.
const ADLER_NMAX: usize = 5552;

/// Modulus for both Adler-32 sums
const ADLER_MOD: u32 = 65521;

/// Incremental CRC-32 accumulator (gzip trailer)
pub struct Crc32 {
    hasher: Hasher,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Incremental Adler-32 accumulator (zlib trailer)
pub struct Adler32 {
    s1: u32,
    s2: u32,
}

impl Adler32 {
    pub fn new() -> Self {
        Self { s1: 1, s2: 0 }
    }

    pub fn update(&mut self, data: &[u8]) {
        for chunk in data.chunks(ADLER_NMAX) {
            for &byte in chunk {
                self.s1 += byte as u32;
                self.s2 += self.s1;
            }
            self.s1 %= ADLER_MOD;
            self.s2 %= ADLER_MOD;
        }
    }

    pub fn finalize(self) -> u32 {
        (self.s2 << 16) | self.s1
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}
