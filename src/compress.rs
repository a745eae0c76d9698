// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Compression facade.
//!
//! [`Compressor`] owns all reusable scratch state (hash chains, frequency
//! tables, the token buffer), so repeated calls on one handle allocate
//! nothing. One call runs synchronously to completion; the `&mut self`
//! receiver is what rules out two concurrent calls on the same handle.

use crate::block::{self, BlockEncoder};
use crate::bitwriter::BitWriter;
use crate::checksum::{Adler32, Crc32};
use crate::constants::{MAX_BLOCK_INPUT, MAX_STORED_LEN, MIN_MATCH};
use crate::error::{Error, Result};
use crate::frame::{compress_bound, gzip_header, zlib_header, Format};
use crate::matchfinder::{MatchFinder, SearchParams, Token};

/// Search effort per compression level. Level 0 stores without matching;
/// levels 1-3 are greedy, 4-12 add one-step lazy evaluation with deeper
/// chains.
const LEVEL_PARAMS: [SearchParams; 13] = [
    SearchParams { max_chain: 0, nice_len: 0, lazy: false },
    SearchParams { max_chain: 4, nice_len: 16, lazy: false },
    SearchParams { max_chain: 8, nice_len: 16, lazy: false },
    SearchParams { max_chain: 16, nice_len: 32, lazy: false },
    SearchParams { max_chain: 16, nice_len: 32, lazy: true },
    SearchParams { max_chain: 32, nice_len: 64, lazy: true },
    SearchParams { max_chain: 64, nice_len: 128, lazy: true },
    SearchParams { max_chain: 128, nice_len: 128, lazy: true },
    SearchParams { max_chain: 256, nice_len: 258, lazy: true },
    SearchParams { max_chain: 512, nice_len: 258, lazy: true },
    SearchParams { max_chain: 1024, nice_len: 258, lazy: true },
    SearchParams { max_chain: 2048, nice_len: 258, lazy: true },
    SearchParams { max_chain: 4096, nice_len: 258, lazy: true },
];

/// Feed checksums in bounded slices so accumulator behavior never depends
/// on seeing the whole input at once.
const CHECKSUM_CHUNK: usize = 64 * 1024;

/// A reusable single-shot compressor configured at one level.
#[derive(Debug)]
pub struct Compressor {
    level: u32,
    params: SearchParams,
    finder: MatchFinder,
    encoder: BlockEncoder,
    tokens: Vec<Token>,
}

impl Compressor {
    /// Create a compressor for `level` (0 = stored only, 12 = slowest).
    pub fn new(level: u32) -> Result<Self> {
        if level as usize >= LEVEL_PARAMS.len() {
            return Err(Error::InvalidLevel(level));
        }
        Ok(Self {
            level,
            params: LEVEL_PARAMS[level as usize],
            finder: MatchFinder::new(),
            encoder: BlockEncoder::new(),
            tokens: Vec::new(),
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Worst-case output size for this handle, see [`compress_bound`].
    pub fn compress_bound(&self, format: Format, input_len: usize) -> Result<usize> {
        compress_bound(format, input_len)
    }

    /// Compress `src` into `dst` and return the exact compressed size.
    ///
    /// Fails with [`Error::BufferTooSmall`] if `dst` cannot hold the
    /// stream; a buffer of [`compress_bound`] bytes always suffices.
    /// Output is deterministic for identical input and level.
    pub fn compress_into(&mut self, src: &[u8], dst: &mut [u8], format: Format) -> Result<usize> {
        if src.len() as u64 > u32::MAX as u64 {
            return Err(Error::TooLarge);
        }

        let mut w = BitWriter::new(dst);
        match format {
            Format::Raw => {}
            Format::Zlib => w.write_bytes(&zlib_header(self.level))?,
            Format::Gzip => w.write_bytes(&gzip_header(self.level))?,
        }

        self.deflate(src, &mut w)?;
        w.align_to_byte()?;

        match format {
            Format::Raw => {}
            Format::Zlib => {
                let mut adler = Adler32::new();
                for chunk in src.chunks(CHECKSUM_CHUNK) {
                    adler.update(chunk);
                }
                w.write_bytes(&adler.finalize().to_be_bytes())?;
            }
            Format::Gzip => {
                let mut crc = Crc32::new();
                for chunk in src.chunks(CHECKSUM_CHUNK) {
                    crc.update(chunk);
                }
                w.write_bytes(&crc.finalize().to_le_bytes())?;
                w.write_bytes(&(src.len() as u32).to_le_bytes())?;
            }
        }

        w.finish()
    }

    /// Compress `src` into a fresh buffer sized by [`compress_bound`].
    pub fn compress(&mut self, src: &[u8], format: Format) -> Result<Vec<u8>> {
        let bound = compress_bound(format, src.len())?;
        let mut out = vec![0u8; bound];
        let n = self.compress_into(src, &mut out, format)?;
        out.truncate(n);
        Ok(out)
    }

    /// Emit the DEFLATE block stream for `src`.
    fn deflate(&mut self, src: &[u8], w: &mut BitWriter<'_>) -> Result<()> {
        if src.is_empty() {
            return block::write_empty_final(w);
        }

        if self.level == 0 {
            let last = (src.len() - 1) / MAX_STORED_LEN;
            for (i, chunk) in src.chunks(MAX_STORED_LEN).enumerate() {
                block::write_stored(w, chunk, i == last)?;
            }
            return Ok(());
        }

        self.finder.reset();
        self.tokens.clear();
        let params = self.params;

        let mut block_start = 0usize;
        let mut pos = 0usize;
        while pos < src.len() {
            let found = self.finder.best_match(src, pos, &params);
            let (mut length, mut dist) = match found {
                Some(m) => m,
                None => (0, 0),
            };

            // Lazy evaluation: when the next position starts a strictly
            // longer match, emit this byte as a literal instead.
            let mut defer = false;
            if length != 0
                && params.lazy
                && (length as usize) < params.nice_len
                && pos + 1 + MIN_MATCH <= src.len()
            {
                if let Some((next_len, next_dist)) = self.finder.best_match(src, pos + 1, &params)
                {
                    if next_len > length {
                        defer = true;
                        length = next_len;
                        dist = next_dist;
                    }
                }
            }

            if length == 0 || defer {
                if pos + 1 - block_start > MAX_BLOCK_INPUT {
                    self.encoder
                        .encode_block(w, &self.tokens, &src[block_start..pos], false)?;
                    self.tokens.clear();
                    block_start = pos;
                }
                self.tokens.push(Token::Literal(src[pos]));
                self.finder.insert(src, pos);
                pos += 1;
                if length == 0 {
                    continue;
                }
            }

            let match_end = pos + length as usize;
            if match_end - block_start > MAX_BLOCK_INPUT {
                self.encoder
                    .encode_block(w, &self.tokens, &src[block_start..pos], false)?;
                self.tokens.clear();
                block_start = pos;
            }
            self.tokens.push(Token::Match { length, dist });
            for i in pos..match_end {
                self.finder.insert(src, i);
            }
            pos = match_end;
        }

        self.encoder
            .encode_block(w, &self.tokens, &src[block_start..], true)?;
        self.tokens.clear();
        Ok(())
    }
}
