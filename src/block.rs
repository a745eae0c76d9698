// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! DEFLATE block encoding.
//!
//! Each block independently picks the cheapest of the three RFC 1951 block
//! types. Fixed and dynamic costs are computed exactly from the code
//! tables; the stored cost is an upper bound (worst-case alignment), so the
//! chosen encoding never exceeds what a stored block would have cost. That
//! inequality is what makes the facade's `compress_bound` a hard guarantee.
//!
//! A block covers at most [`MAX_BLOCK_INPUT`] input bytes, so a stored
//! fallback always fits a single 5-byte-header chunk.

use crate::bitwriter::BitWriter;
use crate::constants::*;
use crate::error::Result;
use crate::huffman;
use crate::matchfinder::Token;

/// Bit cost of a stored rendition: 3-bit header, worst-case 7 bits of
/// alignment padding, LEN/NLEN, then the raw bytes.
fn stored_cost_bits(len: usize) -> u64 {
    3 + 7 + 32 + 8 * len as u64
}

/// Per-block encoder state, reused across blocks and calls.
#[derive(Debug)]
pub struct BlockEncoder {
    litlen_freqs: [u32; NUM_LITLEN_SYMS],
    dist_freqs: [u32; NUM_DIST_SYMS],

    litlen_lens: [u8; NUM_LITLEN_SYMS],
    litlen_codes: [u16; NUM_LITLEN_SYMS],
    dist_lens: [u8; NUM_DIST_SYMS],
    dist_codes: [u16; NUM_DIST_SYMS],

    fixed_litlen_lens: [u8; 288],
    fixed_litlen_codes: [u16; 288],
    fixed_dist_lens: [u8; NUM_DIST_SYMS],
    fixed_dist_codes: [u16; NUM_DIST_SYMS],
}

/// Planned dynamic header: RLE-coded lengths plus the precode.
struct DynamicHeader {
    hlit: usize,
    hdist: usize,
    hclen: usize,
    rle: Vec<(u8, u8, u8)>, // (symbol, extra value, extra bit count)
    precode_lens: [u8; NUM_PRECODE_SYMS],
    precode_codes: [u16; NUM_PRECODE_SYMS],
    bits: u64,
}

impl BlockEncoder {
    pub fn new() -> Self {
        let fixed_litlen_lens = huffman::fixed_litlen_lens();
        let mut fixed_litlen_codes = [0u16; 288];
        huffman::assign_codes(&fixed_litlen_lens, &mut fixed_litlen_codes);

        let fixed_dist_lens = huffman::fixed_dist_lens();
        let mut fixed_dist_codes = [0u16; NUM_DIST_SYMS];
        huffman::assign_codes(&fixed_dist_lens, &mut fixed_dist_codes);

        Self {
            litlen_freqs: [0; NUM_LITLEN_SYMS],
            dist_freqs: [0; NUM_DIST_SYMS],
            litlen_lens: [0; NUM_LITLEN_SYMS],
            litlen_codes: [0; NUM_LITLEN_SYMS],
            dist_lens: [0; NUM_DIST_SYMS],
            dist_codes: [0; NUM_DIST_SYMS],
            fixed_litlen_lens,
            fixed_litlen_codes,
            fixed_dist_lens,
            fixed_dist_codes,
        }
    }

    /// Encode one block of tokens covering `block_src`, choosing the
    /// cheapest block type.
    pub fn encode_block(
        &mut self,
        w: &mut BitWriter<'_>,
        tokens: &[Token],
        block_src: &[u8],
        is_final: bool,
    ) -> Result<()> {
        debug_assert!(block_src.len() <= MAX_BLOCK_INPUT);

        self.tally(tokens);
        huffman::build_code(
            &self.litlen_freqs,
            MAX_CODE_LEN,
            &mut self.litlen_lens,
            &mut self.litlen_codes,
        );
        huffman::build_code(
            &self.dist_freqs,
            MAX_CODE_LEN,
            &mut self.dist_lens,
            &mut self.dist_codes,
        );

        let header = self.plan_dynamic_header();
        let fixed_cost =
            3 + self.body_cost(tokens, &self.fixed_litlen_lens, &self.fixed_dist_lens);
        let dynamic_cost = 3 + header.bits + self.body_cost(tokens, &self.litlen_lens, &self.dist_lens);
        let stored_cost = stored_cost_bits(block_src.len());

        if stored_cost <= fixed_cost && stored_cost <= dynamic_cost {
            write_stored(w, block_src, is_final)
        } else if fixed_cost <= dynamic_cost {
            debug_assert!(fixed_cost <= stored_cost);
            w.write_bits(is_final as u32, 1)?;
            w.write_bits(BLOCK_FIXED, 2)?;
            self.write_body(w, tokens, true)
        } else {
            debug_assert!(dynamic_cost <= stored_cost);
            w.write_bits(is_final as u32, 1)?;
            w.write_bits(BLOCK_DYNAMIC, 2)?;
            self.write_dynamic_header(w, &header)?;
            self.write_body(w, tokens, false)
        }
    }

    fn tally(&mut self, tokens: &[Token]) {
        self.litlen_freqs.fill(0);
        self.dist_freqs.fill(0);
        for token in tokens {
            match *token {
                Token::Literal(byte) => self.litlen_freqs[byte as usize] += 1,
                Token::Match { length, dist } => {
                    let (len_sym, _, _) = length_symbol(length);
                    let (dist_sym, _, _) = dist_symbol(dist);
                    self.litlen_freqs[len_sym as usize] += 1;
                    self.dist_freqs[dist_sym as usize] += 1;
                }
            }
        }
        self.litlen_freqs[END_OF_BLOCK] += 1;
        // A block with no matches still needs a well-formed distance code.
        if self.dist_freqs.iter().all(|&f| f == 0) {
            self.dist_freqs[0] = 1;
        }
    }

    /// Exact bit cost of the token body (including end-of-block) under the
    /// given code lengths.
    fn body_cost(&self, tokens: &[Token], litlen_lens: &[u8], dist_lens: &[u8]) -> u64 {
        let mut bits = 0u64;
        for token in tokens {
            match *token {
                Token::Literal(byte) => bits += litlen_lens[byte as usize] as u64,
                Token::Match { length, dist } => {
                    let (len_sym, len_extra, _) = length_symbol(length);
                    let (dist_sym, dist_extra, _) = dist_symbol(dist);
                    bits += litlen_lens[len_sym as usize] as u64 + len_extra as u64;
                    bits += dist_lens[dist_sym as usize] as u64 + dist_extra as u64;
                }
            }
        }
        bits + litlen_lens[END_OF_BLOCK] as u64
    }

    fn write_body(&self, w: &mut BitWriter<'_>, tokens: &[Token], fixed: bool) -> Result<()> {
        let (litlen_lens, litlen_codes): (&[u8], &[u16]) = if fixed {
            (&self.fixed_litlen_lens, &self.fixed_litlen_codes)
        } else {
            (&self.litlen_lens, &self.litlen_codes)
        };
        let (dist_lens, dist_codes): (&[u8], &[u16]) = if fixed {
            (&self.fixed_dist_lens, &self.fixed_dist_codes)
        } else {
            (&self.dist_lens, &self.dist_codes)
        };

        for token in tokens {
            match *token {
                Token::Literal(byte) => {
                    let sym = byte as usize;
                    w.write_bits(litlen_codes[sym] as u32, litlen_lens[sym] as u32)?;
                }
                Token::Match { length, dist } => {
                    let (len_sym, len_extra, len_value) = length_symbol(length);
                    let sym = len_sym as usize;
                    w.write_bits(litlen_codes[sym] as u32, litlen_lens[sym] as u32)?;
                    if len_extra > 0 {
                        w.write_bits(len_value as u32, len_extra as u32)?;
                    }

                    let (dist_sym, dist_extra, dist_value) = dist_symbol(dist);
                    let sym = dist_sym as usize;
                    w.write_bits(dist_codes[sym] as u32, dist_lens[sym] as u32)?;
                    if dist_extra > 0 {
                        w.write_bits(dist_value as u32, dist_extra as u32)?;
                    }
                }
            }
        }
        w.write_bits(
            litlen_codes[END_OF_BLOCK] as u32,
            litlen_lens[END_OF_BLOCK] as u32,
        )
    }

    /// Plan the dynamic header: trim the length arrays, run-length encode
    /// them, and build the precode over the RLE symbols.
    fn plan_dynamic_header(&self) -> DynamicHeader {
        let hlit = last_nonzero(&self.litlen_lens).max(257);
        let hdist = last_nonzero(&self.dist_lens).max(1);

        let mut all_lens = Vec::with_capacity(hlit + hdist);
        all_lens.extend_from_slice(&self.litlen_lens[..hlit]);
        all_lens.extend_from_slice(&self.dist_lens[..hdist]);

        let mut precode_freqs = [0u32; NUM_PRECODE_SYMS];
        let rle = rle_code_lengths(&all_lens, &mut precode_freqs);

        let mut precode_lens = [0u8; NUM_PRECODE_SYMS];
        let mut precode_codes = [0u16; NUM_PRECODE_SYMS];
        huffman::build_code(
            &precode_freqs,
            MAX_PRECODE_LEN,
            &mut precode_lens,
            &mut precode_codes,
        );

        let mut hclen = 4;
        for (i, &sym) in PRECODE_ORDER.iter().enumerate() {
            if precode_lens[sym] != 0 {
                hclen = i + 1;
            }
        }

        let mut bits = 5 + 5 + 4 + 3 * hclen as u64;
        for &(sym, _, extra_bits) in &rle {
            bits += precode_lens[sym as usize] as u64 + extra_bits as u64;
        }

        DynamicHeader {
            hlit,
            hdist,
            hclen,
            rle,
            precode_lens,
            precode_codes,
            bits,
        }
    }

    fn write_dynamic_header(&self, w: &mut BitWriter<'_>, header: &DynamicHeader) -> Result<()> {
        w.write_bits((header.hlit - 257) as u32, 5)?;
        w.write_bits((header.hdist - 1) as u32, 5)?;
        w.write_bits((header.hclen - 4) as u32, 4)?;
        for &sym in PRECODE_ORDER.iter().take(header.hclen) {
            w.write_bits(header.precode_lens[sym] as u32, 3)?;
        }
        for &(sym, extra_value, extra_bits) in &header.rle {
            let sym = sym as usize;
            w.write_bits(
                header.precode_codes[sym] as u32,
                header.precode_lens[sym] as u32,
            )?;
            if extra_bits > 0 {
                w.write_bits(extra_value as u32, extra_bits as u32)?;
            }
        }
        Ok(())
    }
}

impl Default for BlockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit one stored block. `data` must fit a single stored chunk.
pub fn write_stored(w: &mut BitWriter<'_>, data: &[u8], is_final: bool) -> Result<()> {
    debug_assert!(data.len() <= MAX_STORED_LEN);
    w.write_bits(is_final as u32, 1)?;
    w.write_bits(BLOCK_STORED, 2)?;
    w.align_to_byte()?;
    let len = data.len() as u16;
    w.write_bytes(&len.to_le_bytes())?;
    w.write_bytes(&(!len).to_le_bytes())?;
    w.write_bytes(data)
}

/// Emit an empty final block (fixed code, end-of-block only). Used for
/// zero-length inputs.
pub fn write_empty_final(w: &mut BitWriter<'_>) -> Result<()> {
    w.write_bits(1, 1)?;
    w.write_bits(BLOCK_FIXED, 2)?;
    // End-of-block is the 7-bit all-zero code in the fixed table.
    w.write_bits(0, 7)
}

/// Index one past the last nonzero length, at least 1.
fn last_nonzero(lens: &[u8]) -> usize {
    lens.iter().rposition(|&l| l != 0).map_or(1, |i| i + 1)
}

/// Run-length encode code lengths with symbols 16 (repeat previous),
/// 17 and 18 (zero runs), tallying precode frequencies as it goes.
fn rle_code_lengths(lens: &[u8], freqs: &mut [u32; NUM_PRECODE_SYMS]) -> Vec<(u8, u8, u8)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lens.len() {
        let value = lens[i];
        let mut run = 1;
        while i + run < lens.len() && lens[i + run] == value {
            run += 1;
        }
        i += run;

        if value == 0 {
            let mut rem = run;
            while rem > 0 {
                if rem >= 11 {
                    let take = rem.min(138);
                    out.push((18, (take - 11) as u8, 7));
                    freqs[18] += 1;
                    rem -= take;
                } else if rem >= 3 {
                    let take = rem.min(10);
                    out.push((17, (take - 3) as u8, 3));
                    freqs[17] += 1;
                    rem -= take;
                } else {
                    out.push((0, 0, 0));
                    freqs[0] += 1;
                    rem -= 1;
                }
            }
        } else {
            out.push((value, 0, 0));
            freqs[value as usize] += 1;
            let mut rem = run - 1;
            while rem >= 3 {
                let take = rem.min(6);
                out.push((16, (take - 3) as u8, 2));
                freqs[16] += 1;
                rem -= take;
            }
            while rem > 0 {
                out.push((value, 0, 0));
                freqs[value as usize] += 1;
                rem -= 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_rle(rle: &[(u8, u8, u8)]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(sym, extra, _) in rle {
            match sym {
                0..=15 => out.push(sym),
                16 => {
                    let prev = *out.last().expect("repeat with no previous code");
                    for _ in 0..extra + 3 {
                        out.push(prev);
                    }
                }
                17 => out.extend(std::iter::repeat(0).take(extra as usize + 3)),
                18 => out.extend(std::iter::repeat(0).take(extra as usize + 11)),
                _ => unreachable!(),
            }
        }
        out
    }

    #[test]
    fn test_rle_roundtrip() {
        let cases: Vec<Vec<u8>> = vec![
            vec![8; 10],
            vec![0; 138],
            vec![0; 150],
            vec![5, 5, 5, 5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 7],
            vec![1, 2, 3],
            vec![9, 9, 0, 0, 9, 9, 9, 9, 9, 9, 9, 9, 9],
        ];
        for lens in cases {
            let mut freqs = [0u32; NUM_PRECODE_SYMS];
            let rle = rle_code_lengths(&lens, &mut freqs);
            assert_eq!(expand_rle(&rle), lens, "rle mismatch for {:?}", lens);
            let total: u32 = freqs.iter().sum();
            assert_eq!(total as usize, rle.len());
        }
    }

    #[test]
    fn test_stored_block_layout() {
        let mut buf = [0u8; 16];
        let mut w = BitWriter::new(&mut buf);
        write_stored(&mut w, b"hello", true).unwrap();
        let n = w.finish().unwrap();
        assert_eq!(n, 10);
        // BFINAL=1, BTYPE=00, padded; LEN=5, NLEN=!5.
        assert_eq!(buf[0], 0x01);
        assert_eq!(&buf[1..5], &[0x05, 0x00, 0xfa, 0xff]);
        assert_eq!(&buf[5..10], b"hello");
    }

    #[test]
    fn test_empty_final_block_is_two_bytes() {
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        write_empty_final(&mut w).unwrap();
        let n = w.finish().unwrap();
        assert_eq!(n, 2);
        // BFINAL=1, BTYPE=01, then seven zero bits of the EOB code.
        assert_eq!(buf[0], 0x03);
        assert_eq!(buf[1], 0x00);
    }

    #[test]
    fn test_chosen_cost_never_exceeds_stored() {
        // Incompressible tokens: the encoder must fall back to stored.
        let src: Vec<u8> = (0..4096u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let tokens: Vec<Token> = src.iter().map(|&b| Token::Literal(b)).collect();

        let mut enc = BlockEncoder::new();
        let mut buf = vec![0u8; stored_cost_bits(src.len()) as usize / 8 + 1];
        let mut w = BitWriter::new(&mut buf);
        enc.encode_block(&mut w, &tokens, &src, true).unwrap();
        let n = w.finish().unwrap();
        assert!(n as u64 * 8 <= stored_cost_bits(src.len()));
    }
}
