// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Hash-chain LZ77 match finder.
//!
//! Positions are indexed by a 3-byte hash; chains run newest-first through
//! `prev`, so the first match of a given length is also the nearest one.
//! Search effort (chain depth, early-exit length, lazy evaluation) comes
//! from the per-level parameter table in the compressor.

use crate::constants::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NO_POS: u32 = u32::MAX;

/// A literal byte or a back-reference into the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { length: u16, dist: u16 },
}

/// Search parameters for one compression level
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Maximum hash-chain entries examined per position
    pub max_chain: u32,
    /// Stop searching once a match of at least this length is found
    pub nice_len: usize,
    /// Defer a match by one position if the next position matches longer
    pub lazy: bool,
}

/// Hash-chain index over the input, reusable across compression calls.
#[derive(Debug)]
pub struct MatchFinder {
    head: Vec<u32>,
    prev: Vec<u32>,
}

impl MatchFinder {
    pub fn new() -> Self {
        Self {
            head: vec![NO_POS; HASH_SIZE],
            prev: vec![NO_POS; WINDOW_SIZE],
        }
    }

    /// Forget all indexed positions. Must be called before reusing the
    /// finder on a new input buffer.
    pub fn reset(&mut self) {
        self.head.fill(NO_POS);
        self.prev.fill(NO_POS);
    }

    #[inline]
    fn hash(src: &[u8], pos: usize) -> usize {
        let v = u32::from(src[pos])
            | u32::from(src[pos + 1]) << 8
            | u32::from(src[pos + 2]) << 16;
        (v.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    /// Add `pos` to the chain for its 3-byte prefix.
    #[inline]
    pub fn insert(&mut self, src: &[u8], pos: usize) {
        if pos + MIN_MATCH > src.len() {
            return;
        }
        let h = Self::hash(src, pos);
        self.prev[pos % WINDOW_SIZE] = self.head[h];
        self.head[h] = pos as u32;
    }

    /// Longest previous occurrence of the bytes starting at `pos`.
    ///
    /// Returns `(length, distance)` with `length >= MIN_MATCH`, preferring
    /// longer matches and, among equals, smaller distances. Positions must
    /// have been inserted for everything before `pos`.
    pub fn best_match(&self, src: &[u8], pos: usize, params: &SearchParams) -> Option<(u16, u16)> {
        if pos + MIN_MATCH > src.len() {
            return None;
        }
        let max_len = MAX_MATCH.min(src.len() - pos);
        let h = Self::hash(src, pos);

        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0usize;
        let mut link = self.head[h];
        let mut tries = params.max_chain;

        while link != NO_POS && tries > 0 {
            let cand = link as usize;
            if cand >= pos {
                break;
            }
            let dist = pos - cand;
            if dist > WINDOW_SIZE {
                break;
            }

            // Cheap rejection: a longer match must extend past the current
            // best, so compare that byte first.
            if src[cand + best_len] == src[pos + best_len] {
                let len = match_length(src, cand, pos, max_len);
                if len > best_len {
                    best_len = len;
                    best_dist = dist;
                    if len >= params.nice_len || len == max_len {
                        break;
                    }
                }
            }

            // prev slots are reused modulo the window; a non-decreasing link
            // means the chain has wrapped into newer data.
            let next = self.prev[cand % WINDOW_SIZE];
            if next != NO_POS && next as usize >= cand {
                break;
            }
            link = next;
            tries -= 1;
        }

        if best_len >= MIN_MATCH {
            Some((best_len as u16, best_dist as u16))
        } else {
            None
        }
    }
}

impl Default for MatchFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the common prefix of `src[a..]` and `src[b..]`, capped at `max`.
///
/// `a + max` may run past `b`; overlapping comparisons are what make
/// distance-1 run matches work.
#[inline]
fn match_length(src: &[u8], a: usize, b: usize, max: usize) -> usize {
    let mut len = 0;
    while len < max && src[a + len] == src[b + len] {
        len += 1;
    }
    len
}
