// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Canonical, length-limited Huffman code construction.
//!
//! The builder turns a symbol frequency table into DEFLATE-ready code
//! lengths and bit-reversed codewords. Construction is array-based
//! throughout: leaves and internal nodes live in one flat arena indexed by
//! integer, parent links are indices, and depths fall out of a single
//! reverse sweep. Code lengths exceeding the limit (15 bits for the main
//! codes, 7 for the precode) are repaired by demoting codes one tier at a
//! time while keeping the Kraft sum exact, so the result is always a valid
//! prefix code.

use crate::constants::{MAX_CODE_LEN, NUM_DIST_SYMS};

/// Build a length-limited canonical code for `freqs`.
///
/// `lens[sym]` receives the code length (0 for unused symbols) and
/// `codes[sym]` the bit-reversed codeword, ready for LSB-first emission.
/// A single used symbol yields two 1-bit codes so the tree is complete.
pub fn build_code(freqs: &[u32], max_len: usize, lens: &mut [u8], codes: &mut [u16]) {
    debug_assert!(max_len <= MAX_CODE_LEN);
    debug_assert!(freqs.len() <= lens.len() && freqs.len() <= codes.len());

    lens[..freqs.len()].fill(0);
    codes[..freqs.len()].fill(0);

    // Sorted leaves, lowest frequency first. Symbol index breaks ties so the
    // construction is deterministic.
    let mut sorted: Vec<(u32, u16)> = freqs
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f != 0)
        .map(|(sym, &f)| (f, sym as u16))
        .collect();
    sorted.sort_unstable();

    match sorted.len() {
        0 => return,
        1 => {
            // Degenerate alphabet: pad with a second 1-bit code so strict
            // decoders see a complete tree.
            let sym = sorted[0].1 as usize;
            lens[sym] = 1;
            lens[if sym == 0 { 1 } else { 0 }] = 1;
            assign_codes(lens, codes);
            return;
        }
        _ => {}
    }

    let bl_count = merge_lengths(&sorted, max_len);

    // Hand out lengths by frequency rank: the rarest symbols take the
    // longest codes. Which symbol lands in which tier is then fixed by the
    // canonical numbering below.
    let mut idx = 0;
    for len in (1..=max_len).rev() {
        for _ in 0..bl_count[len] {
            lens[sorted[idx].1 as usize] = len as u8;
            idx += 1;
        }
    }
    debug_assert_eq!(idx, sorted.len());

    assign_codes(lens, codes);
}

/// Run the greedy merge over sorted leaves and return how many codes of
/// each length the limited tree uses.
fn merge_lengths(sorted: &[(u32, u16)], max_len: usize) -> [u32; MAX_CODE_LEN + 1] {
    let n = sorted.len();
    debug_assert!(n >= 2);

    // Arena: leaves in 0..n, internal nodes appended behind them.
    let total_nodes = 2 * n - 1;
    let mut weight = vec![0u64; total_nodes];
    let mut parent = vec![0u32; total_nodes];
    for (i, &(f, _)) in sorted.iter().enumerate() {
        weight[i] = f as u64;
    }

    let mut leaf = 0; // next unconsumed leaf
    let mut inner = n; // next unconsumed internal node
    for node in n..total_nodes {
        for _ in 0..2 {
            let pick = if leaf < n && (inner >= node || weight[leaf] <= weight[inner]) {
                let p = leaf;
                leaf += 1;
                p
            } else {
                let p = inner;
                inner += 1;
                p
            };
            weight[node] += weight[pick];
            parent[pick] = node as u32;
        }
    }

    // Depth of each leaf = code length in the unconstrained tree.
    let mut depth = vec![0u32; total_nodes];
    for node in (0..total_nodes - 1).rev() {
        depth[node] = depth[parent[node] as usize] + 1;
    }

    let mut bl_count = [0u32; MAX_CODE_LEN + 1];
    for node in 0..n {
        bl_count[(depth[node] as usize).min(max_len)] += 1;
    }

    // Clamping may have pushed the Kraft sum past capacity; demote codes
    // from shorter tiers until it is exact again. Each pass frees one unit
    // of code space at the deepest tier.
    let cap = 1u32 << max_len;
    let mut kraft: u32 = (1..=max_len).map(|l| bl_count[l] << (max_len - l)).sum();
    while kraft > cap {
        debug_assert!(bl_count[max_len] > 0);
        bl_count[max_len] -= 1;
        for len in (1..max_len).rev() {
            if bl_count[len] > 0 {
                bl_count[len] -= 1;
                bl_count[len + 1] += 2;
                break;
            }
        }
        kraft -= 1;
    }

    bl_count
}

/// Number codewords canonically from lengths and store them bit-reversed.
///
/// Shorter codes are numerically smaller; within one length, codes follow
/// symbol order. This is the RFC 1951 numbering, so any conformant decoder
/// reconstructs the same table from the lengths alone.
pub fn assign_codes(lens: &[u8], codes: &mut [u16]) {
    let mut bl_count = [0u32; MAX_CODE_LEN + 1];
    for &len in lens {
        bl_count[len as usize] += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u32; MAX_CODE_LEN + 2];
    let mut code = 0u32;
    for len in 1..=MAX_CODE_LEN {
        code = (code + bl_count[len - 1]) << 1;
        next_code[len] = code;
    }

    for (sym, &len) in lens.iter().enumerate() {
        if len != 0 {
            codes[sym] = reverse_code(next_code[len as usize] as u16, len);
            next_code[len as usize] += 1;
        }
    }
}

/// Reverse the low `len` bits of a codeword for LSB-first output.
#[inline]
fn reverse_code(code: u16, len: u8) -> u16 {
    code.reverse_bits() >> (16 - len)
}

/// Fixed literal/length code lengths from RFC 1951 section 3.2.6.
pub fn fixed_litlen_lens() -> [u8; 288] {
    let mut lens = [8u8; 288];
    for len in lens.iter_mut().take(256).skip(144) {
        *len = 9;
    }
    for len in lens.iter_mut().take(280).skip(256) {
        *len = 7;
    }
    lens
}

/// Fixed distance code lengths: thirty 5-bit codes.
pub fn fixed_dist_lens() -> [u8; NUM_DIST_SYMS] {
    [5u8; NUM_DIST_SYMS]
}
