// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Maximum backward distance of a match (32KB window)
pub const WINDOW_SIZE: usize = 32768;

/// Minimum match length
pub const MIN_MATCH: usize = 3;

/// Maximum match length
pub const MAX_MATCH: usize = 258;

/// Number of literal/length symbols (0-255 literals, 256 end-of-block, 257-285 lengths)
pub const NUM_LITLEN_SYMS: usize = 286;

/// Number of distance symbols
pub const NUM_DIST_SYMS: usize = 30;

/// Number of code-length (precode) symbols
pub const NUM_PRECODE_SYMS: usize = 19;

/// End-of-block symbol
pub const END_OF_BLOCK: usize = 256;

/// Maximum codeword length for literal/length and distance codes
pub const MAX_CODE_LEN: usize = 15;

/// Maximum codeword length for the precode
pub const MAX_PRECODE_LEN: usize = 7;

/// Block type field values
pub const BLOCK_STORED: u32 = 0;
pub const BLOCK_FIXED: u32 = 1;
pub const BLOCK_DYNAMIC: u32 = 2;

/// Maximum payload of one stored block
pub const MAX_STORED_LEN: usize = 65535;

/// Maximum input bytes covered by one block.
/// Keeping a block within one stored chunk makes the stored fallback a
/// single 5-byte header, so its cost is exact when choosing a block type.
pub const MAX_BLOCK_INPUT: usize = MAX_STORED_LEN;

/// Base match length for each length code (codes 257-285)
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for each length code
pub const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for each distance code (codes 0-29)
pub const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for each distance code
pub const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of precode code lengths in a dynamic block header
pub const PRECODE_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Map a match length (3..=258) to its (symbol, extra bits, extra value)
pub fn length_symbol(length: u16) -> (u16, u8, u16) {
    debug_assert!((MIN_MATCH as u16..=MAX_MATCH as u16).contains(&length));
    if length == MAX_MATCH as u16 {
        return (285, 0, 0);
    }
    let mut code = 0;
    while code + 1 < LENGTH_BASE.len() && LENGTH_BASE[code + 1] <= length {
        code += 1;
    }
    (257 + code as u16, LENGTH_EXTRA[code], length - LENGTH_BASE[code])
}

/// Map a match distance (1..=32768) to its (symbol, extra bits, extra value)
pub fn dist_symbol(dist: u16) -> (u16, u8, u16) {
    debug_assert!(dist >= 1);
    let mut code = 0;
    while code + 1 < DIST_BASE.len() && DIST_BASE[code + 1] <= dist {
        code += 1;
    }
    (code as u16, DIST_EXTRA[code], dist - DIST_BASE[code])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_symbol() {
        assert_eq!(length_symbol(3), (257, 0, 0));
        assert_eq!(length_symbol(4), (258, 0, 0));
        assert_eq!(length_symbol(10), (264, 0, 0));
        assert_eq!(length_symbol(11), (265, 1, 0));
        assert_eq!(length_symbol(12), (265, 1, 1));
        assert_eq!(length_symbol(130), (280, 4, 15));
        assert_eq!(length_symbol(257), (284, 5, 30));
        assert_eq!(length_symbol(258), (285, 0, 0));
    }

    #[test]
    fn test_dist_symbol() {
        assert_eq!(dist_symbol(1), (0, 0, 0));
        assert_eq!(dist_symbol(2), (1, 0, 0));
        assert_eq!(dist_symbol(4), (3, 0, 0));
        assert_eq!(dist_symbol(5), (4, 1, 0));
        assert_eq!(dist_symbol(6), (4, 1, 1));
        assert_eq!(dist_symbol(24577), (29, 13, 0));
        assert_eq!(dist_symbol(32768), (29, 13, 8191));
    }

    #[test]
    fn test_tables_cover_full_ranges() {
        // Every length 3..=258 and distance 1..=32768 maps into its base range.
        for len in MIN_MATCH as u16..=MAX_MATCH as u16 {
            let (sym, extra, value) = length_symbol(len);
            assert!((257..=285).contains(&sym));
            assert_eq!(LENGTH_BASE[(sym - 257) as usize] + value, len);
            assert!((value as u32) < (1u32 << extra));
        }
        for dist in [1u16, 2, 3, 4, 100, 255, 256, 257, 4096, 32767, 32768] {
            let (sym, extra, value) = dist_symbol(dist);
            assert!((sym as usize) < NUM_DIST_SYMS);
            assert_eq!(DIST_BASE[sym as usize] + value, dist);
            assert!((value as u32) < (1u32 << extra));
        }
    }
}
