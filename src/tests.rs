// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{compress_bound, Compressor, Format};
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::io::Read;

/// Decode with flate2, an independent standards-conformant inflater.
fn reference_decode(format: Format, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    match format {
        Format::Raw => DeflateDecoder::new(data)
            .read_to_end(&mut out)
            .expect("deflate decode failed"),
        Format::Zlib => ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .expect("zlib decode failed"),
        Format::Gzip => GzDecoder::new(data)
            .read_to_end(&mut out)
            .expect("gzip decode failed"),
    };
    out
}

fn roundtrip(data: &[u8]) -> Result<(), String> {
    for level in [0u32, 1, 4, 6, 9, 12] {
        let mut compressor =
            Compressor::new(level).map_err(|e| format!("level {}: {}", level, e))?;
        for format in [Format::Raw, Format::Zlib, Format::Gzip] {
            let bound = compress_bound(format, data.len())
                .map_err(|e| format!("bound failed: {}", e))?;
            let compressed = compressor
                .compress(data, format)
                .map_err(|e| format!("level {} {:?}: {}", level, format, e))?;

            if compressed.len() > bound {
                return Err(format!(
                    "level {} {:?}: output {} exceeds bound {}",
                    level,
                    format,
                    compressed.len(),
                    bound
                ));
            }

            let decoded = reference_decode(format, &compressed);
            if decoded != data {
                return Err(format!(
                    "level {} {:?}: roundtrip mismatch, input len {}, output len {}",
                    level,
                    format,
                    data.len(),
                    decoded.len()
                ));
            }
        }
    }
    Ok(())
}

// Simple LCG for reproducible random corpora
fn lcg_next(state: &mut u64) -> u8 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (*state >> 33) as u8
}

#[test]
fn test_empty() {
    roundtrip(&[]).unwrap();
}

#[test]
fn test_single_byte() {
    roundtrip(&[0]).unwrap();
    roundtrip(&[255]).unwrap();
}

#[test]
fn test_small_copy() {
    for i in 0..32 {
        let mut s = b"aaaa".to_vec();
        s.extend(vec![b'b'; i]);
        s.extend(b"aaaabbbb");
        roundtrip(&s).unwrap();
    }
}

#[test]
fn test_small_rand() {
    let mut state = 0x853c_49e6_748f_ea9bu64;
    let mut n = 1;
    while n < 20000 {
        let mut b = vec![0u8; n];
        for byte in b.iter_mut() {
            *byte = lcg_next(&mut state);
        }
        roundtrip(&b).unwrap();
        n += 571;
    }
}

#[test]
fn test_small_regular() {
    let mut n = 1;
    while n < 20000 {
        let mut b = vec![0u8; n];
        for (i, byte) in b.iter_mut().enumerate() {
            *byte = (i % 10) as u8 + b'a';
        }
        roundtrip(&b).unwrap();
        n += 571;
    }
}

#[test]
fn test_small_repeat() {
    let mut n = 1;
    while n < 20000 {
        let b = vec![b'a'; n];
        roundtrip(&b).unwrap();
        n += 571;
    }
}

#[test]
fn test_all_byte_values() {
    let b: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    roundtrip(&b).unwrap();
}

#[test]
fn test_multi_block_text() {
    // Spans several 65535-byte blocks and the full 32K window.
    let b = b"The quick brown fox jumps over the lazy dog. ".repeat(6000);
    assert!(b.len() > 200_000);
    roundtrip(&b).unwrap();
}

#[test]
fn test_multi_block_incompressible() {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let b: Vec<u8> = (0..200_000).map(|_| lcg_next(&mut state)).collect();
    roundtrip(&b).unwrap();
}

#[test]
fn test_long_range_matches() {
    // Repeats just inside and outside the window distance.
    let mut b = Vec::new();
    let mut state = 7u64;
    let unit: Vec<u8> = (0..1000).map(|_| lcg_next(&mut state)).collect();
    for gap in [1000usize, 30_000, 32_000, 40_000] {
        b.extend_from_slice(&unit);
        b.extend((0..gap).map(|i| (i % 251) as u8));
        b.extend_from_slice(&unit);
    }
    roundtrip(&b).unwrap();
}

#[test]
fn test_large_identical_bytes() {
    roundtrip(&vec![0u8; 300_000]).unwrap();
}
