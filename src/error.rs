// Copyright 2025 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the compressor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The output buffer is too small for the compressed stream
    BufferTooSmall,

    /// The input is too large for a single-shot compression call
    TooLarge,

    /// The requested compression level is out of range
    InvalidLevel(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferTooSmall => write!(f, "miniflate: output buffer too small"),
            Error::TooLarge => write!(f, "miniflate: input too large"),
            Error::InvalidLevel(level) => {
                write!(f, "miniflate: invalid compression level {}", level)
            }
        }
    }
}

impl std::error::Error for Error {}
