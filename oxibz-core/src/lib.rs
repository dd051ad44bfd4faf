//! # OxiBz Core
//!
//! Core components for the OxiBz decompression library.
//!
//! This crate provides the building blocks shared by the codec crate:
//!
//! - [`bitstream`]: MSB-first bit reader with at most one byte of lookahead
//! - [`crc`]: CRC-32/BZIP2 and the stream CRC combination
//! - [`traits`]: the pull-based [`StreamDecompressor`] handle
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Byte source                                         │
//! │     BzReader (Read + StreamDecompressor), listeners     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Stream framing, block decoding, Huffman, MTF, BWT   │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader, CRC-32/BZIP2, errors                     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxibz_core::bitstream::BitReader;
//! use oxibz_core::crc::Crc32;
//! use std::io::Cursor;
//!
//! // Read bits from data, most significant bit first
//! let data = vec![0xAB, 0xCD];
//! let mut reader = BitReader::new(Cursor::new(data));
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! // Compute CRC-32/BZIP2
//! assert_eq!(Crc32::compute(b"123456789"), 0xFC891918);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use crc::Crc32;
pub use error::{OxiBzError, Result};
pub use traits::StreamDecompressor;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitReader;
    pub use crate::crc::Crc32;
    pub use crate::error::{OxiBzError, Result};
    pub use crate::traits::StreamDecompressor;
}
