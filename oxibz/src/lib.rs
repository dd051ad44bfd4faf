//! BZip2 decompression for OxiBz.
//!
//! This crate provides a pure Rust, pull-based bzip2 decoder that handles
//! concatenated streams and reports progress after every block.
//!
//! A compressed block is undone by reversing the encoder's pipeline:
//! 1. Huffman decoding with up to 6 tables switched every 50 symbols
//! 2. Zero-run decoding (RUNA/RUNB), interleaved with step 1
//! 3. Inverse Move-to-Front over the block's byte alphabet
//! 4. Inverse Burrows-Wheeler Transform
//! 5. Derandomization, for legacy randomized blocks
//! 6. Initial run-length decoding, then CRC verification
//!
//! ## Layers
//!
//! ```text
//! BzReader        Read / StreamDecompressor, buffers one block, listeners
//!   └─ BzDecoder  stream header, blocks, footer CRC, member continuation
//!        └─ BlockDecoder  one block: header, tables, symbols, transforms
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use oxibz::{BzReader, ProgressEvent, ListenerResult};
//! use std::fs::File;
//! use std::io::{BufReader, Read};
//!
//! let file = BufReader::new(File::open("data.bz2")?);
//! let mut reader = BzReader::new(file)?;
//! reader.add_listener(|event: &ProgressEvent| -> ListenerResult {
//!     println!("block {}: {} bytes so far", event.block_number, event.cumulative_bytes);
//!     Ok(())
//! });
//!
//! let mut text = String::new();
//! reader.read_to_string(&mut text)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
/// Burrows-Wheeler Transform implementation.
pub mod bwt;
mod config;
mod decode;
pub mod huffman;
pub mod mtf;
pub mod progress;
pub mod randomize;
mod reader;
pub mod rle;

#[cfg(test)]
mod testutil;

pub use block::{BlockDecoder, BlockOutcome, BlockPhase};
pub use config::DecoderOptions;
pub use decode::{BzDecoder, StreamState, decompress, decompress_with};
pub use oxibz_core::{OxiBzError, Result, StreamDecompressor};
pub use progress::{ListenerId, ListenerResult, ProgressEvent, ProgressListener, ProgressNotifier};
pub use reader::BzReader;

/// Stream header magic ("BZh"), followed by the block size digit.
pub const BZIP2_MAGIC: [u8; 3] = *b"BZh";

/// Block header magic (BCD digits of pi), 48 bits.
pub const BLOCK_MAGIC: u64 = 0x3141_5926_5359;

/// End of stream magic (BCD digits of sqrt(pi)), 48 bits.
pub const EOS_MAGIC: u64 = 0x1772_4538_5090;

/// Maximum block size (900k).
pub const MAX_BLOCK_SIZE: usize = 900_000;

/// Declared block size class of a stream (1-9, where 9 = 900k).
///
/// Bounds the length of every block before initial run-length decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockSize(u8);

impl BlockSize {
    /// Create a block size class; `None` outside 1-9.
    pub fn new(level: u8) -> Option<Self> {
        (1..=9).contains(&level).then_some(Self(level))
    }

    /// Parse the ASCII digit that follows "BZh" in a stream header.
    pub fn from_header_byte(byte: u8) -> Option<Self> {
        Self::new(byte.wrapping_sub(b'0'))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }

    /// Largest permitted block before initial run-length decoding.
    pub fn max_block_len(&self) -> usize {
        self.0 as usize * 100_000
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self(9)
    }
}
