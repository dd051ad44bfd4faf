//! Error types for OxiBz operations.
//!
//! A single error enum covers every failure the decoder can report:
//! truncated input, framing and header problems, entropy-decoding
//! failures, integrity mismatches, operations on a closed source, and
//! errors raised by progress listeners.
//!
//! No error is recoverable by re-reading the same bytes. Once a decoder
//! has returned one, the stream is unusable beyond that point.

use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// The main error type for OxiBz operations.
#[derive(Debug, Error)]
pub enum OxiBzError {
    /// I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The byte source ended in the middle of a structure.
    #[error("Truncated input at bit position {bit_position}")]
    TruncatedInput {
        /// Number of bits successfully consumed before the source ran dry.
        bit_position: u64,
    },

    /// Invalid magic number in a stream or block header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// No Huffman code matched within the table's maximum code length.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// A block's recomputed CRC differs from the one in its header.
    #[error("Block {block} CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    BlockCrcMismatch {
        /// 1-based block number within the decoder's lifetime.
        block: u64,
        /// CRC declared in the block header.
        expected: u32,
        /// CRC computed over the decoded bytes.
        computed: u32,
    },

    /// The combined CRC of a stream differs from its footer.
    #[error("Stream CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    StreamCrcMismatch {
        /// CRC declared in the stream footer.
        expected: u32,
        /// CRC combined from the stream's block CRCs.
        computed: u32,
    },

    /// Corrupted data in the compressed stream.
    #[error("Corrupted data at bit {offset}: {message}")]
    CorruptedData {
        /// Bit position where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Operation attempted on a closed source.
    #[error("Stream is closed")]
    Closed,

    /// A previous call failed; the decoder cannot continue.
    #[error("Decoder is unusable after an earlier error")]
    DecoderFailed,

    /// A progress listener failed; decoding of the current call was aborted.
    #[error("Progress listener aborted decoding: {0}")]
    ListenerAborted(#[source] Box<dyn StdError + Send + Sync>),
}

/// Result type alias for OxiBz operations.
pub type Result<T> = std::result::Result<T, OxiBzError>;

impl OxiBzError {
    /// Create a truncated input error.
    pub fn truncated(bit_position: u64) -> Self {
        Self::TruncatedInput { bit_position }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a block CRC mismatch error.
    pub fn block_crc_mismatch(block: u64, expected: u32, computed: u32) -> Self {
        Self::BlockCrcMismatch {
            block,
            expected,
            computed,
        }
    }

    /// Create a stream CRC mismatch error.
    pub fn stream_crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::StreamCrcMismatch { expected, computed }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Attach a bit position to a `CorruptedData` error raised by a stage
    /// that does not track input position. Other errors pass through.
    pub fn at_offset(self, offset: u64) -> Self {
        match self {
            Self::CorruptedData { message, .. } => Self::CorruptedData { offset, message },
            other => other,
        }
    }

    /// Wrap an error raised by a progress listener.
    pub fn listener(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::ListenerAborted(source.into())
    }

    /// True for block and stream checksum failures.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::BlockCrcMismatch { .. } | Self::StreamCrcMismatch { .. }
        )
    }
}

impl From<OxiBzError> for io::Error {
    fn from(err: OxiBzError) -> Self {
        match err {
            OxiBzError::Io(e) => e,
            OxiBzError::TruncatedInput { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
