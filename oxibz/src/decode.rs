//! BZip2 stream decoder.
//!
//! Drives [`BlockDecoder`] over a whole compressed source: stream header,
//! blocks, footer with the combined CRC, and any members concatenated after
//! the first one.
//!
//! ```text
//! ExpectStreamHeader -> DecodingBlocks <-> ExpectStreamFooter
//!                            ^                  │
//!                            │                  v
//!                       ExpectNextMember <──────┤
//!                            │                  │
//!                            v                  v
//!                        EndOfInput         EndOfInput
//! ```
//!
//! Any error moves the decoder to `Failed`, where it stays.

use crate::block::{BlockDecoder, BlockOutcome};
use crate::config::DecoderOptions;
use crate::progress::{ProgressEvent, ProgressNotifier};
use crate::{BZIP2_MAGIC, BlockSize};
use log::{debug, trace, warn};
use oxibz_core::error::{OxiBzError, Result};
use oxibz_core::{BitReader, Crc32};
use std::io::Read;

/// Position of a [`BzDecoder`] in the compressed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Before the "BZh" header of the first member.
    ExpectStreamHeader,
    /// Inside a member, before the next block or end marker.
    DecodingBlocks,
    /// End marker read; the combined CRC follows.
    ExpectStreamFooter,
    /// A member completed; probing for another one.
    ExpectNextMember,
    /// Nothing more will be decoded.
    EndOfInput,
    /// An earlier call failed.
    Failed,
}

/// BZip2 decoder.
///
/// Produces one verified block per [`next_block`](Self::next_block) call.
pub struct BzDecoder<R: Read> {
    reader: BitReader<R>,
    options: DecoderOptions,
    state: StreamState,
    block_size: BlockSize,
    block: BlockDecoder,
    /// Combined CRC of the current member's blocks so far.
    stream_crc: u32,
    blocks_decoded: u64,
    members_decoded: u64,
    total_out: u64,
}

impl<R: Read> BzDecoder<R> {
    /// Create a decoder with default options, reading the stream header.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, DecoderOptions::default())
    }

    /// Create a decoder, reading the stream header.
    ///
    /// # Errors
    ///
    /// `InvalidMagic` or `InvalidHeader` if the source does not start with a
    /// bzip2 header, `TruncatedInput` if it ends within the first 4 bytes.
    pub fn with_options(reader: R, options: DecoderOptions) -> Result<Self> {
        let mut decoder = Self {
            reader: BitReader::new(reader),
            options,
            state: StreamState::ExpectStreamHeader,
            block_size: BlockSize::default(),
            block: BlockDecoder::new(BlockSize::default().max_block_len()),
            stream_crc: 0,
            blocks_decoded: 0,
            members_decoded: 0,
            total_out: 0,
        };

        decoder.read_stream_header()?;
        Ok(decoder)
    }

    /// Decode the next block into `output` (cleared first) and notify
    /// `notifier`.
    ///
    /// Returns the block's progress event, or `None` once the input is
    /// exhausted; further calls keep returning `None`.
    ///
    /// # Errors
    ///
    /// Any decoding, integrity or listener error. The decoder is unusable
    /// afterwards and later calls fail with `DecoderFailed`.
    pub fn next_block(
        &mut self,
        output: &mut Vec<u8>,
        notifier: &mut ProgressNotifier,
    ) -> Result<Option<ProgressEvent>> {
        output.clear();
        match self.advance(output, notifier) {
            Ok(event) => Ok(event),
            Err(err) => {
                if self.state != StreamState::Failed {
                    debug!("bzip2 decoding failed: {}", err);
                    self.state = StreamState::Failed;
                }
                output.clear();
                Err(err)
            }
        }
    }

    /// Transition function: run states until a block is produced or the
    /// input ends.
    fn advance(
        &mut self,
        output: &mut Vec<u8>,
        notifier: &mut ProgressNotifier,
    ) -> Result<Option<ProgressEvent>> {
        loop {
            match self.state {
                StreamState::ExpectStreamHeader => self.read_stream_header()?,
                StreamState::DecodingBlocks => {
                    let number = self.blocks_decoded + 1;
                    match self.block.decode(&mut self.reader, number, output)? {
                        BlockOutcome::Decoded { crc } => {
                            return self.finish_block(number, crc, output.len(), notifier).map(Some);
                        }
                        BlockOutcome::EndOfStream => self.state = StreamState::ExpectStreamFooter,
                    }
                }
                StreamState::ExpectStreamFooter => self.read_stream_footer()?,
                StreamState::ExpectNextMember => self.probe_next_member()?,
                StreamState::EndOfInput => return Ok(None),
                StreamState::Failed => return Err(OxiBzError::DecoderFailed),
            }
        }
    }

    fn finish_block(
        &mut self,
        number: u64,
        crc: u32,
        block_len: usize,
        notifier: &mut ProgressNotifier,
    ) -> Result<ProgressEvent> {
        self.stream_crc = Crc32::combine(self.stream_crc, crc);
        self.blocks_decoded = number;
        self.total_out += block_len as u64;

        trace!(
            "bzip2 block {}: {} bytes, crc {:#010x}{}",
            number,
            block_len,
            crc,
            if self.block.is_randomized() { " (randomized)" } else { "" }
        );

        let event = ProgressEvent {
            block_number: number,
            member_number: self.members_decoded + 1,
            block_len,
            cumulative_bytes: self.total_out,
            compressed_bytes: self.reader.bytes_consumed(),
        };
        notifier.notify(&event)?;
        Ok(event)
    }

    fn read_stream_header(&mut self) -> Result<()> {
        let first = self.reader.read_u8()?;
        let block_size = self.read_member_header(first)?;
        self.begin_member(block_size);
        Ok(())
    }

    /// Check "BZh" and the level digit, the first byte already read.
    ///
    /// Stops at the first byte that does not match.
    fn read_member_header(&mut self, first: u8) -> Result<BlockSize> {
        let mut header = [first, 0, 0, 0];
        for i in 0..BZIP2_MAGIC.len() {
            if i > 0 {
                header[i] = self.reader.read_u8()?;
            }
            if header[i] != BZIP2_MAGIC[i] {
                return Err(OxiBzError::invalid_magic(
                    BZIP2_MAGIC.to_vec(),
                    header[..=i].to_vec(),
                ));
            }
        }

        header[3] = self.reader.read_u8()?;
        BlockSize::from_header_byte(header[3]).ok_or_else(|| {
            OxiBzError::invalid_header(format!(
                "invalid block size {:?} in stream header",
                header[3] as char
            ))
        })
    }

    fn begin_member(&mut self, block_size: BlockSize) {
        debug!(
            "bzip2 member {}: block size {} ({} bytes max)",
            self.members_decoded + 1,
            block_size.level(),
            block_size.max_block_len()
        );
        self.block_size = block_size;
        self.block.set_max_block_len(block_size.max_block_len());
        self.stream_crc = 0;
        self.state = StreamState::DecodingBlocks;
    }

    fn read_stream_footer(&mut self) -> Result<()> {
        let expected = self.reader.read_u32()?;
        if expected != self.stream_crc {
            return Err(OxiBzError::stream_crc_mismatch(expected, self.stream_crc));
        }

        self.members_decoded += 1;
        self.reader.align_to_byte();
        debug!(
            "bzip2 member {} complete: crc {:#010x}, {} compressed bytes consumed",
            self.members_decoded,
            expected,
            self.reader.bytes_consumed()
        );

        self.state = if self.options.decompress_concatenated {
            StreamState::ExpectNextMember
        } else {
            StreamState::EndOfInput
        };
        Ok(())
    }

    fn probe_next_member(&mut self) -> Result<()> {
        let offset = self.reader.bytes_consumed();
        let Some(first) = self.reader.try_read_aligned_byte()? else {
            debug!(
                "bzip2 end of input after {} member(s), {} bytes decoded",
                self.members_decoded, self.total_out
            );
            self.state = StreamState::EndOfInput;
            return Ok(());
        };

        match self.read_member_header(first) {
            Ok(block_size) => {
                self.begin_member(block_size);
                Ok(())
            }
            Err(err @ OxiBzError::Io(_)) => Err(err),
            Err(err) if self.options.strict_trailing_data => Err(err),
            Err(err) => {
                warn!(
                    "ignoring trailing data at byte {} after bzip2 member {}: {}",
                    offset, self.members_decoded, err
                );
                self.state = StreamState::EndOfInput;
                Ok(())
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// True once the input is exhausted (not after a failure).
    pub fn is_finished(&self) -> bool {
        self.state == StreamState::EndOfInput
    }

    /// Options in effect.
    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// Block size declared by the current (or last) member.
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Blocks decoded so far, across members.
    pub fn blocks_decoded(&self) -> u64 {
        self.blocks_decoded
    }

    /// Members whose footer has been verified.
    pub fn members_decoded(&self) -> u64 {
        self.members_decoded
    }

    /// Decoded bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Whole compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.reader.bytes_consumed()
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Consume the decoder and return the underlying reader.
    ///
    /// After the last member's footer the reader is positioned just past
    /// that member's padding, plus any bytes probed for a following member.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

/// Decompress BZip2 data, following concatenated members.
pub fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
    decompress_with(reader, DecoderOptions::default())
}

/// Decompress BZip2 data with explicit options.
pub fn decompress_with<R: Read>(reader: R, options: DecoderOptions) -> Result<Vec<u8>> {
    let mut decoder = BzDecoder::with_options(reader, options)?;
    let mut notifier = ProgressNotifier::new();
    let mut output = Vec::new();
    let mut block = Vec::new();

    while decoder.next_block(&mut block, &mut notifier)?.is_some() {
        output.extend_from_slice(&block);
    }

    Ok(output)
}
