//! Pull-based decompressing byte source.

use crate::config::DecoderOptions;
use crate::decode::BzDecoder;
use crate::progress::{ListenerId, ProgressListener, ProgressNotifier};
use crate::BlockSize;
use oxibz_core::error::{OxiBzError, Result};
use oxibz_core::traits::StreamDecompressor;
use std::io::{self, Read};

/// Decompressing reader over a bzip2 source.
///
/// Decodes one block ahead of demand and serves bytes from it. The stream
/// header is read on construction, so listeners added before the first
/// read see every block.
///
/// # Example
///
/// ```
/// use oxibz::{BzReader, DecoderOptions};
/// use std::io::Read;
///
/// // An empty bzip2 stream: header and end marker only
/// let data = [
///     0x42, 0x5A, 0x68, 0x39, 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0x00, 0x00, 0x00, 0x00,
/// ];
/// let mut reader = BzReader::with_options(&data[..], DecoderOptions::default())?;
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out)?;
/// assert!(out.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BzReader<R: Read> {
    /// `None` once closed.
    decoder: Option<BzDecoder<R>>,
    notifier: ProgressNotifier,
    buffer: Vec<u8>,
    pos: usize,
}

impl<R: Read> BzReader<R> {
    /// Create a reader with default options.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, DecoderOptions::default())
    }

    /// Create a reader with explicit options.
    pub fn with_options(reader: R, options: DecoderOptions) -> Result<Self> {
        Ok(Self {
            decoder: Some(BzDecoder::with_options(reader, options)?),
            notifier: ProgressNotifier::new(),
            buffer: Vec::new(),
            pos: 0,
        })
    }

    /// Register a listener called after every decoded block.
    pub fn add_listener<L: ProgressListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    /// Read one decoded byte. `Ok(None)` at end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.decoder.is_none() {
            return Err(OxiBzError::Closed);
        }
        if self.pos == self.buffer.len() && !self.fill_buffer()? {
            return Ok(None);
        }

        let byte = self.buffer[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    /// Read decoded bytes into `buf`, returning the count.
    ///
    /// Serves at most the rest of the current block; returns `Ok(0)` only at
    /// end of stream or for an empty `buf`.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.decoder.is_none() {
            return Err(OxiBzError::Closed);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos == self.buffer.len() && !self.fill_buffer()? {
            return Ok(0);
        }

        let n = buf.len().min(self.buffer.len() - self.pos);
        buf[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    /// Decoded bytes buffered and not yet served.
    pub fn available(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Drop the underlying source. Later reads fail with `Closed`.
    pub fn close(&mut self) -> Result<()> {
        self.decoder = None;
        self.buffer = Vec::new();
        self.pos = 0;
        Ok(())
    }

    /// Check whether the reader has been closed.
    pub fn is_closed(&self) -> bool {
        self.decoder.is_none()
    }

    /// Decode the next block into the buffer. `false` at end of stream.
    fn fill_buffer(&mut self) -> Result<bool> {
        let decoder = self.decoder.as_mut().ok_or(OxiBzError::Closed)?;
        self.pos = 0;
        while decoder
            .next_block(&mut self.buffer, &mut self.notifier)?
            .is_some()
        {
            if !self.buffer.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Block size of the current member; `None` once closed.
    pub fn block_size(&self) -> Option<BlockSize> {
        self.decoder.as_ref().map(BzDecoder::block_size)
    }

    /// Blocks decoded so far; 0 once closed.
    pub fn blocks_decoded(&self) -> u64 {
        self.decoder.as_ref().map_or(0, BzDecoder::blocks_decoded)
    }

    /// Members fully decoded so far; 0 once closed.
    pub fn members_decoded(&self) -> u64 {
        self.decoder.as_ref().map_or(0, BzDecoder::members_decoded)
    }

    /// Decoded bytes produced so far, served or not; 0 once closed.
    pub fn total_out(&self) -> u64 {
        self.decoder.as_ref().map_or(0, BzDecoder::total_out)
    }

    /// Compressed bytes consumed so far; 0 once closed.
    pub fn total_in(&self) -> u64 {
        self.decoder.as_ref().map_or(0, BzDecoder::total_in)
    }

    /// Consume the reader and return the underlying source.
    ///
    /// Buffered decoded bytes are discarded.
    ///
    /// # Errors
    ///
    /// `Closed` if [`close`](Self::close) already released the source.
    pub fn into_inner(self) -> Result<R> {
        self.decoder
            .map(BzDecoder::into_inner)
            .ok_or(OxiBzError::Closed)
    }
}

impl<R: Read> Read for BzReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_into(buf).map_err(io::Error::from)
    }
}

impl<R: Read> StreamDecompressor for BzReader<R> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        BzReader::read_byte(self)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        BzReader::read_into(self, buf)
    }

    fn available(&self) -> usize {
        BzReader::available(self)
    }

    fn close(&mut self) -> Result<()> {
        BzReader::close(self)
    }

    fn is_closed(&self) -> bool {
        BzReader::is_closed(self)
    }
}
