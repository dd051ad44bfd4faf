//! Bit-level input for block-structured compressed streams.
//!
//! bzip2 packs every field MSB-first: the first bit of a multi-bit value
//! is the most significant bit of the first byte it touches. `BitReader`
//! reproduces that ordering on top of any `Read` implementation.
//!
//! # Buffering
//!
//! The reader never holds more than one partially consumed byte. When a
//! compressed member ends (after its footer and padding), the underlying
//! source is positioned exactly at the next byte, so a caller can hand it
//! to another consumer or look for a following member.
//!
//! Because every bit costs at most one `read` of a single byte, wrap slow
//! sources (files, sockets) in a `std::io::BufReader`.
//!
//! # Example
//!
//! ```
//! use oxibz_core::bitstream::BitReader;
//! use std::io::Cursor;
//!
//! let mut reader = BitReader::new(Cursor::new(vec![0b1011_0000, 0xFF]));
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
//! assert_eq!(reader.read_bits(8).unwrap(), 0b0000_1111);
//! assert_eq!(reader.bits_consumed(), 12);
//! ```

use crate::error::{OxiBzError, Result};
use std::io::{ErrorKind, Read};

/// An MSB-first bit reader that wraps any `Read` implementation.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// The byte currently being consumed.
    current: u8,
    /// Bits of `current` not yet consumed, counted from its low end.
    bits_left: u8,
    /// Total bits consumed.
    bits_consumed: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            current: 0,
            bits_left: 0,
            bits_consumed: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    ///
    /// Bits remaining in a partially consumed byte are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Total number of bits consumed so far.
    pub fn bits_consumed(&self) -> u64 {
        self.bits_consumed
    }

    /// Number of whole bytes consumed so far (`bits_consumed / 8`).
    pub fn bytes_consumed(&self) -> u64 {
        self.bits_consumed / 8
    }

    /// True when the reader sits on a byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.bits_left == 0
    }

    /// Pull one byte from the source. `Ok(None)` on a clean end of input.
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    #[inline]
    fn refill(&mut self) -> Result<()> {
        match self.next_byte()? {
            Some(byte) => {
                self.current = byte;
                self.bits_left = 8;
                Ok(())
            }
            None => Err(OxiBzError::truncated(self.bits_consumed)),
        }
    }

    /// Read up to 32 bits, most significant bit first.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of bits to read (0-32)
    ///
    /// # Errors
    ///
    /// `TruncatedInput` if the source ends before `count` bits are available.
    /// Bits read before the source ran dry are consumed.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        let mut value = 0u32;
        let mut remaining = count;

        while remaining > 0 {
            if self.bits_left == 0 {
                self.refill()?;
            }

            let take = remaining.min(self.bits_left);
            let shift = self.bits_left - take;
            let chunk = (self.current >> shift) & (0xFFu8 >> (8 - take));

            value = (value << take) | chunk as u32;
            self.bits_left -= take;
            self.bits_consumed += take as u64;
            remaining -= take;
        }

        Ok(value)
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            self.refill()?;
        }
        self.bits_left -= 1;
        self.bits_consumed += 1;
        Ok((self.current >> self.bits_left) & 1 == 1)
    }

    /// Read an 8-bit value.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Read a 32-bit big-endian value.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bits(32)
    }

    /// Read a 48-bit big-endian value (block and end-of-stream magics).
    pub fn read_u48(&mut self) -> Result<u64> {
        let high = self.read_bits(16)? as u64;
        let low = self.read_bits(32)? as u64;
        Ok((high << 32) | low)
    }

    /// Discard the unread bits of the current byte.
    pub fn align_to_byte(&mut self) {
        self.bits_consumed += self.bits_left as u64;
        self.bits_left = 0;
    }

    /// Read one byte at a byte boundary, distinguishing end of input.
    ///
    /// Partial bits are discarded first. Returns `Ok(None)` if the source
    /// is exhausted, which is how a caller probes for a following member.
    pub fn try_read_aligned_byte(&mut self) -> Result<Option<u8>> {
        self.align_to_byte();
        match self.next_byte()? {
            Some(byte) => {
                self.bits_consumed += 8;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}
