//! Core traits for pull-based decompression.
//!
//! A format registry only needs to know how to pull decoded bytes out of a
//! handle and how to close it. [`StreamDecompressor`] is that contract;
//! codec crates implement it on their reader types so callers can hold a
//! `Box<dyn StreamDecompressor>` without knowing the format.

use crate::error::Result;

/// A pull-based decompression handle.
///
/// Bytes are decoded on demand on the calling thread. Once the end of the
/// decoded stream has been reported, every further read reports it again.
/// After [`close`](Self::close), every read fails with
/// [`OxiBzError::Closed`](crate::error::OxiBzError::Closed).
pub trait StreamDecompressor {
    /// Read one decoded byte. `Ok(None)` signals end of stream.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Read decoded bytes into `buf`, returning how many were written.
    ///
    /// Returns `Ok(0)` only at end of stream or for an empty `buf`.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Number of decoded bytes that can be served without further decoding.
    ///
    /// Zero does not imply end of stream.
    fn available(&self) -> usize;

    /// Release the underlying source.
    fn close(&mut self) -> Result<()>;

    /// Check whether [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;

    /// Decode everything that remains (convenience method).
    fn read_to_end_decoded(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut buffer = vec![0u8; 32768];

        loop {
            let produced = self.read_into(&mut buffer)?;
            if produced == 0 {
                break;
            }
            output.extend_from_slice(&buffer[..produced]);
        }

        Ok(output)
    }
}
