//! Initial run-length decoding (RLE1) for bzip2.
//!
//! Before sorting, the encoder replaces each run of 4 to 259 identical
//! bytes with the first 4 bytes followed by a count byte holding the number
//! of further repeats. The decoder counts consecutive equal bytes; after
//! the fourth it treats the next byte as a repeat count and starts over.
//!
//! The second run-length stage (RUNA/RUNB zero runs) is decoded together
//! with the Huffman symbols in the block decoder.

use oxibz_core::error::{OxiBzError, Result};

/// Decode RLE1-encoded data, appending to `output`.
///
/// # Errors
///
/// `CorruptedData` if the data ends right after a run of four equal bytes,
/// where a count byte is required. The returned offset is 0; callers attach
/// the input position.
pub fn rle1_decode_into(data: &[u8], output: &mut Vec<u8>) -> Result<()> {
    output.reserve(data.len());

    let mut iter = data.iter().copied();
    let mut last: Option<u8> = None;
    let mut run = 0usize;

    while let Some(byte) = iter.next() {
        output.push(byte);

        if last == Some(byte) {
            run += 1;
        } else {
            last = Some(byte);
            run = 1;
        }

        if run == 4 {
            let Some(count) = iter.next() else {
                return Err(OxiBzError::corrupted(0, "run of four without a count byte"));
            };
            output.resize(output.len() + count as usize, byte);
            last = None;
            run = 0;
        }
    }

    Ok(())
}

/// Decode RLE1-encoded data.
pub fn rle1_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() * 2);
    rle1_decode_into(data, &mut result)?;
    Ok(result)
}
