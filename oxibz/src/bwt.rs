//! Inverse Burrows-Wheeler Transform for bzip2.
//!
//! The forward transform sorts all rotations of a block and keeps the last
//! column plus the row index of the original block (the origin pointer).
//! The inverse counts byte occurrences to rank every position of the last
//! column, builds a successor vector from the ranks and walks it once from
//! the origin pointer.

use oxibz_core::error::{OxiBzError, Result};

/// Perform inverse Burrows-Wheeler Transform.
///
/// Reconstructs the original data from the last column and origin pointer.
///
/// # Errors
///
/// `CorruptedData` if `orig_ptr` is not an index into `data`.
pub fn inverse_transform(data: &[u8], orig_ptr: usize) -> Result<Vec<u8>> {
    let mut next = Vec::new();
    let mut output = Vec::with_capacity(data.len());
    inverse_transform_into(data, orig_ptr, &mut next, &mut output)?;
    Ok(output)
}

/// Inverse transform with caller-provided buffers.
///
/// `next` is scratch space; `output` is cleared and receives the result.
/// Both keep their capacity so one pair can serve every block of a stream.
pub fn inverse_transform_into(
    data: &[u8],
    orig_ptr: usize,
    next: &mut Vec<u32>,
    output: &mut Vec<u8>,
) -> Result<()> {
    output.clear();
    let n = data.len();
    if orig_ptr >= n {
        return Err(OxiBzError::corrupted(
            0,
            format!("origin pointer {} outside block of {} bytes", orig_ptr, n),
        ));
    }

    // Start of each byte value's rows in the sorted first column
    let mut counts = [0u32; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    let mut total = 0u32;
    for count in counts.iter_mut() {
        let c = *count;
        *count = total;
        total += c;
    }

    // next[row] = row that follows it in the original text
    next.clear();
    next.resize(n, 0);
    for (i, &byte) in data.iter().enumerate() {
        let slot = &mut counts[byte as usize];
        next[*slot as usize] = i as u32;
        *slot += 1;
    }

    output.reserve(n);
    let mut idx = next[orig_ptr] as usize;
    for _ in 0..n {
        output.push(data[idx]);
        idx = next[idx] as usize;
    }

    Ok(())
}
