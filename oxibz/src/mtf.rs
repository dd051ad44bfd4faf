//! Inverse Move-to-Front for bzip2.
//!
//! Both the symbol stream and the table selectors are move-to-front coded.
//! The decoder keeps the same recency-ordered list the encoder kept and
//! resolves each index against it, moving the resolved entry to the front.

/// A recency-ordered list of up to 256 byte values.
#[derive(Debug, Clone)]
pub struct MtfList {
    list: [u8; 256],
    len: usize,
}

impl MtfList {
    /// Create a list holding `symbols` in the given order.
    ///
    /// At most 256 symbols are kept.
    pub fn new(symbols: &[u8]) -> Self {
        let len = symbols.len().min(256);
        let mut list = [0u8; 256];
        list[..len].copy_from_slice(&symbols[..len]);
        Self { list, len }
    }

    /// Create the list `0, 1, ..., len - 1`.
    pub fn identity(len: usize) -> Self {
        let len = len.min(256);
        let mut list = [0u8; 256];
        for (i, slot) in list.iter_mut().enumerate().take(len) {
            *slot = i as u8;
        }
        Self { list, len }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolve `index` and move the resolved value to the front.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn move_to_front(&mut self, index: usize) -> u8 {
        assert!(index < self.len, "MTF index out of range");
        let value = self.list[index];
        self.list.copy_within(0..index, 1);
        self.list[0] = value;
        value
    }

    /// Current entries, front first.
    pub fn as_slice(&self) -> &[u8] {
        &self.list[..self.len]
    }
}

/// Resolve a whole index sequence in place against `list`.
///
/// Every index must be smaller than `list.len()`.
pub fn inverse_transform_in_place(indices: &mut [u8], list: &mut MtfList) {
    for slot in indices {
        *slot = list.move_to_front(*slot as usize);
    }
}
