//! Canonical Huffman decoding for bzip2.
//!
//! A block carries between 2 and 6 coding tables and switches between them
//! every 50 symbols. Each table is transmitted only as a list of code
//! lengths; codes are assigned canonically, shortest length first and in
//! increasing symbol order within a length.

use oxibz_core::BitReader;
use oxibz_core::error::{OxiBzError, Result};
use std::io::Read;

/// Minimum number of Huffman tables per block.
pub const MIN_TABLES: usize = 2;

/// Maximum number of Huffman tables per block.
pub const MAX_TABLES: usize = 6;

/// Symbols per selector group.
pub const SYMBOLS_PER_GROUP: usize = 50;

/// Maximum code length.
pub const MAX_CODE_LEN: usize = 20;

/// Number of selectors kept per block; extra selectors are read and dropped.
pub const MAX_SELECTORS: usize = 18_002;

/// Largest alphabet: RUNA, RUNB, 255 MTF indices and end-of-block.
pub const MAX_ALPHA_SIZE: usize = 258;

/// A canonical Huffman decoding table.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Shortest code length in use.
    min_len: u8,
    /// Longest code length in use.
    max_len: u8,
    /// First canonical code of each length.
    first_code: [u32; MAX_CODE_LEN + 1],
    /// Number of codes of each length.
    counts: [u32; MAX_CODE_LEN + 1],
    /// Index in `perms` where the symbols of each length start.
    base_index: [u32; MAX_CODE_LEN + 1],
    /// Symbols sorted by (code length, symbol).
    perms: Vec<u16>,
}

impl HuffmanTable {
    /// Build a table from per-symbol code lengths (0 = unused symbol).
    ///
    /// # Errors
    ///
    /// `CorruptedData` if no symbol is used, a length exceeds
    /// [`MAX_CODE_LEN`], or the lengths over-subscribe the code space.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u32; MAX_CODE_LEN + 1];
        for &len in lengths {
            if len as usize > MAX_CODE_LEN {
                return Err(OxiBzError::corrupted(0, "Huffman code too long"));
            }
            if len > 0 {
                counts[len as usize] += 1;
            }
        }

        let used = lengths.iter().filter(|&&l| l > 0);
        let (Some(&min_len), Some(&max_len)) = (used.clone().min(), used.max()) else {
            return Err(OxiBzError::corrupted(0, "Empty Huffman table"));
        };

        let mut first_code = [0u32; MAX_CODE_LEN + 1];
        let mut base_index = [0u32; MAX_CODE_LEN + 1];

        let mut code = 0u32;
        let mut index = 0u32;
        for len in 1..=max_len as usize {
            first_code[len] = code;
            base_index[len] = index;
            code += counts[len];
            if code > 1 << len {
                return Err(OxiBzError::corrupted(0, "Over-subscribed Huffman code"));
            }
            code <<= 1;
            index += counts[len];
        }

        // perms[base_index[L] + (code - first_code[L])] = symbol
        let mut perms = vec![0u16; index as usize];
        let mut next_index = base_index;
        for (sym, &len) in lengths.iter().enumerate() {
            if len > 0 {
                let slot = &mut next_index[len as usize];
                perms[*slot as usize] = sym as u16;
                *slot += 1;
            }
        }

        Ok(Self {
            min_len,
            max_len,
            first_code,
            counts,
            base_index,
            perms,
        })
    }

    /// Decode a single symbol.
    ///
    /// # Errors
    ///
    /// `InvalidHuffmanCode` if no code matches within the longest length,
    /// `TruncatedInput` if the source ends first.
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let mut code = reader.read_bits(self.min_len)?;

        for len in self.min_len as usize..=self.max_len as usize {
            if len > self.min_len as usize {
                code = (code << 1) | reader.read_bit()? as u32;
            }

            let offset = code.wrapping_sub(self.first_code[len]);
            if offset < self.counts[len] {
                return Ok(self.perms[(self.base_index[len] + offset) as usize]);
            }
        }

        Err(OxiBzError::invalid_huffman(reader.bits_consumed()))
    }

    /// Number of symbols with a code.
    pub fn num_symbols(&self) -> usize {
        self.perms.len()
    }

    /// Longest code length in the table.
    pub fn max_len(&self) -> u8 {
        self.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_huffman_table_creation() {
        let lengths = vec![2, 2, 3, 3, 2];
        let table = HuffmanTable::from_lengths(&lengths).unwrap();
        assert_eq!(table.min_len, 2);
        assert_eq!(table.max_len(), 3);
        assert_eq!(table.num_symbols(), 5);
    }

    #[test]
    fn test_decode_canonical_order() {
        // 0 -> "0", 1 -> "10", 2 -> "110", 3 -> "111"
        let table = HuffmanTable::from_lengths(&[1, 2, 3, 3]).unwrap();
        let mut reader = BitReader::new(Cursor::new(vec![0b0101_1011, 0b1000_0000]));

        let symbols: Vec<u16> = (0..4).map(|_| table.decode(&mut reader).unwrap()).collect();
        assert_eq!(symbols, vec![0, 1, 2, 3]);
        assert_eq!(reader.bits_consumed(), 9);
    }

    #[test]
    fn test_ties_broken_by_symbol_index() {
        // Same lengths listed out of symbol order: 2 gets "0", 0 gets "10", 1 gets "11".
        let table = HuffmanTable::from_lengths(&[2, 2, 1]).unwrap();
        let mut reader = BitReader::new(Cursor::new(vec![0b0101_1000]));

        assert_eq!(table.decode(&mut reader).unwrap(), 2);
        assert_eq!(table.decode(&mut reader).unwrap(), 0);
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
    }

    #[test]
    fn test_unused_symbols_skipped() {
        let table = HuffmanTable::from_lengths(&[0, 1, 0, 1]).unwrap();
        let mut reader = BitReader::new(Cursor::new(vec![0b1000_0000]));

        assert_eq!(table.decode(&mut reader).unwrap(), 3);
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
    }

    #[test]
    fn test_incomplete_code_rejects_unassigned_pattern() {
        // "0" and "10" are assigned; "11" is not.
        let table = HuffmanTable::from_lengths(&[1, 2]).unwrap();
        let mut reader = BitReader::new(Cursor::new(vec![0b1100_0000]));

        let err = table.decode(&mut reader).unwrap_err();
        assert!(matches!(err, OxiBzError::InvalidHuffmanCode { bit_position: 2 }));
    }

    #[test]
    fn test_over_subscribed_rejected() {
        assert!(HuffmanTable::from_lengths(&[1, 1, 1]).is_err());
        assert!(HuffmanTable::from_lengths(&[2, 2, 2, 2, 2]).is_err());
        // Exactly full is fine
        assert!(HuffmanTable::from_lengths(&[2, 2, 2, 2]).is_ok());
    }

    #[test]
    fn test_invalid_lengths_rejected() {
        assert!(HuffmanTable::from_lengths(&[]).is_err());
        assert!(HuffmanTable::from_lengths(&[0, 0]).is_err());
        assert!(HuffmanTable::from_lengths(&[1, 21]).is_err());
    }

    #[test]
    fn test_max_length_codes() {
        // One code per length 1..=19, two of length 20: a complete code.
        let mut lengths: Vec<u8> = (1..=20).collect();
        lengths.push(20);
        let table = HuffmanTable::from_lengths(&lengths).unwrap();

        // The last symbol's code is twenty 1-bits.
        let mut reader = BitReader::new(Cursor::new(vec![0xFF, 0xFF, 0xF0]));
        assert_eq!(table.decode(&mut reader).unwrap(), 20);
        assert_eq!(reader.bits_consumed(), 20);
    }

    #[test]
    fn test_truncated_code() {
        let table = HuffmanTable::from_lengths(&[1, 2, 3, 3]).unwrap();
        let mut reader = BitReader::new(Cursor::new(vec![0xFF]));

        // "111" x2 = 6 bits, then "11" and the source is dry.
        assert_eq!(table.decode(&mut reader).unwrap(), 3);
        assert_eq!(table.decode(&mut reader).unwrap(), 3);
        assert!(matches!(
            table.decode(&mut reader),
            Err(OxiBzError::TruncatedInput { .. })
        ));
    }
}
