//! CRC-32 as used by bzip2.
//!
//! bzip2 protects every block with the non-reflected ("MSB-first") CRC-32
//! variant, catalogued as CRC-32/BZIP2:
//!
//! - Polynomial: 0x04C11DB7 (not reflected)
//! - Initial value: 0xFFFFFFFF
//! - Final XOR: 0xFFFFFFFF
//! - Reflected input/output: No
//!
//! This is *not* the ZIP/GZIP CRC-32 even though the polynomial is the
//! same; bits are processed from the most significant end.
//!
//! Each stream footer carries a combined CRC: the block CRCs folded in
//! order with a one-bit left rotation before each XOR (see
//! [`Crc32::combine`]).
//!
//! ## Performance
//!
//! Data of 16 bytes or more is processed with the "slicing-by-8"
//! technique, eight bytes per step using eight pre-computed tables.

/// CRC-32/BZIP2 lookup table (polynomial 0x04C11DB7, MSB-first).
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ 0x04C1_1DB7;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// CRC-32/BZIP2 slicing-by-8 lookup tables.
const CRC32_TABLE_SLICE: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];
    tables[0] = CRC32_TABLE;

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = (prev << 8) ^ tables[0][(prev >> 24) as usize];
            i += 1;
        }
        t += 1;
    }

    tables
};

/// CRC-32/BZIP2 calculator.
///
/// # Example
///
/// ```
/// use oxibz_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"123456789");
/// assert_eq!(crc.finalize(), 0xFC891918);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFF_FFFF }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.crc = 0xFFFF_FFFF;
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        if data.len() >= 16 {
            crc32_slice8(&mut self.crc, data);
        } else {
            crc32_sw(&mut self.crc, data);
        }
    }

    /// Update the CRC with a single byte.
    #[inline(always)]
    pub fn update_byte(&mut self, byte: u8) {
        self.crc = (self.crc << 8) ^ CRC32_TABLE[((self.crc >> 24) ^ byte as u32) as usize];
    }

    /// Get the current CRC value (without finalizing).
    #[inline(always)]
    pub fn value(&self) -> u32 {
        self.crc ^ 0xFFFF_FFFF
    }

    /// Finalize and return the CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFF_FFFF
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }

    /// Fold a block CRC into a running stream CRC.
    ///
    /// Order-dependent: swapping two blocks changes the result.
    #[inline]
    pub fn combine(stream_crc: u32, block_crc: u32) -> u32 {
        stream_crc.rotate_left(1) ^ block_crc
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte-at-a-time CRC-32. Best for small data (< 16 bytes).
#[inline]
fn crc32_sw(crc: &mut u32, data: &[u8]) {
    for &byte in data {
        *crc = (*crc << 8) ^ CRC32_TABLE[((*crc >> 24) ^ byte as u32) as usize];
    }
}

/// Slicing-by-8 CRC-32 for large inputs.
#[inline]
fn crc32_slice8(crc: &mut u32, data: &[u8]) {
    let mut c = *crc;
    let mut chunks = data.chunks_exact(8);

    for bytes in &mut chunks {
        let x = c ^ u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        c = CRC32_TABLE_SLICE[7][(x >> 24) as usize]
            ^ CRC32_TABLE_SLICE[6][((x >> 16) & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[5][((x >> 8) & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[4][(x & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[3][bytes[4] as usize]
            ^ CRC32_TABLE_SLICE[2][bytes[5] as usize]
            ^ CRC32_TABLE_SLICE[1][bytes[6] as usize]
            ^ CRC32_TABLE_SLICE[0][bytes[7] as usize];
    }

    crc32_sw(&mut c, chunks.remainder());
    *crc = c;
}
