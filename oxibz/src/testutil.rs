//! Hand-assembled bzip2 bitstreams for unit tests.

use crate::{BLOCK_MAGIC, EOS_MAGIC};
use oxibz_core::Crc32;

/// MSB-first bit writer.
#[derive(Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    acc: u8,
    used: u32,
}

impl BitWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bit(&mut self, bit: bool) {
        self.acc = (self.acc << 1) | bit as u8;
        self.used += 1;
        if self.used == 8 {
            self.bytes.push(self.acc);
            self.acc = 0;
            self.used = 0;
        }
    }

    pub(crate) fn bits(&mut self, value: u64, count: u32) {
        for i in (0..count).rev() {
            self.bit((value >> i) & 1 == 1);
        }
    }

    pub(crate) fn bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.bits(byte as u64, 8);
        }
    }

    /// Pad with zero bits to a byte boundary and return the bytes.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        while self.used != 0 {
            self.bit(false);
        }
        self.bytes
    }
}

/// Knobs for [`write_ab_block`]; the defaults produce a valid block.
#[derive(Clone, Copy)]
pub(crate) struct AbBlock {
    pub(crate) crc: u32,
    pub(crate) randomized: bool,
    pub(crate) orig_ptr: u32,
    pub(crate) num_tables: u32,
    pub(crate) num_selectors: u32,
    pub(crate) start_len: u32,
}

impl Default for AbBlock {
    fn default() -> Self {
        Self {
            crc: Crc32::compute(b"ab"),
            randomized: false,
            orig_ptr: 0,
            num_tables: 2,
            num_selectors: 1,
            start_len: 2,
        }
    }
}

/// Write one block decoding to "ab".
///
/// BWT("ab") = "ba" with origin 0; MTF over [a, b] gives indices 1, 1,
/// i.e. symbols 2, 2, then end-of-block 3. Every table codes the four
/// symbols with 2 bits each: RUNA 00, RUNB 01, 2 -> 10, EOB -> 11.
pub(crate) fn write_ab_block(w: &mut BitWriter, block: AbBlock) {
    w.bits(BLOCK_MAGIC, 48);
    w.bits(block.crc as u64, 32);
    w.bit(block.randomized);
    w.bits(block.orig_ptr as u64, 24);

    // 'a' = 0x61 and 'b' = 0x62 both sit in range 6
    w.bits(0x8000 >> 6, 16);
    w.bits((0x8000 >> 1) | (0x8000 >> 2), 16);

    w.bits(block.num_tables as u64, 3);
    w.bits(block.num_selectors as u64, 15);
    for _ in 0..block.num_selectors {
        w.bit(false);
    }

    for _ in 0..block.num_tables {
        w.bits(block.start_len as u64, 5);
        for _ in 0..4 {
            w.bit(false);
        }
    }

    w.bits(0b10, 2);
    w.bits(0b10, 2);
    w.bits(0b11, 2);
}

/// Write an end-of-stream marker with its combined CRC.
pub(crate) fn write_footer(w: &mut BitWriter, combined_crc: u32) {
    w.bits(EOS_MAGIC, 48);
    w.bits(combined_crc as u64, 32);
}

/// A complete member holding `blocks` copies of the "ab" block.
pub(crate) fn ab_member(level: u8, blocks: usize) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.bytes(b"BZh");
    w.bytes(&[b'0' + level]);

    let crc = Crc32::compute(b"ab");
    let mut combined = 0;
    for _ in 0..blocks {
        write_ab_block(&mut w, AbBlock::default());
        combined = Crc32::combine(combined, crc);
    }
    write_footer(&mut w, combined);
    w.finish()
}
