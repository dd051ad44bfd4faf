//! Single block decoding.
//!
//! A block is decoded in explicit phases. Each call to
//! [`BlockDecoder::decode`] runs the phases in order until the block is
//! verified or an end-of-stream marker is found instead of a block:
//!
//! ```text
//! ExpectBlockHeader ─┬─> ReadTables -> DecodeSymbols -> InverseMtf
//!                    │     -> InverseBwt -> InverseRle -> Validate -> Done
//!                    └─> EndOfStream
//! ```
//!
//! Buffers are kept between blocks, so one decoder serves a whole stream
//! without reallocating once it has seen its largest block.

use crate::huffman::{
    HuffmanTable, MAX_CODE_LEN, MAX_SELECTORS, MAX_TABLES, MIN_TABLES, SYMBOLS_PER_GROUP,
};
use crate::mtf::{self, MtfList};
use crate::randomize::Derandomizer;
use crate::{BLOCK_MAGIC, EOS_MAGIC, MAX_BLOCK_SIZE, bwt, rle};
use oxibz_core::error::{OxiBzError, Result};
use oxibz_core::{BitReader, Crc32};
use std::io::Read;

/// Zero-run symbol adding 1 × the current weight.
const RUNA: u16 = 0;
/// Zero-run symbol adding 2 × the current weight.
const RUNB: u16 = 1;

/// Decoding phase of the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPhase {
    /// Reading the 48-bit marker and the block CRC.
    ExpectBlockHeader,
    /// Reading flags, origin pointer, byte map, selectors and code lengths.
    ReadTables,
    /// Huffman decoding with zero runs expanded into MTF indices.
    DecodeSymbols,
    /// Resolving MTF indices into the last BWT column.
    InverseMtf,
    /// Walking the BWT successor vector, derandomizing if flagged.
    InverseBwt,
    /// Expanding initial run-length encoding into the output.
    InverseRle,
    /// Checking the output against the block CRC.
    Validate,
    /// Block decoded and verified.
    Done,
    /// The end-of-stream marker was read instead of a block.
    EndOfStream,
}

impl BlockPhase {
    /// True for `Done` and `EndOfStream`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::EndOfStream)
    }
}

/// Result of one [`BlockDecoder::decode`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// A block was decoded; `crc` is its verified checksum.
    Decoded {
        /// Block CRC, for folding into the stream CRC.
        crc: u32,
    },
    /// The stream's end marker; the footer CRC follows.
    EndOfStream,
}

/// Decoder for one block at a time.
#[derive(Debug)]
pub struct BlockDecoder {
    max_block_len: usize,
    phase: BlockPhase,
    block_number: u64,
    expected_crc: u32,
    randomized: bool,
    orig_ptr: usize,
    /// Byte values present in the block, ascending.
    in_use: Vec<u8>,
    tables: Vec<HuffmanTable>,
    selectors: Vec<u8>,
    /// MTF indices, resolved in place into the last BWT column.
    symbols: Vec<u8>,
    next: Vec<u32>,
    bwt_output: Vec<u8>,
}

impl BlockDecoder {
    /// Create a decoder accepting blocks of up to `max_block_len` symbols.
    pub fn new(max_block_len: usize) -> Self {
        Self {
            max_block_len: max_block_len.min(MAX_BLOCK_SIZE),
            phase: BlockPhase::ExpectBlockHeader,
            block_number: 0,
            expected_crc: 0,
            randomized: false,
            orig_ptr: 0,
            in_use: Vec::with_capacity(256),
            tables: Vec::with_capacity(MAX_TABLES),
            selectors: Vec::new(),
            symbols: Vec::new(),
            next: Vec::new(),
            bwt_output: Vec::new(),
        }
    }

    /// Change the block length limit, for a member with another block size.
    pub fn set_max_block_len(&mut self, max_block_len: usize) {
        self.max_block_len = max_block_len.min(MAX_BLOCK_SIZE);
    }

    /// Current block length limit.
    pub fn max_block_len(&self) -> usize {
        self.max_block_len
    }

    /// Phase reached by the last call; where it stopped if that call failed.
    pub fn phase(&self) -> BlockPhase {
        self.phase
    }

    /// Whether the last block read had the randomized flag.
    pub fn is_randomized(&self) -> bool {
        self.randomized
    }

    /// Decode the next block into `output` (cleared first).
    ///
    /// `block_number` is only used to label a CRC mismatch.
    pub fn decode<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        block_number: u64,
        output: &mut Vec<u8>,
    ) -> Result<BlockOutcome> {
        output.clear();
        self.block_number = block_number;
        self.phase = BlockPhase::ExpectBlockHeader;

        while !self.phase.is_terminal() {
            self.phase = self.step(reader, output)?;
        }

        Ok(match self.phase {
            BlockPhase::EndOfStream => BlockOutcome::EndOfStream,
            _ => BlockOutcome::Decoded {
                crc: self.expected_crc,
            },
        })
    }

    /// Run the current phase and return the next one.
    fn step<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        output: &mut Vec<u8>,
    ) -> Result<BlockPhase> {
        match self.phase {
            BlockPhase::ExpectBlockHeader => self.read_block_header(reader),
            BlockPhase::ReadTables => self.read_tables(reader),
            BlockPhase::DecodeSymbols => self.decode_symbols(reader),
            BlockPhase::InverseMtf => {
                let mut list = MtfList::new(&self.in_use);
                mtf::inverse_transform_in_place(&mut self.symbols, &mut list);
                Ok(BlockPhase::InverseBwt)
            }
            BlockPhase::InverseBwt => {
                bwt::inverse_transform_into(
                    &self.symbols,
                    self.orig_ptr,
                    &mut self.next,
                    &mut self.bwt_output,
                )
                .map_err(|e| e.at_offset(reader.bits_consumed()))?;
                if self.randomized {
                    Derandomizer::new().apply(&mut self.bwt_output);
                }
                Ok(BlockPhase::InverseRle)
            }
            BlockPhase::InverseRle => {
                rle::rle1_decode_into(&self.bwt_output, output)
                    .map_err(|e| e.at_offset(reader.bits_consumed()))?;
                Ok(BlockPhase::Validate)
            }
            BlockPhase::Validate => {
                let computed = Crc32::compute(output);
                if computed != self.expected_crc {
                    return Err(OxiBzError::block_crc_mismatch(
                        self.block_number,
                        self.expected_crc,
                        computed,
                    ));
                }
                Ok(BlockPhase::Done)
            }
            BlockPhase::Done | BlockPhase::EndOfStream => Ok(self.phase),
        }
    }

    fn read_block_header<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<BlockPhase> {
        match reader.read_u48()? {
            BLOCK_MAGIC => {
                self.expected_crc = reader.read_u32()?;
                Ok(BlockPhase::ReadTables)
            }
            EOS_MAGIC => Ok(BlockPhase::EndOfStream),
            other => Err(OxiBzError::invalid_magic(
                BLOCK_MAGIC.to_be_bytes()[2..].to_vec(),
                other.to_be_bytes()[2..].to_vec(),
            )),
        }
    }

    fn read_tables<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<BlockPhase> {
        self.randomized = reader.read_bit()?;
        self.orig_ptr = reader.read_bits(24)? as usize;

        // Two-level bitmap of byte values in use
        self.in_use.clear();
        let ranges = reader.read_bits(16)?;
        for i in 0..16 {
            if ranges & (0x8000 >> i) != 0 {
                let bits = reader.read_bits(16)?;
                for j in 0..16 {
                    if bits & (0x8000 >> j) != 0 {
                        self.in_use.push((i * 16 + j) as u8);
                    }
                }
            }
        }
        if self.in_use.is_empty() {
            return Err(OxiBzError::corrupted(
                reader.bits_consumed(),
                "no byte values in use",
            ));
        }
        let alpha_size = self.in_use.len() + 2;

        let num_tables = reader.read_bits(3)? as usize;
        if !(MIN_TABLES..=MAX_TABLES).contains(&num_tables) {
            return Err(OxiBzError::corrupted(
                reader.bits_consumed(),
                format!("invalid number of Huffman tables: {}", num_tables),
            ));
        }

        let num_selectors = reader.read_bits(15)? as usize;
        if num_selectors == 0 {
            return Err(OxiBzError::corrupted(reader.bits_consumed(), "no selectors"));
        }

        // Selectors: unary-coded MTF indices over the table numbers
        self.selectors.clear();
        let mut selector_mtf = MtfList::identity(num_tables);
        for i in 0..num_selectors {
            let mut idx = 0;
            while reader.read_bit()? {
                idx += 1;
                if idx >= num_tables {
                    return Err(OxiBzError::corrupted(
                        reader.bits_consumed(),
                        "selector index out of range",
                    ));
                }
            }
            if i < MAX_SELECTORS {
                self.selectors.push(selector_mtf.move_to_front(idx));
            }
        }

        // Code lengths: 5-bit start, then per symbol a run of
        // "1x" adjustments (x = 0: +1, x = 1: -1) closed by a "0".
        self.tables.clear();
        let mut lengths = Vec::with_capacity(alpha_size);
        for _ in 0..num_tables {
            lengths.clear();
            let mut current = reader.read_bits(5)? as i32;
            for _ in 0..alpha_size {
                loop {
                    if !(1..=MAX_CODE_LEN as i32).contains(&current) {
                        return Err(OxiBzError::corrupted(
                            reader.bits_consumed(),
                            format!("code length {} out of range", current),
                        ));
                    }
                    if !reader.read_bit()? {
                        break;
                    }
                    if reader.read_bit()? {
                        current -= 1;
                    } else {
                        current += 1;
                    }
                }
                lengths.push(current as u8);
            }

            let table = HuffmanTable::from_lengths(&lengths)
                .map_err(|e| e.at_offset(reader.bits_consumed()))?;
            self.tables.push(table);
        }

        Ok(BlockPhase::DecodeSymbols)
    }

    fn decode_symbols<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<BlockPhase> {
        let end_of_block = (self.in_use.len() + 1) as u16;
        let max_len = self.max_block_len;

        self.symbols.clear();
        let mut run = 0usize;
        let mut weight = 1usize;
        let mut group = 0usize;
        let mut group_left = 0usize;
        let mut table = 0usize;

        loop {
            if group_left == 0 {
                let Some(&selector) = self.selectors.get(group) else {
                    return Err(OxiBzError::corrupted(
                        reader.bits_consumed(),
                        "symbols continue past the last selector",
                    ));
                };
                table = selector as usize;
                group += 1;
                group_left = SYMBOLS_PER_GROUP;
            }
            group_left -= 1;

            let sym = self.tables[table].decode(reader)?;

            if sym == RUNA || sym == RUNB {
                // Bijective base 2: RUNA adds weight, RUNB adds 2 * weight
                run += weight << sym;
                weight <<= 1;
                if self.symbols.len() + run > max_len {
                    return Err(OxiBzError::corrupted(
                        reader.bits_consumed(),
                        "zero run overflows block",
                    ));
                }
                continue;
            }

            if run > 0 {
                let len = self.symbols.len();
                self.symbols.resize(len + run, 0);
                run = 0;
                weight = 1;
            }

            if sym == end_of_block {
                break;
            }

            if self.symbols.len() >= max_len {
                return Err(OxiBzError::corrupted(
                    reader.bits_consumed(),
                    "block exceeds declared size",
                ));
            }
            self.symbols.push((sym - 1) as u8);
        }

        Ok(BlockPhase::InverseMtf)
    }
}
