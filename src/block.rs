/*!
  A block is the unit of tape storage: up to 108 words, one drum long line.

  Blocks are built in two ways. The assembler fills a `BlockBuilder` one source line at a time,
  in any address order, and finalizes it into a `Block` once the source is exhausted. Tape
  readers produce a `Block` directly, which may be shorter than 108 words (see
  `shift_to_origin`).
*/

use std::ops::Index;

use crate::arithmetic::checksum;
use crate::word::Word;

pub const BLOCK_SIZE: usize = 108;

/// One word of a block under construction.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Slot {
  Undefined,
  Value(Word)
}

impl Slot {
  pub fn word(&self) -> Option<Word> {
    match self {
      Slot::Undefined   => None,
      Slot::Value(word) => Some(*word)
    }
  }
}

impl Default for Slot {
  fn default() -> Slot {
    Slot::Undefined
  }
}

/// How the assembler filled an address.
#[derive(strum_macros::Display, Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Kind {
  #[strum(serialize = "A")]
  Assembled,
  #[strum(serialize = "C")]
  Constant
}

/// Addresses in the order the source defined them.
pub type BlockMap = Vec<(Kind, usize)>;

/// A block map that treats every word of a block of length `len` as an instruction.
pub fn generic_block_map(len: usize) -> BlockMap {
  (0..len).map(|address| (Kind::Assembled, address)).collect()
}

/// An ordered sequence of at most `BLOCK_SIZE` words.
#[derive(Clone, Default, Eq, PartialEq, Debug, Hash)]
pub struct Block {
  words: Vec<Word>
}

impl Block {
  pub fn new(words: Vec<Word>) -> Block {
    debug_assert!(words.len() <= BLOCK_SIZE);
    Block{ words }
  }

  pub fn words(&self) -> &[Word] {
    &self.words
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  pub fn checksum(&self) -> Word {
    checksum(&self.words)
  }
}

impl Index<usize> for Block {
  type Output = Word;

  fn index(&self, address: usize) -> &Word {
    &self.words[address]
  }
}

/**
  Normalizes a block read from tape. The words of a tape block are written at the top of the
  line, so a block of fewer than 108 words ends up in `words[last_index + 1..]`. Those words are
  moved down to address 0 and the rest discarded. `last_index` is the next address the reader
  would have written, `-1` for a full block.
*/
pub fn shift_to_origin(mut words: Vec<Word>, last_index: isize) -> Vec<Word> {
  if last_index == -1 {
    return words;
  }
  let start = (last_index + 1).max(0) as usize;
  words.drain(..start.min(words.len()));
  words
}

/// A 108-word block being filled in by the assembler.
#[derive(Clone, Debug)]
pub struct BlockBuilder {
  slots : [Slot; BLOCK_SIZE],
  map   : BlockMap
}

impl BlockBuilder {
  pub fn new() -> BlockBuilder {
    BlockBuilder{
      slots : [Slot::Undefined; BLOCK_SIZE],
      map   : vec![]
    }
  }

  pub fn slots(&self) -> &[Slot] {
    &self.slots
  }

  pub fn map(&self) -> &BlockMap {
    &self.map
  }

  pub fn is_defined(&self, address: usize) -> bool {
    self.slots[address] != Slot::Undefined
  }

  /// Stores `word` at `address` and records it in the block map. The caller checks for
  /// duplicates.
  pub fn define(&mut self, address: usize, word: Word, kind: Kind) {
    self.slots[address] = Slot::Value(word);
    self.map.push((kind, address));
  }

  /// Addresses that no source line defined.
  pub fn undefined_addresses(&self) -> Vec<usize> {
    self.slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| **slot == Slot::Undefined)
        .map(|(address, _)| address)
        .collect()
  }

  /// Replaces undefined words with zero.
  pub fn finalize(self) -> (Block, BlockMap) {
    let words = self.slots.iter().map(|slot| slot.word().unwrap_or(Word::ZERO)).collect();
    (Block::new(words), self.map)
  }
}

impl Default for BlockBuilder {
  fn default() -> BlockBuilder {
    BlockBuilder::new()
  }
}
