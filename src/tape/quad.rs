/*!
  Blocks are punched four words at a time. A quad packs 4 × 29 = 116 bits into 29 hexadecimal
  digits, preceded by a sign and followed by a terminator: the format's final terminator after
  the quad holding word 0 and its continuation mark after every other quad. Quads are punched
  from the top of the block down, so the lowest word of a quad is in its last digits and the
  last quad of the tape is the bottom of the block.

  Reading reverses this, filling the line from word 107 downwards. A block that stops before
  reaching word 0 is short and is moved down to start at word 0.
*/

#[cfg(feature = "trace_quads")]
use tracing::trace;

use crate::block::{shift_to_origin, Block, BLOCK_SIZE};
use crate::digits::{hex_symbol, hex_value};
use crate::error::{Diagnostic, Error, Location, Recovered, TapeSymbol};
use crate::word::{Word, WORD_BITS, WORD_MASK};

pub const QUAD_WORDS: usize = 4;
pub const QUAD_DIGITS: usize = 29;
/// Terminator of the quad holding word 0 on punched tape. It ends a block in every format.
pub const FINAL_TERMINATOR: char = 'S';

/// One quad record: sign, 29 digits, terminator.
fn quad_record(quad: u128, terminator: char) -> String {
  let mut record = String::with_capacity(QUAD_DIGITS + 2);
  record.push(if quad & 1 == 1 { '-' } else { ' ' });
  for i in (0..QUAD_DIGITS).rev() {
    record.push(hex_symbol((quad >> (4 * i)) as u32));
  }
  record.push(terminator);
  record
}

/// The quad records of a block, in punching order. `last` terminates the quad holding word 0.
pub fn encode_quads(words: &[Word], continuation: char, last: char) -> Vec<String> {
  let mut records = Vec::with_capacity(words.len() / QUAD_WORDS + 1);
  let mut quad: u128 = 0;

  for (address, word) in words.iter().enumerate().rev() {
    quad = (quad << WORD_BITS) | word.bits() as u128;
    if address % QUAD_WORDS == 0 {
      let terminator = if address == 0 { last } else { continuation };
      records.push(quad_record(quad, terminator));
      quad = 0;
    }
  }
  records
}

/// A tape character, as classified by the format being read.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Symbol {
  Digit(u32),
  Minus,
  /// End of a quad. `true` for the final terminator of a block.
  End(bool),
  Filler,
  Invalid(TapeSymbol),
}

impl Symbol {
  /// Classifies a character of a quad record. `continuation` is the terminator the format uses
  /// between quads. `S` is read as the end of a block in every format.
  pub fn from_char(c: char, continuation: char) -> Symbol {
    match c {
      '-'                     => Symbol::Minus,
      ' '                     => Symbol::Filler,
      FINAL_TERMINATOR        => Symbol::End(true),
      c if c == continuation  => Symbol::End(false),
      c                       => match hex_value(c) {
        Some(value) => Symbol::Digit(value),
        None        => Symbol::Invalid(TapeSymbol::Char(c))
      }
    }
  }
}

/// Reassembles one block from a stream of symbols.
#[derive(Debug)]
pub struct QuadDecoder {
  location    : Location,
  words       : Vec<Word>,
  /// Highest address the next quad is written to.
  index       : isize,
  quad        : u128,
  digits      : usize,
  quads       : usize,
  diagnostics : Vec<Diagnostic>
}

impl QuadDecoder {
  pub fn new(location: Location) -> QuadDecoder {
    QuadDecoder{
      location,
      words       : vec![Word::ZERO; BLOCK_SIZE],
      index       : BLOCK_SIZE as isize - 1,
      quad        : 0,
      digits      : 0,
      quads       : 0,
      diagnostics : vec![]
    }
  }

  /// Number of quads terminated so far.
  pub fn quads(&self) -> usize {
    self.quads
  }

  fn report(&mut self, error: Error) {
    tracing::warn!("{}: {}", self.location, error);
    self.diagnostics.push(Diagnostic::new(self.location, error));
  }

  pub fn push(&mut self, symbol: Symbol) {
    match symbol {
      Symbol::Digit(value) => {
        self.quad = (self.quad << 4) | (value & 0xF) as u128;
        self.digits += 1;
      }
      // The sign of a quad is repeated in its last digit.
      Symbol::Minus           => {}
      Symbol::End(_)          => self.end_quad(),
      Symbol::Filler          => {}
      Symbol::Invalid(symbol) => self.report(Error::InvalidTapeSymbol(symbol))
    }
  }

  fn end_quad(&mut self) {
    if self.digits != QUAD_DIGITS {
      self.report(Error::QuadDigitCountMismatch{ digits: self.digits, index: self.index });
    }

    if self.index < 0 {
      self.report(Error::BlockOverflow);
    } else {
      let mut quad = self.quad;
      let low = (self.index - 3) as usize;
      for address in low..low + QUAD_WORDS {
        self.words[address] = Word::from_bits((quad as u32) & WORD_MASK);
        quad >>= WORD_BITS;
      }
      #[cfg(feature = "trace_quads")]
      trace!("{}: quad at {}: {:?}", self.location, low, &self.words[low..low + QUAD_WORDS]);
      self.index -= QUAD_WORDS as isize;
    }

    self.quad   = 0;
    self.digits = 0;
    self.quads += 1;
  }

  /// The block read so far, shifted to origin if it is short.
  pub fn finish(self) -> Recovered<Block> {
    let words = shift_to_origin(self.words, self.index);
    Recovered::new(Block::new(words), self.diagnostics)
  }
}
