/*!
  Error and diagnostic types shared by every codec in the crate.

  Most problems found while assembling a source file or reading a tape image are not fatal:
  the offending line or quad is dropped, a `Diagnostic` is recorded, and processing goes on to
  the end of the block. Only a structurally invalid JSON document or a failing stream aborts a
  command.
*/

use std::fmt::{Display, Formatter};

use thiserror::Error as ThisError;

/// Which instruction field a `FieldOutOfRange` error refers to.
#[derive(strum_macros::Display, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Field {
  T,
  N,
  #[strum(serialize = "CH")]
  Ch,
  S,
  D,
  #[strum(serialize = "address")]
  Address,
}

#[derive(ThisError, Debug)]
pub enum Error {
  #[error("Invalid digit string: {0:?}")]
  InvalidDigitString(String),

  #[error("Invalid character in word: {0:?}")]
  InvalidWordCharacter(char),

  #[error("Invalid instruction syntax: {0:?}")]
  InvalidInstructionSyntax(String),

  #[error("Invalid {field} field: {value} (max {max})")]
  FieldOutOfRange {
    field : Field,
    value : u32,
    max   : u32
  },

  #[error("Invalid prefix {prefix:?} for destination {destination}")]
  InvalidPrefix {
    prefix      : String,
    destination : u8
  },

  #[error("Duplicate address {0}")]
  DuplicateAddress(usize),

  #[error("Invalid number of digits in quad data: {digits} (expected 29) at index {index}")]
  QuadDigitCountMismatch {
    digits : usize,
    index  : isize
  },

  #[error("Block data overflow (> 108 words)")]
  BlockOverflow,

  #[error("Invalid tape symbol: {0}")]
  InvalidTapeSymbol(TapeSymbol),

  #[error("Invalid JSON tape image: {0}")]
  MalformedJson(#[from] serde_json::Error),

  #[error("Missing block {0} in JSON tape image")]
  MissingBlockEntry(u32),

  #[error("Missing blocks {first} to {last} in JSON tape image")]
  MissingBlockEntries{ first: u32, last: u32 },

  #[error("No block {0} in tape image ({1} blocks read)")]
  NoSuchBlock(usize, usize),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The offending unit of an `InvalidTapeSymbol` error: a raw punched code or a character.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum TapeSymbol {
  Code(u8),
  Char(char),
}

impl Display for TapeSymbol {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      TapeSymbol::Code(code) => write!(f, "code {}", code),
      TapeSymbol::Char(c)    => write!(f, "{:?}", c),
    }
  }
}

/// Where a recovered error was found.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Location {
  /// 1-based line of an assembly source or PTI file.
  Line(usize),
  /// 0-based block of a tape image.
  Block(usize),
  /// 0-based entry of a JSON tape image.
  Entry(usize),
  /// Tape block number of a JSON tape image.
  BlockNumber(u32),
}

impl Display for Location {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Location::Line(line)          => write!(f, "line {}", line),
      Location::Block(block)        => write!(f, "block {}", block),
      Location::Entry(entry)        => write!(f, "entry {}", entry),
      Location::BlockNumber(number) => write!(f, "block number {}", number),
    }
  }
}

/// A recovered error together with its location.
#[derive(Debug)]
pub struct Diagnostic {
  pub location : Location,
  pub error    : Error
}

impl Diagnostic {
  pub fn new(location: Location, error: Error) -> Diagnostic {
    Diagnostic{ location, error }
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "Error at {}: {}", self.location, self.error)
  }
}

/**
  A value produced despite recoverable errors. The diagnostics are in the order they were found.
*/
#[derive(Debug)]
pub struct Recovered<T> {
  pub value       : T,
  pub diagnostics : Vec<Diagnostic>
}

impl<T> Recovered<T> {
  pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Recovered<T> {
    Recovered{ value, diagnostics }
  }

  pub fn is_clean(&self) -> bool {
    self.diagnostics.is_empty()
  }

  pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Recovered<U> {
    Recovered{ value: f(self.value), diagnostics: self.diagnostics }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_display(){
    assert_eq!(
      Error::FieldOutOfRange{ field: Field::Ch, value: 9, max: 7 }.to_string(),
      "Invalid CH field: 9 (max 7)"
    );
    assert_eq!(
      Error::InvalidTapeSymbol(TapeSymbol::Code(40)).to_string(),
      "Invalid tape symbol: code 40"
    );
    assert_eq!(Error::BlockOverflow.to_string(), "Block data overflow (> 108 words)");
  }

  #[test]
  fn diagnostic_display(){
    let diagnostic = Diagnostic::new(Location::Line(12), Error::DuplicateAddress(7));
    assert_eq!(diagnostic.to_string(), "Error at line 12: Duplicate address 7");
  }
}
