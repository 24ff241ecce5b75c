/*!
  Tools for Bendix G-15 programs and paper tapes.

  The G-15 stores programs on a magnetic drum in 108-word lines and loads them from paper tape
  one line, a *block*, at a time. This crate assembles a block from source, lists and
  disassembles blocks, converts between the tape image formats, and computes block checksums
  with the machine's own adder.
*/

#[macro_use] extern crate lazy_static;

pub mod arithmetic;
pub mod block;
pub mod bytecode;
pub mod commands;
pub mod digits;
pub mod error;
pub mod listing;
pub mod tape;
pub mod word;

pub use block::{Block, BlockBuilder, BlockMap, Kind, Slot, BLOCK_SIZE};
pub use error::{Diagnostic, Error, Location, Recovered, Result};
pub use tape::{PtLayout, TapeFormat};
pub use word::Word;
