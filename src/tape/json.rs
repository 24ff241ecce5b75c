/*!
  A JSON capture holds the readings of a tape reader that may have read a block several times:

  ```json
  { "entries": [ { "blocknum": 0, "nerrors": 0, "checksum": " .0000000", "data": "..." } ] }
  ```

  `data` is the block's quad records run together, each ending in `R`. Each entry holds a
  single block, so no terminator marks the end of a block; the reader still accepts the `S`
  of punched tape.
*/

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::quad::{encode_quads, QuadDecoder, Symbol};
use super::reconcile::reconcile;
use crate::block::Block;
use crate::error::{Diagnostic, Error, Location, Recovered, Result};

pub const TERMINATOR: char = 'R';

/// One reading of a tape block.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct TapeEntry {
  pub blocknum : u32,
  /// Errors the reader noticed while reading the block.
  pub nerrors  : u32,
  /// The checksum as recorded by the reader, in word notation.
  pub checksum : String,
  pub data     : String
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Default)]
pub struct TapeImage {
  pub entries: Vec<TapeEntry>
}

impl TapeImage {
  pub fn from_reader<R: Read>(input: R) -> Result<TapeImage> {
    Ok(serde_json::from_reader(input)?)
  }

  /// An image with one clean reading per block, numbered from 0.
  pub fn from_blocks(blocks: &[Block]) -> TapeImage {
    let entries =
      blocks.iter()
            .enumerate()
            .map(|(index, block)| TapeEntry{
              blocknum : index as u32,
              nerrors  : 0,
              checksum : block.checksum().to_string(),
              data     : encode_quads(block.words(), TERMINATOR, TERMINATOR).concat()
            })
            .collect();
    TapeImage{ entries }
  }
}

pub fn decode_entry(entry: &TapeEntry, location: Location) -> Recovered<Block> {
  let mut decoder = QuadDecoder::new(location);
  for c in entry.data.chars() {
    decoder.push(Symbol::from_char(c, TERMINATOR));
  }
  decoder.finish()
}

/**
  Reads a JSON capture and returns one block per tape block number, choosing the best reading
  of each. A document that does not parse is an error; everything else is recovered.
*/
pub fn read_json<R: Read>(input: R) -> Result<Recovered<Vec<Block>>> {
  let image = TapeImage::from_reader(input)?;

  let mut readings: Vec<Option<Recovered<Block>>> = Vec::with_capacity(image.entries.len());
  for (index, entry) in image.entries.iter().enumerate() {
    let reading = decode_entry(entry, Location::Entry(index));
    info!(
      "Index: {} Block: {} Len: {} Errors: {} Checksum: {} Calc: {}",
      index,
      entry.blocknum,
      reading.value.len(),
      entry.nerrors,
      entry.checksum,
      reading.value.checksum()
    );
    readings.push(Some(reading));
  }

  let selections = reconcile(&image.entries);
  let mut diagnostics: Vec<Diagnostic> = selections.diagnostics;
  let mut blocks = Vec::with_capacity(selections.value.len());

  for selection in selections.value {
    if let Some(reading) = readings[selection.entry].take() {
      diagnostics.extend(reading.diagnostics);
      blocks.push(reading.value);
    }
  }

  Ok(Recovered::new(blocks, diagnostics))
}

pub fn write_json<W: Write>(blocks: &[Block], out: &mut W) -> Result<()> {
  serde_json::to_writer_pretty(&mut *out, &TapeImage::from_blocks(blocks))
    .map_err(|error| Error::Io(error.into()))?;
  writeln!(out)?;
  Ok(())
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::word::Word;

  fn block(len: usize, seed: u32) -> Block {
    Block::new((0..len as u32).map(|i| Word::from_parts(i * 0x1_0001 + seed, i % 4 == 1)).collect())
  }

  fn entry(blocknum: u32, nerrors: u32, block: &Block) -> TapeEntry {
    TapeEntry{
      blocknum,
      nerrors,
      checksum : block.checksum().to_string(),
      data     : encode_quads(block.words(), TERMINATOR, TERMINATOR).concat()
    }
  }

  #[test]
  fn round_trip(){
    let blocks = vec![block(108, 1), block(12, 2)];
    let mut out = Vec::new();
    write_json(&blocks, &mut out).unwrap();

    let recovered = read_json(&out[..]).unwrap();
    assert!(recovered.is_clean());
    assert_eq!(recovered.value, blocks);
  }

  #[test]
  fn written_entries(){
    let image = TapeImage::from_blocks(&[block(8, 0)]);
    let entry = &image.entries[0];
    assert_eq!(entry.blocknum, 0);
    assert_eq!(entry.nerrors, 0);
    assert_eq!(entry.data.matches('R').count(), 2);
    assert!(entry.data.ends_with('R'));
    assert!(!entry.data.contains('S'));
    assert_eq!(entry.checksum, block(8, 0).checksum().to_string());
  }

  #[test]
  fn punched_tape_terminator_is_accepted(){
    let reading = TapeEntry{
      blocknum : 0,
      nerrors  : 0,
      checksum : String::new(),
      data     : encode_quads(block(8, 4).words(), TERMINATOR, 'S').concat()
    };
    assert!(reading.data.ends_with('S'));
    let recovered = decode_entry(&reading, Location::Entry(0));
    assert!(recovered.is_clean());
    assert_eq!(recovered.value, block(8, 4));
  }

  #[test]
  fn best_reading_is_selected(){
    let good = block(108, 5);
    let bad  = block(108, 9);
    let image = TapeImage{
      entries: vec![entry(0, 0, &block(4, 0)), entry(2, 3, &bad), entry(2, 0, &good)]
    };
    let text = serde_json::to_string(&image).unwrap();

    let recovered = read_json(text.as_bytes()).unwrap();
    assert_eq!(recovered.value, vec![block(4, 0), good]);
    assert_eq!(recovered.diagnostics.len(), 1);
    assert!(matches!(recovered.diagnostics[0].error, Error::MissingBlockEntry(1)));
  }

  #[test]
  fn slash_is_not_a_terminator(){
    let reading = TapeEntry{
      blocknum : 0,
      nerrors  : 0,
      checksum : String::new(),
      data     : encode_quads(block(4, 3).words(), '/', 'S').concat()
    };
    let recovered = decode_entry(&reading, Location::Entry(0));
    assert_eq!(recovered.value, block(4, 3));
    assert!(recovered.is_clean());

    let damaged = TapeEntry{ data: reading.data.replace('S', "/"), ..reading };
    let recovered = decode_entry(&damaged, Location::Entry(0));
    assert!(recovered.value.is_empty());
    assert!(matches!(recovered.diagnostics[0].error, Error::InvalidTapeSymbol(_)));
  }

  #[test]
  fn malformed_document(){
    assert!(matches!(read_json("{ \"entries\": [ {".as_bytes()), Err(Error::MalformedJson(_))));
    assert!(matches!(read_json("{ \"blocks\": [] }".as_bytes()), Err(Error::MalformedJson(_))));
  }
}
