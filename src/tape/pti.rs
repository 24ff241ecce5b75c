/*!
  PTI is the text image of a paper tape: one quad record per line, a `/` after each quad but
  the last of a block, `S` after the last. `#` starts a comment and whitespace is insignificant,
  so a block is everything up to and including the first line containing `S`.
*/

use std::io::{BufRead, Write};

use super::quad::{encode_quads, QuadDecoder, Symbol, FINAL_TERMINATOR};
use crate::block::Block;
use crate::error::{Diagnostic, Location, Recovered, Result};

pub const CONTINUATION: char = '/';

const BLOCK_HEADER: &str = "# PTI block data:";

pub fn write_pti_block<W: Write>(block: &Block, out: &mut W) -> Result<()> {
  writeln!(out, "{}", BLOCK_HEADER)?;
  for record in encode_quads(block.words(), CONTINUATION, FINAL_TERMINATOR) {
    writeln!(out, "{}", record)?;
  }
  Ok(())
}

pub fn write_pti<W: Write>(blocks: &[Block], out: &mut W) -> Result<()> {
  for block in blocks {
    write_pti_block(block, out)?;
  }
  Ok(())
}

fn strip_comment_and_whitespace(line: &str) -> String {
  let code = line.split('#').next().unwrap_or("");
  code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Reads every block of a PTI image. Data left after the last `S` forms a final block.
pub fn read_pti<R: BufRead>(input: R) -> Result<Recovered<Vec<Block>>> {
  let mut blocks: Vec<Block>           = Vec::new();
  let mut diagnostics: Vec<Diagnostic> = Vec::new();
  let mut decoder: Option<QuadDecoder> = None;

  for line in input.lines() {
    let code = strip_comment_and_whitespace(&line?);
    if code.is_empty() {
      continue;
    }

    let current = decoder.get_or_insert_with(|| QuadDecoder::new(Location::Block(blocks.len())));
    for c in code.chars() {
      current.push(Symbol::from_char(c, CONTINUATION));
    }

    if code.contains(FINAL_TERMINATOR) {
      if let Some(finished) = decoder.take() {
        let recovered = finished.finish();
        diagnostics.extend(recovered.diagnostics);
        blocks.push(recovered.value);
      }
    }
  }

  if let Some(finished) = decoder.take() {
    let recovered = finished.finish();
    diagnostics.extend(recovered.diagnostics);
    blocks.push(recovered.value);
  }

  Ok(Recovered::new(blocks, diagnostics))
}


#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use crate::block::BLOCK_SIZE;
  use crate::error::Error;
  use crate::word::{Word, WORD_MASK};

  fn block(len: usize, seed: u32) -> Block {
    Block::new(
      (0..len as u32).map(|i| Word::from_parts((i + seed) * 0x0123, i % 2 == 1)).collect()
    )
  }

  #[test]
  fn writes_header_and_records(){
    let mut out = Vec::new();
    write_pti_block(&block(8, 1), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "# PTI block data:");
    assert!(lines[1].ends_with('/'));
    assert!(lines[2].ends_with('S'));
    assert_eq!(lines[2].len(), 31);
  }

  #[test]
  fn round_trip_of_several_blocks(){
    let blocks = vec![block(108, 0), block(4, 7), block(108, 3)];
    let mut out = Vec::new();
    write_pti(&blocks, &mut out).unwrap();

    let recovered = read_pti(&out[..]).unwrap();
    assert!(recovered.is_clean());
    assert_eq!(recovered.value, blocks);
  }

  #[test]
  fn comments_and_spacing_are_ignored(){
    let mut out = Vec::new();
    write_pti_block(&block(4, 2), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let record = text.lines().nth(1).unwrap();
    let (head, tail) = record.split_at(12);
    let spaced = format!("# leading comment\n\n  {}  {}   # trailing\n", head, tail);

    let recovered = read_pti(spaced.as_bytes()).unwrap();
    assert!(recovered.is_clean());
    assert_eq!(recovered.value, vec![block(4, 2)]);
  }

  #[test]
  fn empty_image_has_no_blocks(){
    let recovered = read_pti("# nothing\n\n".as_bytes()).unwrap();
    assert!(recovered.value.is_empty());
  }

  #[test]
  fn errors_carry_the_block_index(){
    let mut out = Vec::new();
    write_pti(&[block(4, 0), block(4, 1)], &mut out).unwrap();
    let damaged = String::from_utf8(out).unwrap()
      .lines()
      .map(|line| match line.starts_with('#') {
        true  => line.to_string(),
        false => line.replacen('0', "k", 1)
      })
      .collect::<Vec<String>>()
      .join("\n");

    let recovered = read_pti(damaged.as_bytes()).unwrap();
    assert_eq!(recovered.value.len(), 2);
    assert_eq!(recovered.diagnostics.len(), 4);
    assert_eq!(recovered.diagnostics[0].location, Location::Block(0));
    assert_eq!(recovered.diagnostics[2].location, Location::Block(1));
    assert!(matches!(recovered.diagnostics[3].error, Error::QuadDigitCountMismatch{ digits: 28, .. }));
  }

  proptest! {
    #[test]
    fn any_full_block_round_trips(bits in prop::collection::vec(0u32..=WORD_MASK, BLOCK_SIZE)) {
      let block = Block::new(bits.into_iter().map(Word::from_bits).collect());
      let mut out = Vec::new();
      write_pti(&[block.clone()], &mut out).unwrap();

      let recovered = read_pti(&out[..]).unwrap();
      prop_assert!(recovered.is_clean());
      prop_assert_eq!(recovered.value, vec![block]);
    }
  }
}
