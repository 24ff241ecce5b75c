/*!
  PT is the raw paper tape: one 5-bit code per byte. Codes map to characters through
  `PT_CODE_TABLE`, and the characters form quad records as in PTI. Code 0 is blank tape and is
  skipped wherever it appears, so blocks are separated by runs of blank tape.
*/

use std::io::{Read, Write};

use bimap::BiMap;

use super::quad::{encode_quads, QuadDecoder, Symbol, FINAL_TERMINATOR};
use crate::block::Block;
use crate::error::{Diagnostic, Error, Location, Recovered, Result, TapeSymbol};

pub const CONTINUATION: char = '/';

/// Character punched by each 5-bit code. `?` codes are reserved.
pub const PT_CODE_TABLE: [char; 32] = [
  ' ', '0', '?', '8', 'S', '4', '?', 'w',
  'R', '2', '?', 'u', '.', '6', '?', 'y',
  '-', '1', '?', '9', '/', '5', '?', 'x',
  'T', '3', '?', 'v', 'W', '7', '?', 'z',
];

const RESERVED: char = '?';

lazy_static! {
  static ref PT_CODES: BiMap<u8, char> = {
    let mut codes = BiMap::new();
    for (code, c) in PT_CODE_TABLE.iter().enumerate() {
      if *c != RESERVED {
        codes.insert(code as u8, *c);
      }
    }
    codes
  };
}

/// Lengths of blank tape, in codes, around the punched blocks.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct PtLayout {
  pub leader  : usize,
  pub gap     : usize,
  pub trailer : usize
}

impl Default for PtLayout {
  fn default() -> PtLayout {
    PtLayout{
      leader  : 30,
      gap     : 75,
      trailer : 30
    }
  }
}

fn pt_code(c: char) -> Result<u8> {
  PT_CODES
    .get_by_right(&c)
    .copied()
    .ok_or(Error::InvalidTapeSymbol(TapeSymbol::Char(c)))
}

fn pt_symbol(code: u8) -> Symbol {
  match PT_CODES.get_by_left(&code) {
    Some(c) => Symbol::from_char(*c, CONTINUATION),
    None    => Symbol::Invalid(TapeSymbol::Code(code))
  }
}

pub fn write_pt_block<W: Write>(block: &Block, out: &mut W) -> Result<()> {
  for record in encode_quads(block.words(), CONTINUATION, FINAL_TERMINATOR) {
    let codes = record.chars().map(pt_code).collect::<Result<Vec<u8>>>()?;
    out.write_all(&codes)?;
  }
  Ok(())
}

pub fn write_pt<W: Write>(blocks: &[Block], out: &mut W, layout: &PtLayout) -> Result<()> {
  for (index, block) in blocks.iter().enumerate() {
    let blank = match index { 0 => layout.leader, _ => layout.gap };
    out.write_all(&vec![0u8; blank])?;
    write_pt_block(block, out)?;
  }
  out.write_all(&vec![0u8; layout.trailer])?;
  Ok(())
}

/**
  Reads every block of a PT image. A block ends at the first `S`; the tape ends when a block
  would hold no quads.
*/
pub fn read_pt<R: Read>(mut input: R) -> Result<Recovered<Vec<Block>>> {
  let mut tape = Vec::new();
  input.read_to_end(&mut tape)?;

  let mut blocks: Vec<Block>           = Vec::new();
  let mut diagnostics: Vec<Diagnostic> = Vec::new();
  let mut codes                        = tape.into_iter();

  loop {
    let mut decoder = QuadDecoder::new(Location::Block(blocks.len()));
    for code in codes.by_ref() {
      let symbol = pt_symbol(code);
      decoder.push(symbol);
      if symbol == Symbol::End(true) {
        break;
      }
    }

    let empty     = decoder.quads() == 0;
    let recovered = decoder.finish();
    diagnostics.extend(recovered.diagnostics);
    if empty {
      break;
    }
    blocks.push(recovered.value);
  }

  Ok(Recovered::new(blocks, diagnostics))
}


#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use crate::block::BLOCK_SIZE;
  use crate::word::{Word, WORD_MASK};

  fn block(len: usize) -> Block {
    Block::new((0..len as u32).map(|i| Word::from_parts(i * 0x0F0F_0F + 1, i % 5 == 0)).collect())
  }

  #[test]
  fn code_table(){
    assert_eq!(pt_code(' ').unwrap(), 0);
    assert_eq!(pt_code('S').unwrap(), 4);
    assert_eq!(pt_code('/').unwrap(), 20);
    assert_eq!(pt_code('-').unwrap(), 16);
    assert_eq!(pt_code('z').unwrap(), 31);
    assert!(pt_code('?').is_err());
    assert_eq!(pt_symbol(2), Symbol::Invalid(TapeSymbol::Code(2)));
    assert_eq!(pt_symbol(40), Symbol::Invalid(TapeSymbol::Code(40)));
    assert_eq!(pt_symbol(8), Symbol::Invalid(TapeSymbol::Char('R')));
  }

  #[test]
  fn layout_of_blank_tape(){
    let mut out = Vec::new();
    let layout = PtLayout{ leader: 3, gap: 5, trailer: 2 };
    write_pt(&[block(4), block(4)], &mut out, &layout).unwrap();

    // Each single quad block is 31 codes.
    assert_eq!(out.len(), 3 + 31 + 5 + 31 + 2);
    assert!(out[..3].iter().all(|&code| code == 0));
    assert_eq!(out[3 + 30], 4);
    assert!(out[out.len() - 2..].iter().all(|&code| code == 0));
  }

  #[test]
  fn round_trip(){
    let blocks = vec![block(BLOCK_SIZE), block(8), block(BLOCK_SIZE)];
    let mut out = Vec::new();
    write_pt(&blocks, &mut out, &PtLayout::default()).unwrap();

    let recovered = read_pt(&out[..]).unwrap();
    assert!(recovered.is_clean());
    assert_eq!(recovered.value, blocks);
  }

  #[test]
  fn blank_tape_has_no_blocks(){
    let recovered = read_pt(&[0u8; 50][..]).unwrap();
    assert!(recovered.value.is_empty());
    assert!(recovered.is_clean());
  }

  #[test]
  fn invalid_codes_are_skipped(){
    let mut out = Vec::new();
    write_pt(&[block(4)], &mut out, &PtLayout::default()).unwrap();
    out.insert(40, 0xFF);
    out.insert(41, 6);

    let recovered = read_pt(&out[..]).unwrap();
    assert_eq!(recovered.value, vec![block(4)]);
    assert_eq!(recovered.diagnostics.len(), 2);
    assert!(matches!(
      recovered.diagnostics[0].error,
      Error::InvalidTapeSymbol(TapeSymbol::Code(0xFF))
    ));
    assert!(matches!(
      recovered.diagnostics[1].error,
      Error::InvalidTapeSymbol(TapeSymbol::Code(6))
    ));
  }

  proptest! {
    #[test]
    fn any_full_block_round_trips(bits in prop::collection::vec(0u32..=WORD_MASK, BLOCK_SIZE)) {
      let block = Block::new(bits.into_iter().map(Word::from_bits).collect());
      let mut out = Vec::new();
      write_pt(&[block.clone()], &mut out, &PtLayout::default()).unwrap();

      let recovered = read_pt(&out[..]).unwrap();
      prop_assert!(recovered.is_clean());
      prop_assert_eq!(recovered.value, vec![block]);
    }
  }
}
