/*!
  The commands of `g15util`, over already opened streams. Each one returns what it produced
  along with the recoverable errors it met; the caller decides how to report them.
*/

use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::arithmetic::{add29, balance_checksum, is_balanceable};
use crate::block::{generic_block_map, Block, BlockMap, Slot};
use crate::bytecode::assemble_source;
use crate::error::{Diagnostic, Error, Recovered, Result};
use crate::listing::write_listing;
use crate::tape::pti::write_pti_block;
use crate::tape::{read_blocks, write_blocks, PtLayout, TapeFormat};
use crate::word::Word;

/// The outcome of assembling one source file.
#[derive(Debug)]
pub struct AssemblyReport {
  pub block       : Block,
  pub map         : BlockMap,
  /// Addresses no source line defined. They are zero in `block`.
  pub undefined   : Vec<usize>,
  pub diagnostics : Vec<Diagnostic>
}

/**
  Assembles `source` into one block, writing the listing to `listing` and the tape image to
  `pti`. The raw part of the listing shows undefined words as such; the checksum, decoded
  listing and tape image see them as zero.
*/
pub fn assemble<R, L, P>(source: R, listing: &mut L, pti: &mut P) -> Result<AssemblyReport>
  where R: BufRead,
        L: Write,
        P: Write
{
  let Recovered{ value: builder, diagnostics } = assemble_source(source)?;

  let slots: Vec<Slot> = builder.slots().to_vec();
  let undefined        = builder.undefined_addresses();
  let (block, map)     = builder.finalize();

  write_listing(listing, &slots, block.words(), &map)?;
  write_pti_block(&block, pti)?;

  info!(
    "Assembled {} words, {} undefined, {} errors, checksum {}",
    map.len(),
    undefined.len(),
    diagnostics.len(),
    block.checksum()
  );

  Ok(AssemblyReport{ block, map, undefined, diagnostics })
}

/// Lists `blocks`, or only block `selected` when given. Returns the number of blocks listed.
fn list_blocks<L: Write>(blocks: &[Block], listing: &mut L, selected: Option<usize>) -> Result<usize> {
  let indices: Vec<usize> =
    match selected {
      Some(index) if index >= blocks.len() => return Err(Error::NoSuchBlock(index, blocks.len())),
      Some(index)                          => vec![index],
      None                                 => (0..blocks.len()).collect()
    };

  for &index in &indices {
    let block = &blocks[index];
    let slots: Vec<Slot> = block.words().iter().map(|word| Slot::Value(*word)).collect();

    writeln!(listing, "\nBlock number: {}", index)?;
    write_listing(listing, &slots, block.words(), &generic_block_map(block.len()))?;
  }

  info!("Listed {} of {} blocks", indices.len(), blocks.len());
  Ok(indices.len())
}

/**
  Lists the blocks of a tape image, or only block `selected` when given. Every word is decoded
  as a command. Returns the number of blocks listed.
*/
pub fn disassemble<R, L>(
  format   : TapeFormat,
  input    : R,
  listing  : &mut L,
  selected : Option<usize>
) -> Result<Recovered<usize>>
  where R: BufRead,
        L: Write
{
  let Recovered{ value: blocks, diagnostics } = read_blocks(format, input)?;
  let listed = list_blocks(&blocks, listing, selected)?;
  Ok(Recovered::new(listed, diagnostics))
}

/**
  Assembles `source` and lists the resulting block the way `disassemble` lists a tape image.
  The source is block 0. Undefined words are listed as zero.
*/
pub fn disassemble_source<R, L>(
  source   : R,
  listing  : &mut L,
  selected : Option<usize>
) -> Result<Recovered<usize>>
  where R: BufRead,
        L: Write
{
  let Recovered{ value: blocks, diagnostics } =
    assemble_source(source)?.map(|builder| vec![builder.finalize().0]);
  let listed = list_blocks(&blocks, listing, selected)?;
  Ok(Recovered::new(listed, diagnostics))
}

/// Converts a tape image to `target`. Returns the number of blocks written.
pub fn convert<R, W>(
  format : TapeFormat,
  input  : R,
  target : TapeFormat,
  out    : &mut W,
  layout : &PtLayout
) -> Result<Recovered<usize>>
  where R: BufRead,
        W: Write
{
  let Recovered{ value: blocks, diagnostics } = read_blocks(format, input)?;
  info!("Converting {} blocks from {} to {}", blocks.len(), format, target);
  write_blocks(target, &blocks, out, layout)?;
  Ok(Recovered::new(blocks.len(), diagnostics))
}

/// The word that brings a block's checksum to a required value.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct BalanceReport {
  pub target     : Word,
  pub actual     : Word,
  pub adjustment : Word,
  /// `actual` plus `adjustment`.
  pub sum        : Word
}

impl Display for BalanceReport {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "r_sum: {} a_sum: {} adj: {} sum: {}",
      self.target, self.actual, self.adjustment, self.sum
    )
  }
}

pub fn balance(target: Word, actual: Word) -> BalanceReport {
  if !is_balanceable(target, actual) {
    warn!("No single word brings {} to {}", actual, target);
  }
  let adjustment = balance_checksum(target, actual);
  BalanceReport{
    target,
    actual,
    adjustment,
    sum : add29(actual, adjustment)
  }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct SumReport {
  pub ar  : Word,
  pub v   : Word,
  pub sum : Word
}

impl Display for SumReport {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "ar_add: {} v_add: {} sum: {}", self.ar, self.v, self.sum)
  }
}

/// Adds `v` to `ar` the way the checksum does.
pub fn sum(ar: Word, v: Word) -> SumReport {
  SumReport{ ar, v, sum: add29(ar, v) }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn word(text: &str) -> Word {
    text.parse().unwrap()
  }

  #[test]
  fn balance_report(){
    let report = balance(word(".0000010"), word(".0000004"));
    assert_eq!(report.adjustment, word(".000000w"));
    assert_eq!(report.sum, word(".0000010"));
    assert_eq!(
      report.to_string(),
      "r_sum:  .0000010 a_sum:  .0000004 adj:  .000000w sum:  .0000010"
    );
  }

  #[test]
  fn sum_report(){
    let report = sum(word(".0000002"), word("-.0000003"));
    assert_eq!(report.sum, word("-.zzzzzzz"));
    assert_eq!(report.to_string(), "ar_add:  .0000002 v_add: -.0000003 sum: -.zzzzzzz");
  }

  #[test]
  fn source_is_listed_as_one_block(){
    let source = "00: .01.02.3.04.05\n01: .0000001\n02: 1.2.3\n";
    let mut listing = Vec::new();
    let listed = disassemble_source(source.as_bytes(), &mut listing, None).unwrap();
    assert_eq!(listed.value, 1);
    assert_eq!(listed.diagnostics.len(), 1);

    let listing = String::from_utf8(listing).unwrap();
    assert!(listing.starts_with("\nBlock number: 0\nBlock raw data:"));
    assert!(!listing.contains("--------"));

    let mut listing = Vec::new();
    let result = disassemble_source(source.as_bytes(), &mut listing, Some(1));
    assert!(matches!(result, Err(Error::NoSuchBlock(1, 1))));
  }

  #[test]
  fn missing_block_is_an_error(){
    let mut listing = Vec::new();
    let result = disassemble(TapeFormat::Pti, "".as_bytes(), &mut listing, Some(0));
    assert!(matches!(result, Err(Error::NoSuchBlock(0, 0))));
  }
}
