/*!
  Listings written by the assembler and the disassembler. A listing has three parts: the raw
  words of the block as a table, the calculated checksum, and the decoded block, one line per
  entry of the block map.

  ```text
  Block raw data:
        │     0          1          2      …
  ──────┼──────────────────────────────────
    00: │  .0000000  -.0000u30   --------  …

  Calculated checksum: -.0000u30

  Decoded block data:
      00:  .01.02.3.04.05    # D    [01] 04->AVA->05
      01: -.0000u30
  ```
*/

use std::io::Write;

use prettytable::{format as TableFormat, Cell, Row, Table};

use crate::block::{BlockMap, Kind, Slot};
use crate::bytecode::{describe, Fields};
use crate::digits::int_to_dstr;
use crate::error::Result;
use crate::word::Word;

/// Words per row of the raw table.
pub const ROW_WORDS: usize = 10;

const UNDEFINED_WORD: &str = "--------";

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/// The raw words of a block, ten to a row, each row labelled with its first address.
pub fn raw_table(slots: &[Slot]) -> Table {
  let mut table = Table::new();
  table.set_format(*TABLE_DISPLAY_FORMAT);

  let mut titles = vec![Cell::new("")];
  titles.extend((0..ROW_WORDS).map(|column| Cell::new(&column.to_string()).style_spec("bc")));
  table.set_titles(Row::new(titles));

  for (row, chunk) in slots.chunks(ROW_WORDS).enumerate() {
    let label     = format!("{}:", int_to_dstr((row * ROW_WORDS) as u32));
    let mut cells = vec![Cell::new(&label).style_spec("r")];
    cells.extend(chunk.iter().map(|slot| match slot {
      Slot::Value(word) => Cell::new(&word.to_string()),
      Slot::Undefined   => Cell::new(UNDEFINED_WORD).style_spec("r")
    }));
    table.add_row(Row::new(cells));
  }
  table
}

pub fn write_raw<W: Write>(out: &mut W, slots: &[Slot]) -> Result<()> {
  writeln!(out, "Block raw data:")?;
  write!(out, "{}", raw_table(slots))?;
  Ok(())
}

pub fn write_checksum<W: Write>(out: &mut W, checksum: Word) -> Result<()> {
  writeln!(out, "\nCalculated checksum: {}", checksum)?;
  Ok(())
}

/// One line of the decoded listing. Commands show their assembly form and what they do.
pub fn decoded_line(address: usize, word: Word, kind: Kind) -> String {
  let label = int_to_dstr(address as u32);
  match kind {
    Kind::Constant  => format!("    {}: {}", label, word),
    Kind::Assembled => format!(
      "    {}: {}   # {}",
      label,
      Fields::decode(word).pretty(),
      describe(word, address)
    )
  }
}

/// Decoded lines in block map order. Map entries beyond the end of `words` are skipped.
pub fn write_decoded<W: Write>(out: &mut W, words: &[Word], map: &BlockMap) -> Result<()> {
  writeln!(out, "\nDecoded block data:")?;
  for (kind, address) in map {
    if let Some(word) = words.get(*address) {
      writeln!(out, "{}", decoded_line(*address, *word, *kind))?;
    }
  }
  Ok(())
}

/// The raw table, checksum, and decoded lines of one block.
pub fn write_listing<W: Write>(
  out   : &mut W,
  slots : &[Slot],
  words : &[Word],
  map   : &BlockMap
) -> Result<()> {
  write_raw(out, slots)?;
  write_checksum(out, crate::arithmetic::checksum(words))?;
  write_decoded(out, words, map)
}
