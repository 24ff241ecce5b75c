/*!
  This module is responsible for the packing and unpacking of command words.
*/

use std::str::FromStr;

use super::{Fields, Prefix, MAX_C, MAX_D, MAX_N, MAX_S, MAX_T, SPECIAL_DESTINATION};
use crate::error::{Error, Field, Result};
use crate::word::Word;

impl Fields {
  /// Splits a word into its command fields. Every word decodes.
  pub fn decode(word: Word) -> Fields {
    let bits = word.bits();
    Fields {
      i_d : ((bits >> 28) & 0x1)  as u8,
      t   : ((bits >> 21) & 0x7F) as u8,
      bp  :  (bits >> 20) & 0x1 == 1,
      n   : ((bits >> 13) & 0x7F) as u8,
      ch  : ((bits >> 11) & 0x3)  as u8,
      s   : ((bits >> 6)  & 0x1F) as u8,
      d   : ((bits >> 1)  & 0x1F) as u8,
      s_d :  (bits        & 0x1)  as u8,
    }
  }

  /// Packs the fields into a word. Out of range values are truncated to their field width.
  pub fn encode(&self) -> Word {
    Word::from_bits(
        ((self.i_d as u32 & 0x1)  << 28)
      | ((self.t   as u32 & 0x7F) << 21)
      | ((self.bp  as u32)        << 20)
      | ((self.n   as u32 & 0x7F) << 13)
      | ((self.ch  as u32 & 0x3)  << 11)
      | ((self.s   as u32 & 0x1F) << 6)
      | ((self.d   as u32 & 0x1F) << 1)
      |  (self.s_d as u32 & 0x1)
    )
  }
}

fn check_range(field: Field, value: u32, max: u32) -> Result<u8> {
  match value <= max {
    true  => Ok(value as u8),
    false => Err(Error::FieldOutOfRange{ field, value, max })
  }
}

/**
  Builds a command word from its assembly fields. `c` is the composite characteristic digit,
  with the single/double flag in bit 2.

  Whether `prefix` sets the deferred flag depends on the destination: for a special command
  (`d == 31`) the blank prefix means immediate and `w` deferred; for a transfer the blank
  prefix means deferred and `u` immediate.
*/
pub fn assemble_fields(
  prefix     : &str,
  t          : u32,
  n          : u32,
  c          : u32,
  s          : u32,
  d          : u32,
  breakpoint : bool
) -> Result<Word> {
  let t = check_range(Field::T,  t, MAX_T)?;
  let n = check_range(Field::N,  n, MAX_N)?;
  let c = check_range(Field::Ch, c, MAX_C)?;
  let s = check_range(Field::S,  s, MAX_S)?;
  let d = check_range(Field::D,  d, MAX_D)?;

  let invalid_prefix = || Error::InvalidPrefix{ prefix: prefix.to_string(), destination: d };
  let i_d =
    match (d == SPECIAL_DESTINATION, Prefix::from_str(prefix)) {
      (true,  Ok(Prefix::Blank)) => 0,
      (true,  Ok(Prefix::W))     => 1,
      (false, Ok(Prefix::Blank)) => 1,
      (false, Ok(Prefix::U))     => 0,
      _                          => return Err(invalid_prefix())
    };

  let fields = Fields {
    i_d,
    t,
    bp  : breakpoint,
    n,
    ch  : c & 0x3,
    s,
    d,
    s_d : c >> 2,
  };
  Ok(fields.encode())
}


#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn assemble_transfer(){
    let word = assemble_fields("", 1, 2, 3, 4, 5, false).unwrap();
    assert_eq!(word.bits(), 270_555_402);
  }

  #[test]
  fn disassemble_transfer(){
    let fields = Fields::decode(Word::from_bits(270_555_402));
    assert_eq!(fields.i_d, 1);
    assert_eq!(fields.t, 1);
    assert_eq!(fields.n, 2);
    assert_eq!(fields.ch, 3);
    assert_eq!(fields.s, 4);
    assert_eq!(fields.d, 5);
    assert_eq!(fields.s_d, 0);
    assert!(!fields.bp);
    assert_eq!(fields.prefix(), Prefix::Blank);
    assert_eq!(fields.prefix().as_str(), "");
  }

  #[test]
  fn prefix_depends_on_destination(){
    let immediate_transfer = Fields::decode(assemble_fields("u", 0, 0, 0, 0, 5, false).unwrap());
    assert_eq!(immediate_transfer.i_d, 0);
    assert_eq!(immediate_transfer.prefix(), Prefix::U);

    let immediate_special = Fields::decode(assemble_fields("", 0, 0, 0, 16, 31, false).unwrap());
    assert_eq!(immediate_special.i_d, 0);
    assert_eq!(immediate_special.prefix(), Prefix::Blank);

    let deferred_special = Fields::decode(assemble_fields("w", 0, 0, 0, 16, 31, false).unwrap());
    assert_eq!(deferred_special.i_d, 1);
    assert_eq!(deferred_special.prefix(), Prefix::W);
  }

  #[test]
  fn invalid_prefix(){
    assert!(matches!(
      assemble_fields("w", 0, 0, 0, 0, 5, false),
      Err(Error::InvalidPrefix{ destination: 5, .. })
    ));
    assert!(matches!(
      assemble_fields("u", 0, 0, 0, 0, 31, false),
      Err(Error::InvalidPrefix{ .. })
    ));
    assert!(matches!(
      assemble_fields("x", 0, 0, 0, 0, 31, false),
      Err(Error::InvalidPrefix{ .. })
    ));
  }

  #[test]
  fn field_ranges(){
    assert!(matches!(
      assemble_fields("", 128, 0, 0, 0, 0, false),
      Err(Error::FieldOutOfRange{ field: Field::T, value: 128, max: 127 })
    ));
    assert!(matches!(
      assemble_fields("", 0, 0, 8, 0, 0, false),
      Err(Error::FieldOutOfRange{ field: Field::Ch, .. })
    ));
    assert!(matches!(
      assemble_fields("", 0, 0, 0, 32, 0, false),
      Err(Error::FieldOutOfRange{ field: Field::S, .. })
    ));
  }

  #[test]
  fn breakpoint_and_double(){
    let fields = Fields::decode(assemble_fields("", 10, 11, 6, 28, 29, true).unwrap());
    assert!(fields.bp);
    assert_eq!(fields.s_d, 1);
    assert_eq!(fields.ch, 2);
    assert_eq!(fields.c(), 6);
    assert_eq!(fields.pretty(), " .10.11.6.28.29*");
  }

  proptest! {
    #[test]
    fn reassembling_decoded_fields(bits in 0u32..=0x1FFF_FFFF) {
      let word = Word::from_bits(bits);
      let fields = Fields::decode(word);
      let rebuilt = assemble_fields(
        fields.prefix().as_str(),
        fields.t as u32,
        fields.n as u32,
        fields.c() as u32,
        fields.s as u32,
        fields.d as u32,
        fields.bp
      ).unwrap();
      prop_assert_eq!(rebuilt, word);
    }
  }
}
