/*!
  The G-15 word is 29 bits: a 28-bit magnitude in bits 28..1 and the sign in bit 0. Written out
  it is a sign (`-` or a space), a dot, and the seven hexadecimal digits of the magnitude, e.g.
  `-.0u30z51`.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::digits::{hex_symbol, hex_value};
use crate::error::Error;

pub const WORD_BITS: u32 = 29;
pub const WORD_MASK: u32 = 0x1FFF_FFFF;
pub const MAGNITUDE_MASK: u32 = 0x0FFF_FFFF;

/// A 29-bit signed-magnitude word. The constructor masks off anything above bit 28.
#[derive(Copy, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Word(u32);

impl Word {
  pub const ZERO: Word = Word(0);

  pub fn from_bits(bits: u32) -> Word {
    Word(bits & WORD_MASK)
  }

  /// Builds a word from a magnitude (masked to 28 bits) and a sign.
  pub fn from_parts(magnitude: u32, negative: bool) -> Word {
    Word(((magnitude & MAGNITUDE_MASK) << 1) | negative as u32)
  }

  pub fn bits(&self) -> u32 {
    self.0
  }

  pub fn is_negative(&self) -> bool {
    self.0 & 1 == 1
  }

  /// The sign bit, 0 or 1.
  pub fn sign(&self) -> u32 {
    self.0 & 1
  }

  pub fn magnitude(&self) -> u32 {
    self.0 >> 1
  }

  /// The same magnitude with the opposite sign.
  pub fn negate(&self) -> Word {
    Word(self.0 ^ 1)
  }
}

impl Display for Word {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let sign = if self.is_negative() { '-' } else { ' ' };
    let magnitude = self.magnitude();
    let digits: String = (0..7).rev().map(|i| hex_symbol(magnitude >> (4 * i))).collect();
    write!(f, "{}.{}", sign, digits)
  }
}

/**
  Parses the dotted form. Dots and spaces are ignored and a `-` anywhere makes the word
  negative, so the digits may be split by dots however the author liked and the blank sign of
  a positive word reads back. Digits beyond the seventh shift the
  leading ones out of the word.
*/
impl FromStr for Word {
  type Err = Error;

  fn from_str(s: &str) -> Result<Word, Error> {
    let mut negative = false;
    let mut magnitude: u32 = 0;

    for c in s.chars() {
      match c {
        '.' | ' ' => continue,
        '-'       => negative = true,
        c         => {
          let value = hex_value(c).ok_or(Error::InvalidWordCharacter(c))?;
          magnitude = (magnitude << 4) | value;
        }
      }
    }

    Ok(Word::from_parts(magnitude, negative))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn format_word(){
    assert_eq!(Word::ZERO.to_string(), " .0000000");
    assert_eq!(Word::from_parts(0xA30, true).to_string(), "-.0000u30");
    assert_eq!(Word::from_bits(0x1FFF_FFFF).to_string(), "-.zzzzzzz");
    assert_eq!(Word::from_parts(0x123_4567, false).to_string(), " .1234567");
  }

  #[test]
  fn parse_word(){
    assert_eq!(" .1234567".parse::<Word>().unwrap(), Word::from_parts(0x123_4567, false));
    assert_eq!(" .0000000".parse::<Word>().unwrap(), Word::ZERO);
    assert_eq!("-.00000z1".parse::<Word>().unwrap(), Word::from_parts(0xF1, true));
    assert_eq!("1".parse::<Word>().unwrap(), Word::from_parts(1, false));
  }

  #[test]
  fn invalid_character(){
    assert!(matches!("-.00a0000".parse::<Word>(), Err(Error::InvalidWordCharacter('a'))));
    assert!(matches!("+.0000000".parse::<Word>(), Err(Error::InvalidWordCharacter('+'))));
  }

  #[test]
  fn negate_flips_only_the_sign(){
    let word = Word::from_parts(0x42, false);
    assert_eq!(word.negate(), Word::from_parts(0x42, true));
    assert_eq!(word.negate().negate(), word);
  }

  proptest! {
    #[test]
    fn text_round_trip(bits in 0u32..=WORD_MASK) {
      let word = Word::from_bits(bits);
      prop_assert_eq!(word.to_string().parse::<Word>().unwrap(), word);
    }
  }
}
