//! The G-15 writes hexadecimal digits as `0-9` followed by `u v w x y z`. Addresses and
//! instruction fields are written as "dstr" numerals: a tens digit from that sixteen symbol
//! alphabet followed by an ordinary decimal units digit, so that `u7` is 107.

use crate::error::{Error, Result};

/// The sixteen symbols of a G-15 hexadecimal digit, in value order.
pub const DIGITS_0_Z: [char; 16] = [
  '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
  'u', 'v', 'w', 'x', 'y', 'z'
];

pub const DIGITS_0_9: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Largest value expressible as a dstr.
pub const MAX_DSTR: u32 = 159;

/// Value of a hexadecimal symbol, if it is one.
pub fn hex_value(c: char) -> Option<u32> {
  DIGITS_0_Z.iter().position(|&d| d == c).map(|i| i as u32)
}

/// Symbol of the low nibble of `value`.
pub fn hex_symbol(value: u32) -> char {
  DIGITS_0_Z[(value & 0xF) as usize]
}

/// Converts a one or two character dstr to its value. A single character is a units digit.
pub fn dstr_to_int(s: &str) -> Result<u32> {
  let chars: Vec<char> = s.chars().collect();
  let (tens, units) =
    match chars.as_slice() {
      [units]        => ('0', *units),
      [tens, units]  => (*tens, *units),
      _              => return Err(Error::InvalidDigitString(s.to_string()))
    };

  let tens  = hex_value(tens);
  let units = units.to_digit(10);
  match (tens, units) {
    (Some(tens), Some(units)) => Ok(tens * 10 + units),
    _                         => Err(Error::InvalidDigitString(s.to_string()))
  }
}

/// Formats `n` as a two character dstr. `n` must not exceed `MAX_DSTR`.
pub fn int_to_dstr(n: u32) -> String {
  debug_assert!(n <= MAX_DSTR, "dstr out of range: {}", n);
  let mut text = String::with_capacity(2);
  text.push(DIGITS_0_Z[(n / 10) as usize]);
  text.push(DIGITS_0_9[(n % 10) as usize]);
  text
}

/// The units digit of `n`.
pub fn int_to_digit(n: u32) -> char {
  DIGITS_0_9[(n % 10) as usize]
}
