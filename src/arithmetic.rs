/*!
  G-15 29-bit signed-magnitude arithmetic.

  Because of its bit-serial organization the G-15 does not re-complement a negative result of an
  addition or subtraction. Intermediate results in AR are always in two's complement form: a
  negative word is taken to already hold the two's complement of its magnitude. Block checksums
  are computed the same way, so reproducing them needs this quirk rather than true
  sign-magnitude addition.
*/

use crate::word::{Word, WORD_MASK, MAGNITUDE_MASK};

/// Pre-rotation encoding of a negative zero, which the adder reports as zero.
const NEGATIVE_ZERO: u32 = 0x1000_0000;

/// Adds `b` to `a` the way the G-15 accumulates into AR.
pub fn add29(a: Word, b: Word) -> Word {
  // Move the sign to bit 28 so that it takes part in the carry.
  let biased = (a.sign() << 28) | a.magnitude();
  let sum =
    match b.is_negative() {
      false => biased.wrapping_add(b.magnitude()),
      true  => biased.wrapping_sub(b.magnitude())
    } & WORD_MASK;

  if sum == NEGATIVE_ZERO {
    return Word::ZERO;
  }
  Word::from_bits((sum << 1) | (sum >> 28))
}

/// Sum of every word of a block, starting from zero.
pub fn checksum(words: &[Word]) -> Word {
  words.iter().fold(Word::ZERO, |sum, word| add29(sum, *word))
}

/**
  Given a target checksum and an actual checksum, returns the word that when added to the
  actual checksum produces the target. Bendix listings call this "Bal." or "Adj. Bal."

  The result is only meaningful when `is_balanceable(target, actual)` holds.
*/
pub fn balance_checksum(target: Word, actual: Word) -> Word {
  let t_mag = target.magnitude();
  let a_mag = actual.magnitude();

  if target.sign() == actual.sign() {
    // A plain addition or subtraction of the magnitude difference.
    match t_mag < a_mag {
      true  => Word::from_parts(a_mag - t_mag, true),
      false => Word::from_parts(t_mag - a_mag, false)
    }
  } else {
    // The two's complement of the difference, so that the carry flips the sign bit.
    match t_mag < a_mag {
      true  => Word::from_parts((a_mag - t_mag).wrapping_neg() & MAGNITUDE_MASK, false),
      false => Word::from_parts((t_mag - a_mag).wrapping_neg() & MAGNITUDE_MASK, true)
    }
  }
}

/**
  Whether any word added to `actual` yields `target`.

  Two targets are out of reach. A negative zero is never produced by the adder. And when the
  signs differ but the magnitudes are equal, the adjustment would need a magnitude of 2^28,
  one more than a word holds.
*/
pub fn is_balanceable(target: Word, actual: Word) -> bool {
  let negative_zero = target.is_negative() && target.magnitude() == 0;
  let unreachable_flip =
    target.sign() != actual.sign() && target.magnitude() == actual.magnitude();
  !(negative_zero || unreachable_flip)
}
