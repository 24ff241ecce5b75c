/*!

  A G-15 command occupies one 29-bit word. From the most significant bit down the fields are:

    I/D:  1 bit   immediate (0) or deferred (1) execution
    T:    7 bits  timing number, the word time at which the command ends
    BP:   1 bit   breakpoint
    N:    7 bits  word time of the next command
    CH:   2 bits  characteristic, the arithmetic combine mode or a sub-operation
    S:    5 bits  source line or register
    D:    5 bits  destination line or register
    S/D:  1 bit   single (0) or double (1) word transfer

  The meaning of a command depends on the fields themselves. A destination of 31 makes the
  command a special command: `S` selects the operation and `CH` often refines it. Any other
  destination makes it a transfer from `S` to `D`. Even the assembler prefix depends on `D`:
  `u` marks an immediate transfer, while `w` marks a deferred special command, because the
  unmarked form of each is the common one.

  In assembly the characteristic field holds `S/D` and `CH` together as one digit `C`, with
  `S/D` in bit 2.

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{assemble_source, parse_instruction, parse_line, SourceLine};
pub use binary::assemble_fields;
pub use instruction::{
  describe, AffectedRange, Command, Instruction, Semantics, SpecialOpcode, Timing, TransferType,
  COMMAND_LINE_NAMES, DESTINATION_NAMES, SOURCE_NAMES, TRANSFER_TYPES
};

use std::fmt::{Display, Formatter};

use strum_macros::{EnumString, IntoStaticStr};

use crate::digits::{int_to_digit, int_to_dstr};

/// Destination number that turns a command into a special command.
pub const SPECIAL_DESTINATION: u8 = 31;
/// Special command 21, Mark Exit, which affects a single word time.
pub const MARK_OPCODE: u8 = 21;

pub const MAX_T: u32 = 127;
pub const MAX_N: u32 = 127;
pub const MAX_C: u32 = 7;
pub const MAX_S: u32 = 31;
pub const MAX_D: u32 = 31;

/// The assembler prefix of a command.
#[derive(
  IntoStaticStr, EnumString,
  Clone, Copy, Eq, PartialEq, Debug, Hash
)]
pub enum Prefix {
  #[strum(serialize = "")]
  Blank,
  #[strum(serialize = "u")]
  U,
  #[strum(serialize = "w")]
  W,
}

impl Prefix {
  pub fn as_str(&self) -> &'static str {
    self.into()
  }
}

/// The listing shows a blank prefix as a space so that the dots line up.
impl Display for Prefix {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Prefix::Blank => write!(f, " "),
      prefix        => write!(f, "{}", prefix.as_str())
    }
  }
}

/// The raw bit fields of a command word.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Default)]
pub struct Fields {
  pub i_d : u8,
  pub t   : u8,
  pub bp  : bool,
  pub n   : u8,
  /// The two-bit characteristic, without `s_d`.
  pub ch  : u8,
  pub s   : u8,
  pub d   : u8,
  pub s_d : u8,
}

impl Fields {
  pub fn is_special(&self) -> bool {
    self.d == SPECIAL_DESTINATION
  }

  pub fn is_mark(&self) -> bool {
    self.is_special() && self.s == MARK_OPCODE
  }

  pub fn is_immediate(&self) -> bool {
    self.i_d == 0
  }

  /// The composite characteristic digit `C` of the assembly form.
  pub fn c(&self) -> u8 {
    (self.s_d << 2) | self.ch
  }

  /// The prefix the assembler needs to reproduce `i_d`.
  pub fn prefix(&self) -> Prefix {
    match (self.is_special(), self.i_d) {
      (false, 0) => Prefix::U,
      (true,  1) => Prefix::W,
      _          => Prefix::Blank
    }
  }

  /// The assembly form, `p.TT.NN.C.SS.DD` followed by `*` for a breakpoint or a space.
  pub fn pretty(&self) -> String {
    format!(
      "{}.{}.{}.{}.{}.{}{}",
      self.prefix(),
      int_to_dstr(self.t as u32),
      int_to_dstr(self.n as u32),
      int_to_digit(self.c() as u32),
      int_to_dstr(self.s as u32),
      int_to_dstr(self.d as u32),
      if self.bp { '*' } else { ' ' }
    )
  }
}
