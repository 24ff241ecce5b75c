/*!
  The decoded form of a command and its description: which word times it affects and what it
  does.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use super::Fields;
use crate::block::BLOCK_SIZE;
use crate::digits::int_to_dstr;
use crate::word::Word;

/// Transfer types decoded from `{(S > 27) | (D > 27), CH}`.
#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum TransferType {
  /// Transfer
  #[strum(serialize = "TR")]
  Tr,
  /// Add
  #[strum(serialize = "AD")]
  Ad,
  /// Transfer via AR
  #[strum(serialize = "TVA")]
  Tva,
  /// Add via AR
  #[strum(serialize = "AVA")]
  Ava,
  /// Absolute value
  #[strum(serialize = "AV")]
  Av,
  /// Subtract
  #[strum(serialize = "SU")]
  Su,
}

pub const TRANSFER_TYPES: [TransferType; 8] = [
  TransferType::Tr, TransferType::Ad, TransferType::Tva, TransferType::Ava,
  TransferType::Tr, TransferType::Ad, TransferType::Av,  TransferType::Su
];

pub const SOURCE_NAMES: [&str; 32] = [
  "00", "01", "02", "03", "04", "05", "06", "07", "08", "09",
  "10", "11", "12", "13", "14", "15", "16", "17", "18", "19",
  "20", "21", "22", "23",
  "MQ", "ID", "PN", "20&21|~20&AR",
  "AR", "20&IN", "20&21", "20&21"
];

pub const DESTINATION_NAMES: [&str; 32] = [
  "00", "01", "02", "03", "04", "05", "06", "07", "08", "09",
  "10", "11", "12", "13", "14", "15", "16", "17", "18", "19",
  "20", "21", "22", "23",
  "MQ", "ID", "PN", "TEST",
  "AR", "AR+", "PN+", "SPECIAL"
];

/// Command line names for decoding the CD register, indexed by the composite `C` digit.
pub const COMMAND_LINE_NAMES: [&str; 8] = ["00", "01", "02", "03", "04", "05", "19", "23"];

/**
  Special commands, selected by `S` when `D` is 31.

  The serialized name is the one printed when `CH` does not refine the command further. Commands
  whose meaning depends entirely on `CH` serialize as their bare number.
*/
#[derive(
  IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone, Copy, Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum SpecialOpcode {
  #[strum(serialize = "Set_Ready")]           SetReady,             // 00
  #[strum(serialize = "01")]                  MagTapeWrite,         // 01
  #[strum(serialize = "Fast_Pun_Leader")]     FastPunchLeader,      // 02
  #[strum(serialize = "Fast_Pun_M19")]        FastPunchM19,         // 03
  #[strum(serialize = "04")]                  MagTapeReverseSearch, // 04
  #[strum(serialize = "05")]                  MagTapeForwardSearch, // 05
  #[strum(serialize = "Tape_Rev0")]           TapeReverse0,         // 06
  #[strum(serialize = "Tape_Rev1")]           TapeReverse1,         // 07
  #[strum(serialize = "Type_AR")]             TypeAr,               // 08
  #[strum(serialize = "Type_M19")]            TypeM19,              // 09
  #[strum(serialize = "Pun_M19")]             PunchM19,             // 10
  #[strum(serialize = "Card_Pun_M19")]        CardPunchM19,         // 11
  #[strum(serialize = "Type_In")]             TypeIn,               // 12
  #[strum(serialize = "13")]                  MagTapeRead,          // 13
  #[strum(serialize = "Card_Read")]           CardRead,             // 14
  #[strum(serialize = "Tape_Read")]           TapeRead,             // 15
  #[strum(serialize = "HALT")]                Halt,                 // 16
  #[strum(serialize = "17")]                  BellAndInput,         // 17
  #[strum(serialize = "M20&ID_to_OUT")]       M20AndIdToOut,        // 18
  #[strum(serialize = "19")]                  Da1Control,           // 19
  #[strum(serialize = "20")]                  ReturnExit,           // 20
  #[strum(serialize = "21")]                  MarkExit,             // 21
  #[strum(serialize = "AR_Sign_Test")]        ArSignTest,           // 22
  #[strum(serialize = "23")]                  ClearOrExtract,       // 23
  #[strum(serialize = "Multiply")]            Multiply,             // 24
  #[strum(serialize = "25")]                  Divide,               // 25
  #[strum(serialize = "26")]                  Shift,                // 26
  #[strum(serialize = "27")]                  Normalize,            // 27
  #[strum(serialize = "28")]                  ReadyTest,            // 28
  #[strum(serialize = "Overflow_Test")]       OverflowTest,         // 29
  #[strum(serialize = "30")]                  MagTapeWriteFileCode, // 30
  #[strum(serialize = "31")]                  NextCommand,          // 31
}

impl SpecialOpcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The table name, before refinement by `CH`.
  pub fn base_name(&self) -> &'static str {
    self.into()
  }

  /**
    Whether the command times its effect relative to its own word time. Multiply, Divide, Shift
    and Normalize count `T` word times from the start rather than stopping at word time `T`.
  */
  pub fn is_relative_timing(&self) -> bool {
    (24..28).contains(&self.code())
  }

  /// The full name, refined by the characteristic `ch`, the composite `c`, and `n`.
  pub fn name(&self, ch: u8, c: u8, n: u8) -> String {
    use SpecialOpcode::*;

    let refined: Option<String> =
      match (self, ch) {
        (MagTapeWrite,         ch) => Some(format!("Mag_Tape_Write{}", ch)),
        (MagTapeReverseSearch, ch) => Some(format!("Mag_Tape_Rev_Search{}", ch)),
        (MagTapeForwardSearch, ch) => Some(format!("Mag_Tape_Fwd_Search{}", ch)),
        (MagTapeRead,          ch) => Some(format!("Mag_Tape_Read{}", ch)),

        (BellAndInput, 0) => Some("Ring_Bell".to_string()),
        (BellAndInput, 1) => Some("Man_Punch_Test".to_string()),
        (BellAndInput, 2) => Some("Start_INPUT".to_string()),
        (BellAndInput, 3) => Some("Stop_INPUT".to_string()),

        (Da1Control, 0) => Some("Start_DA-1".to_string()),
        (Da1Control, 1) => Some("Stop_DA-1".to_string()),

        (ReturnExit, _) => Some(format!(
          "Return_Exit->{}[{}]", COMMAND_LINE_NAMES[c as usize & 0x7], int_to_dstr(n as u32)
        )),
        (MarkExit,   _) => Some(format!(
          "Mark_Exit->{}[{}]", COMMAND_LINE_NAMES[c as usize & 0x7], int_to_dstr(n as u32)
        )),

        (ClearOrExtract, 0) => Some("Clear".to_string()),
        (ClearOrExtract, 3) => Some("PN&M2->ID, PN&~M2->PN".to_string()),

        (Divide, 1) => Some("Divide".to_string()),

        (Shift, 0) => Some("Shift_MQ_ID+".to_string()),
        (Shift, 1) => Some("Shift_MQ_ID".to_string()),

        (Normalize, 0) => Some("Normalize+".to_string()),
        (Normalize, 1) => Some("Normalize".to_string()),

        (ReadyTest, 0) => Some("Ready_Test".to_string()),
        (ReadyTest, 1) => Some("Ready_In_Test".to_string()),
        (ReadyTest, 2) => Some("Ready_Out_Test".to_string()),
        (ReadyTest, 3) => Some("DA-1_Off_Test".to_string()),

        (MagTapeWriteFileCode, ch) => Some(format!("MT_Write_FC{}", ch)),

        (NextCommand, 0) => Some("Next_Command_AR".to_string()),
        (NextCommand, 1) => Some("CN|M18->M18".to_string()),
        (NextCommand, 2) => Some("M18|M20->M18".to_string()),

        _ => None
      };

    refined.unwrap_or_else(|| self.base_name().to_string())
  }
}

/// What a command does, decided once from the destination field.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Command {
  Special {
    opcode: SpecialOpcode
  },
  Transfer {
    source      : u8,
    destination : u8,
    transfer    : TransferType
  }
}

#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Timing {
  #[strum(serialize = "I")]
  Immediate,
  #[strum(serialize = "D")]
  Deferred,
}

/// Inclusive range of word times a command acts on. The range may wrap past 107.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct AffectedRange {
  pub start : usize,
  pub end   : usize
}

impl Display for AffectedRange {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.start == self.end {
      true  => write!(f, "   [{}]", int_to_dstr(self.start as u32)),
      false => write!(f, "[{}:{}]", int_to_dstr(self.start as u32), int_to_dstr(self.end as u32))
    }
  }
}

/// A decoded command.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Instruction {
  pub fields  : Fields,
  pub command : Command
}

fn next_word_time(address: usize) -> usize {
  (address + 1) % BLOCK_SIZE
}

impl Instruction {
  pub fn decode(word: Word) -> Instruction {
    let fields = Fields::decode(word);

    let command =
      match fields.is_special() {
        true => {
          match SpecialOpcode::try_from(fields.s) {
            Ok(opcode) => Command::Special{ opcode },
            Err(_)     => unreachable!("S is a 5-bit field: {}", fields.s)
          }
        }
        false => {
          let via_ar = fields.s > 27 || fields.d > 27;
          let index  = fields.ch as usize + if via_ar { 4 } else { 0 };
          Command::Transfer {
            source      : fields.s,
            destination : fields.d,
            transfer    : TRANSFER_TYPES[index]
          }
        }
      };

    Instruction{ fields, command }
  }

  pub fn timing(&self) -> Timing {
    match self.fields.is_immediate() {
      true  => Timing::Immediate,
      false => Timing::Deferred
    }
  }

  /**
    The word times the command acts on when it is stored at `address`.

    An immediate command starts at the next word time. Mark Exit takes one word time; other
    commands end at word time `T - 1`, except the relative-timing commands (Multiply, Divide,
    Shift, Normalize) whose duration depends on the data. For those `T` is treated as a word
    count, which is only an approximation of the real duration of a shift or normalize.

    A deferred command starts at word time `T`. Single-word transfers and Mark Exit take one
    word time. A double-word transfer takes two, but one starting at an odd word time only
    transfers the one word.
  */
  pub fn affected_range(&self, address: usize) -> AffectedRange {
    let fields = &self.fields;
    let t = fields.t as usize;

    match self.timing() {
      Timing::Immediate => {
        let start = next_word_time(address);
        let relative = matches!(self.command, Command::Special{ opcode } if opcode.is_relative_timing());
        let end =
          if fields.is_mark() {
            start
          } else if !relative {
            (t + BLOCK_SIZE - 1) % BLOCK_SIZE
          } else {
            (t + BLOCK_SIZE + start - 1) % BLOCK_SIZE
          };
        AffectedRange{ start, end }
      }

      Timing::Deferred => {
        let start = t;
        let single = fields.is_mark() || fields.s_d == 0;
        let end =
          match single || start % 2 == 1 {
            true  => start,
            false => next_word_time(start)
          };
        AffectedRange{ start, end }
      }
    }
  }

  /// Name of the operation, e.g. `HALT` or `AR->TR->05`.
  pub fn name(&self) -> String {
    match self.command {
      Command::Special{ opcode } => {
        opcode.name(self.fields.ch, self.fields.c(), self.fields.n)
      }
      Command::Transfer{ source, destination, transfer } => {
        format!(
          "{}->{}->{}",
          SOURCE_NAMES[source as usize], transfer, DESTINATION_NAMES[destination as usize]
        )
      }
    }
  }

  pub fn describe(&self, address: usize) -> Semantics {
    Semantics {
      timing : self.timing(),
      range  : self.affected_range(address),
      name   : self.name()
    }
  }
}

/// What a command stored at a given address does.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Semantics {
  pub timing : Timing,
  pub range  : AffectedRange,
  pub name   : String
}

impl Display for Semantics {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {} {}", self.timing, self.range, self.name)
  }
}

/// Describes `word` as a command stored at `address`.
pub fn describe(word: Word, address: usize) -> Semantics {
  Instruction::decode(word).describe(address)
}
