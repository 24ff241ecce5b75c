/*!
  The assembly form of a block is one word per line:

  ```text
  ADDR:PAYLOAD    # comment
  ```

  Whitespace anywhere on the line is ignored. `ADDR` is a dstr word address. A payload with a
  single dot is a constant in the word notation (`-.0000u30`). Any other payload is a command,
  `[prefix.]T.N.C.S.D`, optionally followed by `*` to set the breakpoint bit.

  Errors on a line are reported and the line is dropped; assembly always runs to the end of the
  source.
*/

use std::io::BufRead;

use nom::{
  bytes::complete::take_while,
  character::complete::{alphanumeric0, char as one_char},
  combinator::{all_consuming, opt},
  multi::separated_list1,
  sequence::{pair, separated_pair},
  IResult
};
use tracing::{debug, warn};

use super::assemble_fields;
use crate::block::{BlockBuilder, Kind, BLOCK_SIZE};
use crate::digits::dstr_to_int;
use crate::error::{Diagnostic, Error, Field, Location, Recovered, Result};
use crate::word::Word;

/// A successfully parsed source line.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct SourceLine {
  pub address : usize,
  pub word    : Word,
  pub kind    : Kind
}

/// Removes the comment and all whitespace.
fn strip_comment_and_whitespace(line: &str) -> String {
  let code = line.split('#').next().unwrap_or("");
  code.chars().filter(|c| !c.is_whitespace()).collect()
}

fn address_payload_p(input: &str) -> IResult<&str, (&str, &str)> {
  all_consuming(
    separated_pair(
      take_while(|c: char| c != ':'),
      one_char(':'),
      take_while(|c: char| c != ':')
    )
  )(input)
}

fn command_fields_p(input: &str) -> IResult<&str, (Vec<&str>, Option<char>)> {
  all_consuming(
    pair(
      separated_list1(one_char('.'), alphanumeric0),
      opt(one_char('*'))
    )
  )(input)
}

/// Assembles the command notation `[prefix.]T.N.C.S.D[*]`.
pub fn parse_instruction(text: &str) -> Result<Word> {
  let syntax_error = || Error::InvalidInstructionSyntax(text.to_string());

  let (_, (fields, star)) = command_fields_p(text).map_err(|_| syntax_error())?;

  let (prefix, numbers) =
    match fields.len() {
      5 => ("", &fields[..]),
      6 => (fields[0], &fields[1..]),
      _ => return Err(syntax_error())
    };

  let mut values = [0u32; 5];
  for (value, field) in values.iter_mut().zip(numbers) {
    if field.is_empty() {
      return Err(syntax_error());
    }
    *value = dstr_to_int(field).map_err(|_| syntax_error())?;
  }
  let [t, n, c, s, d] = values;

  assemble_fields(prefix, t, n, c, s, d, star.is_some())
}

/**
  Parses one source line. Blank and comment-only lines give `Ok(None)`.
*/
pub fn parse_line(line: &str) -> Result<Option<SourceLine>> {
  let code = strip_comment_and_whitespace(line);
  if code.is_empty() {
    return Ok(None);
  }

  let (_, (address_text, payload)) =
    address_payload_p(&code).map_err(|_| Error::InvalidInstructionSyntax(code.clone()))?;

  let address = dstr_to_int(address_text)?;
  if address as usize >= BLOCK_SIZE {
    return Err(Error::FieldOutOfRange{
      field : Field::Address,
      value : address,
      max   : BLOCK_SIZE as u32 - 1
    });
  }

  let (word, kind) =
    match payload.matches('.').count() {
      1 => (payload.parse::<Word>()?, Kind::Constant),
      _ => (parse_instruction(payload)?, Kind::Assembled)
    };

  Ok(Some(SourceLine{ address: address as usize, word, kind }))
}

/**
  Assembles a source file into a block. Read errors are fatal; errors in individual lines are
  returned as diagnostics. When two lines define the same address the first one wins.
*/
pub fn assemble_source<R: BufRead>(source: R) -> Result<Recovered<BlockBuilder>> {
  let mut builder     = BlockBuilder::new();
  let mut diagnostics = Vec::new();

  for (index, line) in source.lines().enumerate() {
    let line     = line?;
    let location = Location::Line(index + 1);

    let parsed =
      match parse_line(&line) {
        Ok(Some(parsed)) => parsed,
        Ok(None)         => continue,
        Err(error)       => {
          warn!("{}: {}: {}", location, error, line.trim());
          diagnostics.push(Diagnostic::new(location, error));
          continue;
        }
      };

    if builder.is_defined(parsed.address) {
      let error = Error::DuplicateAddress(parsed.address);
      warn!("{}: {}: {}", location, error, line.trim());
      diagnostics.push(Diagnostic::new(location, error));
      continue;
    }

    debug!("{}: {} {} at {}", location, parsed.kind, parsed.word, parsed.address);
    builder.define(parsed.address, parsed.word, parsed.kind);
  }

  Ok(Recovered::new(builder, diagnostics))
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::Slot;

  #[test]
  fn instruction_with_and_without_prefix(){
    assert_eq!(parse_instruction("01.02.3.04.05").unwrap().bits(), 270_555_402);
    assert_eq!(parse_instruction(".01.02.3.04.05").unwrap().bits(), 270_555_402);
    assert_eq!(parse_instruction("1.2.3.4.5").unwrap().bits(), 270_555_402);
  }

  #[test]
  fn breakpoint_flag(){
    let word = parse_instruction("u.10.11.0.28.29*").unwrap();
    assert_eq!(word.bits() >> 20 & 1, 1);
    assert_eq!(word.bits() >> 28 & 1, 0);
  }

  #[test]
  fn instruction_syntax_errors(){
    for text in &["01.02.3.04", "u.w.01.02.3.04.05", "01..3.04.05", "01.02.3.04.0a", "01.02*.3.04.05"] {
      assert!(
        matches!(parse_instruction(text), Err(Error::InvalidInstructionSyntax(_))),
        "{:?} should be a syntax error",
        text
      );
    }
  }

  #[test]
  fn prefix_error(){
    assert!(matches!(parse_instruction("x.01.02.3.04.05"), Err(Error::InvalidPrefix{ .. })));
  }

  #[test]
  fn constant_and_command_lines(){
    let constant = parse_line(" 12 : -.0000u30   # a constant").unwrap().unwrap();
    assert_eq!(constant.address, 12);
    assert_eq!(constant.kind, Kind::Constant);
    assert_eq!(constant.word, "-.0000u30".parse::<Word>().unwrap());

    let command = parse_line("u5: w.40.07.0.21.31").unwrap().unwrap();
    assert_eq!(command.address, 105);
    assert_eq!(command.kind, Kind::Assembled);

    assert!(parse_line("   # nothing here").unwrap().is_none());
    assert!(parse_line("").unwrap().is_none());
  }

  #[test]
  fn line_errors(){
    assert!(matches!(parse_line("12 -.0000u30"), Err(Error::InvalidInstructionSyntax(_))));
    assert!(matches!(parse_line("12:13:.0000001"), Err(Error::InvalidInstructionSyntax(_))));
    assert!(matches!(parse_line("a2:.0000001"), Err(Error::InvalidDigitString(_))));
    assert!(matches!(
      parse_line("u8:.0000001"),
      Err(Error::FieldOutOfRange{ field: Field::Address, value: 108, .. })
    ));
    assert!(matches!(parse_line("12:.00k0001"), Err(Error::InvalidWordCharacter('k'))));
  }

  #[test]
  fn assemble_block(){
    let source = "\
# test block
00: .01.02.3.04.05
01: -.0000001
01: .0000002      # duplicate, ignored
02: 01.02.9.04.05 # bad characteristic
03: u.00.00.0.16.31
";
    let recovered = assemble_source(source.as_bytes()).unwrap();
    let builder = &recovered.value;

    assert_eq!(recovered.diagnostics.len(), 3);
    assert_eq!(recovered.diagnostics[0].location, Location::Line(4));
    assert!(matches!(recovered.diagnostics[0].error, Error::DuplicateAddress(1)));
    assert_eq!(recovered.diagnostics[1].location, Location::Line(5));
    assert!(matches!(recovered.diagnostics[1].error, Error::FieldOutOfRange{ field: Field::Ch, .. }));
    assert!(matches!(recovered.diagnostics[2].error, Error::InvalidPrefix{ .. }));

    assert_eq!(builder.slots()[0], Slot::Value(Word::from_bits(270_555_402)));
    assert_eq!(builder.slots()[1], Slot::Value("-.0000001".parse().unwrap()));
    assert_eq!(builder.slots()[2], Slot::Undefined);
    assert_eq!(builder.map(), &vec![(Kind::Assembled, 0), (Kind::Constant, 1)]);
  }
}
