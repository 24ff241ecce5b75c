/*!
  Tape images. All three formats share the quad record of `quad`:

  * `pti` is the text image, one quad per line.
  * `pt` is the punched tape itself, one 5-bit code per byte.
  * `json` is a capture from a tape reader, possibly with several readings of each block.

  Readers return every block they could recover together with the diagnostics for the parts
  they could not.
*/

pub mod json;
pub mod pt;
pub mod pti;
pub mod quad;
pub mod reconcile;

use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use strum_macros::{Display, EnumString};
use tracing::debug;

pub use json::{read_json, write_json, TapeEntry, TapeImage};
pub use pt::{read_pt, write_pt, PtLayout};
pub use pti::{read_pti, write_pti};
pub use reconcile::{reconcile, Selection};

use crate::block::Block;
use crate::error::{Recovered, Result};

/// A tape image format, named by its file extension.
#[derive(Display, EnumString, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum TapeFormat {
  Pti,
  Pt,
  Json,
}

impl TapeFormat {
  pub fn from_path(path: &Path) -> Option<TapeFormat> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .and_then(|extension| TapeFormat::from_str(extension).ok())
  }

  pub fn extension(&self) -> String {
    self.to_string()
  }
}

pub fn read_blocks<R: BufRead>(format: TapeFormat, input: R) -> Result<Recovered<Vec<Block>>> {
  let recovered =
    match format {
      TapeFormat::Pti  => read_pti(input)?,
      TapeFormat::Pt   => read_pt(input)?,
      TapeFormat::Json => read_json(input)?,
    };
  debug!(
    "Read {} {} blocks with {} errors",
    recovered.value.len(),
    format,
    recovered.diagnostics.len()
  );
  Ok(recovered)
}

pub fn write_blocks<W: Write>(
  format : TapeFormat,
  blocks : &[Block],
  out    : &mut W,
  layout : &PtLayout
) -> Result<()> {
  match format {
    TapeFormat::Pti  => write_pti(blocks, out),
    TapeFormat::Pt   => write_pt(blocks, out, layout),
    TapeFormat::Json => write_json(blocks, out),
  }
}
