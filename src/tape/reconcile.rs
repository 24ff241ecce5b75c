/*!
  A JSON capture may read the same tape block several times. For every block number the reading
  with the fewest errors is kept; on a tie the earliest reading wins.
*/

use std::collections::BTreeMap;

use tracing::warn;

use super::json::TapeEntry;
use crate::error::{Diagnostic, Error, Location, Recovered};

/// The entry chosen for one tape block number.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Selection {
  pub blocknum : u32,
  /// Index into the capture's entries.
  pub entry    : usize,
  pub nerrors  : u32
}

/**
  Selects one entry per block number, in block number order. Block numbers missing between the
  lowest and highest one present are reported but do not stop the selection. Each run of
  missing numbers is one diagnostic: `MissingBlockEntry` for a single number and
  `MissingBlockEntries` for a longer run.
*/
pub fn reconcile(entries: &[TapeEntry]) -> Recovered<Vec<Selection>> {
  let mut best: BTreeMap<u32, Selection> = BTreeMap::new();

  for (index, entry) in entries.iter().enumerate() {
    let candidate = Selection{ blocknum: entry.blocknum, entry: index, nerrors: entry.nerrors };
    best.entry(entry.blocknum)
        .and_modify(|selected| {
          if candidate.nerrors < selected.nerrors {
            *selected = candidate;
          }
        })
        .or_insert(candidate);
  }

  let mut diagnostics = Vec::new();
  let present: Vec<u32> = best.keys().copied().collect();
  for pair in present.windows(2) {
    let (first, last) = (pair[0] + 1, pair[1] - 1);
    let error = match last.checked_sub(first) {
      None    => continue,
      Some(0) => Error::MissingBlockEntry(first),
      Some(_) => Error::MissingBlockEntries{ first, last }
    };
    warn!("{}", error);
    diagnostics.push(Diagnostic::new(Location::BlockNumber(first), error));
  }

  for selection in best.values().filter(|selection| selection.nerrors > 0) {
    warn!(
      "Block {} has errors: {} (entry {})",
      selection.blocknum,
      selection.nerrors,
      selection.entry
    );
  }

  Recovered::new(best.into_values().collect(), diagnostics)
}
