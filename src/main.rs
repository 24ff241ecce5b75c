use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use g15tape::commands;
use g15tape::{Diagnostic, PtLayout, TapeFormat, Word};

#[derive(Parser)]
#[command(name = "g15util")]
#[command(about = "Assembler, disassembler, and paper tape converter for the Bendix G-15")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Assemble a .asm file into a listing (.lst) and a tape image (.pti)
  Asm {
    input: PathBuf,
  },

  /// List the blocks of a .asm source or a .pti, .pt or .json tape image into a .dislst file
  Dis {
    input: PathBuf,
    /// List only this block
    block: Option<usize>,
  },

  /// Convert a tape image to another format, written next to the input
  Cvt {
    /// Target format: pt, pti or json
    #[arg(short, long)]
    target: TapeFormat,
    input: PathBuf,
    /// Blank codes before the first block of a .pt tape
    #[arg(long, default_value_t = PtLayout::default().leader)]
    leader: usize,
    /// Blank codes between blocks of a .pt tape
    #[arg(long, default_value_t = PtLayout::default().gap)]
    gap: usize,
    /// Blank codes after the last block of a .pt tape
    #[arg(long, default_value_t = PtLayout::default().trailer)]
    trailer: usize,
  },

  /// Find the word that balances the actual checksum to the target
  Bal {
    #[arg(allow_hyphen_values = true)]
    target: Word,
    #[arg(allow_hyphen_values = true)]
    actual: Word,
  },

  /// Add two words the way the checksum does
  Sum {
    #[arg(allow_hyphen_values = true)]
    ar: Word,
    #[arg(allow_hyphen_values = true)]
    v: Word,
  },
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
  let file = File::open(path).with_context(|| format!("Error opening input file: {}", path.display()))?;
  Ok(BufReader::new(file))
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
  let file = File::create(path).with_context(|| format!("Error opening output file: {}", path.display()))?;
  Ok(BufWriter::new(file))
}

fn tape_format(path: &Path) -> Result<TapeFormat> {
  match TapeFormat::from_path(path) {
    Some(format) => Ok(format),
    None         => bail!("Input file must have a .pti, .pt or .json extension: {}", path.display())
  }
}

fn report(diagnostics: &[Diagnostic]) {
  for diagnostic in diagnostics {
    eprintln!("{}", diagnostic);
  }
}

fn assemble(input: &Path) -> Result<()> {
  if !is_source(input) {
    bail!("Input filename must have .asm extension: {}", input.display());
  }
  let source       = open_input(input)?;
  let mut listing  = create_output(&input.with_extension("lst"))?;
  let mut pti      = create_output(&input.with_extension("pti"))?;

  tracing::info!("Assembling: {}", input.display());
  let assembled = commands::assemble(source, &mut listing, &mut pti)?;
  listing.flush()?;
  pti.flush()?;

  report(&assembled.diagnostics);
  Ok(())
}

fn is_source(path: &Path) -> bool {
  path.extension().and_then(|extension| extension.to_str()) == Some("asm")
}

fn disassemble(input: &Path, block: Option<usize>) -> Result<()> {
  let format      = match is_source(input) {
    true  => None,
    false => Some(tape_format(input)?)
  };
  let source      = open_input(input)?;
  let mut listing = create_output(&input.with_extension("dislst"))?;

  let listed = match format {
    Some(format) => commands::disassemble(format, source, &mut listing, block)?,
    None         => commands::disassemble_source(source, &mut listing, block)?
  };
  listing.flush()?;

  report(&listed.diagnostics);
  Ok(())
}

fn convert(input: &Path, target: TapeFormat, layout: &PtLayout) -> Result<()> {
  let format = tape_format(input)?;
  let output = input.with_extension(target.extension());
  if output == input {
    bail!("Input is already a .{} file: {}", target, input.display());
  }

  let source  = open_input(input)?;
  let mut out = create_output(&output)?;

  tracing::info!("Converting {} to {}", input.display(), output.display());
  let converted = commands::convert(format, source, target, &mut out, layout)?;
  out.flush()?;

  report(&converted.diagnostics);
  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with_writer(std::io::stderr)
    .init();

  #[cfg(feature = "trace_quads")]
  tracing::info!("Quad tracing ENABLED");

  let cli = Cli::parse();

  match cli.command {
    Commands::Asm{ input }        => assemble(&input),
    Commands::Dis{ input, block } => disassemble(&input, block),
    Commands::Cvt{ target, input, leader, gap, trailer } => {
      convert(&input, target, &PtLayout{ leader, gap, trailer })
    }
    Commands::Bal{ target, actual } => {
      println!("{}", commands::balance(target, actual));
      Ok(())
    }
    Commands::Sum{ ar, v } => {
      println!("{}", commands::sum(ar, v));
      Ok(())
    }
  }
}
