use std::path::PathBuf;

use clap::Parser;

/// Command-line surface. Positional `input` is optional because
/// `--interactive` never needs one.
#[derive(Parser, Debug)]
#[command(name = "psc")]
#[command(author, version, about = "A teaching compiler for an indentation-based scripting language subset", long_about = None)]
pub struct Cli {
    /// Source file to compile
    pub input: Option<PathBuf>,

    /// Print verbose per-stage dumps and keep compiling through errors
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Directory the output files are written into
    #[arg(short = 'o', long = "output", default_value = "output")]
    pub output: PathBuf,

    /// Launch the interactive REPL instead of a batch compile
    #[arg(short = 'i', long)]
    pub interactive: bool,
}

/// The resolved configuration a compile run actually acts on, decoupled
/// from clap so the pipeline and REPL don't depend on the CLI crate.
pub struct Config {
    pub input: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub debug: bool,
    pub interactive: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output_dir: cli.output,
            debug: cli.debug,
            interactive: cli.interactive,
        }
    }
}
