//! Driver crate: wires the lexer, parser, semantic analyzer, TAC
//! emitter, and x86-64 emitter into one pipeline, then exposes it
//! through a batch CLI and an interactive REPL.

mod config;
mod driver;
mod output;
mod pipeline;
mod repl;
mod summary;

pub use config::{Cli, Config};
pub use pipeline::{run_pipeline, CompileRun};

use anyhow::{bail, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a `tracing` subscriber whose verbosity follows `--debug`.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);
    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

/// Entry point shared by `main` and the integration tests. Returns
/// whether the run succeeded; `main` maps that to an exit code.
pub fn run(config: Config) -> Result<bool> {
    if config.interactive {
        repl::Repl::new(config.debug).run();
        return Ok(true);
    }

    let Some(input) = config.input.as_ref() else {
        bail!("no source file given (pass a path, or run with --interactive)");
    };
    driver::compile_file(input, &config.output_dir, config.debug)
}
