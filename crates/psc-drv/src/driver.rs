use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::output::OutputWriter;
use crate::pipeline::run_pipeline;
use crate::summary::print_summary;

/// Batch mode: read one source file, run the pipeline, write whatever
/// artifacts each stage produced, print the summary. Returns whether
/// the overall run succeeded so `main` can pick an exit code.
pub fn compile_file(source_path: &Path, output_dir: &Path, debug: bool) -> Result<bool> {
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("reading source file {}", source_path.display()))?;
    tracing::debug!(path = %source_path.display(), bytes = source.len(), "read source file");

    let run = run_pipeline(&source, debug);
    let writer = OutputWriter::new(output_dir, source_path)?;

    if let Some(tokens) = &run.tokens {
        writer.write_tokens(tokens)?;
    }
    if let Some(program) = &run.program {
        writer.write_ast(program)?;
    }
    if let Some(analyzer) = &run.analyzer {
        writer.write_symbols(&analyzer.symbols)?;
    }
    if let Some(instructions) = &run.instructions {
        writer.write_code(instructions)?;
    }
    if let Some(assembly) = &run.assembly {
        writer.write_asm(assembly)?;
    }

    print_summary(&run);
    let succeeded = run.succeeded();
    tracing::debug!(succeeded, "compile run finished");
    Ok(succeeded)
}
