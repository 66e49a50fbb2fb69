use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use psc_lex::Token;
use psc_par::Program;
use psc_sem::SymbolTable;
use psc_tac::Instruction;

const RULE: &str = "============================================================";

/// The five artifacts `<base>_*` written under the output directory,
/// one per pipeline stage that produced something to show.
pub struct OutputWriter {
    base: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: &Path, source_path: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        Ok(Self { base: output_dir.join(stem) })
    }

    fn path(&self, suffix: &str) -> PathBuf {
        let mut name = self.base.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn write_tokens(&self, tokens: &[Token]) -> Result<PathBuf> {
        let mut out = String::new();
        writeln!(out, "LEXICAL ANALYSIS RESULTS").unwrap();
        writeln!(out, "{RULE}").unwrap();
        writeln!(out, "{:<15} {:<20} {:<6} {:<6}", "KIND", "VALUE", "LINE", "COLUMN").unwrap();
        writeln!(out, "{}", "-".repeat(60)).unwrap();
        for token in tokens {
            writeln!(
                out,
                "{:<15} {:<20} {:<6} {:<6}",
                token.kind.name(),
                token.kind.value_display(),
                token.position.line,
                token.position.column
            )
            .unwrap();
        }
        writeln!(out, "{RULE}").unwrap();
        writeln!(out, "Total tokens: {}", tokens.len()).unwrap();
        let path = self.path("_tokens.txt");
        fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn write_ast(&self, program: &Program) -> Result<PathBuf> {
        let mut out = String::new();
        writeln!(out, "ABSTRACT SYNTAX TREE").unwrap();
        writeln!(out, "{RULE}").unwrap();
        out.push_str(&psc_par::dump(program));
        let path = self.path("_ast.txt");
        fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn write_symbols(&self, symbols: &SymbolTable) -> Result<PathBuf> {
        let mut out = String::new();
        writeln!(out, "SYMBOL TABLE").unwrap();
        writeln!(out, "{RULE}").unwrap();
        out.push_str(&symbols.dump());
        let path = self.path("_symbols.txt");
        fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn write_code(&self, instructions: &[Instruction]) -> Result<PathBuf> {
        let mut out = String::new();
        writeln!(out, "THREE-ADDRESS CODE").unwrap();
        writeln!(out, "{RULE}").unwrap();
        out.push_str(&psc_tac::render(instructions));
        let path = self.path("_code.txt");
        fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn write_asm(&self, assembly: &str) -> Result<PathBuf> {
        let mut out = String::new();
        writeln!(out, "; approximate x86-64 assembly, not directly assemblable").unwrap();
        out.push_str(assembly);
        let path = self.path("_x86.asm");
        fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}
