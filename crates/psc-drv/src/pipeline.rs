use psc_lex::{LexError, Lexer, Token};
use psc_par::{parse, ParseError, Program};
use psc_sem::SemanticAnalyzer;
use psc_tac::Instruction;

/// Component H's input is optional: in non-debug mode a failing parse
/// or semantic pass stops the pipeline before TAC/assembly ever run.
/// In debug mode every later stage still runs on whatever partial
/// result the previous stage produced, so a classroom run always has
/// something to look at.
#[derive(Default)]
pub struct CompileRun {
    pub tokens: Option<Vec<Token>>,
    pub lex_error: Option<LexError>,
    pub program: Option<Program>,
    pub parse_errors: Vec<ParseError>,
    pub analyzer: Option<SemanticAnalyzer>,
    pub instructions: Option<Vec<Instruction>>,
    pub assembly: Option<String>,
}

impl CompileRun {
    /// `false` the moment any stage reported a non-empty error list,
    /// matching the driver's blanket failure policy.
    pub fn succeeded(&self) -> bool {
        self.lex_error.is_none()
            && self.parse_errors.is_empty()
            && self
                .analyzer
                .as_ref()
                .map(|a| a.errors.is_empty())
                .unwrap_or(true)
    }
}

/// Run every stage in order, stopping early unless `debug` asks the
/// pipeline to push through a stage's errors to feed the next one.
pub fn run_pipeline(source: &str, debug: bool) -> CompileRun {
    let mut run = CompileRun::default();

    let tokens = match Lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(err) => {
            run.lex_error = Some(err);
            return run;
        }
    };
    run.tokens = Some(tokens.clone());

    let (program, parse_errors) = parse(tokens);
    let parse_failed = !parse_errors.is_empty();
    run.parse_errors = parse_errors;
    run.program = Some(program);
    if parse_failed && !debug {
        return run;
    }

    let program = run.program.as_ref().unwrap();
    let mut analyzer = SemanticAnalyzer::new();
    let sem_ok = analyzer.analyze(program);
    run.analyzer = Some(analyzer);
    if !sem_ok && !debug {
        return run;
    }

    let instructions = psc_tac::emit(program);
    let assembly = psc_asm::emit(&instructions);
    run.instructions = Some(instructions);
    run.assembly = Some(assembly);
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_clean_program_runs_every_stage_and_succeeds() {
        let run = run_pipeline("x = 42\nprint(x)\n", false);
        assert!(run.succeeded());
        assert!(run.instructions.is_some());
        assert!(run.assembly.is_some());
    }

    #[test]
    fn a_lexer_error_stops_the_pipeline_before_parsing() {
        let run = run_pipeline("x = @\n", false);
        assert!(!run.succeeded());
        assert!(run.lex_error.is_some());
        assert!(run.program.is_none());
    }

    #[test]
    fn a_semantic_error_stops_codegen_outside_debug_mode() {
        let run = run_pipeline("y = z + 1\n", false);
        assert!(!run.succeeded());
        assert!(run.program.is_some());
        assert!(run.instructions.is_none());
    }

    #[test]
    fn debug_mode_still_runs_codegen_after_a_semantic_error() {
        let run = run_pipeline("y = z + 1\n", true);
        assert!(!run.succeeded());
        assert!(run.instructions.is_some());
        assert!(run.assembly.is_some());
    }

    #[test]
    fn a_parse_error_stops_codegen_outside_debug_mode() {
        let run = run_pipeline("x = \nif True:\n    y = 1\n", false);
        assert!(!run.succeeded());
        assert!(!run.parse_errors.is_empty());
        assert!(run.instructions.is_none());
    }
}
