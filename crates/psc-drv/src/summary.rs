use crate::pipeline::CompileRun;

/// A compact, teaching-oriented pass/fail report over each stage that
/// actually ran, printed at the end of a batch compile.
pub fn print_summary(run: &CompileRun) {
    println!();
    println!("COMPILATION SUMMARY");
    println!("{}", "=".repeat(60));

    let lex_status = if run.lex_error.is_some() { "FAILED" } else { "PASSED" };
    println!("{:<22} {}", "Lexical analysis:", lex_status);
    if let Some(tokens) = &run.tokens {
        println!("  {} tokens produced", tokens.len());
    }
    if let Some(err) = &run.lex_error {
        println!("  {}", err);
    }

    if run.tokens.is_none() {
        println!("{}", "=".repeat(60));
        return;
    }

    let parse_status = if run.parse_errors.is_empty() { "PASSED" } else { "FAILED" };
    println!("{:<22} {}", "Syntax analysis:", parse_status);
    if let Some(program) = &run.program {
        println!("  {} top-level statements", program.statements.len());
    }
    for error in &run.parse_errors {
        println!("  {}", error);
    }

    if let Some(analyzer) = &run.analyzer {
        let sem_status = if analyzer.errors.is_empty() { "PASSED" } else { "FAILED" };
        println!("{:<22} {}", "Semantic analysis:", sem_status);
        for error in &analyzer.errors {
            println!("  {}", error);
        }
    }

    if let Some(instructions) = &run.instructions {
        println!("{:<22} {}", "Code generation:", "PASSED");
        println!("  {} TAC instructions emitted", instructions.len());
    }

    println!("{}", "=".repeat(60));
    println!(
        "Overall result: {}",
        if run.succeeded() { "SUCCESS" } else { "FAILURE" }
    );
}
