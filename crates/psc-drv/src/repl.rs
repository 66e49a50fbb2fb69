use std::io::{self, Write};

use crate::pipeline::run_pipeline;
use crate::summary::print_summary;

/// Interactive REPL: accumulate lines until a blank line or `:compile`,
/// then run the full pipeline over the buffered source and print its
/// TAC and diagnostics. `debug` is fixed for the whole session — it is
/// a start-up flag, not something the REPL can flip mid-session.
pub struct Repl {
    debug: bool,
}

impl Repl {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn run(&mut self) {
        self.print_banner();
        let stdin = io::stdin();
        let mut buffer = String::new();

        loop {
            print!("{}", if buffer.is_empty() { ">>> " } else { "... " });
            io::stdout().flush().ok();

            let mut line = String::new();
            if stdin.read_line(&mut line).unwrap_or(0) == 0 {
                println!();
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);

            match trimmed {
                ":exit" => break,
                ":reset" => {
                    buffer.clear();
                    println!("buffer cleared");
                }
                ":compile" => {
                    if buffer.is_empty() {
                        println!("nothing to compile");
                        continue;
                    }
                    self.compile_buffer(&buffer);
                    buffer.clear();
                }
                "" => {
                    if buffer.is_empty() {
                        continue;
                    }
                    self.compile_buffer(&buffer);
                    buffer.clear();
                }
                _ => {
                    buffer.push_str(trimmed);
                    buffer.push('\n');
                }
            }
        }
    }

    fn print_banner(&self) {
        println!("psc interactive mode.");
        println!("Enter source lines; a blank line or `:compile` compiles the buffer.");
        println!("`:reset` discards the buffer, `:exit` leaves the REPL.");
    }

    fn compile_buffer(&mut self, source: &str) {
        let run = run_pipeline(source, self.debug);

        if let Some(program) = &run.program {
            println!("--- ast ---");
            print!("{}", psc_par::dump(program));
        }
        if let Some(analyzer) = &run.analyzer {
            if !analyzer.errors.is_empty() {
                println!("--- semantic errors ---");
                for error in &analyzer.errors {
                    println!("{error}");
                }
            }
        }
        if let Some(instructions) = &run.instructions {
            println!("--- three-address code ---");
            print!("{}", psc_tac::render(instructions));
        }
        if let Some(err) = &run.lex_error {
            println!("{err}");
        }
        for error in &run.parse_errors {
            println!("{error}");
        }

        print_summary(&run);
    }
}
