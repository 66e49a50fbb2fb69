//! Component G: lowers the `psc-par` AST into a flat three-address
//! code (TAC) listing with fresh temporaries and labels.

mod emitter;
mod instruction;

pub use emitter::emit;
pub use instruction::{BinOp, Instruction, Operand, UnOp};

/// Render a program's TAC listing the way `<base>_code.txt` does: one
/// 1-indexed instruction per line.
pub fn render(instructions: &[Instruction]) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    for (i, instruction) in instructions.iter().enumerate() {
        writeln!(out, "{:3}: {}", i + 1, instruction).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use psc_lex::Lexer;
    use psc_par::parse;

    fn tac_lines(src: &str) -> Vec<String> {
        let tokens = Lexer::tokenize(src).unwrap();
        let (program, errors) = parse(tokens);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        emit(&program).iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn assignment_then_print() {
        let lines = tac_lines("x = 42\nprint(x)\n");
        assert_eq!(lines, vec!["x = 42".to_string(), "PRINT x".to_string()]);
    }

    #[test]
    fn if_else_emits_the_documented_shape() {
        let lines = tac_lines("if 1 < 2:\n    y = 3\nelse:\n    y = 4\n");
        assert_eq!(
            lines,
            vec![
                "t1 = 1 < 2".to_string(),
                "IF_FALSE t1 GOTO L1".to_string(),
                "y = 3".to_string(),
                "GOTO L2".to_string(),
                "LABEL L1".to_string(),
                "y = 4".to_string(),
                "LABEL L2".to_string(),
            ]
        );
    }

    #[test]
    fn function_def_and_call() {
        let lines = tac_lines("def f(n):\n    return n * 2\nprint(f(5))\n");
        assert_eq!(lines[0], "FUNCTION f");
        assert_eq!(lines[1], "t1 = n * 2");
        assert_eq!(lines[2], "RETURN t1");
        assert_eq!(lines[3], "END_FUNCTION f");
        assert_eq!(lines[4], "PARAM 5");
        assert_eq!(lines[5], "CALL f");
        assert!(lines[6].starts_with("PRINT t"));
    }

    #[test]
    fn for_loop_over_a_string_emits_len_index_and_increment() {
        let lines = tac_lines("for c in \"ab\":\n    print(c)\n");
        assert!(lines.iter().any(|l| l.contains("LEN")));
        assert!(lines.iter().any(|l| l.starts_with("c = INDEX")));
        assert!(lines.iter().any(|l| l == "PRINT c"));
        // the index temp is both compared and incremented each pass
        assert!(lines.iter().any(|l| l.contains('<')));
        assert!(lines.iter().any(|l| l.contains('+')));
    }

    #[test]
    fn every_label_referenced_by_a_branch_is_defined_somewhere() {
        let lines = tac_lines(
            "if x < 1:\n    y = 1\nelif x < 2:\n    y = 2\nelse:\n    y = 3\nwhile x < 10:\n    x = x + 1\n",
        );
        let defined: std::collections::HashSet<_> = lines
            .iter()
            .filter_map(|l| l.strip_prefix("LABEL "))
            .collect();
        for line in &lines {
            if let Some(rest) = line.strip_prefix("GOTO ") {
                assert!(defined.contains(rest), "GOTO target {rest} never labeled");
            }
            if let Some(rest) = line.split(" GOTO ").nth(1) {
                assert!(defined.contains(rest), "conditional target {rest} never labeled");
            }
        }
    }

    #[test]
    fn temporaries_are_unique_within_one_emission() {
        let lines = tac_lines("x = (1 + 2) * (3 + 4)\n");
        let temps: Vec<&str> = lines
            .iter()
            .filter_map(|l| l.split_whitespace().next())
            .filter(|w| w.starts_with('t'))
            .collect();
        let unique: std::collections::HashSet<_> = temps.iter().collect();
        assert_eq!(temps.len(), unique.len());
    }

    #[test]
    fn list_literal_creates_then_appends_in_order() {
        let lines = tac_lines("x = [1, 2, 3]\n");
        assert!(lines[0].ends_with("= CREATE_LIST"));
        assert_eq!(lines[1], format!("APPEND {}, 1", lines[0].split(' ').next().unwrap()));
    }

    #[test]
    fn return_with_no_expression_is_bare() {
        let lines = tac_lines("def f():\n    return\n");
        assert_eq!(lines[1], "RETURN");
    }
}
