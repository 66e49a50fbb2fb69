//! Component E (symbol table) and Component F (semantic analyzer):
//! scope resolution, initialization tracking, and best-effort type
//! checking over the tree `psc-par` produces.

mod analyzer;
mod symbol;
mod table;

pub use analyzer::{SemanticAnalyzer, SemanticError};
pub use symbol::{DataType, Symbol, SymbolKind};
pub use table::SymbolTable;

#[cfg(test)]
mod tests {
    use super::*;
    use psc_lex::Lexer;
    use psc_par::parse;

    fn analyze(src: &str) -> SemanticAnalyzer {
        let tokens = Lexer::tokenize(src).expect("lex failure in semantic test fixture");
        let (program, parse_errors) = parse(tokens);
        assert!(parse_errors.is_empty(), "unexpected parse errors: {parse_errors:?}");
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&program);
        analyzer
    }

    #[test]
    fn builtins_are_preregistered_and_callable() {
        let analyzer = analyze("print(42)\n");
        assert!(analyzer.errors.is_empty());
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let analyzer = analyze("y = undefined_var + 1\n");
        assert_eq!(analyzer.errors.len(), 1);
        assert!(analyzer.errors[0].message().contains("Undefined variable"));
    }

    #[test]
    fn variable_used_before_initialization_inside_its_own_rhs() {
        // `x` only becomes initialized once the assignment's RHS has
        // fully evaluated, so `x` on the RHS is still undefined.
        let analyzer = analyze("x = x + 1\n");
        assert!(analyzer
            .errors
            .iter()
            .any(|e| e.message().contains("Undefined variable 'x'")));
    }

    #[test]
    fn reassignment_with_incompatible_type_is_flagged() {
        let analyzer = analyze("x = 1\nx = \"hello\"\n");
        assert!(analyzer.errors.iter().any(|e| e.message().contains("Type mismatch")));
    }

    #[test]
    fn int_widens_to_float_without_error() {
        let analyzer = analyze("x = 1.5\nx = 2\n");
        assert!(analyzer.errors.is_empty());
    }

    #[test]
    fn if_scopes_do_not_leak_bindings_to_siblings() {
        let analyzer = analyze("if True:\n    a = 1\nelse:\n    b = a\n");
        assert!(analyzer.errors.iter().any(|e| e.message().contains("Undefined variable 'a'")));
    }

    #[test]
    fn outer_scope_is_visible_from_a_nested_block() {
        let analyzer = analyze("x = 1\nif True:\n    y = x + 1\n");
        assert!(analyzer.errors.is_empty());
    }

    #[test]
    fn function_parameters_are_scoped_to_the_function() {
        let analyzer = analyze("def f(n):\n    return n\nm = n\n");
        assert!(analyzer.errors.iter().any(|e| e.message().contains("Undefined variable 'n'")));
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let analyzer = analyze("return 1\n");
        assert!(analyzer
            .errors
            .iter()
            .any(|e| e.message().contains("Return statement outside function")));
    }

    #[test]
    fn recursive_call_sees_its_own_function_binding() {
        let analyzer = analyze(
            "def factorial(n):\n    if n <= 1:\n        return 1\n    else:\n        return n * factorial(n - 1)\n",
        );
        assert!(analyzer.errors.is_empty());
    }

    #[test]
    fn wrong_argument_count_is_flagged() {
        let analyzer = analyze("def add(a, b):\n    return a + b\nx = add(1)\n");
        assert!(analyzer.errors.iter().any(|e| e.message().contains("expects 2 arguments")));
    }

    #[test]
    fn calling_a_zero_parameter_function_with_arguments_is_flagged() {
        let analyzer = analyze("def f():\n    return 1\nx = f(1, 2)\n");
        assert!(analyzer.errors.iter().any(|e| e.message().contains("expects 0 arguments")));
    }

    #[test]
    fn for_loop_variable_is_initialized_in_its_own_body() {
        let analyzer = analyze("for item in [1, 2, 3]:\n    x = item\n");
        assert!(analyzer.errors.is_empty());
    }

    #[test]
    fn string_concatenation_is_allowed_but_mixed_types_are_not() {
        let ok = analyze("x = \"a\" + \"b\"\n");
        assert!(ok.errors.is_empty());
        let bad = analyze("x = \"a\" + True\n");
        assert!(bad.errors.iter().any(|e| e.message().contains("Invalid operand types for +")));
    }

    #[test]
    fn indexing_a_function_is_an_error() {
        let analyzer = analyze("def f():\n    return 1\nx = f[0]\n");
        assert!(analyzer.errors.iter().any(|e| e.message().contains("Cannot index into")));
    }

    #[test]
    fn if_condition_must_be_boolean() {
        let analyzer = analyze("if 1:\n    x = 1\n");
        assert!(analyzer
            .errors
            .iter()
            .any(|e| e.message().contains("If condition must be boolean")));
    }

    #[test]
    fn elif_condition_must_be_boolean() {
        let analyzer = analyze("if True:\n    x = 1\nelif 1:\n    y = 2\n");
        assert!(analyzer
            .errors
            .iter()
            .any(|e| e.message().contains("Elif condition must be boolean")));
    }

    #[test]
    fn while_condition_must_be_boolean() {
        let analyzer = analyze("while 1:\n    x = 1\n");
        assert!(analyzer
            .errors
            .iter()
            .any(|e| e.message().contains("While condition must be boolean")));
    }

    #[test]
    fn for_loop_iterable_must_be_list_or_string() {
        let analyzer = analyze("for item in 1:\n    x = item\n");
        assert!(analyzer
            .errors
            .iter()
            .any(|e| e.message().contains("For loop iterable must be list or string")));
    }

    #[test]
    fn list_index_must_be_integer() {
        let analyzer = analyze("x = [1, 2, 3]\ny = x[\"a\"]\n");
        assert!(analyzer
            .errors
            .iter()
            .any(|e| e.message().contains("List index must be integer")));
    }
}
