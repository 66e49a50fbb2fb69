//! Component A (token model) and Component B (lexer) of the
//! compilation pipeline: turns source text into a token stream
//! terminated by exactly one `EOF`, tracking indentation the way
//! Python does (tabs count as 8 columns).

mod cursor;
mod lexer;
mod token;

pub use lexer::{LexError, LexErrorKind, Lexer};
pub use token::{
    lookup_delimiter, lookup_keyword, lookup_one_char_operator, lookup_two_char_operator, Token,
    TokenKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn simple_assignment_and_print() {
        let ks = kinds("x = 42\nprint(x)\n");
        // x = 42 NEWLINE print ( x ) NEWLINE EOF -- 9 tokens excluding EOF
        let non_eof: Vec<_> = ks.iter().filter(|k| !k.is_eof()).collect();
        assert_eq!(non_eof.len(), 9);
        assert!(matches!(ks.last(), Some(TokenKind::Eof)));
    }

    #[test]
    fn indent_dedent_balance() {
        let ks = kinds("if True:\n    x = 1\n    y = 2\nz = 3\n");
        let indents = ks.iter().filter(|k| matches!(k, TokenKind::Indent(_))).count();
        let dedents = ks.iter().filter(|k| matches!(k, TokenKind::Dedent)).count();
        assert_eq!(indents, 1);
        assert_eq!(dedents, 1);
    }

    #[test]
    fn blank_and_comment_lines_do_not_affect_indentation() {
        let ks = kinds("x = 1\n\n# comment\nif True:\n    y = 2\n");
        let indents = ks.iter().filter(|k| matches!(k, TokenKind::Indent(_))).count();
        assert_eq!(indents, 1);
    }

    #[test]
    fn tabs_count_as_eight() {
        let err = Lexer::tokenize("if True:\n\tx = 1\n  y = 2\n").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::IndentationError);
    }

    #[test]
    fn float_literal() {
        let ks = kinds("3.14\n");
        assert_eq!(ks[0], TokenKind::Float(3.14));
    }

    #[test]
    fn malformed_float_is_an_error() {
        let err = Lexer::tokenize("3.\n").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidFloatLiteral);
    }

    #[test]
    fn string_with_escapes() {
        let ks = kinds("\"a\\nb\\\"c\"\n");
        assert_eq!(ks[0], TokenKind::Str("a\nb\"c".to_string()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::tokenize("\"abc\n").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn two_char_operators_take_precedence() {
        let ks = kinds("a ** b == c != d <= e >= f\n");
        assert!(ks.contains(&TokenKind::Power));
        assert!(ks.contains(&TokenKind::Equal));
        assert!(ks.contains(&TokenKind::NotEqual));
        assert!(ks.contains(&TokenKind::LessEqual));
        assert!(ks.contains(&TokenKind::GreaterEqual));
    }

    #[test]
    fn keywords_and_booleans() {
        let ks = kinds("if elif else while for in def return and or not True False\n");
        assert_eq!(
            ks,
            vec![
                TokenKind::If,
                TokenKind::Elif,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Def,
                TokenKind::Return,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Boolean(true),
                TokenKind::Boolean(false),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trailing_dedents_at_eof() {
        let ks = kinds("if True:\n    x = 1\n");
        assert_eq!(ks.last(), Some(&TokenKind::Eof));
        assert_eq!(ks[ks.len() - 2], TokenKind::Dedent);
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = Lexer::tokenize("x = @\n").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::UnexpectedCharacter('@')));
    }
}
