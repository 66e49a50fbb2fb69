use std::fmt;

use psc_util::{Diagnostic, Position};
use thiserror::Error;

use crate::cursor::Cursor;
use crate::token::{
    lookup_delimiter, lookup_keyword, lookup_one_char_operator, lookup_two_char_operator, Token,
    TokenKind,
};

/// What went wrong, independent of where. Kept separate from
/// [`LexError`] so callers can match on the kind without also
/// destructuring the position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Invalid float literal")]
    InvalidFloatLiteral,
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char),
    #[error("Unknown operator: {0}")]
    UnknownOperator(char),
    #[error("Indentation error")]
    IndentationError,
}

/// A lexical error with the position it occurred at. The lexer fails
/// fast: the first error encountered aborts tokenization. Built on the
/// same [`Diagnostic`] the parser and semantic analyzer use, so `kind`
/// is carried alongside it for callers that want to match on it
/// without re-parsing the message.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct LexError {
    pub diagnostic: Diagnostic,
    pub kind: LexErrorKind,
}

impl LexError {
    fn new(position: Position, kind: LexErrorKind) -> Self {
        Self {
            diagnostic: Diagnostic::error(position, kind.to_string()),
            kind,
        }
    }

    pub fn position(&self) -> Position {
        self.diagnostic.position
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

fn is_operator_start(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!')
}

/// Indentation-aware DFA-style scanner. Tabs count as 8 columns of
/// indentation, spaces as 1 — a deliberate simplification carried over
/// unchanged from the reference implementation so indentation-error
/// behavior matches exactly.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    at_line_start: bool,
    indent_stack: Vec<u32>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            at_line_start: true,
            indent_stack: vec![0],
            tokens: Vec::new(),
        }
    }

    /// Scan the entire source, returning the token stream terminated by
    /// exactly one `EOF`, or the first lexical error encountered.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(source);
        lexer.run()?;
        Ok(lexer.tokens)
    }

    fn run(&mut self) -> Result<(), LexError> {
        while !self.cursor.at_end() {
            if self.at_line_start {
                self.handle_indentation()?;
                continue;
            }

            let Some(c) = self.cursor.current() else {
                break;
            };

            match c {
                '\n' => {
                    self.tokens
                        .push(Token::new(TokenKind::Newline, self.cursor.position()));
                    self.cursor.advance();
                    self.at_line_start = true;
                }
                ' ' | '\t' | '\r' => {
                    self.cursor.advance();
                }
                '#' => {
                    while let Some(c) = self.cursor.current() {
                        if c == '\n' {
                            break;
                        }
                        self.cursor.advance();
                    }
                }
                c if c.is_ascii_digit() => {
                    let token = self.read_number()?;
                    self.tokens.push(token);
                }
                '"' | '\'' => {
                    let token = self.read_string()?;
                    self.tokens.push(token);
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let token = self.read_identifier();
                    self.tokens.push(token);
                }
                c if lookup_delimiter(c).is_some() => {
                    let position = self.cursor.position();
                    self.cursor.advance();
                    self.tokens
                        .push(Token::new(lookup_delimiter(c).unwrap(), position));
                }
                c if is_operator_start(c) => {
                    let token = self.read_operator()?;
                    self.tokens.push(token);
                }
                c => {
                    return Err(LexError::new(
                        self.cursor.position(),
                        LexErrorKind::UnexpectedCharacter(c),
                    ))
                }
            }
        }

        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens
                .push(Token::new(TokenKind::Dedent, self.cursor.position()));
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, self.cursor.position()));
        Ok(())
    }

    /// Measure the leading indentation of a logical line and reconcile
    /// it against `indent_stack`. Blank lines and comment-only lines
    /// leave the stack untouched.
    fn handle_indentation(&mut self) -> Result<(), LexError> {
        let mut indent_level: u32 = 0;
        while let Some(c) = self.cursor.current() {
            match c {
                ' ' => {
                    indent_level += 1;
                    self.cursor.advance();
                }
                '\t' => {
                    indent_level += 8;
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        match self.cursor.current() {
            Some('\n') | Some('#') | None => {
                self.at_line_start = false;
                return Ok(());
            }
            _ => {}
        }

        self.at_line_start = false;
        let position = self.cursor.position();
        let current_indent = *self.indent_stack.last().unwrap();

        if indent_level > current_indent {
            self.indent_stack.push(indent_level);
            self.tokens
                .push(Token::new(TokenKind::Indent(indent_level), position));
        } else if indent_level < current_indent {
            while *self.indent_stack.last().unwrap() > indent_level {
                self.indent_stack.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, position));
            }
            if *self.indent_stack.last().unwrap() != indent_level {
                return Err(LexError::new(position, LexErrorKind::IndentationError));
            }
        }

        Ok(())
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.position();
        let mut text = String::new();

        while let Some(c) = self.cursor.current() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.cursor.advance();
        }

        if self.cursor.current() == Some('.') {
            text.push('.');
            self.cursor.advance();

            match self.cursor.current() {
                Some(c) if c.is_ascii_digit() => {}
                _ => return Err(LexError::new(start, LexErrorKind::InvalidFloatLiteral)),
            }

            while let Some(c) = self.cursor.current() {
                if !c.is_ascii_digit() {
                    break;
                }
                text.push(c);
                self.cursor.advance();
            }

            let value: f64 = text.parse().expect("validated float lexeme");
            Ok(Token::new(TokenKind::Float(value), start))
        } else {
            let value: i64 = text.parse().expect("validated integer lexeme");
            Ok(Token::new(TokenKind::Integer(value), start))
        }
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.position();
        let quote = self.cursor.advance().expect("opening quote");
        let mut value = String::new();

        loop {
            match self.cursor.current() {
                None => return Err(LexError::new(start, LexErrorKind::UnterminatedString)),
                Some(c) if c == quote => break,
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some(c) if c == quote => value.push(quote),
                        Some(c) => value.push(c),
                        None => return Err(LexError::new(start, LexErrorKind::UnterminatedString)),
                    }
                    self.cursor.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }

        self.cursor.advance(); // closing quote
        Ok(Token::new(TokenKind::Str(value), start))
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.cursor.position();
        let mut text = String::new();

        while let Some(c) = self.cursor.current() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        let kind = lookup_keyword(&text).unwrap_or(TokenKind::Identifier(text));
        Token::new(kind, start)
    }

    fn read_operator(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.position();
        let c = self.cursor.current().expect("operator start character");

        if let Some(next) = self.cursor.peek(1) {
            let two = [c, next].iter().collect::<String>();
            if let Some(kind) = lookup_two_char_operator(&two) {
                self.cursor.advance();
                self.cursor.advance();
                return Ok(Token::new(kind, start));
            }
        }

        if let Some(kind) = lookup_one_char_operator(c) {
            self.cursor.advance();
            return Ok(Token::new(kind, start));
        }

        Err(LexError::new(start, LexErrorKind::UnknownOperator(c)))
    }
}
