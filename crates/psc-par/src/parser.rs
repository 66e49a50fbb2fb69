use std::fmt;
use std::mem::discriminant;

use psc_lex::{Token, TokenKind};
use psc_util::{Diagnostic, Position};
use thiserror::Error;

use crate::ast::{BinOp, Expr, Literal, Program, Stmt, UnOp};

/// A syntax error with the position it was detected at, built on the
/// same [`Diagnostic`] the lexer and semantic analyzer use. Parsing
/// never panics on malformed input: every failure path returns one of
/// these.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ParseError {
    pub diagnostic: Diagnostic,
}

impl ParseError {
    fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::error(position, message),
        }
    }

    pub fn position(&self) -> Position {
        self.diagnostic.position
    }

    pub fn message(&self) -> &str {
        &self.diagnostic.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

type PResult<T> = Result<T, ParseError>;

/// Recursive-descent parser with one token of lookahead and panic-mode
/// recovery. Precedence climbing is used for expressions instead of a
/// Pratt table — nine explicit levels, matching the grammar one for one.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    pub errors: Vec<ParseError>,
}

/// Parse a full token stream, recovering from syntax errors at
/// statement boundaries. Always returns a (possibly partial) [`Program`]
/// together with every [`ParseError`] collected along the way.
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.errors)
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn at_eof(&self) -> bool {
        matches!(self.current_token().kind, TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        discriminant(&self.current_token().kind) == discriminant(kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
        token
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(self.current_token().position, message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> PResult<(String, Position)> {
        let token = self.consume(TokenKind::Identifier(String::new()), message)?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.position)),
            _ => unreachable!("consume() already checked the discriminant"),
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Discard tokens until a `NEWLINE` has been consumed or a
    /// statement-starting keyword is in view, whichever comes first.
    fn synchronize(&mut self) {
        let discarded = self.advance();
        if matches!(discarded.kind, TokenKind::Newline) {
            return;
        }
        loop {
            if self.at_eof() {
                return;
            }
            if matches!(self.current_token().kind, TokenKind::Newline) {
                self.advance();
                return;
            }
            if matches!(
                self.current_token().kind,
                TokenKind::If
                    | TokenKind::While
                    | TokenKind::For
                    | TokenKind::Def
                    | TokenKind::Return
            ) {
                return;
            }
            self.advance();
        }
    }

    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        self.skip_newlines();
        let mut last_position: Option<usize> = None;
        let mut stuck_once = false;

        while !self.at_eof() {
            if last_position == Some(self.current) {
                if stuck_once {
                    self.errors.push(ParseError::new(
                        self.current_token().position,
                        "parser made no progress; aborting",
                    ));
                    break;
                }
                stuck_once = true;
            } else {
                stuck_once = false;
            }
            last_position = Some(self.current);

            match self.statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    self.skip_newlines();
                }
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                    self.skip_newlines();
                }
            }
        }

        Program { statements }
    }

    /// A sequence of statements under one `INDENT`/`DEDENT` pair, used
    /// for `if`/`while`/`for`/`def` bodies. Errors inside the block are
    /// recovered from per-statement so one bad line never loses the
    /// rest of the block.
    fn statement_block(&mut self) -> PResult<Vec<Stmt>> {
        self.consume(TokenKind::Indent(0), "expected an indented block")?;
        let mut statements = Vec::new();
        self.skip_newlines();

        while !self.check(&TokenKind::Dedent) && !self.at_eof() {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
            self.skip_newlines();
        }

        self.consume(TokenKind::Dedent, "expected end of indented block")?;
        Ok(statements)
    }

    fn statement(&mut self) -> PResult<Stmt> {
        if self.check(&TokenKind::Identifier(String::new()))
            && matches!(self.peek(1).kind, TokenKind::Assign)
        {
            return self.assignment();
        }
        match self.current_token().kind {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Def => self.function_def(),
            TokenKind::Return => self.return_statement(),
            _ => self.expression_statement(),
        }
    }

    fn assignment(&mut self) -> PResult<Stmt> {
        let (name, position) = self.expect_identifier("expected identifier")?;
        self.consume(TokenKind::Assign, "expected '=' in assignment")?;
        let value = self.expression()?;
        Ok(Stmt::Assignment {
            name,
            value,
            position,
        })
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        let position = self.advance().position; // IF
        let condition = self.expression()?;
        self.consume(TokenKind::Colon, "expected ':' after if condition")?;
        self.skip_newlines();
        let then_body = self.statement_block()?;

        let mut elif_clauses = Vec::new();
        while self.check(&TokenKind::Elif) {
            self.advance();
            let elif_condition = self.expression()?;
            self.consume(TokenKind::Colon, "expected ':' after elif condition")?;
            self.skip_newlines();
            let elif_body = self.statement_block()?;
            elif_clauses.push((elif_condition, elif_body));
        }

        let else_body = if self.check(&TokenKind::Else) {
            self.advance();
            self.consume(TokenKind::Colon, "expected ':' after else")?;
            self.skip_newlines();
            Some(self.statement_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_body,
            elif_clauses,
            else_body,
            position,
        })
    }

    fn while_statement(&mut self) -> PResult<Stmt> {
        let position = self.advance().position; // WHILE
        let condition = self.expression()?;
        self.consume(TokenKind::Colon, "expected ':' after while condition")?;
        self.skip_newlines();
        let body = self.statement_block()?;
        Ok(Stmt::While {
            condition,
            body,
            position,
        })
    }

    fn for_statement(&mut self) -> PResult<Stmt> {
        let position = self.advance().position; // FOR
        let (variable, _) = self.expect_identifier("expected loop variable")?;
        self.consume(TokenKind::In, "expected 'in' in for statement")?;
        let iterable = self.expression()?;
        self.consume(TokenKind::Colon, "expected ':' after for clause")?;
        self.skip_newlines();
        let body = self.statement_block()?;
        Ok(Stmt::For {
            variable,
            iterable,
            body,
            position,
        })
    }

    fn function_def(&mut self) -> PResult<Stmt> {
        let position = self.advance().position; // DEF
        let (name, _) = self.expect_identifier("expected function name")?;
        self.consume(TokenKind::LParen, "expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (param, _) = self.expect_identifier("expected parameter name")?;
                params.push(param);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "expected ')' after parameter list")?;
        self.consume(TokenKind::Colon, "expected ':' after function signature")?;
        self.skip_newlines();
        let body = self.statement_block()?;
        Ok(Stmt::FunctionDef {
            name,
            params,
            body,
            position,
        })
    }

    fn return_statement(&mut self) -> PResult<Stmt> {
        let position = self.advance().position; // RETURN
        let value = if matches!(self.current_token().kind, TokenKind::Newline | TokenKind::Eof) {
            None
        } else {
            Some(self.expression()?)
        };
        Ok(Stmt::Return { value, position })
    }

    fn expression_statement(&mut self) -> PResult<Stmt> {
        let expr = self.expression()?;
        let position = expr.position();
        Ok(Stmt::ExprStmt { expr, position })
    }

    // --- Expressions, precedence-climbing from lowest to highest. ---

    fn expression(&mut self) -> PResult<Expr> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> PResult<Expr> {
        let mut expr = self.logical_and()?;
        while self.check(&TokenKind::Or) {
            self.advance();
            let right = self.logical_and()?;
            let position = expr.position();
            expr = Expr::Binary {
                left: Box::new(expr),
                op: BinOp::Or,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn logical_and(&mut self) -> PResult<Expr> {
        let mut expr = self.equality()?;
        while self.check(&TokenKind::And) {
            self.advance();
            let right = self.equality()?;
            let position = expr.position();
            expr = Expr::Binary {
                left: Box::new(expr),
                op: BinOp::And,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::Equal => BinOp::Eq,
                TokenKind::NotEqual => BinOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.comparison()?;
            let position = expr.position();
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let mut expr = self.term()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::LessThan => BinOp::Lt,
                TokenKind::LessEqual => BinOp::LtEq,
                TokenKind::GreaterThan => BinOp::Gt,
                TokenKind::GreaterEqual => BinOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            let position = expr.position();
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> PResult<Expr> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.factor()?;
            let position = expr.position();
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> PResult<Expr> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::Multiply => BinOp::Mul,
                TokenKind::Divide => BinOp::Div,
                TokenKind::Modulo => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            let position = expr.position();
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let op = match self.current_token().kind {
            TokenKind::Not => UnOp::Not,
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Plus => UnOp::Pos,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.unary()?;
        let position = operand.position();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            position,
        })
    }

    /// Right-associative: `2 ** 3 ** 2` parses as `2 ** (3 ** 2)`.
    fn power(&mut self) -> PResult<Expr> {
        let expr = self.call_or_index()?;
        if self.check(&TokenKind::Power) {
            self.advance();
            let right = self.power()?;
            let position = expr.position();
            Ok(Expr::Binary {
                left: Box::new(expr),
                op: BinOp::Pow,
                right: Box::new(right),
                position,
            })
        } else {
            Ok(expr)
        }
    }

    /// Postfix call/index chaining on top of a primary expression, e.g.
    /// `items[0]` or `len(items)`.
    fn call_or_index(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.check(&TokenKind::LBracket) {
                let position = expr.position();
                self.advance();
                let index = self.expression()?;
                self.consume(TokenKind::RBracket, "expected ']' after index expression")?;
                expr = Expr::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                    position,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let token = self.current_token().clone();
        match token.kind {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Integer(value),
                    position: token.position,
                })
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Float(value),
                    position: token.position,
                })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Str(value),
                    position: token.position,
                })
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Boolean(value),
                    position: token.position,
                })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if self.check(&TokenKind::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.consume(TokenKind::RParen, "expected ')' after call arguments")?;
                    Ok(Expr::Call {
                        name,
                        args,
                        position: token.position,
                    })
                } else {
                    Ok(Expr::Variable {
                        name,
                        position: token.position,
                    })
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        elements.push(self.expression()?);
                        if self.check(&TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RBracket, "expected ']' after list elements")?;
                Ok(Expr::List {
                    elements,
                    position: token.position,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RParen, "expected ')' after expression")?;
                Ok(expr)
            }
            _ => Err(ParseError::new(
                token.position,
                format!("unexpected token {}", token.kind.name()),
            )),
        }
    }
}
