//! Shared foundation types for the compiler pipeline.
//!
//! Every stage (lexer, parser, semantic analyzer, TAC emitter, x86-64
//! emitter) reports errors as plain data rather than exceptions: a
//! [`Diagnostic`] carrying a [`Position`] and a message. This crate is
//! the one place those two types live, so no stage needs to depend on
//! another stage just to report a position.

mod diagnostic;
mod position;

pub use diagnostic::{Diagnostic, Level};
pub use position::Position;
