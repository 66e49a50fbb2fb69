use std::fmt;

use crate::position::Position;

/// Severity of a diagnostic. Every stage currently only emits `Error`,
/// but the level is carried through so the driver can format
/// consistently and so future stages (e.g. unreachable-code warnings)
/// have somewhere to plug in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
        };
        write!(f, "{s}")
    }
}

/// A single diagnostic record: data, not a control-flow exception.
/// Each compiler stage accumulates these in a plain `Vec` and returns
/// them alongside (or instead of) its primary output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn error(position: Position, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}
