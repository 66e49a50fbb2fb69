use psc_util::Position;

/// Character-at-a-time cursor over the source text.
///
/// Tracks byte offset plus 1-based line/column so every emitted token
/// can carry an exact [`Position`].
pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn current(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    pub fn peek(&self, offset: usize) -> Option<char> {
        self.source[self.position..].chars().nth(offset)
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Consume and return the current character, advancing line/column.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}
