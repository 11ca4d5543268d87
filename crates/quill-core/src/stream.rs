use crate::ast::Span;

/// Character cursor shared by the reader and every handler. Positions are
/// char offsets into the source.
#[derive(Clone, Debug)]
pub struct CharStream {
    chars: Vec<char>,
    pos: usize,
}

impl CharStream {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    pub fn next_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    pub fn consume(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.pos)
    }

    pub fn here(&self) -> Span {
        Span::point(self.pos)
    }

    pub fn skip_ws_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.peek() {
                if is_ws(ch) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() == Some(';') {
                while let Some(ch) = self.next_char() {
                    if ch == '\n' {
                        break;
                    }
                }
                continue;
            }
            break;
        }
    }

    /// Reads contiguous non-delimiter text. Returns an empty string when the
    /// cursor already sits on a delimiter.
    pub fn read_token(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if is_delimiter(ch) {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}

pub fn is_ws(ch: char) -> bool {
    ch.is_whitespace() || ch == ','
}

pub fn is_delimiter(ch: char) -> bool {
    is_ws(ch) || matches!(ch, '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\'')
}
