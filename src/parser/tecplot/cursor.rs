//! Immutable view over the unconsumed part of an in-memory export.
//!
//! Every operation returns new views instead of modifying the receiver, so a
//! caller always holds both the piece it asked for and the advanced cursor.

/// Non-owning view over a range of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCursor<'a> {
    text: &'a str,
    offset: usize,                          // Byte offset of `text` within the original buffer
}

impl<'a> TextCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        TextCursor { text, offset: 0 }
    }

    fn at(text: &'a str, offset: usize) -> Self {
        TextCursor { text, offset }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Position of the first byte of this view in the original buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    // Python-style index: negative counts back from the end. Clamped to the
    // view and moved forward onto a char boundary.
    fn index(&self, i: isize) -> usize {
        let len = self.text.len() as isize;
        let clamped = if i >= 0 { i.min(len) } else { (len + i).max(0) };
        let mut j = clamped as usize;
        while !self.text.is_char_boundary(j) {
            j += 1;
        }
        j
    }

    /// Bytes `[i, j)` of the view.
    pub fn slice(&self, i: isize, j: isize) -> Self {
        let start = self.index(i);
        let end = self.index(j).max(start);
        Self::at(&self.text[start..end], self.offset + start)
    }

    /// Bytes `[0, i)`.
    pub fn prefix(&self, i: isize) -> Self {
        self.slice(0, i)
    }

    /// Bytes `[i, len)`.
    pub fn suffix(&self, i: isize) -> Self {
        let start = self.index(i);
        Self::at(&self.text[start..], self.offset + start)
    }

    pub fn trim_start(&self) -> Self {
        let trimmed = self.text.trim_start();
        Self::at(trimmed, self.offset + (self.text.len() - trimmed.len()))
    }

    pub fn trim_end(&self) -> Self {
        Self::at(self.text.trim_end(), self.offset)
    }

    pub fn trim(&self) -> Self {
        self.trim_start().trim_end()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.text.starts_with(prefix)
    }

    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        self.text.bytes().position(|b| b == byte)
    }

    /// Splits around the first occurrence of `byte`, dropping the byte itself.
    pub fn split_once_byte(&self, byte: u8) -> Option<(Self, Self)> {
        let i = self.find_byte(byte)?;
        Some((self.prefix(i as isize), self.suffix(i as isize + 1)))
    }

    /// Reads up to the first byte from `delimiters`, then skips the whole run
    /// of delimiter bytes that follows. Returns `(token, rest)`.
    pub fn next_token(&self, delimiters: &[u8]) -> (Self, Self) {
        let bytes = self.text.as_bytes();
        let end = bytes.iter().position(|b| delimiters.contains(b)).unwrap_or(bytes.len());
        let skip = bytes[end..].iter().take_while(|b| delimiters.contains(b)).count();
        (self.prefix(end as isize), self.suffix((end + skip) as isize))
    }

    /// Reads one line without its terminator (`\n`, `\r\n` or a lone `\r`).
    /// Returns `(line, rest)`; both are empty once the view is exhausted.
    pub fn next_line(&self) -> (Self, Self) {
        let bytes = self.text.as_bytes();
        let end = bytes.iter().position(|&b| b == b'\n' || b == b'\r').unwrap_or(bytes.len());
        let skip = match &bytes[end..] {
            [b'\r', b'\n', ..] => 2,
            [] => 0,
            _ => 1,
        };
        (self.prefix(end as isize), self.suffix((end + skip) as isize))
    }

    /// Drops leading lines that hold only whitespace.
    pub fn skip_blank_lines(&self) -> Self {
        let mut rest = *self;
        while !rest.is_empty() {
            let (line, next) = rest.next_line();
            if !line.trim().is_empty() {
                break;
            }
            rest = next;
        }
        rest
    }

    /// Content between the first `left` and the last `right` delimiter.
    /// The view is returned unchanged when the pair is missing or out of order.
    pub fn strip_enclosing(&self, left: u8, right: u8) -> Self {
        let bytes = self.text.as_bytes();
        let Some(open) = bytes.iter().position(|&b| b == left) else {
            return *self;
        };
        match bytes.iter().rposition(|&b| b == right) {
            Some(close) if close > open => self.slice(open as isize + 1, close as isize),
            _ => *self,
        }
    }
}
