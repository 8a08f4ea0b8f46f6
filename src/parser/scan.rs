// Low-level text scanning used by the markdown extractor.
//
// The page content is ASCII table noise with the occasional unicode glyph, so
// everything here walks raw bytes. Positions are byte offsets and only ever
// advance past ASCII, which keeps slice boundaries valid.

/// Case-insensitive substring search starting at `from`. Returns a byte offset.
pub(crate) fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let ned = needle.as_bytes();
    if ned.is_empty() || from > hay.len() {
        return None;
    }
    let last = hay.len().checked_sub(ned.len())?;
    (from..=last).find(|&i| hay[i..i + ned.len()].eq_ignore_ascii_case(ned))
}

/// Word characters in the source format: ASCII letters, digits, underscore.
pub(crate) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Forward-only scanning cursor over text, starting at an arbitrary offset.
#[derive(Clone)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Consumes `b` if it is next.
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes an ASCII literal, ignoring case.
    pub fn eat_ci(&mut self, literal: &str) -> bool {
        let end = self.pos + literal.len();
        if end <= self.text.len()
            && self.text.as_bytes()[self.pos..end].eq_ignore_ascii_case(literal.as_bytes())
        {
            self.pos = end;
            true
        } else {
            false
        }
    }

    /// Consumes bytes while `pred` holds.
    pub fn skip_while(&mut self, pred: impl Fn(u8) -> bool) {
        while matches!(self.peek(), Some(b) if pred(b)) {
            self.bump();
        }
    }

    /// Consumes any run of whitespace, newlines included.
    pub fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    /// Consumes a whitespace run and reports whether it was non-empty.
    pub fn skip_ws_required(&mut self) -> bool {
        let start = self.pos;
        self.skip_ws();
        self.pos > start
    }

    /// Consumes a whitespace run and reports whether it crossed a line break.
    pub fn skip_ws_over_newline(&mut self) -> bool {
        let mut saw_newline = false;
        while let Some(b) = self.peek() {
            if !b.is_ascii_whitespace() {
                break;
            }
            if b == b'\n' {
                saw_newline = true;
            }
            self.bump();
        }
        saw_newline
    }

    /// Consumes an explicit `+`/`-` and returns it as a factor.
    pub fn sign(&mut self) -> Option<f64> {
        match self.peek() {
            Some(b'+') => {
                self.bump();
                Some(1.0)
            }
            Some(b'-') => {
                self.bump();
                Some(-1.0)
            }
            _ => None,
        }
    }

    /// Consumes a price-style number with comma thousands separators, e.g.
    /// `4,491.64`. With `fraction_required` the decimal part must be present;
    /// otherwise it is consumed when it is there.
    pub fn comma_number(&mut self, fraction_required: bool) -> Option<f64> {
        let start = self.pos;
        let mut saw_digit = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => {
                    saw_digit = true;
                    self.bump();
                }
                b',' => self.bump(),
                _ => break,
            }
        }
        if !saw_digit {
            self.pos = start;
            return None;
        }
        if fraction_required {
            if !self.eat(b'.') {
                self.pos = start;
                return None;
            }
            let frac_start = self.pos;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.bump();
            }
            if self.pos == frac_start {
                self.pos = start;
                return None;
            }
        } else if self.eat(b'.') {
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.bump();
            }
        }
        match self.text[start..self.pos].replace(',', "").parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    /// Consumes a bare digits-and-dot number (table cell style, no commas).
    pub fn plain_number(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut saw_digit = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => {
                    saw_digit = true;
                    self.bump();
                }
                b'.' => self.bump(),
                _ => break,
            }
        }
        if !saw_digit {
            self.pos = start;
            return None;
        }
        match self.text[start..self.pos].parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    /// Consumes an unsigned decimal integer.
    pub fn uint(&mut self) -> Option<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        if self.pos == start {
            return None;
        }
        match self.text[start..self.pos].parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    /// Consumes a run of word characters.
    pub fn word(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_word_byte(b)) {
            self.bump();
        }
        if self.pos == start {
            None
        } else {
            Some(&self.text[start..self.pos])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_ci_ignores_case_and_respects_offset() {
        let text = "Moving Averages: moving averages";
        assert_eq!(find_ci(text, "MOVING", 0), Some(0));
        assert_eq!(find_ci(text, "MOVING", 1), Some(17));
        assert_eq!(find_ci(text, "pivot", 0), None);
    }

    #[test]
    fn comma_number_strips_separators() {
        let mut c = Cursor::new("1,234,567.89 USD", 0);
        assert_eq!(c.comma_number(true), Some(1234567.89));
    }

    #[test]
    fn comma_number_fraction_requirement() {
        let mut c = Cursor::new("4,491 next", 0);
        assert_eq!(c.comma_number(true), None);
        // cursor is restored on failure
        assert_eq!(c.comma_number(false), Some(4491.0));
    }

    #[test]
    fn plain_number_rejects_double_dot() {
        let mut c = Cursor::new("1.2.3", 0);
        assert_eq!(c.plain_number(), None);
    }

    #[test]
    fn sign_and_uint() {
        let mut c = Cursor::new("-12", 0);
        assert_eq!(c.sign(), Some(-1.0));
        assert_eq!(c.uint(), Some(12));
    }

    #[test]
    fn ws_over_newline_requires_a_line_break() {
        let mut c = Cursor::new("   \n  +1", 0);
        assert!(c.skip_ws_over_newline());
        assert!(c.eat(b'+'));
        let mut c2 = Cursor::new("   +1", 0);
        assert!(!c2.skip_ws_over_newline());
    }
}
