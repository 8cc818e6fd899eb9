/// A single editing operation on an [`InputBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
    /// Ctrl+W: drop trailing whitespace, then the word before it.
    DeleteWord,
    Left,
    Right,
    Home,
    End,
}

/// Editable text with a cursor, used by the comment editor and the
/// navigator filter. The cursor is a char index, not a byte offset.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    pub fn apply(&mut self, edit: Edit) {
        match edit {
            Edit::Insert(c) => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            Edit::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.chars.remove(self.cursor);
                }
            }
            Edit::DeleteWord => {
                let mut start = self.cursor;
                while start > 0 && self.chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                while start > 0 && !self.chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                self.chars.drain(start..self.cursor);
                self.cursor = start;
            }
            Edit::Left => self.cursor = self.cursor.saturating_sub(1),
            Edit::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            Edit::Home => self.cursor = 0,
            Edit::End => self.cursor = self.chars.len(),
        }
    }
}

impl std::fmt::Display for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> InputBuffer {
        let mut buf = InputBuffer::new();
        s.chars().for_each(|c| buf.apply(Edit::Insert(c)));
        buf
    }

    #[test]
    fn test_new_empty() {
        let buf = InputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_insert_appends_and_moves_cursor() {
        let buf = typed("abc");
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut buf = typed("ac");
        buf.apply(Edit::Left);
        buf.apply(Edit::Insert('b'));
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_backspace() {
        let mut buf = typed("abc");
        buf.apply(Edit::Backspace);
        assert_eq!(buf.text(), "ab");
        buf.apply(Edit::Home);
        buf.apply(Edit::Backspace);
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut buf = typed("ab");
        buf.apply(Edit::Right);
        assert_eq!(buf.cursor(), 2);
        buf.apply(Edit::Home);
        buf.apply(Edit::Left);
        assert_eq!(buf.cursor(), 0);
        buf.apply(Edit::End);
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_delete_word() {
        let mut buf = typed("hello big world  ");
        buf.apply(Edit::DeleteWord);
        assert_eq!(buf.text(), "hello big ");
        buf.apply(Edit::DeleteWord);
        assert_eq!(buf.text(), "hello ");
        buf.apply(Edit::DeleteWord);
        assert_eq!(buf.text(), "");
        buf.apply(Edit::DeleteWord);
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_multibyte_chars() {
        let mut buf = typed("héllo 🦀");
        assert_eq!(buf.cursor(), 7);
        buf.apply(Edit::Backspace);
        assert_eq!(buf.text(), "héllo ");
        assert_eq!(buf.to_string(), "héllo ");
    }

    #[test]
    fn test_newline_is_ordinary_char() {
        let buf = typed("a\nb");
        assert_eq!(buf.text(), "a\nb");
        assert_eq!(buf.cursor(), 3);
    }
}
