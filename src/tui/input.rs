// Input line editing
//
// A minimal single-line editor: append, backspace, replace (for history
// recall), and take-on-submit. Rendering shows the tail of the line when it
// is wider than the input bar, using display widths so CJK and emoji don't
// break the cursor position.

use unicode_width::UnicodeWidthChar;

/// Hard cap on typed characters
const MAX_INPUT_CHARS: usize = 1024;

#[derive(Default)]
pub struct InputLine {
    buffer: String,
}

impl InputLine {
    #[allow(dead_code)] // test assertion helper
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn push(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if self.buffer.chars().count() >= MAX_INPUT_CHARS {
            return;
        }
        self.buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Replace the whole line (history recall)
    pub fn set(&mut self, text: String) {
        self.buffer = text;
    }

    /// Take the line for submission, leaving it empty
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// The widest suffix of the line that fits in max_cols terminal
    /// columns, plus its display width (for cursor placement)
    pub fn visible_tail(&self, max_cols: u16) -> (&str, u16) {
        let max = max_cols as usize;
        let mut width = 0usize;
        let mut start = self.buffer.len();
        for (idx, ch) in self.buffer.char_indices().rev() {
            let w = ch.width().unwrap_or(0);
            if width + w > max {
                break;
            }
            width += w;
            start = idx;
        }
        (&self.buffer[start..], width as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> InputLine {
        let mut input = InputLine::default();
        input.set(text.to_string());
        input
    }

    #[test]
    fn push_and_backspace_edit_the_tail() {
        let mut input = InputLine::default();
        input.push('h');
        input.push('i');
        input.backspace();
        assert_eq!(input.as_str(), "h");
    }

    #[test]
    fn control_characters_are_ignored() {
        let mut input = InputLine::default();
        input.push('\u{7}');
        input.push('\t');
        assert_eq!(input.as_str(), "");
    }

    #[test]
    fn take_clears_the_line() {
        let mut input = line("hello");
        assert_eq!(input.take(), "hello");
        assert_eq!(input.as_str(), "");
    }

    #[test]
    fn short_lines_are_fully_visible() {
        let input = line("hello");
        assert_eq!(input.visible_tail(10), ("hello", 5));
    }

    #[test]
    fn long_lines_show_only_the_tail() {
        let input = line("abcdefghij");
        assert_eq!(input.visible_tail(4), ("ghij", 4));
    }

    #[test]
    fn wide_characters_count_double() {
        let input = line("ab漢字");
        // Each CJK char is two columns wide
        assert_eq!(input.visible_tail(4), ("漢字", 4));
        assert_eq!(input.visible_tail(5), ("b漢字", 5));
    }
}
