use crate::flags::Flags;

/// Which code points count as line breaks for anchors and `.`.
#[derive(Debug, PartialEq, Eq)]
pub enum LineTerminator {
    /// Only `\n`.
    Unix,
    /// `\n`, `\r`, NEL, LS and PS.
    Unicode,
}

static UNIX: LineTerminator = LineTerminator::Unix;
static UNICODE: LineTerminator = LineTerminator::Unicode;

const NEL: char = '\u{85}';

impl LineTerminator {
    /// Returns the shared policy for the given flags.
    pub fn from_flags(flags: Flags) -> &'static LineTerminator {
        if flags.contains(Flags::UNIX_LINES) {
            &UNIX
        } else {
            &UNICODE
        }
    }

    pub fn is_line_terminator(&self, ch: char) -> bool {
        match self {
            LineTerminator::Unix => ch == '\n',
            LineTerminator::Unicode => {
                // LS (U+2028) and PS (U+2029) differ only in the low bit.
                ch == '\n' || ch == '\r' || ch == NEL || (ch as u32 | 1) == 0x2029
            }
        }
    }

    /// Returns true if a line starts right after `prev`, given the character
    /// that follows it (if any). A `\r` immediately followed by `\n` is not a
    /// break on its own.
    pub fn is_after_line_terminator(&self, prev: char, next: Option<char>) -> bool {
        match self {
            LineTerminator::Unix => prev == '\n',
            LineTerminator::Unicode => {
                prev == '\n'
                    || prev == NEL
                    || (prev as u32 | 1) == 0x2029
                    || (prev == '\r' && next != Some('\n'))
            }
        }
    }

    /// Whether `\r\n` is treated as a single terminator.
    pub fn is_crlf_aware(&self) -> bool {
        matches!(self, LineTerminator::Unicode)
    }

    /// Byte offset of the first terminator in `haystack`, if any.
    pub fn find(&self, haystack: &str) -> Option<usize> {
        match self {
            LineTerminator::Unix => memchr::memchr(b'\n', haystack.as_bytes()),
            LineTerminator::Unicode => haystack
                .char_indices()
                .find(|&(_, ch)| self.is_line_terminator(ch))
                .map(|(i, _)| i),
        }
    }

    /// Byte offset of the last terminator in `haystack`, if any.
    pub fn rfind(&self, haystack: &str) -> Option<usize> {
        match self {
            LineTerminator::Unix => memchr::memrchr(b'\n', haystack.as_bytes()),
            LineTerminator::Unicode => haystack
                .char_indices()
                .rev()
                .find(|&(_, ch)| self.is_line_terminator(ch))
                .map(|(i, _)| i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_per_variant() {
        let a = LineTerminator::from_flags(Flags::UNIX_LINES);
        let b = LineTerminator::from_flags(Flags::UNIX_LINES | Flags::DOTALL);
        assert!(std::ptr::eq(a, b));
        let c = LineTerminator::from_flags(Flags::empty());
        let d = LineTerminator::from_flags(Flags::MULTILINE);
        assert!(std::ptr::eq(c, d));
        assert!(!std::ptr::eq(a, c));
    }

    #[test]
    fn unicode_terminators() {
        let lt = LineTerminator::from_flags(Flags::empty());
        for ch in ['\n', '\r', '\u{85}', '\u{2028}', '\u{2029}'] {
            assert!(lt.is_line_terminator(ch), "{:?}", ch);
        }
        assert!(!lt.is_line_terminator('\u{2027}'));
        assert!(!lt.is_line_terminator('a'));
    }

    #[test]
    fn unix_terminators() {
        let lt = LineTerminator::from_flags(Flags::UNIX_LINES);
        assert!(lt.is_line_terminator('\n'));
        assert!(!lt.is_line_terminator('\r'));
        assert!(!lt.is_line_terminator('\u{2028}'));
    }

    #[test]
    fn after_terminator() {
        let lt = LineTerminator::from_flags(Flags::empty());
        assert!(lt.is_after_line_terminator('\r', Some('a')));
        assert!(lt.is_after_line_terminator('\r', None));
        assert!(!lt.is_after_line_terminator('\r', Some('\n')));
        assert!(lt.is_after_line_terminator('\n', Some('\n')));

        let unix = LineTerminator::from_flags(Flags::UNIX_LINES);
        assert!(!unix.is_after_line_terminator('\r', Some('a')));
        assert!(unix.is_after_line_terminator('\n', None));
    }

    #[test]
    fn scans() {
        let lt = LineTerminator::from_flags(Flags::empty());
        assert_eq!(lt.find("ab\u{2028}c\n"), Some(2));
        assert_eq!(lt.rfind("ab\u{2028}c\n"), Some(6));
        assert_eq!(lt.find("abc"), None);
        let unix = LineTerminator::from_flags(Flags::UNIX_LINES);
        assert_eq!(unix.find("a\rb\n"), Some(3));
        assert_eq!(unix.rfind("\na\rb"), Some(0));
    }
}
