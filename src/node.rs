//! The node chain a compiled pattern is made of.
//!
//! Nodes live in an arena owned by the [`Program`](crate::matcher::Program)
//! and refer to each other by [`NodeId`]. Each node names the node that must
//! match the rest of the input after it succeeds. Nodes hold no per-attempt
//! data; that lives in [`MatchState`](crate::state::MatchState) slots indexed
//! by the same id.

use std::fmt;

use crate::class::{eq_folded, CharClass};
use crate::decompose::Decomposition;
use crate::line::LineTerminator;
use crate::quantifier::{Policy, Quantifier};

/// Index of a node in its program's arena. Also its slot in per-attempt
/// counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    /// Accepts where the match may end: anywhere in find and prefix mode, only
    /// at the right bound in entire mode.
    Final,
    Leaf { leaf: Leaf, next: NodeId },
    GreedyQuantifier {
        leaf: Leaf,
        quantifier: Quantifier,
        next: NodeId,
    },
    ReluctantQuantifier {
        leaf: Leaf,
        quantifier: Quantifier,
        next: NodeId,
    },
    PossessiveQuantifier {
        leaf: Leaf,
        quantifier: Quantifier,
        next: NodeId,
    },
    /// Repetition of an arbitrary sub-chain. The body's tail is a `GroupEnd`
    /// pointing back here.
    CompositeQuantifier {
        body: NodeId,
        quantifier: Quantifier,
        policy: Policy,
        next: NodeId,
    },
    GroupEnd { quantifier: NodeId },
    /// `.*` outside dot-all mode.
    DotQuantifier {
        line: &'static LineTerminator,
        next: NodeId,
    },
    /// `.*` in dot-all mode.
    DotAllQuantifier { next: NodeId },
    /// Alternatives tried in order. Every branch continues at the same node.
    Alternation { branches: Vec<NodeId> },
    Anchor {
        anchor: Anchor,
        line: &'static LineTerminator,
        next: NodeId,
    },
}

/// A zero-width assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `\A`, and `^` outside multiline mode.
    StartOfInput,
    /// `^` in multiline mode.
    StartOfLine,
    /// `\z`
    EndOfInput,
    /// `$` outside multiline mode, and `\Z`: end of input, or before a final
    /// line terminator.
    EndOfLine,
    /// `$` in multiline mode.
    MultiLineEnd,
}

/// A matcher for exactly one input position.
#[derive(Debug, Clone)]
pub enum Leaf {
    Char(char),
    /// A literal compared under simple case folding.
    CharFold(char),
    Class { class: CharClass, fold: bool },
    /// `.` outside dot-all mode.
    Dot(&'static LineTerminator),
    /// `.` in dot-all mode.
    DotAll,
    Decomposition(Decomposition),
}

impl Leaf {
    /// Returns the number of bytes consumed at `pos`, or `None` if the leaf
    /// does not match there. Never reads at or past `right`.
    #[inline]
    pub fn accepts(&self, input: &str, pos: usize, right: usize) -> Option<usize> {
        if let Leaf::Decomposition(d) = self {
            return d.accepts(input, pos, right);
        }
        let ch = input.get(pos..right)?.chars().next()?;
        let ok = match self {
            Leaf::Char(c) => ch == *c,
            Leaf::CharFold(c) => eq_folded(*c, ch),
            Leaf::Class { class, fold: false } => class.contains(ch),
            Leaf::Class { class, fold: true } => class.contains_folded(ch),
            Leaf::Dot(line) => !line.is_line_terminator(ch),
            Leaf::DotAll => true,
            Leaf::Decomposition(_) => false,
        };
        if ok {
            Some(ch.len_utf8())
        } else {
            None
        }
    }

    /// Whether a failure at `pos` was caused by running out of region, so more
    /// input could have changed the outcome.
    pub fn overruns(&self, input: &str, pos: usize, right: usize) -> bool {
        match self {
            Leaf::Decomposition(d) => pos >= right || d.is_partial(input, pos, right),
            _ => pos >= right,
        }
    }

    /// Whether the leaf always consumes exactly one code point.
    pub fn is_single_char(&self) -> bool {
        !matches!(self, Leaf::Decomposition(_))
    }

    /// The set of code points this leaf can accept, when it is a plain set.
    pub fn class(&self) -> Option<CharClass> {
        match self {
            Leaf::Char(c) => Some(CharClass::single(*c)),
            Leaf::Class { class, fold: false } => Some(class.clone()),
            Leaf::Dot(LineTerminator::Unix) => Some(CharClass::single('\n').negate()),
            Leaf::Dot(LineTerminator::Unicode) => Some(
                CharClass::from_ranges([
                    ('\n', '\n'),
                    ('\r', '\r'),
                    ('\u{85}', '\u{85}'),
                    ('\u{2028}', '\u{2029}'),
                ])
                .negate(),
            ),
            Leaf::DotAll => Some(CharClass::any()),
            Leaf::CharFold(_) | Leaf::Class { fold: true, .. } | Leaf::Decomposition(_) => None,
        }
    }

    /// The ASCII byte a match must start with, if the leaf is a plain ASCII
    /// literal.
    pub fn literal_byte(&self) -> Option<u8> {
        match self {
            Leaf::Char(c) if c.is_ascii() => Some(*c as u8),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::Flags;

    #[test]
    fn widths_follow_utf8() {
        let input = "aé😀";
        assert_eq!(Leaf::Char('a').accepts(input, 0, input.len()), Some(1));
        assert_eq!(Leaf::Char('é').accepts(input, 1, input.len()), Some(2));
        assert_eq!(Leaf::DotAll.accepts(input, 3, input.len()), Some(4));
    }

    #[test]
    fn bounded_by_region() {
        let input = "ab";
        assert_eq!(Leaf::Char('b').accepts(input, 1, 1), None);
        assert!(Leaf::Char('b').overruns(input, 1, 1));
        assert_eq!(Leaf::DotAll.accepts(input, 2, 2), None);
        // A multi-byte character cut by the region is not accepted.
        assert_eq!(Leaf::DotAll.accepts("é", 0, 1), None);
    }

    #[test]
    fn dot_respects_policy() {
        let unicode = LineTerminator::from_flags(Flags::empty());
        let unix = LineTerminator::from_flags(Flags::UNIX_LINES);
        assert_eq!(Leaf::Dot(unicode).accepts("\r", 0, 1), None);
        assert_eq!(Leaf::Dot(unix).accepts("\r", 0, 1), Some(1));
        assert_eq!(Leaf::Dot(unix).accepts("\n", 0, 1), None);
    }

    #[test]
    fn folded_literals() {
        assert_eq!(Leaf::CharFold('k').accepts("K", 0, 1), Some(1));
        assert_eq!(Leaf::CharFold('K').accepts("k", 0, 1), Some(1));
        assert_eq!(Leaf::CharFold('k').accepts("x", 0, 1), None);
    }

    #[test]
    fn dot_class_matches_dot() {
        let unicode = LineTerminator::from_flags(Flags::empty());
        let class = Leaf::Dot(unicode).class().unwrap();
        for ch in ['a', '\n', '\r', '\u{85}', '\u{2028}', '\u{2029}', '\u{2027}'] {
            assert_eq!(class.contains(ch), !unicode.is_line_terminator(ch), "{:?}", ch);
        }
    }
}
