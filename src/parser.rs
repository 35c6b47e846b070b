use crate::ast::{ClassItem, ClassNode, RegexNode};
use crate::error::{Error, Result};
use crate::quantifier::{Policy, Quantifier};

/// Parser for regular expressions.
///
/// The `Parser` struct holds the pattern and the current byte position.
pub struct Parser<'a> {
    pub pattern: &'a str,
    pub pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given pattern.
    pub fn new(pattern: &'a str) -> Self {
        Self { pattern, pos: 0 }
    }

    /// Peek at the next character in the pattern without advancing.
    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    /// Peek at the character after the next one.
    fn peek2(&self) -> Option<char> {
        let mut chars = self.pattern[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance the parser by one character and return it.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Expect a specific character and advance if it matches.
    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(Error::syntax(self.pos, message))
    }

    /// Entry point for parsing a regex pattern.
    ///
    /// Calls `parse_alt` to parse the full pattern and rejects trailing input.
    ///
    /// Example:
    /// - Pattern: `a|b` → Alt([Seq([Literal('a')]), Seq([Literal('b')])])
    pub fn parse(&mut self) -> Result<RegexNode> {
        let node = self.parse_alt()?;
        if self.peek().is_some() {
            return self.error("unmatched ')'");
        }
        Ok(node)
    }

    /// Parse alternation (`|`) in the pattern.
    ///
    /// Example:
    /// - Pattern: `a|b|c` → Alt([Seq([Literal('a')]), Seq([Literal('b')]), Seq([Literal('c')])])
    /// - Pattern: `abc`   → Seq([Literal('a'), Literal('b'), Literal('c')])
    fn parse_alt(&mut self) -> Result<RegexNode> {
        let mut branches = vec![self.parse_seq()?];
        while self.expect('|') {
            branches.push(self.parse_seq()?);
        }
        Ok(if branches.len() == 1 {
            branches.swap_remove(0)
        } else {
            RegexNode::Alt(branches)
        })
    }

    /// Parse a sequence of regex atoms (concatenation).
    fn parse_seq(&mut self) -> Result<RegexNode> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == '|' {
                break;
            }
            nodes.push(self.parse_repeat()?);
        }
        Ok(RegexNode::Seq(nodes))
    }

    /// Parse a repetition operator after an atom, with its optional policy suffix.
    ///
    /// Example:
    /// - Pattern: `a?`     → Repeat { Literal('a'), {0,1}, Greedy }
    /// - Pattern: `b+?`    → Repeat { Literal('b'), {1,}, Reluctant }
    /// - Pattern: `c{2,3}+` → Repeat { Literal('c'), {2,3}, Possessive }
    /// - Pattern: `d`      → Literal('d')
    fn parse_repeat(&mut self) -> Result<RegexNode> {
        let atom = self.parse_atom()?;
        let quantifier = match self.peek() {
            Some('*') => {
                self.advance();
                Quantifier::STAR
            }
            Some('+') => {
                self.advance();
                Quantifier::PLUS
            }
            Some('?') => {
                self.advance();
                Quantifier::QUESTION
            }
            Some('{') => self.parse_bounds()?,
            _ => return Ok(atom),
        };
        let policy = if self.expect('?') {
            Policy::Reluctant
        } else if self.expect('+') {
            Policy::Possessive
        } else {
            Policy::Greedy
        };
        if matches!(self.peek(), Some('*' | '+' | '?' | '{')) {
            return self.error("dangling quantifier");
        }
        Ok(RegexNode::Repeat {
            node: Box::new(atom),
            quantifier,
            policy,
        })
    }

    /// Parse `{n}`, `{n,}` or `{n,m}`.
    fn parse_bounds(&mut self) -> Result<Quantifier> {
        let start = self.pos;
        self.advance(); // consume '{'
        let min = match self.parse_number()? {
            Some(n) => n,
            None => return self.error("malformed repetition"),
        };
        let max = if self.expect(',') {
            self.parse_number()?
        } else {
            Some(min)
        };
        if !self.expect('}') {
            return self.error("malformed repetition");
        }
        Quantifier::new(min, max).map_err(|_| Error::syntax(start, "repetition minimum exceeds maximum"))
    }

    fn parse_number(&mut self) -> Result<Option<usize>> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if start == self.pos {
            return Ok(None);
        }
        match self.pattern[start..self.pos].parse() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(Error::syntax(start, "repetition count too large")),
        }
    }

    /// Parse a single regex atom: group, char class, escape, literal, or anchor.
    ///
    /// Examples:
    /// - Pattern: `(abc)`  → Group { capturing: true, Seq([...]) }
    /// - Pattern: `(?:ab)` → Group { capturing: false, Seq([...]) }
    /// - Pattern: `[abc]`  → Class(Set { ... })
    /// - Pattern: `\d`     → Class(Digit)
    /// - Pattern: `.`      → Dot
    /// - Pattern: `^`      → StartAnchor
    /// - Pattern: `$`      → EndAnchor
    /// - Pattern: `a`      → Literal('a')
    fn parse_atom(&mut self) -> Result<RegexNode> {
        match self.peek() {
            Some('(') => {
                self.advance();
                let capturing = if self.peek() == Some('?') {
                    if self.peek2() != Some(':') {
                        return self.error("unsupported group construct");
                    }
                    self.pos += 2;
                    false
                } else {
                    true
                };
                let node = self.parse_alt()?;
                if !self.expect(')') {
                    return self.error("unclosed group");
                }
                Ok(RegexNode::Group {
                    capturing,
                    node: Box::new(node),
                })
            }
            Some('[') => Ok(RegexNode::Class(self.parse_class()?)),
            Some('\\') => {
                self.advance();
                self.parse_escape()
            }
            Some('.') => {
                self.advance();
                Ok(RegexNode::Dot)
            }
            Some('^') => {
                self.advance();
                Ok(RegexNode::StartAnchor)
            }
            Some('$') => {
                self.advance();
                Ok(RegexNode::EndAnchor)
            }
            Some('*' | '+' | '?' | '{') => self.error("dangling meta character"),
            Some(c) => {
                self.advance();
                Ok(RegexNode::Literal(c))
            }
            None => Ok(RegexNode::Seq(vec![])),
        }
    }

    /// Parse the escape after a backslash outside a class.
    fn parse_escape(&mut self) -> Result<RegexNode> {
        let node = match self.peek() {
            Some('A') => RegexNode::StartOfInput,
            Some('z') => RegexNode::EndOfInput,
            Some('Z') => RegexNode::EndOfInputOrLine,
            Some(c) => match shorthand(c) {
                Some(class) => RegexNode::Class(class),
                None => return Ok(RegexNode::Literal(self.parse_escaped_char()?)),
            },
            None => return self.error("trailing backslash"),
        };
        self.advance();
        Ok(node)
    }

    /// Parse an escaped character (the backslash is already consumed).
    fn parse_escaped_char(&mut self) -> Result<char> {
        let start = self.pos;
        let c = match self.advance() {
            Some(c) => c,
            None => return self.error("trailing backslash"),
        };
        let escaped = match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'f' => '\x0C',
            'e' => '\x1B',
            'x' => self.parse_hex(2)?,
            'u' => self.parse_hex(4)?,
            '0' => self.parse_octal()?,
            c if c.is_ascii_alphanumeric() => {
                return Err(Error::syntax(start, format!("unsupported escape '\\{}'", c)))
            }
            c => c,
        };
        Ok(escaped)
    }

    fn parse_hex(&mut self, digits: usize) -> Result<char> {
        let start = self.pos;
        let end = start + digits;
        let hex = match self.pattern.get(start..end) {
            Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => hex,
            _ => return self.error("malformed hexadecimal escape"),
        };
        self.pos = end;
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| Error::syntax(start, "escape is not a scalar value"))
    }

    /// Parse the digits of `\0n`, `\0nn` or `\0mnn` (m at most 3).
    fn parse_octal(&mut self) -> Result<char> {
        let mut value = 0u32;
        let mut digits = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(8)) {
            if digits == 3 || (digits == 2 && value > 0o37) {
                break;
            }
            value = value * 8 + d;
            digits += 1;
            self.advance();
        }
        if digits == 0 {
            return self.error("illegal octal escape");
        }
        char::from_u32(value).ok_or_else(|| Error::syntax(self.pos, "illegal octal escape"))
    }

    /// Parse a character class, e.g. `[abc]`, `[^a-z]` or `[a-z&&[^aeiou]]`.
    ///
    /// Examples:
    /// - Pattern: `[abc]`   → Set { items: [Literal('a'), Literal('b'), Literal('c')], negated: false }
    /// - Pattern: `[^x-z]`  → Set { items: [Range('x', 'z')], negated: true }
    /// - Pattern: `[\d_]`   → Set { items: [Nested(Digit), Literal('_')], negated: false }
    fn parse_class(&mut self) -> Result<ClassNode> {
        let open = self.pos;
        self.advance(); // consume '['
        let negated = self.expect('^');
        let items = self.parse_class_items()?;
        let mut intersections = Vec::new();
        while self.peek() == Some('&') && self.peek2() == Some('&') {
            self.pos += 2;
            let operand = self.parse_class_items()?;
            intersections.push(ClassNode::Set {
                items: operand,
                intersections: Vec::new(),
                negated: false,
            });
        }
        if !self.expect(']') {
            return Err(Error::syntax(open, "unclosed character class"));
        }
        if items.is_empty() && intersections.is_empty() {
            return Err(Error::syntax(open, "empty character class"));
        }
        Ok(ClassNode::Set {
            items,
            intersections,
            negated,
        })
    }

    /// Parse class items up to `]` or `&&`.
    fn parse_class_items(&mut self) -> Result<Vec<ClassItem>> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None | Some(']') => break,
                Some('&') if self.peek2() == Some('&') => break,
                Some('[') => items.push(ClassItem::Nested(self.parse_class()?)),
                Some(_) => {
                    let start = self.pos;
                    let lo = match self.parse_class_char()? {
                        Ok(c) => c,
                        Err(class) => {
                            items.push(ClassItem::Nested(class));
                            continue;
                        }
                    };
                    if self.peek() == Some('-') && !matches!(self.peek2(), Some(']') | None) {
                        self.advance();
                        let hi = match self.parse_class_char()? {
                            Ok(c) => c,
                            Err(_) => return Err(Error::syntax(start, "illegal character range")),
                        };
                        if hi < lo {
                            return Err(Error::syntax(start, "illegal character range"));
                        }
                        items.push(ClassItem::Range(lo, hi));
                    } else {
                        items.push(ClassItem::Literal(lo));
                    }
                }
            }
        }
        Ok(items)
    }

    /// A single class character, or a shorthand class if the escape names one.
    fn parse_class_char(&mut self) -> Result<std::result::Result<char, ClassNode>> {
        match self.advance() {
            Some('\\') => {
                if let Some(class) = self.peek().and_then(shorthand) {
                    self.advance();
                    return Ok(Err(class));
                }
                Ok(Ok(self.parse_escaped_char()?))
            }
            Some(c) => Ok(Ok(c)),
            None => self.error("unclosed character class"),
        }
    }
}

fn shorthand(c: char) -> Option<ClassNode> {
    let class = match c {
        'd' => ClassNode::Digit { negated: false },
        'D' => ClassNode::Digit { negated: true },
        'w' => ClassNode::Word { negated: false },
        'W' => ClassNode::Word { negated: true },
        's' => ClassNode::Space { negated: false },
        'S' => ClassNode::Space { negated: true },
        _ => return None,
    };
    Some(class)
}
