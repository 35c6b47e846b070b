use std::fmt;

use crate::quantifier::{Policy, Quantifier};

#[derive(Debug, Clone)]
pub enum RegexNode {
    Seq(Vec<RegexNode>),
    Alt(Vec<RegexNode>),
    Repeat {
        node: Box<RegexNode>,
        quantifier: Quantifier,
        policy: Policy,
    },
    Group {
        capturing: bool,
        node: Box<RegexNode>,
    },
    /// `^`
    StartAnchor,
    /// `$`
    EndAnchor,
    /// `\A`
    StartOfInput,
    /// `\z`
    EndOfInput,
    /// `\Z`
    EndOfInputOrLine,
    Dot,
    Class(ClassNode),
    Literal(char),
}

/// A bracketed or shorthand class as written in the pattern.
#[derive(Debug, Clone)]
pub enum ClassNode {
    Digit { negated: bool },
    Word { negated: bool },
    Space { negated: bool },
    Set {
        items: Vec<ClassItem>,
        /// Operands of `&&`, each intersected with `items`.
        intersections: Vec<ClassNode>,
        negated: bool,
    },
}

#[derive(Debug, Clone)]
pub enum ClassItem {
    Literal(char),
    Range(char, char),
    Nested(ClassNode),
}

impl RegexNode {
    /// Whether this node matches exactly one code point.
    pub fn is_single_char(&self) -> bool {
        matches!(self, RegexNode::Dot | RegexNode::Class(_) | RegexNode::Literal(_))
    }
}

impl fmt::Display for RegexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexNode::Seq(nodes) => nodes.iter().try_for_each(|n| write!(f, "{}", n)),
            RegexNode::Alt(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", branch)?;
                }
                Ok(())
            }
            RegexNode::Repeat {
                node,
                quantifier,
                policy,
            } => {
                if node.is_single_char() {
                    write!(f, "{}", node)?;
                } else {
                    write!(f, "(?:{})", node)?;
                }
                write!(f, "{}{}", quantifier, policy.suffix())
            }
            RegexNode::Group { capturing: true, node } => write!(f, "({})", node),
            RegexNode::Group { capturing: false, node } => write!(f, "(?:{})", node),
            RegexNode::StartAnchor => f.write_str("^"),
            RegexNode::EndAnchor => f.write_str("$"),
            RegexNode::StartOfInput => f.write_str("\\A"),
            RegexNode::EndOfInput => f.write_str("\\z"),
            RegexNode::EndOfInputOrLine => f.write_str("\\Z"),
            RegexNode::Dot => f.write_str("."),
            RegexNode::Class(class) => write!(f, "{}", class),
            RegexNode::Literal(c) => write_literal(f, *c, false),
        }
    }
}

impl fmt::Display for ClassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassNode::Digit { negated } => f.write_str(if *negated { "\\D" } else { "\\d" }),
            ClassNode::Word { negated } => f.write_str(if *negated { "\\W" } else { "\\w" }),
            ClassNode::Space { negated } => f.write_str(if *negated { "\\S" } else { "\\s" }),
            ClassNode::Set {
                items,
                intersections,
                negated,
            } => {
                f.write_str("[")?;
                if *negated {
                    f.write_str("^")?;
                }
                for item in items {
                    match item {
                        ClassItem::Literal(c) => write_literal(f, *c, true)?,
                        ClassItem::Range(lo, hi) => {
                            write_literal(f, *lo, true)?;
                            f.write_str("-")?;
                            write_literal(f, *hi, true)?;
                        }
                        ClassItem::Nested(class) => write!(f, "{}", class)?,
                    }
                }
                for operand in intersections {
                    write!(f, "&&{}", operand)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, c: char, in_class: bool) -> fmt::Result {
    let special = if in_class {
        matches!(c, '\\' | '[' | ']' | '^' | '-' | '&')
    } else {
        matches!(
            c,
            '\\' | '.' | '[' | ']' | '(' | ')' | '{' | '}' | '*' | '+' | '?' | '|' | '^' | '$'
        )
    };
    match c {
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        c if special => write!(f, "\\{}", c),
        c if c.is_control() => write!(f, "\\u{:04X}", c as u32),
        c => write!(f, "{}", c),
    }
}
