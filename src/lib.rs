//! A backtracking regular expression engine.
//!
//! A pattern is parsed into a [`RegexNode`](ast::RegexNode) tree, lowered into
//! a chain of nodes (see [`node`]) and run by a backtracking matcher
//! with an explicit stack. Positions are byte offsets into UTF-8 input; every node consumes
//! whole code points.
//!
//! ```
//! use chainre::Regex;
//!
//! let re = Regex::new("a+?").unwrap();
//! assert_eq!(re.find("aaa").unwrap().map(|m| m.range()), Some(0..1));
//! ```

pub mod ast;
pub mod class;
mod compile;
pub mod decompose;
mod error;
mod flags;
pub mod line;
pub mod matcher;
pub mod node;
pub mod parser;
pub mod quantifier;
mod regex;
pub mod state;

pub use crate::compile::Compiler;
pub use crate::error::{Error, Result};
pub use crate::flags::Flags;
pub use crate::matcher::{Limits, Match, MatchOutcome, Program, Region, DEFAULT_DEPTH_LIMIT};
pub use crate::regex::{Matcher, Matches, Regex, RegexBuilder};
pub use crate::state::MatchMode;

/// Returns true if `pattern` matches anywhere in `input`.
pub fn is_match(input: &str, pattern: &str) -> Result<bool> {
    Regex::new(pattern)?.is_match(input)
}
