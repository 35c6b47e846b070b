use std::sync::Arc;

use crate::compile::Compiler;
use crate::error::{Error, Result};
use crate::flags::Flags;
use crate::matcher::{Limits, Match, Program, Region};
use crate::parser::Parser;
use crate::state::MatchMode;

/// A compiled regular expression.
///
/// Cloning is cheap and clones share the compiled program; a `Regex` can be
/// used from many threads at once.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: Arc<str>,
    program: Arc<Program>,
}

impl Regex {
    /// Compiles `pattern` with default flags.
    pub fn new(pattern: &str) -> Result<Regex> {
        RegexBuilder::new(pattern).build()
    }

    pub fn builder(pattern: &str) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> Flags {
        self.program.flags()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Returns true if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> Result<bool> {
        Ok(self.find(text)?.is_some())
    }

    /// Returns true if the pattern matches all of `text`.
    pub fn matches(&self, text: &str) -> Result<bool> {
        let outcome = self
            .program
            .attempt_match(text, &Region::whole(text), MatchMode::Entire)?;
        Ok(outcome.success())
    }

    /// Returns the leftmost match in `text`.
    pub fn find(&self, text: &str) -> Result<Option<Match>> {
        let outcome = self.program.attempt_find(text, &Region::whole(text), 0)?;
        Ok(outcome.found)
    }

    /// Iterates over successive non-overlapping matches.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches {
            regex: self,
            text,
            next_from: Some(0),
        }
    }

    /// A stateful matcher over `text`, with a region and bounds that can be
    /// adjusted between searches.
    pub fn matcher<'r, 't>(&'r self, text: &'t str) -> Matcher<'r, 't> {
        Matcher::new(self, text)
    }
}

/// Builds a [`Regex`] with non-default flags or limits.
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: String,
    flags: Flags,
    limits: Limits,
    auto_possessive: bool,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_string(),
            flags: Flags::empty(),
            limits: Limits::default(),
            auto_possessive: true,
        }
    }

    pub fn build(&self) -> Result<Regex> {
        let ast = Parser::new(&self.pattern).parse()?;
        let program = Compiler::new(self.flags)
            .limits(self.limits)
            .auto_possessive(self.auto_possessive)
            .compile(&ast);
        Ok(Regex {
            pattern: Arc::from(self.pattern.as_str()),
            program: Arc::new(program),
        })
    }

    /// Replaces all flags.
    pub fn flags(&mut self, flags: Flags) -> &mut RegexBuilder {
        self.flags = flags;
        self
    }

    pub fn case_insensitive(&mut self, yes: bool) -> &mut RegexBuilder {
        self.flags.set(Flags::CASE_INSENSITIVE, yes);
        self
    }

    pub fn multi_line(&mut self, yes: bool) -> &mut RegexBuilder {
        self.flags.set(Flags::MULTILINE, yes);
        self
    }

    pub fn dot_all(&mut self, yes: bool) -> &mut RegexBuilder {
        self.flags.set(Flags::DOTALL, yes);
        self
    }

    pub fn unix_lines(&mut self, yes: bool) -> &mut RegexBuilder {
        self.flags.set(Flags::UNIX_LINES, yes);
        self
    }

    pub fn canon_eq(&mut self, yes: bool) -> &mut RegexBuilder {
        self.flags.set(Flags::CANON_EQ, yes);
        self
    }

    /// Abort any attempt after this many node transitions.
    pub fn step_limit(&mut self, limit: Option<usize>) -> &mut RegexBuilder {
        self.limits.step_limit = limit;
        self
    }

    /// Abort any attempt that holds more than this many pending backtracking
    /// points. These live on the heap, not the native stack.
    pub fn depth_limit(&mut self, limit: usize) -> &mut RegexBuilder {
        self.limits.depth_limit = limit;
        self
    }

    pub fn auto_possessive(&mut self, yes: bool) -> &mut RegexBuilder {
        self.auto_possessive = yes;
        self
    }
}

/// Iterator over successive matches, created by [`Regex::find_iter`].
///
/// An empty match is followed by a search one character further on. An error
/// ends the iteration.
#[derive(Debug)]
pub struct Matches<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    next_from: Option<usize>,
}

impl<'r, 't> Iterator for Matches<'r, 't> {
    type Item = Result<Match>;

    fn next(&mut self) -> Option<Result<Match>> {
        let from = self.next_from?;
        let outcome = self
            .regex
            .program
            .attempt_find(self.text, &Region::whole(self.text), from);
        match outcome {
            Ok(outcome) => match outcome.found {
                Some(m) => {
                    self.next_from = next_search_start(self.text, m, self.text.len());
                    Some(Ok(m))
                }
                None => {
                    self.next_from = None;
                    None
                }
            },
            Err(err) => {
                self.next_from = None;
                Some(Err(err))
            }
        }
    }
}

/// Where the search after `m` starts, or `None` if it would pass `limit`.
fn next_search_start(text: &str, m: Match, limit: usize) -> Option<usize> {
    if !m.is_empty() {
        return Some(m.end);
    }
    if m.end >= limit {
        return None;
    }
    let width = text[m.end..].chars().next().map_or(1, char::len_utf8);
    Some(m.end + width)
}

/// A stateful matcher over one input, in the manner of a cursor: it remembers
/// its region, bounds, last match and where the next `find` resumes.
#[derive(Debug)]
pub struct Matcher<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    region: Region,
    current: Option<Match>,
    next_from: Option<usize>,
    hit_end: bool,
}

impl<'r, 't> Matcher<'r, 't> {
    fn new(regex: &'r Regex, text: &'t str) -> Matcher<'r, 't> {
        Matcher {
            regex,
            text,
            region: Region::whole(text),
            current: None,
            next_from: Some(0),
            hit_end: false,
        }
    }

    /// Confines later searches to `start..end`, and forgets any match.
    pub fn region(&mut self, start: usize, end: usize) -> Result<&mut Self> {
        let region = Region {
            range: start..end,
            ..self.region.clone()
        };
        region.check(self.text)?;
        self.region = region;
        self.forget(start);
        Ok(self)
    }

    pub fn region_start(&self) -> usize {
        self.region.range.start
    }

    pub fn region_end(&self) -> usize {
        self.region.range.end
    }

    pub fn use_anchoring_bounds(&mut self, yes: bool) -> &mut Self {
        self.region.anchoring_bounds = yes;
        self
    }

    pub fn has_anchoring_bounds(&self) -> bool {
        self.region.anchoring_bounds
    }

    pub fn use_transparent_bounds(&mut self, yes: bool) -> &mut Self {
        self.region.transparent_bounds = yes;
        self
    }

    pub fn has_transparent_bounds(&self) -> bool {
        self.region.transparent_bounds
    }

    /// Restores the whole input as the region and forgets any match. Bounds
    /// settings are kept.
    pub fn reset(&mut self) -> &mut Self {
        self.region.range = 0..self.text.len();
        self.forget(0);
        self
    }

    fn forget(&mut self, from: usize) {
        self.current = None;
        self.next_from = Some(from);
        self.hit_end = false;
    }

    /// Matches the entire region.
    pub fn matches(&mut self) -> Result<bool> {
        self.attempt(MatchMode::Entire)
    }

    /// Matches a prefix of the region.
    pub fn looking_at(&mut self) -> Result<bool> {
        self.attempt(MatchMode::Prefix)
    }

    fn attempt(&mut self, mode: MatchMode) -> Result<bool> {
        let outcome = self.regex.program.attempt_match(self.text, &self.region, mode)?;
        self.hit_end = outcome.hit_end;
        self.current = outcome.found;
        self.next_from = match outcome.found {
            Some(m) => next_search_start(self.text, m, self.region.range.end),
            None => None,
        };
        Ok(self.current.is_some())
    }

    /// Finds the next match in the region, resuming after the previous one.
    pub fn find(&mut self) -> Result<bool> {
        let from = match self.next_from {
            Some(from) => from,
            None => {
                self.current = None;
                return Ok(false);
            }
        };
        let outcome = self.regex.program.attempt_find(self.text, &self.region, from)?;
        self.hit_end = outcome.hit_end;
        self.current = outcome.found;
        self.next_from = match outcome.found {
            Some(m) => next_search_start(self.text, m, self.region.range.end),
            None => None,
        };
        Ok(self.current.is_some())
    }

    /// Resets the matcher and finds the first match at or after `from`.
    pub fn find_from(&mut self, from: usize) -> Result<bool> {
        self.reset();
        self.next_from = Some(from);
        self.find()
    }

    /// Start of the current match.
    pub fn start(&self) -> Result<usize> {
        self.as_match().map(|m| m.start)
    }

    /// End of the current match.
    pub fn end(&self) -> Result<usize> {
        self.as_match().map(|m| m.end)
    }

    pub fn as_match(&self) -> Result<Match> {
        self.current.ok_or(Error::NoMatch)
    }

    pub fn as_str(&self) -> Result<&'t str> {
        let m = self.as_match()?;
        Ok(m.as_str(self.text))
    }

    /// Whether the last attempt ran into the end of the region.
    pub fn hit_end(&self) -> bool {
        self.hit_end
    }
}
