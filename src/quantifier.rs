use std::fmt;

use crate::error::{Error, Result};

/// A `{min,max}` repetition bound. `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantifier {
    min: usize,
    max: Option<usize>,
}

impl Quantifier {
    /// `*`
    pub const STAR: Quantifier = Quantifier { min: 0, max: None };
    /// `+`
    pub const PLUS: Quantifier = Quantifier { min: 1, max: None };
    /// `?`
    pub const QUESTION: Quantifier = Quantifier { min: 0, max: Some(1) };

    pub fn new(min: usize, max: Option<usize>) -> Result<Quantifier> {
        match max {
            Some(max) if max < min => Err(Error::InvalidQuantifier { min, max }),
            _ => Ok(Quantifier { min, max }),
        }
    }

    /// `{n}`
    pub fn exactly(n: usize) -> Quantifier {
        Quantifier { min: n, max: Some(n) }
    }

    /// `{n,}`
    pub fn at_least(n: usize) -> Quantifier {
        Quantifier { min: n, max: None }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Returns true if another repetition is permitted after `count` of them.
    #[inline]
    pub fn allows(&self, count: usize) -> bool {
        self.max.map_or(true, |max| count < max)
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, None) => f.write_str("*"),
            (1, None) => f.write_str("+"),
            (0, Some(1)) => f.write_str("?"),
            (min, None) => write!(f, "{{{},}}", min),
            (min, Some(max)) if min == max => write!(f, "{{{}}}", min),
            (min, Some(max)) => write!(f, "{{{},{}}}", min, max),
        }
    }
}

/// Which repetition count a quantifier prefers when several would match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    Greedy,
    Reluctant,
    /// Greedy without giving anything back.
    Possessive,
}

impl Policy {
    pub(crate) fn suffix(&self) -> &'static str {
        match self {
            Policy::Greedy => "",
            Policy::Reluctant => "?",
            Policy::Possessive => "+",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert_eq!(
            Quantifier::new(3, Some(2)),
            Err(Error::InvalidQuantifier { min: 3, max: 2 })
        );
        assert!(Quantifier::new(2, Some(2)).is_ok());
        assert!(Quantifier::new(5, None).is_ok());
    }

    #[test]
    fn allows() {
        let q = Quantifier::new(1, Some(3)).unwrap();
        assert!(q.allows(0));
        assert!(q.allows(2));
        assert!(!q.allows(3));
        assert!(Quantifier::STAR.allows(usize::MAX - 1));
    }

    #[test]
    fn display() {
        assert_eq!(Quantifier::STAR.to_string(), "*");
        assert_eq!(Quantifier::PLUS.to_string(), "+");
        assert_eq!(Quantifier::QUESTION.to_string(), "?");
        assert_eq!(Quantifier::exactly(3).to_string(), "{3}");
        assert_eq!(Quantifier::at_least(2).to_string(), "{2,}");
        assert_eq!(Quantifier::new(1, Some(4)).unwrap().to_string(), "{1,4}");
    }
}
