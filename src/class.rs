//! Character classes: predicates over a single code point.
//!
//! A [`CharClass`] is a shared base set plus a negation flag. Negation is
//! applied when a code point is tested, so a class and its complement share
//! the same base set.

use std::cmp::Ordering;
use std::sync::Arc;

/// The base set of a character class, before negation.
#[derive(Debug)]
pub enum ClassSet {
    /// Sorted, non-overlapping, non-adjacent inclusive ranges.
    Ranges(Vec<(char, char)>),
    /// `\d`: ASCII digits.
    Digit,
    /// `\w`: ASCII letters, digits and `_`.
    Word,
    /// `\s`: ASCII whitespace.
    Space,
    Union(Vec<CharClass>),
    Intersection(Vec<CharClass>),
}

impl ClassSet {
    fn contains(&self, ch: char) -> bool {
        match self {
            ClassSet::Ranges(ranges) => ranges
                .binary_search_by(|&(lo, hi)| {
                    if hi < ch {
                        Ordering::Less
                    } else if lo > ch {
                        Ordering::Greater
                    } else {
                        Ordering::Equal
                    }
                })
                .is_ok(),
            ClassSet::Digit => ch.is_ascii_digit(),
            ClassSet::Word => ch.is_ascii_alphanumeric() || ch == '_',
            ClassSet::Space => matches!(ch, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'),
            ClassSet::Union(items) => items.iter().any(|c| c.contains(ch)),
            ClassSet::Intersection(items) => items.iter().all(|c| c.contains(ch)),
        }
    }

    /// The set as code point ranges, when it is simple enough to enumerate.
    fn ranges(&self) -> Option<Vec<(u32, u32)>> {
        let ranges = match self {
            ClassSet::Ranges(ranges) => ranges.iter().map(|&(lo, hi)| (lo as u32, hi as u32)).collect(),
            ClassSet::Digit => vec![(0x30, 0x39)],
            ClassSet::Word => vec![(0x30, 0x39), (0x41, 0x5A), (0x5F, 0x5F), (0x61, 0x7A)],
            ClassSet::Space => vec![(0x09, 0x0D), (0x20, 0x20)],
            ClassSet::Union(_) | ClassSet::Intersection(_) => return None,
        };
        Some(ranges)
    }
}

/// A predicate over a single code point, with optional negation.
#[derive(Debug, Clone)]
pub struct CharClass {
    set: Arc<ClassSet>,
    alt: bool,
}

impl CharClass {
    pub fn new(set: ClassSet) -> CharClass {
        CharClass {
            set: Arc::new(set),
            alt: false,
        }
    }

    /// Builds a class from inclusive ranges in any order; overlapping and
    /// adjacent ranges are merged.
    pub fn from_ranges<I>(ranges: I) -> CharClass
    where
        I: IntoIterator<Item = (char, char)>,
    {
        let mut ranges: Vec<(char, char)> = ranges
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        ranges.sort_unstable();
        let mut merged: Vec<(char, char)> = Vec::with_capacity(ranges.len());
        for (lo, hi) in ranges {
            if let Some(last) = merged.last_mut() {
                if lo as u32 <= last.1 as u32 + 1 {
                    if hi > last.1 {
                        last.1 = hi;
                    }
                    continue;
                }
            }
            merged.push((lo, hi));
        }
        CharClass::new(ClassSet::Ranges(merged))
    }

    pub fn single(ch: char) -> CharClass {
        CharClass::from_ranges([(ch, ch)])
    }

    pub fn digit() -> CharClass {
        CharClass::new(ClassSet::Digit)
    }

    pub fn word() -> CharClass {
        CharClass::new(ClassSet::Word)
    }

    pub fn space() -> CharClass {
        CharClass::new(ClassSet::Space)
    }

    /// The class matching every code point.
    pub fn any() -> CharClass {
        CharClass::from_ranges(std::iter::empty()).negate()
    }

    pub fn union(items: Vec<CharClass>) -> CharClass {
        CharClass::new(ClassSet::Union(items))
    }

    /// Intersection of the given classes. An empty list matches nothing.
    pub fn intersection(items: Vec<CharClass>) -> CharClass {
        if items.is_empty() {
            return CharClass::from_ranges(std::iter::empty());
        }
        CharClass::new(ClassSet::Intersection(items))
    }

    /// The complement of this class, sharing the same base set.
    pub fn negate(&self) -> CharClass {
        CharClass {
            set: Arc::clone(&self.set),
            alt: !self.alt,
        }
    }

    pub fn is_negated(&self) -> bool {
        self.alt
    }

    pub fn set(&self) -> &ClassSet {
        &self.set
    }

    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        self.alt != self.set.contains(ch)
    }

    /// Membership under simple case folding: `ch` or one of its one-to-one
    /// case variants is in the base set. Negation applies after folding.
    pub fn contains_folded(&self, ch: char) -> bool {
        let base = self.set.contains(ch)
            || case_variants(ch)
                .into_iter()
                .flatten()
                .any(|v| self.set.contains(v));
        self.alt != base
    }

    /// Returns false only if no code point can be in both classes.
    ///
    /// Exact for range and shorthand classes; compound classes are assumed to
    /// intersect.
    pub fn intersects(a: &CharClass, b: &CharClass) -> bool {
        match (a.effective_ranges(), b.effective_ranges()) {
            (Some(x), Some(y)) => ranges_overlap(&x, &y),
            _ => true,
        }
    }

    fn effective_ranges(&self) -> Option<Vec<(u32, u32)>> {
        let ranges = self.set.ranges()?;
        Some(if self.alt { complement(&ranges) } else { ranges })
    }
}

/// The one-to-one lowercase and uppercase mappings of `ch`, where they differ
/// from `ch`.
pub(crate) fn case_variants(ch: char) -> [Option<char>; 2] {
    fn single(mut it: impl Iterator<Item = char>, ch: char) -> Option<char> {
        match (it.next(), it.next()) {
            (Some(c), None) if c != ch => Some(c),
            _ => None,
        }
    }
    [
        single(ch.to_lowercase(), ch),
        single(ch.to_uppercase(), ch),
    ]
}

/// Case-insensitive equality under simple one-to-one case mapping.
pub(crate) fn eq_folded(a: char, b: char) -> bool {
    a == b || case_variants(a).into_iter().flatten().any(|v| v == b)
}

fn complement(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut next = 0u32;
    for &(lo, hi) in ranges {
        if lo > next {
            out.push((next, lo - 1));
        }
        next = hi + 1;
    }
    if next <= char::MAX as u32 {
        out.push((next, char::MAX as u32));
    }
    out
}

fn ranges_overlap(a: &[(u32, u32)], b: &[(u32, u32)]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (alo, ahi) = a[i];
        let (blo, bhi) = b[j];
        let lo = alo.max(blo);
        let hi = ahi.min(bhi);
        // Surrogates are not code points a class can be tested against.
        if lo <= hi && !(lo >= 0xD800 && hi <= 0xDFFF) {
            return true;
        }
        if ahi < bhi {
            i += 1;
        } else {
            j += 1;
        }
    }
    false
}
