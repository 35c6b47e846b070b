//! Canonical decompositions used under `CANON_EQ`.
//!
//! Only the precomposed Latin-1 letters are tabled; characters outside the
//! table match only themselves.

use crate::class::case_variants;

const GRAVE: char = '\u{300}';
const ACUTE: char = '\u{301}';
const CIRCUMFLEX: char = '\u{302}';
const TILDE: char = '\u{303}';
const DIAERESIS: char = '\u{308}';
const RING: char = '\u{30A}';
const CEDILLA: char = '\u{327}';

/// (composed, base, combining mark), sorted by the composed code point.
static TABLE: &[(char, char, char)] = &[
    ('À', 'A', GRAVE),
    ('Á', 'A', ACUTE),
    ('Â', 'A', CIRCUMFLEX),
    ('Ã', 'A', TILDE),
    ('Ä', 'A', DIAERESIS),
    ('Å', 'A', RING),
    ('Ç', 'C', CEDILLA),
    ('È', 'E', GRAVE),
    ('É', 'E', ACUTE),
    ('Ê', 'E', CIRCUMFLEX),
    ('Ë', 'E', DIAERESIS),
    ('Ì', 'I', GRAVE),
    ('Í', 'I', ACUTE),
    ('Î', 'I', CIRCUMFLEX),
    ('Ï', 'I', DIAERESIS),
    ('Ñ', 'N', TILDE),
    ('Ò', 'O', GRAVE),
    ('Ó', 'O', ACUTE),
    ('Ô', 'O', CIRCUMFLEX),
    ('Õ', 'O', TILDE),
    ('Ö', 'O', DIAERESIS),
    ('Ù', 'U', GRAVE),
    ('Ú', 'U', ACUTE),
    ('Û', 'U', CIRCUMFLEX),
    ('Ü', 'U', DIAERESIS),
    ('Ý', 'Y', ACUTE),
    ('à', 'a', GRAVE),
    ('á', 'a', ACUTE),
    ('â', 'a', CIRCUMFLEX),
    ('ã', 'a', TILDE),
    ('ä', 'a', DIAERESIS),
    ('å', 'a', RING),
    ('ç', 'c', CEDILLA),
    ('è', 'e', GRAVE),
    ('é', 'e', ACUTE),
    ('ê', 'e', CIRCUMFLEX),
    ('ë', 'e', DIAERESIS),
    ('ì', 'i', GRAVE),
    ('í', 'i', ACUTE),
    ('î', 'i', CIRCUMFLEX),
    ('ï', 'i', DIAERESIS),
    ('ñ', 'n', TILDE),
    ('ò', 'o', GRAVE),
    ('ó', 'o', ACUTE),
    ('ô', 'o', CIRCUMFLEX),
    ('õ', 'o', TILDE),
    ('ö', 'o', DIAERESIS),
    ('ù', 'u', GRAVE),
    ('ú', 'u', ACUTE),
    ('û', 'u', CIRCUMFLEX),
    ('ü', 'u', DIAERESIS),
    ('ý', 'y', ACUTE),
    ('ÿ', 'y', DIAERESIS),
];

/// The canonical decomposition of `ch`, if it is tabled.
pub fn decompose(ch: char) -> Option<(char, char)> {
    TABLE
        .binary_search_by_key(&ch, |&(composed, _, _)| composed)
        .ok()
        .map(|i| (TABLE[i].1, TABLE[i].2))
}

/// The precomposed form of `base` followed by `mark`, if it is tabled.
pub fn compose(base: char, mark: char) -> Option<char> {
    TABLE
        .iter()
        .find(|&&(_, b, m)| b == base && m == mark)
        .map(|&(composed, _, _)| composed)
}

/// A leaf matching every canonically equivalent spelling of one character.
#[derive(Debug, Clone)]
pub struct Decomposition {
    source: char,
    forms: Box<[Box<str>]>,
}

impl Decomposition {
    /// Builds the leaf for `ch`, or `None` if `ch` has no tabled decomposition.
    /// With `case_insensitive`, the spellings of every simple case variant are
    /// included too.
    pub fn new(ch: char, case_insensitive: bool) -> Option<Decomposition> {
        decompose(ch)?;
        let mut sources = vec![ch];
        if case_insensitive {
            sources.extend(case_variants(ch).into_iter().flatten());
        }
        let mut forms: Vec<Box<str>> = Vec::new();
        for source in sources {
            forms.push(source.to_string().into_boxed_str());
            if let Some((base, mark)) = decompose(source) {
                let mut decomposed = String::with_capacity(4);
                decomposed.push(base);
                decomposed.push(mark);
                forms.push(decomposed.into_boxed_str());
            }
        }
        Some(Decomposition {
            source: ch,
            forms: forms.into_boxed_slice(),
        })
    }

    pub fn source(&self) -> char {
        self.source
    }

    pub fn forms(&self) -> &[Box<str>] {
        &self.forms
    }

    /// Width of the first spelling found at `pos` within `..right`.
    pub fn accepts(&self, input: &str, pos: usize, right: usize) -> Option<usize> {
        let rest = input.get(pos..right)?;
        self.forms
            .iter()
            .find(|form| rest.starts_with(&***form))
            .map(|form| form.len())
    }

    /// Whether a spelling could still match if the region extended past `right`.
    pub fn is_partial(&self, input: &str, pos: usize, right: usize) -> bool {
        match input.get(pos..right) {
            Some(rest) => self
                .forms
                .iter()
                .any(|form| form.len() > rest.len() && form.starts_with(rest)),
            None => false,
        }
    }
}
