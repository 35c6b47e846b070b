use chainre::{Error, Regex, RegexBuilder};

fn find(pattern: &str, text: &str) -> Option<(usize, usize)> {
    Regex::new(pattern)
        .unwrap()
        .find(text)
        .unwrap()
        .map(|m| (m.start, m.end))
}

fn all<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.find_iter(text).map(|m| m.unwrap().as_str(text)).collect()
}

fn spans(pattern: &str, text: &str) -> Vec<(usize, usize)> {
    let re = Regex::new(pattern).unwrap();
    re.find_iter(text).map(|m| m.unwrap()).map(|m| (m.start, m.end)).collect()
}

#[test]
fn greedy_and_reluctant() {
    assert_eq!(find("a+", "aaa"), Some((0, 3)));
    assert_eq!(find("a+?", "aaa"), Some((0, 1)));
    assert_eq!(find("a{2,}?", "aaaa"), Some((0, 2)));
    assert_eq!(find("(?:ab)+?", "ababab"), Some((0, 2)));
    assert_eq!(find("(?:ab)+", "ababab"), Some((0, 6)));
}

#[test]
fn alternatives_in_order() {
    assert_eq!(find("a|ab", "ab"), Some((0, 1)));
    assert_eq!(find("ab|a", "ab"), Some((0, 2)));
    assert_eq!(find("(a|ab)(c|bcd)(d*)", "abcd"), Some((0, 4)));
}

#[test]
fn empty_iterations_terminate() {
    let re = Regex::new("(a*)*").unwrap();
    assert!(re.matches("").unwrap());
    assert!(re.matches("aaa").unwrap());
    assert_eq!(find("(a*)*", "b"), Some((0, 0)));
    assert!(!Regex::new("(?:a*)*b").unwrap().is_match("aaac").unwrap());
    assert!(Regex::new("(?:a?){3}").unwrap().matches("a").unwrap());
    assert!(Regex::new("(?:|a)+b").unwrap().matches("aab").unwrap());
}

#[test]
fn empty_pattern() {
    let re = Regex::new("").unwrap();
    assert!(re.matches("").unwrap());
    assert!(!re.matches("x").unwrap());
    assert_eq!(find("", "abc"), Some((0, 0)));
}

#[test]
fn dot_and_line_terminators() {
    let re = Regex::new(".").unwrap();
    assert!(!re.matches("\n").unwrap());
    assert!(!re.matches("\r").unwrap());
    assert!(!re.matches("\u{2028}").unwrap());
    assert!(re.matches("é").unwrap());

    let re = Regex::builder(".").dot_all(true).build().unwrap();
    assert!(re.matches("\n").unwrap());

    let re = Regex::builder("a.b").unix_lines(true).build().unwrap();
    assert!(re.matches("a\rb").unwrap());
    assert!(!re.matches("a\nb").unwrap());
}

#[test]
fn dot_star_stays_on_its_line() {
    assert_eq!(find(".*foo", "xx\nabfoo"), Some((3, 8)));
    assert_eq!(find(".*foo", "xxfoo\nfoo"), Some((0, 5)));
    assert_eq!(find(".*", "\nab"), Some((0, 0)));
    assert_eq!(find("a.*", "ba\r\nc"), Some((1, 2)));

    let re = Regex::builder(".*b").dot_all(true).build().unwrap();
    assert_eq!(re.find("a\nb\nc").unwrap().map(|m| m.range()), Some(0..3));
}

#[test]
fn end_of_line_before_final_terminator() {
    assert_eq!(find("a$", "a\r\n"), Some((0, 1)));
    assert_eq!(find("a$", "a\n"), Some((0, 1)));
    assert_eq!(find("a$", "a\u{85}"), Some((0, 1)));
    assert_eq!(find("a$", "a\n\n"), None);
    assert_eq!(find("a$", "a\nb"), None);

    assert_eq!(find("a\\Z", "a\n"), Some((0, 1)));
    assert_eq!(find("a\\z", "a\n"), None);
    assert_eq!(find("a\\z", "ba"), Some((1, 2)));

    let re = Regex::builder("a$").unix_lines(true).build().unwrap();
    assert!(!re.is_match("a\r\n").unwrap());
    assert!(re.is_match("a\n").unwrap());

    // Never between the two halves of a `\r\n`.
    assert_eq!(spans("$", "a\r\n"), vec![(1, 1), (3, 3)]);
}

#[test]
fn end_of_line_heading_a_repetition() {
    let pattern = "(?:$\n?)*";
    assert_eq!(spans(pattern, ""), vec![(0, 0)]);
    assert_eq!(spans(pattern, "\n"), vec![(0, 1), (1, 1)]);
    assert_eq!(spans(pattern, "a\n"), vec![(0, 0), (1, 2), (2, 2)]);
    assert_eq!(spans(pattern, "a\r\n"), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    let re = Regex::new(pattern).unwrap();
    assert!(re.matches("").unwrap());
    assert!(re.matches("\n").unwrap());
    assert!(!re.matches("a\n").unwrap());

    let pattern = "(?:$a?)+";
    assert_eq!(spans(pattern, ""), vec![(0, 0)]);
    assert_eq!(spans(pattern, "\n"), vec![(0, 0), (1, 1)]);
    assert_eq!(spans(pattern, "a\n"), vec![(1, 1), (2, 2)]);
    assert_eq!(spans(pattern, "a\r\n"), vec![(1, 1), (3, 3)]);

    let pattern = "(?:$|a)*b";
    for text in ["", "\n", "a\n", "a\r\n"] {
        assert_eq!(find(pattern, text), None, "{:?}", text);
    }
    assert_eq!(find(pattern, "aab"), Some((0, 3)));
    assert_eq!(find(pattern, "ab\n"), Some((0, 2)));
    assert_eq!(find(pattern, "a\nb"), Some((2, 3)));
}

#[test]
fn multiline_anchors() {
    let re = Regex::builder("^\\w+$").multi_line(true).build().unwrap();
    assert_eq!(all(&re, "one\ntwo\r\nthree"), vec!["one", "two", "three"]);

    let re = Regex::new("^\\w+$").unwrap();
    assert!(re.find_iter("one\ntwo").next().is_none());

    let re = Regex::builder("^b").multi_line(true).build().unwrap();
    assert!(re.is_match("a\nb").unwrap());
    assert!(!re.is_match("ab").unwrap());
}

#[test]
fn start_of_input() {
    assert_eq!(find("^a", "aa"), Some((0, 1)));
    assert_eq!(find("^a", "ba"), None);
    assert_eq!(find("\\Ab", "ab"), None);
    let re = Regex::new("^a").unwrap();
    assert_eq!(all(&re, "aaa"), vec!["a"]);
}

#[test]
fn case_insensitive() {
    let re = Regex::builder("hello [a-c]+").case_insensitive(true).build().unwrap();
    assert!(re.matches("HELLO CAB").unwrap());
    assert!(re.matches("hElLo abc").unwrap());
    assert!(!re.matches("hello abd").unwrap());
    assert!(!Regex::new("hello").unwrap().matches("HELLO").unwrap());
}

#[test]
fn canonical_equivalence() {
    let re = Regex::builder("caf\u{e9}").canon_eq(true).build().unwrap();
    assert!(re.matches("caf\u{e9}").unwrap());
    assert!(re.matches("cafe\u{301}").unwrap());
    assert!(!re.matches("cafe").unwrap());

    let re = Regex::builder("e\u{301}").canon_eq(true).build().unwrap();
    assert!(re.matches("\u{e9}").unwrap());

    let re = Regex::new("caf\u{e9}").unwrap();
    assert!(!re.matches("cafe\u{301}").unwrap());
}

#[test]
fn possessive_does_not_give_back() {
    assert!(!Regex::new("a*+a").unwrap().is_match("aaa").unwrap());
    assert!(Regex::new("a*a").unwrap().is_match("aaa").unwrap());
    assert!(!Regex::new("(?:ab)++ab").unwrap().is_match("ababab").unwrap());
    assert!(Regex::new("(?:ab)+ab").unwrap().is_match("ababab").unwrap());
    assert_eq!(find("a{1,2}+b", "aaab"), Some((1, 4)));
}

#[test]
fn auto_possessive_keeps_results() {
    for text in ["abc123", "abc", "123", "a1b2"] {
        let with = RegexBuilder::new("[a-z]*[0-9]").build().unwrap();
        let without = RegexBuilder::new("[a-z]*[0-9]").auto_possessive(false).build().unwrap();
        assert_eq!(with.find(text).unwrap(), without.find(text).unwrap(), "{}", text);
    }
}

#[test]
fn class_intersection_and_negation() {
    assert_eq!(find("[a-z&&[^aeiou]]+", "aebcd"), Some((2, 5)));
    assert_eq!(find("[^\\d\\s]+", "12 ab 3"), Some((3, 5)));
    assert_eq!(find("\\W", "ab_c!"), Some((4, 5)));
}

#[test]
fn find_iter_and_matcher_agree() {
    let re = Regex::new("\\d+").unwrap();
    let text = "12 ab 345 6";
    assert_eq!(all(&re, text), vec!["12", "345", "6"]);

    let mut m = re.matcher(text);
    let mut found = Vec::new();
    while m.find().unwrap() {
        found.push(m.as_str().unwrap());
    }
    assert_eq!(found, vec!["12", "345", "6"]);
}

#[test]
fn region_with_anchoring_bounds() {
    let re = Regex::new("^b$").unwrap();
    let mut m = re.matcher("abc");
    m.region(1, 2).unwrap();
    assert!(m.matches().unwrap());
    m.use_anchoring_bounds(false);
    assert!(!m.matches().unwrap());
}

#[test]
fn region_with_transparent_bounds() {
    let re = Regex::new("b$").unwrap();
    let mut m = re.matcher("ab\n");
    m.region(1, 2).unwrap();
    assert!(m.matches().unwrap());

    m.use_anchoring_bounds(false);
    assert!(!m.matches().unwrap());

    m.use_transparent_bounds(true);
    assert!(m.has_transparent_bounds());
    assert!(m.matches().unwrap());
    assert_eq!((m.start().unwrap(), m.end().unwrap()), (1, 2));
}

#[test]
fn region_limits_find() {
    let re = Regex::new("\\d").unwrap();
    let mut m = re.matcher("1a23b4");
    m.region(2, 5).unwrap();
    assert_eq!((m.region_start(), m.region_end()), (2, 5));
    let mut found = Vec::new();
    while m.find().unwrap() {
        found.push(m.start().unwrap());
    }
    assert_eq!(found, vec![2, 3]);

    m.reset();
    assert_eq!((m.region_start(), m.region_end()), (0, 6));
}

#[test]
fn looking_at_and_matches() {
    let re = Regex::new("a+").unwrap();
    let mut m = re.matcher("aab");
    assert!(m.looking_at().unwrap());
    assert_eq!(m.end().unwrap(), 2);
    assert!(!m.matches().unwrap());
    assert_eq!(m.start(), Err(Error::NoMatch));
}

#[test]
fn hit_end() {
    let re = Regex::new("a+").unwrap();
    let mut m = re.matcher("baa");
    assert!(m.find().unwrap());
    assert!(m.hit_end());

    let re = Regex::new("ab").unwrap();
    let mut m = re.matcher("abx");
    assert!(m.find().unwrap());
    assert!(!m.hit_end());

    let re = Regex::new("abc").unwrap();
    let mut m = re.matcher("xab");
    assert!(!m.find().unwrap());
    assert!(m.hit_end());
}

#[test]
fn step_limit() {
    let re = Regex::builder("(a|b)*c").step_limit(Some(10)).build().unwrap();
    let err = re.is_match("abababababababab").unwrap_err();
    assert_eq!(err, Error::StepLimitExceeded(10));
    assert!(err.is_limit());

    let mut iter = re.find_iter("abababab");
    assert!(matches!(iter.next(), Some(Err(Error::StepLimitExceeded(10)))));
    assert!(iter.next().is_none());
}

#[test]
fn depth_limit() {
    let re = Regex::builder("(?:ab)*").depth_limit(100).build().unwrap();
    let text = "ab".repeat(500);
    assert_eq!(re.matches(&text), Err(Error::DepthLimitExceeded(100)));
    assert!(re.matches(&"ab".repeat(10)).unwrap());
}

#[test]
fn long_input_on_a_small_stack() {
    let worker = std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(|| {
            let text = format!("{}c", "ab".repeat(2_000));
            let found = Regex::new("(?:a|b)*c")
                .unwrap()
                .find(&text)
                .map(|m| m.map(|m| m.range()));
            let whole = Regex::new("(?:ab)*").unwrap().matches(&"ab".repeat(4_000));
            (found, whole, text.len())
        })
        .unwrap();
    let (found, whole, len) = worker.join().unwrap();
    assert_eq!(found, Ok(Some(0..len)));
    assert_eq!(whole, Ok(true));
}

#[test]
fn syntax_errors() {
    for pattern in ["(a", "a)", "a{2,1}", "[]", "*a", "a**", "[a", "\\", "(?=a)", "\\q"] {
        match Regex::new(pattern) {
            Err(Error::Syntax { .. }) => {}
            other => panic!("{:?} gave {:?}", pattern, other),
        }
    }
}

#[test]
fn shared_across_threads() {
    let re = Regex::new("(?:a|b)*c").unwrap();
    let text = "ababxababc";
    let expected = re.find(text).unwrap();
    assert_eq!(expected.map(|m| m.range()), Some(5..10));
    std::thread::scope(|s| {
        for _ in 0..4 {
            let re = re.clone();
            s.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(re.find(text).unwrap(), expected);
                }
            });
        }
    });
}

#[test]
fn utf8_positions() {
    assert_eq!(find("ü+", "aüüb"), Some((1, 5)));
    assert_eq!(find("[α-ω]", "abγ"), Some((2, 4)));
    let re = Regex::new("..").unwrap();
    assert_eq!(all(&re, "a😀bc"), vec!["a😀", "bc"]);
}

#[test]
fn free_function() {
    assert!(chainre::is_match("xaby", "a.").unwrap());
    assert!(!chainre::is_match("xy", "a.").unwrap());
    assert!(chainre::is_match("", "(").is_err());
}
