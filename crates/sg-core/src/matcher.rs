//! Compiled membership tests over normalized candidate sets.
//!
//! Unsafe-side lists compile to a case-insensitive substring test: a match
//! on any candidate anywhere in the URL flags it. Safe-side lists compile
//! to an exact-membership set. Both are rebuilt from scratch whenever a
//! list's candidates change; the query path only ever sees a finished
//! matcher.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use regex::{Regex, RegexBuilder};

use crate::types::MatchMode;

/// Above this many candidates a single alternation pattern stops being a
/// reasonable idea; switch to literal multi-pattern search instead.
const MAX_ALTERNATION_CANDIDATES: usize = 2048;

// =============================================================================
// Matcher
// =============================================================================

/// A compiled membership/substring test for one classification list.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches nothing. Compiled from an empty candidate set.
    Never,
    /// Case-insensitive substring search over all candidates.
    Substring(SubstringMatcher),
    /// Exact-equality membership test.
    Exact(ExactMatcher),
}

impl Matcher {
    /// Compile a candidate set with the given matching semantics.
    ///
    /// Candidates are treated as literals: regex metacharacters have no
    /// meaning regardless of which backend ends up doing the search.
    pub fn compile<I, S>(mode: MatchMode, candidates: I) -> Matcher
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates: Vec<String> = candidates
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if candidates.is_empty() {
            return Matcher::Never;
        }

        match mode {
            MatchMode::Substring => compile_substring(&candidates),
            MatchMode::Exact => Matcher::Exact(ExactMatcher {
                set: candidates.into_iter().collect(),
            }),
        }
    }

    /// Test a serialized URL form against this matcher.
    pub fn test(&self, url: &str) -> bool {
        match self {
            Matcher::Never => false,
            Matcher::Substring(m) => m.test(url),
            Matcher::Exact(m) => m.set.contains(url),
        }
    }
}

// =============================================================================
// Substring Matching
// =============================================================================

/// Substring search backend. Small candidate sets use one escaped
/// alternation; large sets use Aho-Corasick literal search.
#[derive(Debug, Clone)]
pub enum SubstringMatcher {
    Pattern(Regex),
    MultiPattern(AhoCorasick),
}

impl SubstringMatcher {
    fn test(&self, url: &str) -> bool {
        match self {
            SubstringMatcher::Pattern(regex) => regex.is_match(url),
            SubstringMatcher::MultiPattern(ac) => ac.is_match(url),
        }
    }
}

fn compile_substring(candidates: &[String]) -> Matcher {
    if candidates.len() <= MAX_ALTERNATION_CANDIDATES {
        match compile_alternation(candidates) {
            Ok(regex) => return Matcher::Substring(SubstringMatcher::Pattern(regex)),
            Err(err) => {
                log::warn!(
                    "alternation over {} candidates failed to compile ({err}), \
                     falling back to multi-pattern search",
                    candidates.len()
                );
            }
        }
    }
    // Literal patterns; the builder only fails on pathological pattern
    // counts far beyond any real list.
    match AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(candidates)
    {
        Ok(ac) => Matcher::Substring(SubstringMatcher::MultiPattern(ac)),
        Err(err) => {
            log::error!(
                "multi-pattern build failed for {} candidates: {err}",
                candidates.len()
            );
            Matcher::Never
        }
    }
}

/// Build one case-insensitive alternation with every candidate escaped.
fn compile_alternation(candidates: &[String]) -> Result<Regex, regex::Error> {
    let escaped: Vec<String> = candidates.iter().map(|c| regex::escape(c)).collect();
    RegexBuilder::new(&format!("({})", escaped.join("|")))
        .case_insensitive(true)
        .build()
}

// =============================================================================
// Exact Matching
// =============================================================================

/// Byte-for-byte membership test over the candidate set.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    set: HashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn substring(candidates: &[&str]) -> Matcher {
        Matcher::compile(MatchMode::Substring, candidates.iter().copied())
    }

    fn exact(candidates: &[&str]) -> Matcher {
        Matcher::compile(MatchMode::Exact, candidates.iter().copied())
    }

    #[test]
    fn test_empty_set_never_matches() {
        let m = Matcher::compile(MatchMode::Substring, Vec::<String>::new());
        assert!(matches!(m, Matcher::Never));
        assert!(!m.test("https://example.com"));

        let m = Matcher::compile(MatchMode::Exact, Vec::<String>::new());
        assert!(!m.test("https://example.com"));
    }

    #[test]
    fn test_substring_matches_anywhere() {
        let m = substring(&["https://bad.example"]);
        assert!(m.test("https://bad.example"));
        assert!(m.test("https://bad.example/deep/path"));
        assert!(!m.test("https://good.example"));
    }

    #[test]
    fn test_substring_subpath_candidate() {
        let m = substring(&["https://example.com/bad"]);
        assert!(m.test("https://example.com/bad/extra"));
        assert!(!m.test("https://example.com/good"));
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let m = substring(&["https://bad.example"]);
        assert!(m.test("https://BAD.example/x"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        // An unescaped '.' would also match "badXexample".
        let m = substring(&["bad.example"]);
        assert!(m.test("https://bad.example"));
        assert!(!m.test("https://badxexample.com"));

        // Parentheses and pipes must not change the pattern structure.
        let m = substring(&["a(b|c)d"]);
        assert!(m.test("https://host/a(b|c)d"));
        assert!(!m.test("https://host/abd"));
    }

    #[test]
    fn test_exact_requires_equality() {
        let m = exact(&["https://good.example"]);
        assert!(m.test("https://good.example"));
        assert!(!m.test("https://good.example/sub"));
        assert!(!m.test("https://evil-good.example"));
    }

    #[test]
    fn test_large_set_uses_multi_pattern() {
        let candidates: Vec<String> = (0..MAX_ALTERNATION_CANDIDATES + 1)
            .map(|i| format!("https://site-{i}.example"))
            .collect();
        let m = Matcher::compile(MatchMode::Substring, candidates.iter());
        match &m {
            Matcher::Substring(SubstringMatcher::MultiPattern(_)) => {}
            other => panic!("expected multi-pattern matcher, got {other:?}"),
        }
        assert!(m.test("https://site-2048.example/page"));
        assert!(!m.test("https://other.example"));
    }
}
