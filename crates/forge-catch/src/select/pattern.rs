//! Dotted-name glob patterns
//!
//! `*` matches within one segment (no dots), `**` matches across segments.
//! Patterns are anchored: `pkg.*` matches `pkg.f` but not `pkg.C.g` or
//! `other.pkg.f`. Malformed patterns never match anything.

use regex::Regex;

/// A compiled include/exclude pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// Compile a pattern; malformed input yields a pattern that matches nothing
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = translate(&source).and_then(|re| Regex::new(&re).ok());
        Self { source, regex }
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether the pattern contains wildcards
    pub fn has_wildcard(&self) -> bool {
        self.source.contains('*')
    }

    /// Check whether the pattern compiled
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    /// Whole-name match
    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(name))
    }
}

/// Match a name against a pattern string
pub fn matches(name: &str, pattern: &str) -> bool {
    Pattern::new(pattern).matches(name)
}

/// An ordered list of patterns; a name matches if any pattern does
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile every pattern
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Pattern::new).collect(),
        }
    }

    /// Check if any pattern matches
    pub fn any_match(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    /// The compiled patterns
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Check if there are no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translate a dotted glob to an anchored regex
fn translate(pattern: &str) -> Option<String> {
    if pattern.is_empty() || pattern.split('.').any(str::is_empty) {
        return None;
    }

    let mut re = String::with_capacity(pattern.len() * 2 + 2);
    re.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            continue;
        }

        let mut run = 1;
        while chars.peek() == Some(&'*') {
            chars.next();
            run += 1;
        }
        match run {
            1 => re.push_str("[^.]*"),
            2 => re.push_str(".*"),
            _ => return None,
        }
    }

    re.push('$');
    Some(re)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_anchored() {
        assert!(matches("pkg.f", "pkg.f"));
        assert!(!matches("pkg.foo", "pkg.f"));
        assert!(!matches("my.pkg.f", "pkg.f"));
        assert!(!matches("pkgxf", "pkg.f"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        assert!(matches("pkg.f", "pkg.*"));
        assert!(matches("pkg.Client", "pkg.*"));
        assert!(!matches("pkg.Client.fetch", "pkg.*"));
        assert!(matches("pkg.Client.fetch", "pkg.*.fetch"));
        assert!(matches("pkg.fetchAll", "pkg.fetch*"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        assert!(matches("pkg.Client.fetch", "pkg.**"));
        assert!(matches("pkg.a.b.c", "pkg.**"));
        assert!(matches("io.example.api.Client.fetch", "io.**.fetch"));
        assert!(!matches("other.Client.fetch", "pkg.**"));
    }

    #[test]
    fn test_malformed_matches_nothing() {
        for bad in ["", "pkg..f", ".pkg", "pkg.", "pkg.***"] {
            let p = Pattern::new(bad);
            assert!(!p.is_valid(), "{bad:?} should be malformed");
            assert!(!p.matches("pkg.f"));
            assert!(!p.matches(""));
        }
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("pkg.f$1", "pkg.f$1"));
        assert!(!matches("pkg.fx", "pkg.f+"));
        assert!(matches("pkg.`weird name`", "pkg.`weird name`"));
    }

    #[test]
    fn test_pattern_set() {
        let set = PatternSet::new(["pkg.internal.**", "pkg.debug*"]);
        assert!(set.any_match("pkg.internal.Cache.get"));
        assert!(set.any_match("pkg.debugDump"));
        assert!(!set.any_match("pkg.run"));
        assert!(PatternSet::default().is_empty());
    }
}
