use regex::Regex;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;

use crate::core::error::{GlobError, MatchError, Result};

/// The `PathPredicate` trait is the executable side of a rule.
///
/// The state map only ever asks "does this rule select this path?", so the
/// precedence algorithm stays independent of the glob dialect. Implementors
/// decide membership for a single forward-slash, scope-relative path.
pub trait PathPredicate: fmt::Debug + Send + Sync {
    /// Returns `true` when `path` is selected by the rule.
    fn is_match(&self, path: &str) -> bool;
}

/// A glob compiled into an anchored regular expression.
#[derive(Debug)]
pub struct GlobMatcher {
    glob: String,
    regex: Regex,
}

impl GlobMatcher {
    /// Compiles a glob.
    ///
    /// # Arguments
    /// * `glob`: The glob text, without any leading `!`.
    ///
    /// # Returns
    /// `Result<Self, GlobError>`, failing on an unterminated class, a
    /// trailing escape or a reversed range.
    pub fn new(glob: &str) -> Result<Self, GlobError> {
        let source = glob_to_regex(glob)?;
        let regex = Regex::new(&source).map_err(|e| GlobError::Compile(e.to_string()))?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }
}

impl PathPredicate for GlobMatcher {
    fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Selects every descendant of one directory; the executable form of a
/// cascade rule `<dir>/**`. The directory name is compared literally, so
/// names containing glob metacharacters cascade correctly.
#[derive(Debug)]
pub struct DescendantMatcher {
    prefix: String,
}

impl DescendantMatcher {
    pub fn new(dir: &str) -> Self {
        Self {
            prefix: format!("{dir}/"),
        }
    }
}

impl PathPredicate for DescendantMatcher {
    fn is_match(&self, path: &str) -> bool {
        path.len() > self.prefix.len() && path.starts_with(&self.prefix)
    }
}

/// Represents a single rule from an ignorefile or from a caller-supplied list.
///
/// A `Pattern` is immutable once parsed. Its predicate is compiled on first
/// use and kept for the rest of the pattern's life.
#[derive(Debug)]
pub struct Pattern {
    /// The rule exactly as written.
    raw: String,
    /// The glob, with a leading `!` stripped.
    glob: String,
    /// `true` when the rule marks paths as unmatched.
    exclusion: bool,
    compiled: OnceLock<Box<dyn PathPredicate>>,
}

impl Pattern {
    /// Parses one rule.
    ///
    /// A rule starting with `!` and longer than one character is an exclusion
    /// whose glob is the remainder. Any other rule is an inclusion; a lone `!`
    /// is therefore an inclusion for the literal name `!`. A rule whose glob
    /// is empty or only whitespace becomes the empty pattern, which the
    /// engine skips.
    pub fn parse(rule: &str) -> Self {
        let (glob, exclusion) = match rule.strip_prefix('!') {
            Some(rest) if !rest.is_empty() => (rest, true),
            _ => (rule, false),
        };
        let glob = if glob.trim().is_empty() { "" } else { glob };

        Self {
            raw: rule.to_string(),
            glob: glob.to_string(),
            exclusion,
            compiled: OnceLock::new(),
        }
    }

    /// Builds the cascade rule `<dir>/**` for a directory that an explicit
    /// rule matched, carrying that rule's exclusion flag.
    pub fn descendants_of(dir: &str, exclusion: bool) -> Self {
        let glob = format!("{}/**", escape_glob(dir));
        let raw = if exclusion {
            format!("!{glob}")
        } else {
            glob.clone()
        };
        let predicate: Box<dyn PathPredicate> = Box::new(DescendantMatcher::new(dir));

        Self {
            raw,
            glob,
            exclusion,
            compiled: OnceLock::from(predicate),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn is_exclusion(&self) -> bool {
        self.exclusion
    }

    pub fn is_empty(&self) -> bool {
        self.glob.is_empty()
    }

    /// Compiles the pattern now so syntax errors surface before any state
    /// is touched. A no-op for the empty pattern.
    pub fn prepare(&self) -> Result<()> {
        if !self.is_empty() {
            self.predicate()?;
        }
        Ok(())
    }

    /// Returns the compiled predicate, compiling it on first use.
    pub fn predicate(&self) -> Result<&dyn PathPredicate> {
        if let Some(predicate) = self.compiled.get() {
            return Ok(predicate.as_ref());
        }
        let matcher = GlobMatcher::new(&self.glob).map_err(|source| MatchError::Pattern {
            pattern: self.raw.clone(),
            source,
        })?;
        Ok(self.compiled.get_or_init(|| Box::new(matcher) as Box<dyn PathPredicate>).as_ref())
    }

    /// Returns every candidate selected by this pattern, regardless of the
    /// candidate's current state. The result is a set; its order carries no
    /// meaning.
    ///
    /// # Arguments
    /// * `candidates`: Scope-relative, forward-slash paths.
    pub fn matches<'a>(&self, candidates: &'a [String]) -> Result<Vec<&'a str>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let predicate = self.predicate()?;
        Ok(candidates
            .iter()
            .map(String::as_str)
            .filter(|path| predicate.is_match(path))
            .collect())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Escapes glob metacharacters so `text` matches only itself.
pub fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Translates a glob into an anchored regular expression.
///
/// `*` and `?` never cross a `/`; `**` does, and `**/` may also match no
/// directory at all so that `**/name` selects a top-level `name`.
pub fn glob_to_regex(glob: &str) -> Result<String, GlobError> {
    let mut out = String::from("(?s)^");
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    while chars.peek() == Some(&'*') {
                        chars.next();
                    }
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '[' => push_class(&mut chars, &mut out)?,
            '\\' => {
                let escaped = chars.next().ok_or(GlobError::TrailingEscape)?;
                out.push_str(&regex::escape(escaped.encode_utf8(&mut [0; 4])));
            }
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    Ok(out)
}

/// Consumes a character class after its opening `[` and appends the regex
/// equivalent. Negated classes never match `/`.
fn push_class(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<(), GlobError> {
    let negated = matches!(chars.peek(), Some('!') | Some('^'));
    if negated {
        chars.next();
    }

    let mut items = String::new();
    let mut first = true;
    loop {
        let c = chars.next().ok_or(GlobError::UnterminatedClass)?;
        if c == ']' && !first {
            break;
        }
        first = false;

        let lo = if c == '\\' {
            chars.next().ok_or(GlobError::TrailingEscape)?
        } else {
            c
        };

        // `a-z` is a range unless the `-` is the last thing before `]`.
        if chars.peek() == Some(&'-') {
            let mut ahead = chars.clone();
            ahead.next();
            if !matches!(ahead.peek(), Some(']') | None) {
                chars.next();
                let hi = match chars.next().ok_or(GlobError::UnterminatedClass)? {
                    '\\' => chars.next().ok_or(GlobError::TrailingEscape)?,
                    hi => hi,
                };
                if lo > hi {
                    return Err(GlobError::InvalidRange(lo, hi));
                }
                items.push_str(&class_char(lo));
                items.push('-');
                items.push_str(&class_char(hi));
                continue;
            }
        }
        items.push_str(&class_char(lo));
    }

    if negated {
        out.push_str("[^/");
    } else {
        out.push('[');
    }
    out.push_str(&items);
    out.push(']');
    Ok(())
}

/// A class member in a form the regex parser never treats as syntax.
fn class_char(c: char) -> String {
    if c.is_ascii_alphanumeric() {
        c.to_string()
    } else {
        format!("\\x{{{:X}}}", c as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_match(glob: &str, path: &str) -> bool {
        GlobMatcher::new(glob).unwrap().is_match(path)
    }

    #[test]
    fn test_parse_inclusion_and_exclusion() {
        let pattern = Pattern::parse("*.log");
        assert_eq!(pattern.glob(), "*.log");
        assert!(!pattern.is_exclusion());

        let pattern = Pattern::parse("!keep.txt");
        assert_eq!(pattern.glob(), "keep.txt");
        assert_eq!(pattern.raw(), "!keep.txt");
        assert!(pattern.is_exclusion());
    }

    #[test]
    fn test_lone_bang_is_a_literal_inclusion() {
        let pattern = Pattern::parse("!");
        assert!(!pattern.is_exclusion());
        assert_eq!(pattern.glob(), "!");
        let candidates = vec!["!".to_string(), "a".to_string()];
        assert_eq!(pattern.matches(&candidates).unwrap(), vec!["!"]);
    }

    #[test]
    fn test_blank_rules_are_empty() {
        assert!(Pattern::parse("").is_empty());
        assert!(Pattern::parse("   ").is_empty());
        assert!(Pattern::parse("! ").is_empty());
        let candidates = vec!["a".to_string()];
        assert!(Pattern::parse("  ").matches(&candidates).unwrap().is_empty());
    }

    #[test]
    fn test_star_stays_within_a_segment() {
        assert!(is_match("*.txt", "1.txt"));
        assert!(!is_match("*.txt", "sub/1.txt"));
        assert!(is_match("sub/*", "sub/1.txt"));
        assert!(!is_match("sub/*", "sub/deep/1.txt"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        assert!(is_match("**/hello.txt", "hello.txt"));
        assert!(is_match("**/hello.txt", "aa/a1/a2/hello.txt"));
        assert!(is_match("foo/**", "foo/bar/baz.txt"));
        assert!(!is_match("foo/**", "foo"));
        assert!(is_match("a/**/b", "a/b"));
        assert!(is_match("a/**/b", "a/x/y/b"));
        assert!(is_match("**", "any/thing"));
    }

    #[test]
    fn test_question_mark_and_classes() {
        assert!(is_match("e?.txt", "e1.txt"));
        assert!(!is_match("e?.txt", "e/.txt"));
        assert!(is_match("e[13].txt", "e3.txt"));
        assert!(!is_match("e[13].txt", "e2.txt"));
        assert!(is_match("e[!13].txt", "e2.txt"));
        assert!(is_match("e[^13].txt", "e2.txt"));
        assert!(!is_match("e[!x]y", "e/y"));
        assert!(is_match("[a-c]x", "bx"));
        assert!(!is_match("[a-c]x", "dx"));
        assert!(is_match("[]]", "]"));
        assert!(is_match("[a-]", "-"));
    }

    #[test]
    fn test_literals_and_escapes() {
        assert!(is_match("  what.txt", "  what.txt"));
        assert!(!is_match("  what.txt", "what.txt"));
        assert!(is_match("a+b(1).txt", "a+b(1).txt"));
        assert!(is_match(r"\*.txt", "*.txt"));
        assert!(!is_match(r"\*.txt", "a.txt"));
        assert!(is_match(r"[\]]", "]"));
    }

    #[test]
    fn test_matcher_keeps_source_glob() {
        let matcher = GlobMatcher::new("src/**/*.rs").unwrap();
        assert_eq!(matcher.glob(), "src/**/*.rs");
        assert!(matcher.is_match("src/a/b/lib.rs"));
    }

    #[test]
    fn test_malformed_globs_fail() {
        assert_eq!(
            GlobMatcher::new("[abc").unwrap_err(),
            GlobError::UnterminatedClass
        );
        assert_eq!(GlobMatcher::new("abc\\").unwrap_err(), GlobError::TrailingEscape);
        assert_eq!(
            GlobMatcher::new("[z-a]").unwrap_err(),
            GlobError::InvalidRange('z', 'a')
        );

        let pattern = Pattern::parse("!broken[");
        match pattern.prepare() {
            Err(MatchError::Pattern { pattern, .. }) => assert_eq!(pattern, "!broken["),
            other => panic!("expected a pattern error, got {other:?}"),
        }
    }

    #[test]
    fn test_descendants_of_is_literal() {
        let pattern = Pattern::descendants_of("weird[dir]", true);
        assert_eq!(pattern.raw(), r"!weird\[dir\]/**");
        assert!(pattern.is_exclusion());
        let candidates = vec![
            "weird[dir]".to_string(),
            "weird[dir]/a.txt".to_string(),
            "weirdd/a.txt".to_string(),
        ];
        assert_eq!(pattern.matches(&candidates).unwrap(), vec!["weird[dir]/a.txt"]);
    }

    #[test]
    fn test_escaped_glob_round_trips_through_compiler() {
        let glob = format!("{}/**", escape_glob("a*b?"));
        assert!(is_match(&glob, "a*b?/x"));
        assert!(!is_match(&glob, "axxb1/x"));
    }
}
