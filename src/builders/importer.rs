use std::io::{self, BufRead};
use tracing::debug;

use crate::builders::patterns::Pattern;
use crate::core::error::Result;
use crate::core::fs::Scope;

/// The default ignorefile name, used when the caller leaves it empty.
pub const DEFAULT_IGNOREFILE: &str = ".xignore";

/// A trait that defines the behavior for importing rules into a scope.
///
/// The engine asks for the compiled, ordered rule list of a scope's
/// ignorefile; how and where that list is read is up to the implementor.
pub trait PatternImporter {
    /// Loads and compiles the ignorefile of a scope.
    ///
    /// # Arguments
    /// * `scope`: The directory the ignorefile governs.
    /// * `ignorefile`: The file name to look for, relative to the scope.
    ///
    /// # Returns
    /// The rules in file order. A missing ignorefile yields no rules; an
    /// unreadable file or a malformed rule fails the whole load.
    fn import_patterns(&self, scope: &Scope<'_>, ignorefile: &str) -> Result<Vec<Pattern>>;
}

/// The rule lines of one ignorefile, before compilation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ignorefile {
    pub rules: Vec<String>,
}

impl Ignorefile {
    /// Parses ignorefile content.
    ///
    /// Trailing whitespace is trimmed, leading whitespace is kept because it
    /// is part of the glob. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let rules = content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { rules }
    }

    pub fn from_reader<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(Self::parse(&content))
    }

    /// Compiles every rule, failing on the first malformed one.
    pub fn compile(&self) -> Result<Vec<Pattern>> {
        compile_rules(&self.rules)
    }
}

/// Parses and compiles caller-supplied rules, such as before/after lists.
pub fn compile_rules<S: AsRef<str>>(rules: &[S]) -> Result<Vec<Pattern>> {
    rules
        .iter()
        .map(|rule| {
            let pattern = Pattern::parse(rule.as_ref());
            pattern.prepare()?;
            Ok(pattern)
        })
        .collect()
}

/// Resolves the configured ignorefile name, falling back to the default.
pub fn ignorefile_name(name: &str) -> &str {
    if name.is_empty() {
        DEFAULT_IGNOREFILE
    } else {
        name
    }
}

/// A concrete implementation of `PatternImporter` reading ignorefiles
/// through the scope's filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImporter;

impl FileImporter {
    /// Constructs a new `FileImporter` instance.
    pub fn new() -> Self {
        Self
    }
}

impl PatternImporter for FileImporter {
    fn import_patterns(&self, scope: &Scope<'_>, ignorefile: &str) -> Result<Vec<Pattern>> {
        let ignorefile = ignorefile_name(ignorefile);
        let location = scope.to_root_relative(ignorefile);

        if !scope.exists(ignorefile)? {
            debug!(ignorefile = %location, "no ignorefile in scope");
            return Ok(Vec::new());
        }
        // A directory that happens to carry the ignorefile's name holds no rules.
        if scope.is_dir(ignorefile)? {
            debug!(ignorefile = %location, "ignorefile name refers to a directory");
            return Ok(Vec::new());
        }

        let content = scope.read_to_string(ignorefile)?;
        let patterns = Ignorefile::parse(&content).compile()?;
        debug!(ignorefile = %location, rules = patterns.len(), "loaded ignorefile");
        Ok(patterns)
    }
}
