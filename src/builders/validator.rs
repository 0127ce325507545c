use anyhow::Result;
use std::collections::HashSet;

use crate::builders::importer::Ignorefile;
use crate::builders::patterns::Pattern;

/// The `IgnorefileValidator` trait defines the public interface for checking
/// ignorefile rules before they are used.
pub trait IgnorefileValidator {
    /// Checks every rule of an ignorefile and returns the issues found.
    ///
    /// # Arguments
    /// * `ignorefile`: The parsed ignorefile.
    ///
    /// # Returns
    /// A `Result<Vec<String>>` where each string describes one issue. An empty
    /// vector means the file is clean.
    fn validate_ignorefile(&self, ignorefile: &Ignorefile) -> Result<Vec<String>>;

    /// Checks a single rule.
    fn validate_rule(&self, rule: &str) -> Vec<String>;
}

/// The `StandardValidator` flags malformed globs and rules that are valid
/// but almost certainly not what the author meant.
pub struct StandardValidator;

impl StandardValidator {
    /// Creates a new instance of `StandardValidator`.
    pub fn new() -> Self {
        Self
    }

    /// Reports rules that appear more than once; only the last copy has any effect.
    fn check_duplicates(&self, rules: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut warnings = Vec::new();
        for rule in rules {
            if !seen.insert(rule.as_str()) {
                warnings.push(format!("Duplicate rule: {rule}"));
            }
        }
        warnings
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl IgnorefileValidator for StandardValidator {
    fn validate_ignorefile(&self, ignorefile: &Ignorefile) -> Result<Vec<String>> {
        let mut issues = Vec::new();
        for rule in &ignorefile.rules {
            issues.extend(self.validate_rule(rule));
        }
        issues.extend(self.check_duplicates(&ignorefile.rules));
        Ok(issues)
    }

    fn validate_rule(&self, rule: &str) -> Vec<String> {
        let mut issues = Vec::new();
        let pattern = Pattern::parse(rule);

        if pattern.is_empty() {
            issues.push(format!("Rule '{rule}' has an empty glob and is ignored"));
            return issues;
        }
        if let Err(e) = pattern.prepare() {
            issues.push(format!("Invalid rule: {e}"));
        }

        if rule == "!" {
            issues.push(
                "Rule '!' matches only an entry literally named '!'; write '\\!' if that is intended"
                    .to_string(),
            );
        }
        // Paths are matched relative to the ignorefile's directory.
        if pattern.glob().starts_with('/') {
            issues.push(format!(
                "Rule '{rule}' starts with '/' and can never match a relative path"
            ));
        }
        if pattern.glob().len() > 1 && pattern.glob().ends_with('/') {
            issues.push(format!(
                "Rule '{rule}' ends with '/' and never matches; drop the slash to match the directory"
            ));
        }

        issues
    }
}
