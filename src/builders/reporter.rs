use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

use crate::core::result::MatchesResult;

/// Output formats for a `MatchesResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Human-readable report printed by `ConsoleReporter`.
    #[default]
    Text,
    Json,
    Yaml,
    Toml,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(format!(
                "unknown format '{other}' (expected text, json, yaml or toml)"
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Yaml => write!(f, "yaml"),
            ExportFormat::Toml => write!(f, "toml"),
        }
    }
}

/// Serializes a result into one of the structured formats.
///
/// `Text` has no serialized form here; it is rendered by `ConsoleReporter`.
pub fn export_result(result: &MatchesResult, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(result).context("Failed to serialize to JSON")
        }
        ExportFormat::Yaml => serde_yaml::to_string(result).context("Failed to serialize to YAML"),
        ExportFormat::Toml => {
            toml::to_string_pretty(result).context("Failed to serialize to TOML")
        }
        ExportFormat::Text => Ok(ConsoleReporter::new().render(result)),
    }
}

pub trait ResultReporter {
    fn report(&self, result: &MatchesResult) -> Result<()>;
}

/// A concrete implementation of `ResultReporter` that prints the report to
/// the console.
///
/// Without `verbose`, only the matched entries are listed; the remaining
/// lists are summarized by count.
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// Constructs a new `ConsoleReporter` instance.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Renders the full report as a string.
    pub fn render(&self, result: &MatchesResult) -> String {
        let mut out = String::new();
        out.push_str(&format!("📁 {}\n", result.base_dir.display()));

        let sections: [(&str, &[String], bool); 6] = [
            ("Matched files", &result.matched_files, true),
            ("Matched directories", &result.matched_dirs, true),
            ("Unmatched files", &result.unmatched_files, self.verbose),
            ("Unmatched directories", &result.unmatched_dirs, self.verbose),
            ("Unreadable entries", &result.error_files, true),
            ("Unclassified entries", &result.error_dirs, true),
        ];
        for (title, paths, listed) in sections {
            if paths.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{title} ({}):\n", paths.len()));
            if listed {
                for path in paths {
                    out.push_str(&format!("  {path}\n"));
                }
            }
        }

        out.push_str("\n📈 Summary:\n");
        out.push_str(&format!(
            "  Matched: {} files, {} directories\n",
            result.matched_files.len(),
            result.matched_dirs.len()
        ));
        out.push_str(&format!(
            "  Unmatched: {} files, {} directories\n",
            result.unmatched_files.len(),
            result.unmatched_dirs.len()
        ));
        if result.has_errors() {
            out.push_str(&format!(
                "  ⚠️  Errors: {} unreadable, {} unclassified\n",
                result.error_files.len(),
                result.error_dirs.len()
            ));
        }
        out
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultReporter for ConsoleReporter {
    fn report(&self, result: &MatchesResult) -> Result<()> {
        print!("{}", self.render(result));
        Ok(())
    }
}
