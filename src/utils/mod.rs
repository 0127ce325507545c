use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::importer::Ignorefile;
use crate::builders::reporter::{ConsoleReporter, ExportFormat, ResultReporter, export_result};
use crate::builders::validator::{IgnorefileValidator, StandardValidator};
use crate::core::config::{ConfigManager, MatchesOptions};
use crate::core::engine::Matcher;

pub mod paths;

/// Config file written by `xignore init` when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "xignore.toml";

/// Command-line overrides for `xignore matches`, applied on top of the
/// config file.
#[derive(Debug, Default, Clone)]
pub struct MatchesArgs {
    pub ignorefile: Option<String>,
    pub nested: bool,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub config: Option<PathBuf>,
    pub format: ExportFormat,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

impl MatchesArgs {
    /// Loads the configured options (defaults without `--config`) and layers
    /// the flags over them. A config file named with `--config` must exist.
    pub fn resolve_options(&self) -> Result<MatchesOptions> {
        let mut options = match &self.config {
            Some(path) => ConfigManager::new(path).load_required()?,
            None => MatchesOptions::default(),
        };

        if let Some(name) = &self.ignorefile {
            options.ignorefile = name.clone();
        }
        if self.nested {
            options.nested = true;
        }
        options.before_patterns.extend(self.before.iter().cloned());
        options.after_patterns.extend(self.after.iter().cloned());
        Ok(options)
    }
}

pub fn initialize_config(path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let config_manager = ConfigManager::new(path);
    let written = config_manager.initialize()?;
    let path = config_manager.config_path().display();
    if written {
        println!("✓ Wrote default configuration to {path}");
    } else {
        println!("Configuration {path} already exists, leaving it untouched");
    }
    Ok(())
}

pub fn run_matches(dir: &Path, args: &MatchesArgs) -> Result<()> {
    let options = args.resolve_options()?;
    let result = Matcher::system()
        .matches(dir, &options)
        .with_context(|| format!("Failed to classify {}", dir.display()))?;

    match (&args.output, args.format) {
        (None, ExportFormat::Text) => {
            ConsoleReporter::new().verbose(args.verbose).report(&result)?;
        }
        (None, format) => println!("{}", export_result(&result, format)?),
        (Some(output), format) => {
            let content = match format {
                ExportFormat::Text => ConsoleReporter::new().verbose(args.verbose).render(&result),
                format => export_result(&result, format)?,
            };
            fs::write(output, content)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✓ Results written to {}", output.display());
        }
    }
    Ok(())
}

pub fn check_ignorefile(path: &Path) -> Result<()> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open ignorefile {}", path.display()))?;
    let ignorefile = Ignorefile::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to read ignorefile {}", path.display()))?;

    let issues = StandardValidator::new().validate_ignorefile(&ignorefile)?;
    if issues.is_empty() {
        println!("✓ {} ({} rules) looks good", path.display(), ignorefile.rules.len());
        return Ok(());
    }

    println!("⚠️  Issues in {}:", path.display());
    for issue in &issues {
        println!("  - {issue}");
    }
    bail!("{} issue(s) found in {}", issues.len(), path.display())
}
