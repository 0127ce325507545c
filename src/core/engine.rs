use std::path::Path;
use tracing::debug;

use crate::builders::importer::{FileImporter, PatternImporter, compile_rules};
use crate::core::config::MatchesOptions;
use crate::core::error::{MatchError, Result};
use crate::core::fs::{Filesystem, OsFilesystem, Scope};
use crate::core::nested::apply_nested;
use crate::core::result::{MatchesResult, partition};
use crate::core::state_map::{Baseline, apply_patterns};

/// Classifies directory trees against ignorefile rules.
///
/// A `Matcher` holds nothing but its filesystem handle; every call builds
/// its own state, so one instance can serve any number of calls.
#[derive(Debug, Default, Clone)]
pub struct Matcher<F = OsFilesystem> {
    fs: F,
    importer: FileImporter,
}

impl Matcher<OsFilesystem> {
    /// A matcher over the host filesystem.
    pub fn system() -> Self {
        Self::new(OsFilesystem)
    }
}

impl<F: Filesystem> Matcher<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            importer: FileImporter::new(),
        }
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Classifies every entry under `base_dir`.
    ///
    /// # Arguments
    /// * `base_dir`: The directory to classify; its ignorefile forms the root scope.
    /// * `options`: Ignorefile name, nesting, and before/after rules.
    ///
    /// # Returns
    /// The partitioned `MatchesResult`. Fails with `NotFound` for a missing
    /// base directory, `Pattern` for a malformed rule anywhere, and `Io` when
    /// an ignorefile cannot be read or a matched directory cannot be tested.
    pub fn matches(&self, base_dir: impl AsRef<Path>, options: &MatchesOptions) -> Result<MatchesResult> {
        let base_dir = base_dir.as_ref();
        let root = Scope::root(&self.fs, base_dir);
        let ignorefile = options.effective_ignorefile();
        debug!(base_dir = %base_dir.display(), ignorefile, nested = options.nested, "matching directory");

        if !root.exists("")? || !root.is_dir("")? {
            return Err(MatchError::NotFound {
                path: base_dir.to_path_buf(),
            });
        }

        let walked = root.walk();
        let mut patterns = compile_rules(&options.before_patterns)?;
        patterns.extend(self.importer.import_patterns(&root, ignorefile)?);
        patterns.extend(compile_rules(&options.after_patterns)?);

        let mut state = apply_patterns(&root, &walked.paths, &patterns, Baseline::Unmatched)?;
        let mut error_files = walked.errors;
        if options.nested {
            error_files.extend(apply_nested(&root, &mut state, &self.importer, ignorefile)?);
        }

        let result = partition(&root, state, error_files);
        debug!(
            matched_files = result.matched_files.len(),
            matched_dirs = result.matched_dirs.len(),
            classified = result.classified(),
            "matching finished"
        );
        Ok(result)
    }
}

/// Classifies `base_dir` on the host filesystem in one call.
pub fn dir_matches(base_dir: impl AsRef<Path>, options: &MatchesOptions) -> Result<MatchesResult> {
    Matcher::system().matches(base_dir, options)
}
