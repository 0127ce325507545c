use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::core::fs::Scope;
use crate::core::state_map::StateMap;
use crate::utils::paths;

/// The outcome of one matching call.
///
/// All six lists are sorted, pairwise disjoint, relative to `base_dir` and
/// written with the host's native separator.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchesResult {
    pub base_dir: PathBuf,
    /// Files the rules matched.
    pub matched_files: Vec<String>,
    /// Files no rule matched, or whose last applicable rule was an exclusion.
    pub unmatched_files: Vec<String>,
    pub matched_dirs: Vec<String>,
    pub unmatched_dirs: Vec<String>,
    /// Entries the walk could not read.
    pub error_files: Vec<String>,
    /// Entries whose type could not be determined when partitioning.
    pub error_dirs: Vec<String>,
}

impl MatchesResult {
    /// Number of classified entries, errors excluded.
    pub fn classified(&self) -> usize {
        self.matched_files.len()
            + self.unmatched_files.len()
            + self.matched_dirs.len()
            + self.unmatched_dirs.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.error_files.is_empty() || !self.error_dirs.is_empty()
    }
}

/// Splits a final state map into a `MatchesResult`.
///
/// An entry that cannot be tested for being a directory lands in
/// `error_dirs` and in no classification list.
pub fn partition(scope: &Scope<'_>, state: StateMap, error_files: Vec<String>) -> MatchesResult {
    let mut result = MatchesResult {
        base_dir: scope.base().to_path_buf(),
        ..MatchesResult::default()
    };

    for (path, matched) in state {
        if path.is_empty() {
            continue;
        }
        let is_dir = match scope.is_dir(&path) {
            Ok(is_dir) => is_dir,
            Err(error) => {
                warn!(path = %path, %error, "cannot classify entry");
                result.error_dirs.push(paths::to_native(&path));
                continue;
            }
        };
        let list = match (is_dir, matched) {
            (true, true) => &mut result.matched_dirs,
            (true, false) => &mut result.unmatched_dirs,
            (false, true) => &mut result.matched_files,
            (false, false) => &mut result.unmatched_files,
        };
        list.push(paths::to_native(&path));
    }
    result.error_files = error_files.iter().map(|path| paths::to_native(path)).collect();

    for list in [
        &mut result.matched_files,
        &mut result.unmatched_files,
        &mut result.matched_dirs,
        &mut result.unmatched_dirs,
        &mut result.error_files,
        &mut result.error_dirs,
    ] {
        list.sort();
        list.dedup();
    }
    result
}
