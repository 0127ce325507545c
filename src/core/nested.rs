use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

use crate::builders::importer::{PatternImporter, ignorefile_name};
use crate::core::error::Result;
use crate::core::fs::Scope;
use crate::core::state_map::{Baseline, StateMap, apply_patterns};
use crate::utils::paths;

/// Applies every nested ignorefile found in an already classified tree.
///
/// Nested ignorefiles are processed shallowest first, so on overlap the
/// deeper scope's verdict is written last and wins. Each one governs its own
/// directory with an empty baseline: paths its rules do not touch keep the
/// state they already had in `state`.
///
/// # Arguments
/// * `root`: The root scope `state` was built for.
/// * `state`: The root state map, updated in place.
/// * `importer`: Loads each nested scope's rules.
/// * `ignorefile`: The ignorefile name.
///
/// # Returns
/// Root-relative paths that failed to walk inside nested scopes. They are
/// removed from `state` before returning. Loading a nested ignorefile is
/// fatal on failure.
pub fn apply_nested(
    root: &Scope<'_>,
    state: &mut StateMap,
    importer: &dyn PatternImporter,
    ignorefile: &str,
) -> Result<Vec<String>> {
    let ignorefile = ignorefile_name(ignorefile);
    let mut queue: Vec<String> = state
        .paths()
        .filter(|path| path.len() > ignorefile.len() && paths::file_name(path) == ignorefile)
        .map(str::to_string)
        .collect();
    queue.sort_by(|a, b| {
        paths::depth(a)
            .cmp(&paths::depth(b))
            .then_with(|| a.cmp(b))
    });
    let mut queue = VecDeque::from(queue);

    let mut errors = BTreeSet::new();
    while let Some(nested_file) = queue.pop_front() {
        let scope = root.child(paths::parent(&nested_file));
        debug!(ignorefile = %nested_file, "applying nested ignorefile");

        let walked = scope.walk();
        let patterns = importer.import_patterns(&scope, ignorefile)?;
        let nested = apply_patterns(&scope, &walked.paths, &patterns, Baseline::Empty)?;

        for (path, matched) in nested {
            state.set(scope.to_root_relative(&path), matched);
        }
        errors.extend(walked.errors.iter().map(|path| scope.to_root_relative(path)));
    }

    for path in &errors {
        state.remove(path);
    }
    Ok(errors.into_iter().collect())
}
