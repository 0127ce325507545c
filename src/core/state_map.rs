use std::collections::HashMap;
use std::collections::hash_map;
use tracing::trace;

use crate::builders::patterns::Pattern;
use crate::core::error::Result;
use crate::core::fs::Scope;

/// Matched/unmatched state per scope-relative path.
///
/// One map is built per scope. Merging overwrites: the map merged last wins
/// for every key it holds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StateMap {
    entries: HashMap<String, bool>,
}

/// The starting state of a scope before any rule is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Every candidate starts unmatched. Used by the root scope.
    Unmatched,
    /// No entries; only paths a rule touches are recorded. Used by nested
    /// scopes so untouched paths keep the enclosing scope's verdict.
    Empty,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding every path as unmatched.
    pub fn unmatched<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: paths.into_iter().map(|path| (path.into(), false)).collect(),
        }
    }

    pub fn set(&mut self, path: impl Into<String>, matched: bool) {
        self.entries.insert(path.into(), matched);
    }

    pub fn get(&self, path: &str) -> Option<bool> {
        self.entries.get(path).copied()
    }

    pub fn remove(&mut self, path: &str) -> Option<bool> {
        self.entries.remove(path)
    }

    /// Copies every entry of `other` over this map.
    pub fn merge(&mut self, other: StateMap) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(path, matched)| (path.as_str(), *matched))
    }
}

impl IntoIterator for StateMap {
    type Item = (String, bool);
    type IntoIter = hash_map::IntoIter<String, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Applies an ordered rule list to the candidates of one scope.
///
/// Rules are applied in order and a later rule overwrites an earlier one for
/// the same path. Every directory an explicit rule selects also produces a
/// cascade rule `<dir>/**` carrying the same exclusion flag. Cascade results
/// are laid over the baseline first and explicit results on top, so a rule
/// naming a path beats a rule that only named one of its ancestors.
///
/// # Arguments
/// * `scope`: Used to tell directories from files.
/// * `candidates`: The scope's walked paths, scope-relative.
/// * `patterns`: The ordered rules; empty patterns are skipped.
/// * `baseline`: The starting state.
///
/// # Returns
/// The scope's `StateMap`. Fails on a malformed rule, or when a selected
/// path cannot be tested for being a directory.
pub fn apply_patterns(
    scope: &Scope<'_>,
    candidates: &[String],
    patterns: &[Pattern],
    baseline: Baseline,
) -> Result<StateMap> {
    for pattern in patterns {
        pattern.prepare()?;
    }

    let mut explicit = StateMap::new();
    let mut cascades = Vec::new();
    for pattern in patterns.iter().filter(|pattern| !pattern.is_empty()) {
        let matched = pattern.matches(candidates)?;
        trace!(pattern = %pattern, matches = matched.len(), "applied rule");

        for &path in &matched {
            explicit.set(path, !pattern.is_exclusion());
        }
        for &path in &matched {
            if scope.is_dir(path)? {
                cascades.push(Pattern::descendants_of(path, pattern.is_exclusion()));
            }
        }
    }

    let mut inherited = StateMap::new();
    for cascade in &cascades {
        for path in cascade.matches(candidates)? {
            inherited.set(path, !cascade.is_exclusion());
        }
    }

    let mut state = match baseline {
        Baseline::Unmatched => StateMap::unmatched(candidates.iter().cloned()),
        Baseline::Empty => StateMap::new(),
    };
    state.merge(inherited);
    state.merge(explicit);
    Ok(state)
}
