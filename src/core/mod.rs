// This file is the module declaration file for the `core` module.
// It declares the submodules that make up the matching engine and exposes
// them to the rest of the crate and to embedding applications.

// `config` module:
// `MatchesOptions` (ignorefile name, nesting, before/after rules) and the
// `ConfigManager` that loads them from a TOML file.
pub mod config;

// `engine` module:
// The `Matcher` orchestrator: walk the tree once, build the root state map,
// resolve nested ignorefiles when asked, and partition the result.
pub mod engine;

// `error` module:
// The `MatchError` taxonomy returned by the engine and the `GlobError`
// syntax errors of the glob dialect.
pub mod error;

// `fs` module:
// The read-only `Filesystem` abstraction (host and in-memory
// implementations) and `Scope`, a view rooted at one directory.
pub mod fs;

// `nested` module:
// Applies ignorefiles found in subdirectories, shallowest first, on top of
// the root state map.
pub mod nested;

// `result` module:
// `MatchesResult` and the partitioning of a final state map into sorted
// matched/unmatched/error lists.
pub mod result;

// `state_map` module:
// The per-path matched/unmatched map and the algorithm that applies an
// ordered rule list to one scope, including directory cascading.
pub mod state_map;
