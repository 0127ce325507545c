//! Classify every file and directory under a root directory as matched or
//! unmatched against ignorefile glob rules.
//!
//! ```no_run
//! use xignore::{MatchesOptions, Matcher};
//!
//! let options = MatchesOptions::new(".dockerignore").nested(true);
//! let result = Matcher::system().matches("./build-context", &options)?;
//! for file in &result.matched_files {
//!     println!("skip {file}");
//! }
//! # Ok::<(), xignore::MatchError>(())
//! ```
pub mod builders;
pub mod core;
pub mod utils;

pub use crate::builders::importer::DEFAULT_IGNOREFILE;
pub use crate::builders::patterns::{PathPredicate, Pattern};
pub use crate::core::config::MatchesOptions;
pub use crate::core::engine::{Matcher, dir_matches};
pub use crate::core::error::{GlobError, MatchError};
pub use crate::core::fs::{Filesystem, MemoryFilesystem, OsFilesystem};
pub use crate::core::result::MatchesResult;

#[cfg(test)]
mod tests;
