use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::core::error::{MatchError, Result};
use crate::utils::paths;

/// A single item produced by `Filesystem::walk`.
#[derive(Debug)]
pub enum WalkEntry {
    /// An entry that was read successfully.
    Entry(PathBuf),
    /// An entry that could not be read. The walk carries on past it.
    Error { path: PathBuf, error: io::Error },
}

/// Trait defining the read-only filesystem operations required by the matcher.
/// This abstraction keeps the engine free of direct OS calls, so the same
/// classification runs over the real disk or an in-memory tree.
pub trait Filesystem {
    /// Checks whether a path exists.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Checks whether a path refers to a directory. Fails if the path
    /// cannot be inspected.
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Opens a file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// Lists every path under `root` in pre-order, `root` itself excluded.
    /// Unreadable entries are reported in place rather than aborting the walk.
    fn walk(&self, root: &Path) -> Vec<WalkEntry>;
}

/// Concrete implementation of `Filesystem` over the host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.is_dir())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn walk(&self, root: &Path) -> Vec<WalkEntry> {
        WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| match entry {
                Ok(entry) => WalkEntry::Entry(entry.into_path()),
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    let message = err.to_string();
                    let error = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other(message));
                    WalkEntry::Error { path, error }
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
enum MemoryEntry {
    File(String),
    Dir,
    /// Listed as an error by `walk`; its children are never reached.
    WalkError,
    /// Listed normally by `walk`, but `is_dir` fails.
    StatError,
}

/// An in-memory `Filesystem`.
///
/// Useful to embedders that classify virtual trees, and to tests that need
/// deterministic failures. Parent directories are created implicitly.
#[derive(Debug, Default, Clone)]
pub struct MemoryFilesystem {
    entries: BTreeMap<PathBuf, MemoryEntry>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), MemoryEntry::Dir)
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> &mut Self {
        self.insert(path.as_ref(), MemoryEntry::File(content.into()))
    }

    /// Adds an entry the walk cannot read, like a directory without permissions.
    pub fn add_walk_error(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), MemoryEntry::WalkError)
    }

    /// Adds an entry the walk lists but whose type cannot be determined,
    /// like a file removed between the walk and a later stat.
    pub fn add_stat_error(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), MemoryEntry::StatError)
    }

    fn insert(&mut self, path: &Path, entry: MemoryEntry) -> &mut Self {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.entries
                .entry(ancestor.to_path_buf())
                .or_insert(MemoryEntry::Dir);
        }
        self.entries.insert(path.to_path_buf(), entry);
        self
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        Ok(self.entries.contains_key(path))
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        match self.entries.get(path) {
            Some(MemoryEntry::Dir) => Ok(true),
            Some(MemoryEntry::File(_)) => Ok(false),
            Some(MemoryEntry::WalkError | MemoryEntry::StatError) => Err(io::Error::other(
                format!("cannot stat {}", path.display()),
            )),
            None => Err(Self::not_found(path)),
        }
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        match self.entries.get(path) {
            Some(MemoryEntry::File(content)) => Ok(Box::new(Cursor::new(content.as_bytes()))),
            Some(MemoryEntry::Dir) => Err(io::Error::other(format!(
                "{} is a directory",
                path.display()
            ))),
            Some(_) => Err(io::Error::other(format!("cannot open {}", path.display()))),
            None => Err(Self::not_found(path)),
        }
    }

    fn walk(&self, root: &Path) -> Vec<WalkEntry> {
        if !self.entries.contains_key(root) {
            return vec![WalkEntry::Error {
                path: root.to_path_buf(),
                error: Self::not_found(root),
            }];
        }

        let mut walked = Vec::new();
        let mut unreadable: Vec<&Path> = Vec::new();
        for (path, entry) in &self.entries {
            if path == root || !path.starts_with(root) {
                continue;
            }
            if unreadable.iter().any(|dir| path.starts_with(dir)) {
                continue;
            }
            match entry {
                MemoryEntry::WalkError => {
                    unreadable.push(path.as_path());
                    walked.push(WalkEntry::Error {
                        path: path.clone(),
                        error: io::Error::new(
                            io::ErrorKind::PermissionDenied,
                            format!("cannot read {}", path.display()),
                        ),
                    });
                }
                _ => walked.push(WalkEntry::Entry(path.clone())),
            }
        }
        walked
    }
}

/// Paths collected by one walk of a scope, as scope-relative keys.
#[derive(Debug, Default, Clone)]
pub struct Walked {
    pub paths: Vec<String>,
    pub errors: Vec<String>,
}

/// A view of a `Filesystem` rooted at one directory.
///
/// The root scope sits at the matcher's base directory; every nested
/// ignorefile gets a child scope at its own directory. `prefix` is the
/// scope's location relative to the root scope.
pub struct Scope<'a> {
    fs: &'a dyn Filesystem,
    base: PathBuf,
    prefix: String,
}

impl<'a> Scope<'a> {
    pub fn root(fs: &'a dyn Filesystem, base: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            base: base.into(),
            prefix: String::new(),
        }
    }

    /// A scope rooted at `dir`, a key relative to this scope.
    pub fn child(&self, dir: &str) -> Scope<'a> {
        Scope {
            fs: self.fs,
            base: self.resolve(dir),
            prefix: paths::join(&self.prefix, dir),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Host path of a scope-relative key.
    pub fn resolve(&self, key: &str) -> PathBuf {
        let mut path = self.base.clone();
        for segment in key.split('/').filter(|segment| !segment.is_empty()) {
            path.push(segment);
        }
        path
    }

    /// Key relative to the root scope for a key relative to this one.
    pub fn to_root_relative(&self, key: &str) -> String {
        paths::join(&self.prefix, key)
    }

    pub fn exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key);
        self.fs
            .exists(&path)
            .map_err(|source| MatchError::io(path, source))
    }

    pub fn is_dir(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key);
        self.fs
            .is_dir(&path)
            .map_err(|source| MatchError::io(path, source))
    }

    pub fn read_to_string(&self, key: &str) -> Result<String> {
        let path = self.resolve(key);
        let mut content = String::new();
        self.fs
            .open(&path)
            .and_then(|mut reader| reader.read_to_string(&mut content))
            .map_err(|source| MatchError::io(path, source))?;
        Ok(content)
    }

    /// Walks the scope. A path that fails is reported only as an error,
    /// never also as a readable entry. Entries whose names are not valid
    /// UTF-8 are reported as errors too.
    pub fn walk(&self) -> Walked {
        let mut walked = Walked::default();
        for entry in self.fs.walk(&self.base) {
            match entry {
                WalkEntry::Entry(path) => {
                    let key = self.key_of(&path);
                    if key.is_empty() {
                        continue;
                    }
                    // Keys must resolve back to the same host path.
                    if path.strip_prefix(&self.base).unwrap_or(&path).to_str().is_none() {
                        warn!(path = %self.to_root_relative(&key), "skipping entry with a non UTF-8 name");
                        walked.errors.push(key);
                        continue;
                    }
                    walked.paths.push(key);
                }
                WalkEntry::Error { path, error } => {
                    let key = self.key_of(&path);
                    if key.is_empty() {
                        warn!(dir = %self.base.display(), %error, "cannot read scope directory");
                        continue;
                    }
                    warn!(path = %self.to_root_relative(&key), %error, "skipping unreadable entry");
                    walked.errors.push(key);
                }
            }
        }

        walked.errors.sort();
        walked.errors.dedup();
        if !walked.errors.is_empty() {
            let failed: HashSet<&str> = walked.errors.iter().map(String::as_str).collect();
            walked.paths.retain(|path| !failed.contains(path.as_str()));
        }
        walked
    }

    fn key_of(&self, path: &Path) -> String {
        paths::to_slash(path.strip_prefix(&self.base).unwrap_or(path))
    }
}
