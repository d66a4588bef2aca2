//! Content scanner.
//!
//! Walks the watched knowledge root and yields reviewable documents.
//! Documents are identified by their path relative to the root, with `/`
//! separators on every platform.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{CoreError, Result};

/// A content document found under the watched root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated.
    pub relative: String,
    /// Raw UTF-8 text.
    pub text: String,
}

/// Recursive scanner over one root directory.
#[derive(Debug, Clone)]
pub struct ContentScanner {
    root: PathBuf,
    extension: String,
}

impl ContentScanner {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily yield every matching document with its text.
    ///
    /// Entries the walk cannot enter and files that cannot be read as UTF-8
    /// are logged and skipped. Each call starts a fresh walk. Use
    /// [`ContentScanner::read_all`] when a missing document would be taken
    /// as a deleted one.
    pub fn documents(&self) -> Result<impl Iterator<Item = Document> + '_> {
        Ok(self.walk()?.filter_map(|entry| {
            let (path, relative) = match entry {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping entry during scan");
                    return None;
                }
            };
            match std::fs::read_to_string(&path) {
                Ok(text) => Some(Document {
                    path,
                    relative,
                    text,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable document");
                    None
                }
            }
        }))
    }

    /// Every matching document, failing on the first entry that cannot be
    /// walked or read.
    pub fn read_all(&self) -> Result<Vec<Document>> {
        self.walk()?
            .map(|entry| {
                let (path, relative) = entry?;
                let text = std::fs::read_to_string(&path).map_err(|e| CoreError::Scan {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                Ok(Document {
                    path,
                    relative,
                    text,
                })
            })
            .collect()
    }

    /// Relative paths of every matching document, without reading them.
    ///
    /// Fails if any part of the tree cannot be walked, so a partial listing
    /// is never mistaken for deleted documents.
    pub fn relative_paths(&self) -> Result<BTreeSet<String>> {
        self.walk()?
            .map(|entry| entry.map(|(_, relative)| relative))
            .collect()
    }

    /// Join a relative identity back onto the root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    fn walk(&self) -> Result<impl Iterator<Item = Result<(PathBuf, String)>> + '_> {
        if !self.root.is_dir() {
            return Err(CoreError::Scan {
                path: self.root.clone(),
                message: "not a directory".into(),
            });
        }

        let iter = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() || !self.matches(entry.path()) {
                        return None;
                    }
                    let path = entry.into_path();
                    let relative = relative_identity(&self.root, &path)?;
                    Some(Ok((path, relative)))
                }
                Err(e) => Some(Err(CoreError::Scan {
                    path: e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf),
                    message: e.to_string(),
                })),
            });

        Ok(iter)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

fn relative_identity(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Title-case a file stem, turning `_` and `-` into spaces.
pub fn title_from_stem(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path);

    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
