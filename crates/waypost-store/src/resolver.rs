//! Path confinement
//!
//! Every caller-supplied path is rewritten so that it lands inside a bucket
//! root. The defense is lexical: `..` is collapsed to `.` until none remain,
//! then the path is joined segment by segment. Symlinks are not followed or
//! checked.

use std::path::{Path, PathBuf};

/// Collapse every `..` into `.` until the input holds no `..` at all.
///
/// A single pass is not enough: `...` becomes `..` after one replacement.
pub fn sanitize(input: &str) -> String {
    let mut out = input.to_string();
    while out.contains("..") {
        out = out.replace("..", ".");
    }
    out
}

/// Join `relative` onto `base`, dropping empty and `.` segments
fn lexical_join(base: &Path, relative: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for segment in relative.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        out.push(segment);
    }
    out
}

/// Resolves relative references against a fixed bucket root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver; the root itself is sanitized
    pub fn new(root: impl AsRef<Path>) -> Self {
        let raw = sanitize(&root.as_ref().to_string_lossy());
        let base = if raw.starts_with('/') {
            PathBuf::from("/")
        } else {
            PathBuf::new()
        };
        Self {
            root: lexical_join(&base, &raw),
        }
    }

    /// The bucket root every resolved path stays under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolver for a named child directory (a bucket) of this root
    pub fn child(&self, name: &str) -> Self {
        Self {
            root: lexical_join(&self.root, &sanitize(name)),
        }
    }

    /// Resolve a caller path to an absolute path inside the root.
    ///
    /// A path that already carries the root as prefix has it stripped
    /// first, so `resolve(resolve(p)) == resolve(p)`.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let sanitized = sanitize(relative);
        let candidate = Path::new(&sanitized);
        let remainder = match candidate.strip_prefix(&self.root) {
            Ok(rest) => rest.to_string_lossy().into_owned(),
            Err(_) => sanitized.clone(),
        };
        lexical_join(&self.root, &remainder)
    }

    /// Inverse of [`resolve`](Self::resolve): strip the root for display.
    ///
    /// Paths outside the root are returned unchanged.
    pub fn display_path(&self, absolute: &Path) -> String {
        match absolute.strip_prefix(&self.root) {
            Ok(rest) => {
                let segments: Vec<_> = rest
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("/{}", segments.join("/"))
            }
            Err(_) => absolute.to_string_lossy().into_owned(),
        }
    }

    /// Whether `path` lies at or below the root
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}
