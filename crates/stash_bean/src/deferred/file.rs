use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::Value;
use crate::deferred::DeferredRef;

/// Whether a [`FileProperty`] points to a regular file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// An optional, settable file system location.
///
/// Relative locations are resolved against the base directory, when one is
/// configured. Unwraps to the resolved [`PathBuf`] or to absence.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use stash_bean::deferred::FileProperty;
///
/// let output = FileProperty::directory().with_base("/work");
/// assert_eq!(output.get(), None);
///
/// output.set("build/classes");
/// assert_eq!(output.get(), Some(PathBuf::from("/work/build/classes")));
/// ```
#[derive(Debug)]
pub struct FileProperty {
    kind: FileKind,
    base: Option<PathBuf>,
    location: RwLock<Option<PathBuf>>,
}

impl FileProperty {
    /// Creates an empty property for a regular file.
    #[inline]
    pub const fn file() -> Self {
        Self::new(FileKind::File)
    }

    /// Creates an empty property for a directory.
    #[inline]
    pub const fn directory() -> Self {
        Self::new(FileKind::Directory)
    }

    const fn new(kind: FileKind) -> Self {
        Self {
            kind,
            base: None,
            location: RwLock::new(None),
        }
    }

    /// Sets the directory relative locations are resolved against.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Returns the kind of location.
    #[inline]
    pub const fn kind(&self) -> FileKind {
        self.kind
    }

    /// Sets the location.
    pub fn set(&self, location: impl AsRef<Path>) {
        *self.location.write().unwrap_or_else(PoisonError::into_inner) =
            Some(location.as_ref().to_path_buf());
    }

    /// Removes the location.
    pub fn clear(&self) {
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns the resolved location, if one is set.
    pub fn get(&self) -> Option<PathBuf> {
        let location = self.location.read().unwrap_or_else(PoisonError::into_inner);
        let location = location.as_deref()?;
        Some(match &self.base {
            Some(base) if location.is_relative() => base.join(location),
            _ => location.to_path_buf(),
        })
    }

    /// Returns `true` if a location is set.
    pub fn is_present(&self) -> bool {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Value for FileProperty {
    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::File(self))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{FileKind, FileProperty};

    #[test]
    fn absolute_locations_ignore_base() {
        let file = FileProperty::file().with_base("/work");
        file.set("/tmp/out.jar");

        assert_eq!(file.kind(), FileKind::File);
        assert_eq!(file.get(), Some(PathBuf::from("/tmp/out.jar")));
    }

    #[test]
    fn clear_makes_absent() {
        let dir = FileProperty::directory();
        dir.set("out");
        assert!(dir.is_present());

        dir.clear();
        assert!(!dir.is_present());
        assert_eq!(dir.get(), None);
    }
}
