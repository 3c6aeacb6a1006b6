use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use proc_macro2::{Ident, Span};
use toml_edit::{Document, Item, Table};

/// Locates the path under which a `stash` crate is reachable from the crate
/// that invokes a derive macro.
///
/// Generated code must name the engine crate with a path that resolves in
/// the *caller's* dependency graph, so the caller's `Cargo.toml` is parsed
/// (and cached by modification time) to find out how it depends on it.
///
/// # Example
///
/// ```no_run
/// # use stash_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("stash_bean")).unwrap();
/// ```
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If the requested crate name begins with `stash_` and the caller depends
///    on the facade crate `stash_core`, return `::stash_core::short_name`
///    (e.g. `stash_bean` -> `::stash_core::bean`).
/// 3. Same as 2 for a dependency renamed to `stash`.
/// 4. Repeat steps 1-3 in `dev-dependencies`.
/// 5. Otherwise, fall back to the absolute path `::crate_name`.
///
/// A crate referencing itself (doctests, unit tests of the engine) relies on
/// an `extern crate self as stash_bean;` alias in its root.
#[derive(Debug)]
pub struct Manifest {
    document: Document<Box<str>>,
    modified_time: SystemTime,
}

/// Failure to locate or parse the caller's `Cargo.toml`.
#[derive(Debug)]
pub struct ManifestError(String);

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ManifestError {}

const FACADE_NAME: &str = "stash_core";
const SHORT_FACADE_NAME: &str = "stash";
const CRATE_PREFIX: &str = "stash_";

impl Manifest {
    fn manifest_path() -> Result<PathBuf, ManifestError> {
        let dir = env::var_os("CARGO_MANIFEST_DIR").ok_or_else(|| {
            ManifestError("CARGO_MANIFEST_DIR should be auto-defined by cargo".into())
        })?;
        let path = PathBuf::from(dir).join("Cargo.toml");
        if path.exists() {
            Ok(path)
        } else {
            Err(ManifestError(format!(
                "cargo manifest does not exist at path {}",
                path.display()
            )))
        }
    }

    fn modified_time(path: &Path) -> Result<SystemTime, ManifestError> {
        std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| ManifestError(format!("cannot stat {}: {e}", path.display())))
    }

    fn read(path: &Path, modified_time: SystemTime) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ManifestError(format!("unable to read {}: {e}", path.display())))?;
        let document = Document::parse(text.into_boxed_str())
            .map_err(|e| ManifestError(format!("failed to parse {}: {e}", path.display())))?;
        Ok(Self {
            document,
            modified_time,
        })
    }

    fn absolute(segments: &[&str]) -> syn::Path {
        let mut path = syn::Path {
            leading_colon: Some(Default::default()),
            segments: Default::default(),
        };
        for segment in segments {
            path.segments
                .push(syn::PathSegment::from(Ident::new(segment, Span::call_site())));
        }
        path
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::absolute(&[name]));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        [FACADE_NAME, SHORT_FACADE_NAME]
            .into_iter()
            .find(|facade| deps.contains_key(facade))
            .map(|facade| Self::absolute(&[facade, module]))
    }

    /// Returns a [`syn::Path`] for the package named `name` as resolved from
    /// the caller's `Cargo.toml`. See the type-level documentation for the
    /// resolution order.
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .filter_map(|key| match self.document.get(key) {
                Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| Self::absolute(&[name]))
    }

    /// Runs `func` against the caller's manifest.
    ///
    /// Manifests are cached per path and re-read only when the file's
    /// modification time changes, so derive macros can call this once per
    /// invocation.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> Result<R, ManifestError> {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path()?;
        let modified_time = Self::modified_time(&path)?;

        {
            let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = manifests.get(&path)
                && manifest.modified_time == modified_time
            {
                return Ok(func(manifest));
            }
        }

        let manifest = Self::read(&path, modified_time)?;
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::Manifest;

    fn path_string(path: &syn::Path) -> String {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let prefix = if path.leading_colon.is_some() { "::" } else { "" };
        format!("{prefix}{}", segments.join("::"))
    }

    fn manifest(text: &str) -> Manifest {
        Manifest {
            document: toml_edit::Document::parse(text.to_owned().into_boxed_str()).unwrap(),
            modified_time: std::time::SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn direct_dependency() {
        let m = manifest("[dependencies]\nstash_bean = \"0.0.1\"\n");
        assert_eq!(path_string(&m.get_crate_path("stash_bean")), "::stash_bean");
    }

    #[test]
    fn through_facade() {
        let m = manifest("[dependencies]\nstash_core = \"0.0.1\"\n");
        assert_eq!(path_string(&m.get_crate_path("stash_bean")), "::stash_core::bean");
    }

    #[test]
    fn dev_dependency_and_fallback() {
        let m = manifest("[dev-dependencies]\nstash = { package = \"stash_core\" }\n");
        assert_eq!(path_string(&m.get_crate_path("stash_bean")), "::stash::bean");

        let m = manifest("[dependencies]\nserde = \"1\"\n");
        assert_eq!(path_string(&m.get_crate_path("stash_bean")), "::stash_bean");
    }
}
