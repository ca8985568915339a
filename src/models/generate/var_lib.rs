//! Variable libraries shared between model configs.
//!
//! A config may name a `"var_lib_file"` holding a JSON object of variable
//! definitions. Its entries are merged into the config's own `"var_lib"`
//! object before rendering, overriding entries with the same key.

use std::{fs, io, path::PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::support::dirs::RunDirs;

use super::GenerateError;

/// Root URL that remote variable library files are resolved against.
pub const DEFAULT_VAR_LIB_ROOT: &str = "https://raw.github.com/fscottfoti/bayarea/master/configs/";

/// The error type returned by a [`VarLibFetcher`].
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Retrieves remote variable library files.
///
/// The crate performs no network I/O itself; install a fetcher with
/// [`Generator::with_fetcher`](super::Generator::with_fetcher) to enable
/// configs that set `"var_lib_db"`.
///
/// Any `Fn(&str) -> Result<String, FetchError>` is a fetcher.
pub trait VarLibFetcher: Send + Sync {
    /// Returns the body of the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the document cannot be retrieved.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<F> VarLibFetcher for F
where
    F: Fn(&str) -> Result<String, FetchError> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self(url)
    }
}

/// Errors loading or merging a variable library.
#[derive(Debug, Error)]
pub enum VarLibError {
    /// `"var_lib_file"` is present but is not a string.
    #[error("`var_lib_file` must be a string")]
    FileNotString,

    /// The local library file could not be read.
    #[error("failed to read variable library {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The library is not valid JSON.
    #[error("failed to parse variable library {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The config asks for a remote library but no fetcher is installed.
    #[error("no fetcher installed for remote variable library {url}")]
    NoFetcher { url: String },

    /// The fetcher failed.
    #[error("failed to fetch variable library {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The library name does not resolve to a URL against the remote root.
    #[error("cannot resolve `{reference}` against {base}")]
    Url {
        base: String,
        reference: String,
        #[source]
        source: url::ParseError,
    },

    /// The library or the config's `"var_lib"` is not a JSON object.
    #[error("{origin} is not a JSON object")]
    NotObject { origin: String },
}

/// Resolves `"var_lib_file"` entries for one [`Generator`](super::Generator).
pub(super) struct VarLibLoader<'a> {
    pub(super) dirs: &'a RunDirs,
    pub(super) remote_root: &'a str,
    pub(super) fetcher: Option<&'a dyn VarLibFetcher>,
}

impl VarLibLoader<'_> {
    /// Merges the named library into `config["var_lib"]`, if one is named.
    pub(super) fn apply(&self, config: &mut Map<String, Value>) -> Result<(), GenerateError> {
        let Some(file) = config.get("var_lib_file") else {
            return Ok(());
        };
        let file = file.as_str().ok_or(VarLibError::FileNotString)?.to_owned();

        let (origin, text) = if config.contains_key("var_lib_db") {
            let url = join_url(self.remote_root, &file)?;
            let text = self.fetch(&url)?;
            (url, text)
        } else {
            let path = self.dirs.configs_dir()?.join(&file);
            let text = fs::read_to_string(&path).map_err(|source| VarLibError::Read {
                path: path.clone(),
                source,
            })?;
            (path.display().to_string(), text)
        };

        let loaded = match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(VarLibError::NotObject { origin }.into()),
            Err(source) => return Err(VarLibError::Parse { origin, source }.into()),
        };

        let var_lib = config
            .entry("var_lib")
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(var_lib) = var_lib else {
            return Err(VarLibError::NotObject {
                origin: "config `var_lib`".to_owned(),
            }
            .into());
        };

        tracing::debug!(origin = %origin, entries = loaded.len(), "merging variable library");
        var_lib.extend(loaded);
        Ok(())
    }

    fn fetch(&self, url: &str) -> Result<String, VarLibError> {
        let fetcher = self.fetcher.ok_or_else(|| VarLibError::NoFetcher {
            url: url.to_owned(),
        })?;
        fetcher.fetch(url).map_err(|source| VarLibError::Fetch {
            url: url.to_owned(),
            source,
        })
    }
}

/// Resolves `reference` against `base` the way a browser resolves a link.
fn join_url(base: &str, reference: &str) -> Result<String, VarLibError> {
    Url::parse(base)
        .and_then(|base| base.join(reference))
        .map(String::from)
        .map_err(|source| VarLibError::Url {
            base: base.to_owned(),
            reference: reference.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(base: &str, reference: &str) -> String {
        join_url(base, reference).unwrap()
    }

    #[test]
    fn join_url_cases() {
        assert_eq!(
            join(DEFAULT_VAR_LIB_ROOT, "var_lib.json"),
            "https://raw.github.com/fscottfoti/bayarea/master/configs/var_lib.json"
        );
        assert_eq!(
            join("http://example.com/a/b.json", "c.json"),
            "http://example.com/a/c.json"
        );
        assert_eq!(
            join("http://example.com/a/", "/root.json"),
            "http://example.com/root.json"
        );
        assert_eq!(
            join(DEFAULT_VAR_LIB_ROOT, "https://other.org/v.json"),
            "https://other.org/v.json"
        );
    }

    #[test]
    fn join_url_resolves_parent_and_scheme_relative_references() {
        assert_eq!(
            join(DEFAULT_VAR_LIB_ROOT, "../shared/v.json"),
            "https://raw.github.com/fscottfoti/bayarea/master/shared/v.json"
        );
        assert_eq!(
            join(DEFAULT_VAR_LIB_ROOT, "//cdn.example/v.json"),
            "https://cdn.example/v.json"
        );
    }

    #[test]
    fn join_url_rejects_a_relative_root() {
        let err = join_url("configs/", "var_lib.json").unwrap_err();
        assert!(matches!(err, VarLibError::Url { ref reference, .. } if reference == "var_lib.json"));
    }
}
