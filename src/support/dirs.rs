//! Run directory conventions.
//!
//! Model runs read and write artifacts in a fixed set of subdirectories under a
//! single root, which defaults to the `DATA_HOME` environment variable:
//!
//! | Directory | Contents                                  |
//! |-----------|-------------------------------------------|
//! | `data`    | Input datasets                            |
//! | `models`  | Generated model sources                   |
//! | `configs` | Model configs and variable libraries      |
//! | `runs`    | Simulation outputs, one set per run       |
//! | `coeffs`  | Estimated coefficients                    |
//! | `output`  | Results tables (CSV)                      |
//! | `debug`   | Diagnostics, including LaTeX tables       |
//!
//! Each accessor creates its directory on first use.

use std::{
    env,
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Environment variable naming the root of the run directory layout.
pub const DATA_HOME_VAR: &str = "DATA_HOME";

/// File under the root that stores the next run number.
pub const RUN_NUMBER_FILE: &str = "RUNNUM";

/// An error creating a run directory or updating the run number.
#[derive(Debug, Error)]
#[error("{action} {}: {source}", .path.display())]
pub struct DirError {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl DirError {
    fn new(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            action,
            path: path.into(),
            source,
        }
    }

    /// Returns the path that could not be created or written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The conventional directory layout for a set of model runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirs {
    root: PathBuf,
}

impl RunDirs {
    /// Creates a layout rooted at `root`.
    ///
    /// Nothing is created until a directory accessor is called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a layout rooted at `$DATA_HOME`, or the current directory if unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_data_home(env::var_os(DATA_HOME_VAR))
    }

    fn from_data_home(data_home: Option<OsString>) -> Self {
        Self::new(data_home.map_or_else(|| PathBuf::from("."), PathBuf::from))
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/<folder>`, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn ensure(&self, folder: &str) -> Result<PathBuf, DirError> {
        let dir = self.root.join(folder);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| DirError::new("creating", &dir, e))?;
            tracing::debug!(dir = %dir.display(), "created run directory");
        }
        Ok(dir)
    }

    /// Input datasets.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn data_dir(&self) -> Result<PathBuf, DirError> {
        self.ensure("data")
    }

    /// Generated model sources.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn models_dir(&self) -> Result<PathBuf, DirError> {
        self.ensure("models")
    }

    /// Model configs and variable libraries.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn configs_dir(&self) -> Result<PathBuf, DirError> {
        self.ensure("configs")
    }

    /// Simulation outputs.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn runs_dir(&self) -> Result<PathBuf, DirError> {
        self.ensure("runs")
    }

    /// Estimated coefficients, stored under `coeffs`.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn coef_dir(&self) -> Result<PathBuf, DirError> {
        self.ensure("coeffs")
    }

    /// Results tables.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn output_dir(&self) -> Result<PathBuf, DirError> {
        self.ensure("output")
    }

    /// Diagnostics and LaTeX tables.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the directory cannot be created.
    pub fn debug_dir(&self) -> Result<PathBuf, DirError> {
        self.ensure("debug")
    }

    /// Claims the next run number.
    ///
    /// Reads the number stored in `<root>/RUNNUM`, writes back its successor,
    /// and returns the number read. A missing or unreadable file counts as 1.
    ///
    /// # Errors
    ///
    /// Returns a [`DirError`] if the successor cannot be written.
    pub fn run_number(&self) -> Result<u64, DirError> {
        let path = self.root.join(RUN_NUMBER_FILE);
        let num = fs::read_to_string(&path)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);

        fs::write(&path, (num + 1).to_string()).map_err(|e| DirError::new("writing", &path, e))?;
        tracing::debug!(run = num, "claimed run number");
        Ok(num)
    }
}

impl Default for RunDirs {
    fn default() -> Self {
        Self::from_env()
    }
}
