//! Generating and running template-based models.
//!
//! A model is described by a JSON config whose `"model"` key names a template
//! (`<model>.py.template`). The [`Generator`] renders that template once per
//! [`Mode`] the model type supports, producing the model's source text.
//!
//! # Running models
//!
//! Generated sources are not executed in-process. Instead, each entry point
//! `<basename>_<mode>` is registered in a [`ModelRegistry`] as a
//! [`twine_core::Model`] taking a [`ModelRun`]. [`ModelRegistry::run_model`]
//! renders the config for the requested mode, so template and config errors
//! surface exactly as they would for a real run, and then dispatches to the
//! registered entry point.

mod generate;
mod mode;
mod run;

pub use generate::{
    DEFAULT_VAR_LIB_ROOT, FetchError, GenerateError, GeneratedModel, Generator, ModelConfig,
    VarLibError, VarLibFetcher,
};
pub use mode::{Mode, ParseModeError, modes_for};
pub use run::{BASE_YEAR, FnModel, ModelRegistry, ModelRun, RunError};
