//! # UrbanSim Utils
//!
//! Model-building glue for UrbanSim-style land use models.
//!
//! ## Crate layout
//!
//! - [`models`]: Generating model source from templates and dispatching model runs.
//! - [`support`]: Run-directory conventions, results tables, and tabular data helpers.
//!
//! ## Typical workflow
//!
//! 1. Describe a model in a JSON config with a `"model"` key naming its template.
//! 2. Render it for each [`Mode`](models::Mode) with a [`Generator`](models::Generator).
//! 3. Estimate it, then write the coefficient table with a
//!    [`ResultsWriter`](support::results::ResultsWriter) under the
//!    [`RunDirs`](support::dirs::RunDirs) layout.
//!
//! The crate never installs a `tracing` subscriber; progress is reported through
//! `tracing` events for the host application to collect.

pub mod models;
pub mod support;
