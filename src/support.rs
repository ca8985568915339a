//! Supporting utilities used by models and model runs.
//!
//! These modules have no dependency on templates or model dispatch and can be
//! used on their own.

pub mod dirs;
pub mod frame;
pub mod naics;
pub mod results;
pub mod summary;
