//! Test helpers shared across the workspace.
//!
//! - [`figment`]: run a closure inside a `figment::Jail` and read its
//!   directory as a UTF-8 path.
//! - [`text`]: normalise generated text for golden comparisons.
//! - [`fixtures`]: scene and settings documents used by several suites.

pub mod figment;
pub mod fixtures;
pub mod text;
