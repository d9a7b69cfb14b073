//! Biological vocabulary shared by the profile tools.

pub mod taxonomy;

pub use taxonomy::{resolve_level, LevelRequest, ResolvedLevel, TaxonomicLevel};
