//! Price-range and date cleaning for versioned listing datasets.

pub mod cleaner;
pub mod data;
pub mod error;
pub mod registry;

pub use cleaner::{CleanReport, CleanRequest, Cleaner};
pub use error::CleanError;
pub use registry::{ArtifactRegistry, ArtifactSpec, LocalRegistry};
