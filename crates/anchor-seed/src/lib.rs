#![forbid(unsafe_code)]

//! Builds the ordered, de-duplicated seed list the engine processes:
//! manifest parsing, hotspot regex scanning, VCS-diff scanning, and
//! import/dependency lens assignment.

mod diff;
mod error;
mod hotspots;
mod lens;
mod manifest;
mod selector;

pub use diff::changed_paths;
pub use error::SeedError;
pub use hotspots::{scan as scan_hotspots, Category, Hotspot};
pub use lens::Lens;
pub use manifest::read_manifest;
pub use selector::{select_seeds, SeedEntry, SelectorConfig};
