#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod relocator;

pub use asset_paths::{Rewrite, RewriteRule};
pub use config::RelocatorSettings;
pub use error::{RelocateError, RelocateResult};
pub use models::{CopiedAsset, Relocation, RelocationReport, SoftFailure};
pub use relocator::AssetRelocator;
