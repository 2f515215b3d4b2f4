//! Helpers for recognising upload URLs and turning them into static asset paths.
//!
//! The rewrite itself is pure string work and lives in [`rule`]; the checks that decide whether
//! an extracted filename may be touched on disk live in [`filters`]. Both are shared by the
//! relocator and by callers that only need the rewritten paths.

mod filters;
mod rule;

pub use filters::is_safe_file_name;
pub use rule::{
    DEFAULT_MARKER, DEFAULT_PATTERN, DEFAULT_REPLACEMENT_PREFIX, Rewrite, RewriteRule,
};
