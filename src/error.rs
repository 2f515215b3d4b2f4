//! Fatal errors raised while loading, relocating or writing a configuration document.
//!
//! Recoverable problems (a missing upload, a single failed copy) are never surfaced through
//! this type; they are collected as [`crate::models::SoftFailure`] records instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type RelocateResult<T> = Result<T, RelocateError>;

/// Conditions that abort a relocation run before or while it touches the filesystem.
#[derive(Debug, Error)]
pub enum RelocateError {
  /// The input document could not be read from disk.
  #[error("config file not found at {}: {source}", .path.display())]
  ConfigNotFound {
    /// Path that was requested.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The input document exists but is not valid JSON.
  #[error("failed to parse config file {}: {source}", .path.display())]
  ConfigParse {
    /// Path that was parsed.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// The destination directory could not be created.
  #[error("destination directory {} is not writable: {source}", .path.display())]
  DestinationUnwritable {
    /// Destination directory.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The rewrite rule can never yield a filename.
  #[error("invalid rewrite rule: {0}")]
  InvalidRule(String),
  /// The settings file could not be read.
  #[error("failed to read settings {}: {source}", .path.display())]
  SettingsRead {
    /// Settings file path.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The settings file is not valid JSON or YAML.
  #[error("failed to parse settings {}: {reason}", .path.display())]
  SettingsParse {
    /// Settings file path.
    path: PathBuf,
    /// Parser message.
    reason: String,
  },
  /// The transformed document could not be written.
  #[error("failed to write {}: {source}", .path.display())]
  OutputUnwritable {
    /// Output path.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The transformed document could not be serialised.
  #[error("failed to render document: {0}")]
  Render(#[from] serde_json::Error),
}
