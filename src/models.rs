//! Data structures produced while relocating the assets of a configuration document.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

/// Transformed document together with the side effects recorded while producing it.
#[derive(Debug, Clone)]
pub struct Relocation {
  /// Document with every matching upload reference rewritten.
  pub tree: Value,
  /// Copies performed and soft failures encountered, in traversal order.
  pub report: RelocationReport,
}

/// Asset copied (or, in a dry run, planned to be copied) into the destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedAsset {
  /// Filename extracted from the upload reference.
  pub file_name: String,
  /// Source file the bytes were read from.
  pub source: PathBuf,
  /// Destination file that now holds the asset.
  pub destination: PathBuf,
}

/// Recoverable problem recorded while relocating a single asset.
///
/// The rewritten path is still emitted for every failure kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoftFailure {
  /// The referenced file does not exist in the source directory.
  AssetMissing {
    /// Filename extracted from the upload reference.
    file_name: String,
    /// Source path that was probed.
    source: PathBuf,
  },
  /// The source file exists but copying it failed.
  CopyFailed {
    /// Filename extracted from the upload reference.
    file_name: String,
    /// Source file.
    source: PathBuf,
    /// Destination file.
    destination: PathBuf,
    /// Underlying I/O error message.
    reason: String,
  },
  /// The extracted filename would escape the configured directories.
  UnsafeFileName {
    /// Filename extracted from the upload reference.
    file_name: String,
  },
}

impl SoftFailure {
  /// Filename the failure refers to.
  pub fn file_name(&self) -> &str {
    match self {
      Self::AssetMissing { file_name, .. }
      | Self::CopyFailed { file_name, .. }
      | Self::UnsafeFileName { file_name } => file_name,
    }
  }
}

impl fmt::Display for SoftFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AssetMissing { source, .. } => {
        write!(f, "file not found {}", source.display())
      }
      Self::CopyFailed {
        source,
        destination,
        reason,
        ..
      } => write!(
        f,
        "failed to copy {} to {}: {}",
        source.display(),
        destination.display(),
        reason
      ),
      Self::UnsafeFileName { file_name } => {
        write!(f, "refusing to copy unsafe file name `{file_name}`")
      }
    }
  }
}

/// Side effects of a relocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelocationReport {
  /// Assets copied into the destination directory.
  pub copied: Vec<CopiedAsset>,
  /// Recoverable failures, one per offending reference.
  pub failures: Vec<SoftFailure>,
}

impl RelocationReport {
  /// Number of copies performed.
  pub fn copied_count(&self) -> usize {
    self.copied.len()
  }

  /// Returns `true` when any reference could not be relocated.
  pub fn has_soft_failures(&self) -> bool {
    !self.failures.is_empty()
  }

  /// Source paths of every asset that was referenced but missing.
  pub fn missing_assets(&self) -> Vec<&PathBuf> {
    self
      .failures
      .iter()
      .filter_map(|failure| match failure {
        SoftFailure::AssetMissing { source, .. } => Some(source),
        _ => None,
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn missing(name: &str) -> SoftFailure {
    SoftFailure::AssetMissing {
      file_name: name.into(),
      source: PathBuf::from("uploads").join(name),
    }
  }

  #[test]
  fn missing_assets_ignores_other_failures() {
    let report = RelocationReport {
      copied: Vec::new(),
      failures: vec![
        missing("a.png"),
        SoftFailure::UnsafeFileName {
          file_name: "../b.png".into(),
        },
        missing("c.png"),
      ],
    };

    assert!(report.has_soft_failures());
    assert_eq!(report.missing_assets(), vec![
      &PathBuf::from("uploads/a.png"),
      &PathBuf::from("uploads/c.png"),
    ]);
  }

  #[test]
  fn empty_report_has_no_failures() {
    let report = RelocationReport::default();
    assert!(!report.has_soft_failures());
    assert_eq!(report.copied_count(), 0);
  }

  #[test]
  fn failures_serialise_with_kind_tag() {
    let json = serde_json::to_value(missing("logo.png")).unwrap();
    assert_eq!(json["kind"], "asset_missing");
    assert_eq!(json["file_name"], "logo.png");
  }

  #[test]
  fn display_names_the_probed_source() {
    let failure = missing("logo.png");
    assert_eq!(failure.file_name(), "logo.png");
    assert!(failure.to_string().contains("logo.png"));
  }
}
