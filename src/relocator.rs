//! Asset relocation: rewrite upload references in a document and mirror the referenced files.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use same_file::is_same_file;
use serde_json::Value;

use crate::asset_paths::{RewriteRule, is_safe_file_name};
use crate::error::{RelocateError, RelocateResult};
use crate::models::{CopiedAsset, Relocation, RelocationReport, SoftFailure};

/// Walks configuration documents, rewriting upload references and copying the referenced files.
#[derive(Debug, Clone)]
pub struct AssetRelocator {
  source_dir: PathBuf,
  dest_dir: PathBuf,
  rule: RewriteRule,
  dry_run: bool,
}

impl AssetRelocator {
  /// Create a relocator copying from `source_dir` into `dest_dir`.
  pub fn new(
    source_dir: impl Into<PathBuf>,
    dest_dir: impl Into<PathBuf>,
    rule: RewriteRule,
  ) -> Self {
    Self {
      source_dir: source_dir.into(),
      dest_dir: dest_dir.into(),
      rule,
      dry_run: false,
    }
  }

  /// Skip every filesystem write while still rewriting and reporting.
  pub fn dry_run(mut self, enabled: bool) -> Self {
    self.dry_run = enabled;
    self
  }

  /// Directory the uploaded files are read from.
  pub fn source_dir(&self) -> &Path {
    &self.source_dir
  }

  /// Directory the relocated files are written to.
  pub fn dest_dir(&self) -> &Path {
    &self.dest_dir
  }

  /// Rule used to recognise and rewrite upload references.
  pub fn rule(&self) -> &RewriteRule {
    &self.rule
  }

  /// Rewrite every matching string in `tree` and copy the referenced assets.
  ///
  /// The destination directory is created up front; failing to do so is the only error this
  /// returns. Per-asset problems are recorded in the report and never stop the traversal.
  pub fn relocate(&self, tree: &Value) -> RelocateResult<Relocation> {
    if !self.dry_run {
      fs::create_dir_all(&self.dest_dir).map_err(|source| {
        RelocateError::DestinationUnwritable {
          path: self.dest_dir.clone(),
          source,
        }
      })?;
    }

    let mut report = RelocationReport::default();
    let tree = self.relocate_node(tree, &mut report);

    info!(
      "relocated {} asset(s) into {} with {} soft failure(s)",
      report.copied_count(),
      self.dest_dir.display(),
      report.failures.len()
    );

    Ok(Relocation { tree, report })
  }

  fn relocate_node(&self, node: &Value, report: &mut RelocationReport) -> Value {
    match node {
      Value::Object(map) => Value::Object(
        map
          .iter()
          .map(|(key, value)| (key.clone(), self.relocate_node(value, report)))
          .collect(),
      ),
      Value::Array(items) => Value::Array(
        items
          .iter()
          .map(|item| self.relocate_node(item, report))
          .collect(),
      ),
      Value::String(text) => match self.rule.rewrite(text) {
        Some(rewrite) => {
          self.relocate_asset(rewrite.file_name, report);
          Value::String(rewrite.path)
        }
        None => node.clone(),
      },
      Value::Null | Value::Bool(_) | Value::Number(_) => node.clone(),
    }
  }

  fn relocate_asset(&self, file_name: &str, report: &mut RelocationReport) {
    if !is_safe_file_name(file_name) {
      let failure = SoftFailure::UnsafeFileName {
        file_name: file_name.to_string(),
      };
      warn!("{failure}");
      report.failures.push(failure);
      return;
    }

    let source = self.source_dir.join(file_name);
    let destination = self.dest_dir.join(file_name);

    if !source.exists() {
      let failure = SoftFailure::AssetMissing {
        file_name: file_name.to_string(),
        source,
      };
      warn!("{failure}");
      report.failures.push(failure);
      return;
    }

    let installed = if !source.is_file() {
      Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "source is not a regular file",
      ))
    } else if self.dry_run {
      Ok(())
    } else {
      install_asset(&source, &destination)
    };

    if let Err(err) = installed {
      let failure = SoftFailure::CopyFailed {
        file_name: file_name.to_string(),
        source,
        destination,
        reason: err.to_string(),
      };
      warn!("{failure}");
      report.failures.push(failure);
      return;
    }

    if !self.dry_run {
      debug!("copied {} to {}", source.display(), destination.display());
    }

    report.copied.push(CopiedAsset {
      file_name: file_name.to_string(),
      source,
      destination,
    });
  }
}

/// Copy `source` over `destination`, keeping the source timestamps.
///
/// Existing destination files are removed first so read-only copies from an earlier run are
/// still overwritten. When both paths already point at the same file the copy is skipped, as
/// copying a file onto itself would truncate it.
fn install_asset(source: &Path, destination: &Path) -> io::Result<()> {
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)?;
  }

  if destination.exists() {
    if is_same_file(source, destination)? {
      return Ok(());
    }
    fs::remove_file(destination)?;
  }

  fs::copy(source, destination)?;
  preserve_timestamps(source, destination)
}

fn preserve_timestamps(source: &Path, destination: &Path) -> io::Result<()> {
  let metadata = fs::metadata(source)?;
  let mut times = FileTimes::new().set_modified(metadata.modified()?);
  if let Ok(accessed) = metadata.accessed() {
    times = times.set_accessed(accessed);
  }

  // the copy inherits the source permissions, which may be read-only
  let file = File::open(destination)?;
  file.set_times(times)
}
