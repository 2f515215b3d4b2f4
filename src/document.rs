//! Reading configuration documents and rendering the relocated result.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{RelocateError, RelocateResult};

/// Line printed before a framed document.
pub const FRAME_START: &str = "__JSON_START__";
/// Line printed after a framed document.
pub const FRAME_END: &str = "__JSON_END__";

/// Load a JSON document fully into memory.
pub fn load_document(path: &Path) -> RelocateResult<Value> {
  let content = fs::read_to_string(path).map_err(|source| RelocateError::ConfigNotFound {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| RelocateError::ConfigParse {
    path: path.to_path_buf(),
    source,
  })
}

/// Render a document as two-space indented JSON.
///
/// Non-ASCII text is emitted as-is. When `framed` is set the output is wrapped in
/// [`FRAME_START`] and [`FRAME_END`] lines so it can be cut out of surrounding log output.
pub fn render_document(tree: &Value, framed: bool) -> RelocateResult<String> {
  let body = serde_json::to_string_pretty(tree)?;
  if framed {
    Ok(format!("{FRAME_START}\n{body}\n{FRAME_END}\n"))
  } else {
    Ok(format!("{body}\n"))
  }
}

/// Write a document to disk, creating parent directories as needed.
pub fn write_document(path: &Path, tree: &Value) -> RelocateResult<()> {
  let rendered = render_document(tree, false)?;
  let output_error = |source| RelocateError::OutputUnwritable {
    path: path.to_path_buf(),
    source,
  };

  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(output_error)?;
  }
  fs::write(path, rendered).map_err(output_error)
}
