use std::path::{Component, Path};

/// Determine whether an extracted filename may be joined onto the source and destination roots.
///
/// Empty names, absolute paths and names that climb out of the root with `..` are rejected so a
/// crafted upload URL can never read or overwrite files outside the configured directories.
pub fn is_safe_file_name(file_name: &str) -> bool {
    if file_name.is_empty() {
        return false;
    }

    Path::new(file_name)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        && Path::new(file_name)
            .components()
            .any(|component| matches!(component, Component::Normal(_)))
}
