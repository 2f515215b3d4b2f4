//! Settings loader describing where documents and assets live.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::asset_paths::{
    DEFAULT_MARKER, DEFAULT_PATTERN, DEFAULT_REPLACEMENT_PREFIX, RewriteRule,
};
use crate::error::{RelocateError, RelocateResult};
use crate::relocator::AssetRelocator;

/// Settings file names searched for by [`RelocatorSettings::discover`], in order.
pub const SETTINGS_FILE_NAMES: [&str; 3] = [
    "relocator.config.json",
    "relocator.config.yaml",
    "relocator.config.yml",
];

/// Discoverable settings describing the input document, asset directories and rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelocatorSettings {
    /// JSON document whose upload references should be relocated.
    pub config_path: PathBuf,
    /// Directory holding the uploaded files.
    pub source_dir: PathBuf,
    /// Directory the referenced files are copied into.
    pub dest_dir: PathBuf,
    /// Substring identifying upload references.
    pub pattern: String,
    /// Marker the filename follows inside a reference.
    pub marker: String,
    /// Prefix of the rewritten public path.
    pub replacement_prefix: String,
}

impl Default for RelocatorSettings {
    fn default() -> Self {
        Self {
            config_path: "data/config.json".into(),
            source_dir: "uploads".into(),
            dest_dir: "public/defaults".into(),
            pattern: DEFAULT_PATTERN.into(),
            marker: DEFAULT_MARKER.into(),
            replacement_prefix: DEFAULT_REPLACEMENT_PREFIX.into(),
        }
    }
}

impl RelocatorSettings {
    /// Look for a settings file in `dir`, falling back to defaults when none exists.
    ///
    /// Relative paths inside a discovered file are resolved against `dir`. A settings file that
    /// exists but cannot be parsed is reported instead of being silently ignored.
    pub fn discover(dir: &Path) -> RelocateResult<Self> {
        for name in SETTINGS_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(Self::from_path(&candidate)?.resolve_paths(dir));
            }
        }
        Ok(Self::default())
    }

    /// Read settings from a JSON or YAML file, chosen by extension.
    pub fn from_path(path: &Path) -> RelocateResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| RelocateError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |reason: String| RelocateError::SettingsParse {
            path: path.to_path_buf(),
            reason,
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            _ => serde_json::from_str(&content).map_err(|err| parse_error(err.to_string())),
        }
    }

    /// Anchor relative directory settings at `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        self.config_path = anchor(base, self.config_path);
        self.source_dir = anchor(base, self.source_dir);
        self.dest_dir = anchor(base, self.dest_dir);
        self
    }

    /// Build the rewrite rule described by these settings.
    pub fn rule(&self) -> RelocateResult<RewriteRule> {
        RewriteRule::new(
            self.pattern.clone(),
            self.marker.clone(),
            self.replacement_prefix.clone(),
        )
    }

    /// Build a relocator for these settings.
    pub fn relocator(&self) -> RelocateResult<AssetRelocator> {
        Ok(AssetRelocator::new(
            &self.source_dir,
            &self.dest_dir,
            self.rule()?,
        ))
    }
}

fn anchor(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discovers_defaults_when_no_file_exists() {
        let temp = tempdir().unwrap();
        let settings = RelocatorSettings::discover(temp.path()).unwrap();
        assert_eq!(settings, RelocatorSettings::default());
    }

    #[test]
    fn discovers_json_settings_and_anchors_paths() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("relocator.config.json"),
            r#"{ "sourceDir": "manager/backend/uploads", "replacementPrefix": "/static/" }"#,
        )
        .unwrap();

        let settings = RelocatorSettings::discover(temp.path()).unwrap();
        assert_eq!(settings.source_dir, temp.path().join("manager/backend/uploads"));
        assert_eq!(settings.dest_dir, temp.path().join("public/defaults"));
        assert_eq!(settings.replacement_prefix, "/static/");
        assert_eq!(settings.pattern, DEFAULT_PATTERN);
    }

    #[test]
    fn reads_yaml_settings() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("relocator.config.yaml");
        fs::write(
            &path,
            "pattern: \"cdn.local/media/\"\nmarker: \"/media/\"\ndestDir: /srv/site/media\n",
        )
        .unwrap();

        let settings = RelocatorSettings::from_path(&path).unwrap();
        assert_eq!(settings.pattern, "cdn.local/media/");
        assert_eq!(settings.marker, "/media/");
        assert_eq!(settings.dest_dir, PathBuf::from("/srv/site/media"));
        assert!(settings.rule().is_ok());
    }

    #[test]
    fn malformed_settings_are_reported() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("relocator.config.json"), "{ nope").unwrap();
        assert!(matches!(
            RelocatorSettings::discover(temp.path()),
            Err(RelocateError::SettingsParse { .. })
        ));
    }

    #[test]
    fn absolute_paths_are_not_re_anchored() {
        let settings = RelocatorSettings {
            dest_dir: PathBuf::from("/srv/defaults"),
            ..RelocatorSettings::default()
        }
        .resolve_paths(Path::new("/work"));
        assert_eq!(settings.dest_dir, PathBuf::from("/srv/defaults"));
        assert_eq!(settings.source_dir, PathBuf::from("/work/uploads"));
    }

    #[test]
    fn inconsistent_rule_is_rejected() {
        let settings = RelocatorSettings {
            marker: "/files/".into(),
            ..RelocatorSettings::default()
        };
        assert!(matches!(settings.rule(), Err(RelocateError::InvalidRule(_))));
    }
}
