use crate::error::{RelocateError, RelocateResult};

/// Substring identifying upload URLs served by the local manager backend.
pub const DEFAULT_PATTERN: &str = "localhost:3002/uploads/";
/// Marker preceding the uploaded filename.
pub const DEFAULT_MARKER: &str = "/uploads/";
/// Public path prefix the relocated assets are served from.
pub const DEFAULT_REPLACEMENT_PREFIX: &str = "/defaults/";

/// Rule describing which string values are upload references and how to rewrite them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pattern: String,
    marker: String,
    replacement_prefix: String,
}

/// Outcome of applying a [`RewriteRule`] to a matching value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite<'a> {
    /// Filename extracted after the last marker occurrence.
    pub file_name: &'a str,
    /// Rewritten public path.
    pub path: String,
}

impl Default for RewriteRule {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.into(),
            marker: DEFAULT_MARKER.into(),
            replacement_prefix: DEFAULT_REPLACEMENT_PREFIX.into(),
        }
    }
}

impl RewriteRule {
    /// Build a rule from its parts.
    ///
    /// The pattern must be non-empty and contain the marker, otherwise a matching value could
    /// have no filename to extract.
    pub fn new(
        pattern: impl Into<String>,
        marker: impl Into<String>,
        replacement_prefix: impl Into<String>,
    ) -> RelocateResult<Self> {
        let pattern = pattern.into();
        let marker = marker.into();
        if pattern.is_empty() {
            return Err(RelocateError::InvalidRule("pattern must not be empty".into()));
        }
        if marker.is_empty() {
            return Err(RelocateError::InvalidRule("marker must not be empty".into()));
        }
        if !pattern.contains(&marker) {
            return Err(RelocateError::InvalidRule(format!(
                "pattern `{pattern}` does not contain marker `{marker}`"
            )));
        }

        Ok(Self {
            pattern,
            marker,
            replacement_prefix: replacement_prefix.into(),
        })
    }

    /// Recognised substring.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Marker the filename follows.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Prefix prepended to the extracted filename.
    pub fn replacement_prefix(&self) -> &str {
        &self.replacement_prefix
    }

    /// Returns `true` when the value references an upload.
    pub fn matches(&self, value: &str) -> bool {
        value.contains(&self.pattern)
    }

    /// Extract the filename from a matching value.
    pub fn file_name<'a>(&self, value: &'a str) -> Option<&'a str> {
        if !self.matches(value) {
            return None;
        }
        value
            .rsplit_once(self.marker.as_str())
            .map(|(_, file_name)| file_name)
    }

    /// Rewrite a matching value into its public asset path.
    pub fn rewrite<'a>(&self, value: &'a str) -> Option<Rewrite<'a>> {
        let file_name = self.file_name(value)?;
        Some(Rewrite {
            file_name,
            path: format!("{}{}", self.replacement_prefix, file_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_upload_urls_with_default_rule() {
        let rule = RewriteRule::default();
        let rewrite = rule
            .rewrite("http://localhost:3002/uploads/logo.png")
            .expect("should match");
        assert_eq!(rewrite.file_name, "logo.png");
        assert_eq!(rewrite.path, "/defaults/logo.png");
    }

    #[test]
    fn leaves_other_strings_alone() {
        let rule = RewriteRule::default();
        assert!(rule.rewrite("https://cdn.example.com/uploads/logo.png").is_none());
        assert!(rule.rewrite("/defaults/logo.png").is_none());
        assert!(rule.rewrite("").is_none());
    }

    #[test]
    fn uses_last_marker_occurrence() {
        let rule = RewriteRule::default();
        let rewrite = rule
            .rewrite("http://localhost:3002/uploads/nested/uploads/banner.webp")
            .expect("should match");
        assert_eq!(rewrite.file_name, "banner.webp");
        assert_eq!(rewrite.path, "/defaults/banner.webp");
    }

    #[test]
    fn keeps_subdirectories_after_marker() {
        let rule = RewriteRule::default();
        let rewrite = rule
            .rewrite("http://localhost:3002/uploads/icons/x.png")
            .expect("should match");
        assert_eq!(rewrite.file_name, "icons/x.png");
        assert_eq!(rewrite.path, "/defaults/icons/x.png");
    }

    #[test]
    fn custom_prefix_is_concatenated_verbatim() {
        let rule = RewriteRule::new("cdn.local/media/", "/media/", "assets/").unwrap();
        let rewrite = rule.rewrite("https://cdn.local/media/hero.jpg").unwrap();
        assert_eq!(rewrite.path, "assets/hero.jpg");
    }

    #[test]
    fn rejects_rules_without_marker_in_pattern() {
        assert!(matches!(
            RewriteRule::new("localhost:3002/files/", "/uploads/", "/defaults/"),
            Err(RelocateError::InvalidRule(_))
        ));
        assert!(RewriteRule::new("", "/uploads/", "/defaults/").is_err());
        assert!(RewriteRule::new("localhost:3002/uploads/", "", "/defaults/").is_err());
    }
}
