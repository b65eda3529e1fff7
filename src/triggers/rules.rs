//! Line classification rules
//!
//! A rule decides whether a single log line counts as an error. Matching is
//! plain substring search on the normalized line; no regex, no field parsing.

/// Trait for rules that classify individual log lines
pub trait LineRule: Send + Sync {
    /// Whether the line counts toward the error window
    fn matches(&self, line: &str) -> bool;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;
}

/// Normalize a raw line for matching and display: trim, then upper-case
pub fn normalize_line(line: &str) -> String {
    line.trim().to_uppercase()
}

/// Rule that matches lines containing any of a fixed set of markers
///
/// Markers are normalized the same way as lines, so matching is
/// case-insensitive. With the default markers a line is an error if it
/// contains `ERROR` or `500` anywhere, including inside longer tokens
/// such as `5000` or `ERRORS`.
#[derive(Debug, Clone)]
pub struct ErrorSignatureRule {
    /// Normalized markers, any of which marks a line as an error
    markers: Vec<String>,
}

impl ErrorSignatureRule {
    /// Create a rule from custom markers
    ///
    /// Blank markers are dropped since they would match every line.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| normalize_line(m.as_ref()))
            .filter(|m| !m.is_empty())
            .collect();
        Self { markers }
    }

    /// Create the default rule: `ERROR` or `500`
    pub fn with_defaults() -> Self {
        Self::new(["ERROR", "500"])
    }

    /// Normalized markers this rule looks for
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Match an already normalized line
    pub fn matches_normalized(&self, normalized: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| normalized.contains(marker.as_str()))
    }
}

impl Default for ErrorSignatureRule {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LineRule for ErrorSignatureRule {
    fn matches(&self, line: &str) -> bool {
        self.matches_normalized(&normalize_line(line))
    }

    fn name(&self) -> &str {
        "ErrorSignatureRule"
    }
}
