use crate::rules::{NamePatterns, Rule, DEFAULT_RISK_MARKERS, DEFAULT_RISK_SUFFIXES};

/// Names that look like executables or carry a threat marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RiskRule {
    patterns: NamePatterns,
}

impl Default for RiskRule {
    fn default() -> Self {
        Self::with_markers(DEFAULT_RISK_MARKERS)
    }
}

impl RiskRule {
    pub fn new(patterns: NamePatterns) -> Self {
        Self { patterns }
    }

    /// Executable suffixes stay fixed; only the marker list varies.
    pub fn with_markers<S: AsRef<str>>(markers: &[S]) -> Self {
        let suffixes: Vec<&str> = DEFAULT_RISK_SUFFIXES.to_vec();
        let markers: Vec<&str> = markers.iter().map(AsRef::as_ref).collect();
        Self {
            patterns: NamePatterns::new(&suffixes[..], &markers[..]),
        }
    }

    pub fn patterns(&self) -> &NamePatterns {
        &self.patterns
    }
}

impl Rule for RiskRule {
    fn name(&self) -> &'static str {
        "risk"
    }

    fn label(&self) -> &'static str {
        "Suspicious Files"
    }

    fn matches(&self, lowered: &str) -> bool {
        self.patterns.matches(lowered)
    }
}
