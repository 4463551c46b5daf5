use crate::rules::{NamePatterns, Rule, DEFAULT_JUNK_MARKERS, DEFAULT_JUNK_SUFFIXES};

/// Cache and temp artifacts that are safe to remove.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JunkRule {
    patterns: NamePatterns,
}

impl Default for JunkRule {
    fn default() -> Self {
        Self {
            patterns: NamePatterns::new(DEFAULT_JUNK_SUFFIXES, DEFAULT_JUNK_MARKERS),
        }
    }
}

impl JunkRule {
    pub fn new(patterns: NamePatterns) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &NamePatterns {
        &self.patterns
    }
}

impl Rule for JunkRule {
    fn name(&self) -> &'static str {
        "junk"
    }

    fn label(&self) -> &'static str {
        "Junk Files"
    }

    fn matches(&self, lowered: &str) -> bool {
        self.patterns.matches(lowered)
    }
}
