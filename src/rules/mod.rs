//! Filename classification table.
//!
//! Rules are data, not code: each one is a list of suffixes and substrings
//! matched against the lowercased leaf name. Junk and risk are evaluated
//! independently, so one file can be both.

mod junk;
mod risk;

pub use junk::JunkRule;
pub use risk::RiskRule;

pub const DEFAULT_JUNK_SUFFIXES: &[&str] = &[".tmp", ".log"];
pub const DEFAULT_JUNK_MARKERS: &[&str] = &["cache"];
pub const DEFAULT_RISK_SUFFIXES: &[&str] = &[".exe"];
pub const DEFAULT_RISK_MARKERS: &[&str] = &["malware", "payload", "trojan", "virus", "keylogger"];

/// The trait every classification rule implements.
pub trait Rule: Send + Sync {
    /// Machine-readable name (e.g. "junk").
    fn name(&self) -> &'static str;

    /// Human-readable label for display.
    fn label(&self) -> &'static str;

    /// `lowered` must already be lowercase.
    fn matches(&self, lowered: &str) -> bool;
}

/// Suffix and substring lists shared by every rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePatterns {
    suffixes: Vec<String>,
    markers: Vec<String>,
}

impl NamePatterns {
    pub fn new<S: AsRef<str>>(suffixes: &[S], markers: &[S]) -> Self {
        let lower = |items: &[S]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            suffixes: lower(suffixes),
            markers: lower(markers),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    fn matches(&self, lowered: &str) -> bool {
        self.suffixes.iter().any(|s| lowered.ends_with(s.as_str()))
            || self.markers.iter().any(|m| lowered.contains(m.as_str()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    pub junk: bool,
    pub risk: bool,
}

impl Verdict {
    pub fn is_clean(self) -> bool {
        !self.junk && !self.risk
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSet {
    junk: JunkRule,
    risk: RiskRule,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            junk: JunkRule::default(),
            risk: RiskRule::default(),
        }
    }
}

impl RuleSet {
    pub fn new(junk: JunkRule, risk: RiskRule) -> Self {
        Self { junk, risk }
    }

    /// Default junk rule with a custom risk marker list.
    pub fn with_risk_markers<S: AsRef<str>>(markers: &[S]) -> Self {
        Self {
            junk: JunkRule::default(),
            risk: RiskRule::with_markers(markers),
        }
    }

    pub fn classify(&self, file_name: &str) -> Verdict {
        let lowered = file_name.to_lowercase();
        Verdict {
            junk: self.junk.matches(&lowered),
            risk: self.risk.matches(&lowered),
        }
    }

    pub fn rules(&self) -> [&dyn Rule; 2] {
        [&self.junk, &self.risk]
    }
}
