//! Reference list of hidden dialer codes.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeCategory {
    Testing,
    Information,
    Advanced,
    System,
}

impl CodeCategory {
    pub fn label(self) -> &'static str {
        match self {
            CodeCategory::Testing => "Testing",
            CodeCategory::Information => "Information",
            CodeCategory::Advanced => "Advanced",
            CodeCategory::System => "System",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemCode {
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: CodeCategory,
}

const fn code(
    code: &'static str,
    title: &'static str,
    description: &'static str,
    category: CodeCategory,
) -> SystemCode {
    SystemCode {
        code,
        title,
        description,
        category,
    }
}

pub const CATALOG: &[SystemCode] = &[
    code("*#06#", "Find My IMEI", "Shows the unique serial number of the phone.", CodeCategory::Information),
    code("*#*#4636#*#*", "Testing Menu", "Battery, Wi-Fi and usage statistics.", CodeCategory::Testing),
    code("*#*#34971539#*#*", "Camera Check", "Detailed camera firmware information.", CodeCategory::Testing),
    code("*#*#1111#*#*", "Software Version", "Shows the installed software version.", CodeCategory::Information),
    code("*#*#232339#*#*", "WiFi Speed Test", "Runs a wireless network test.", CodeCategory::Testing),
    code("*#*#0842#*#*", "Vibration Test", "Checks the vibration motor and backlight.", CodeCategory::Testing),
    code("*#*#2664#*#*", "Screen Test", "Checks the touch screen.", CodeCategory::Testing),
    code("*#*#0*#*#*", "LCD Display Test", "Shows solid colours to find bad pixels.", CodeCategory::Testing),
    code("*#0*#", "Samsung Test Menu", "Full hardware check on Samsung phones.", CodeCategory::Testing),
    code("*#*#64663#*#*", "Xiaomi CIT Menu", "Hardware check on Xiaomi and Redmi phones.", CodeCategory::Testing),
    code("*#*#426#*#*", "Google Play Service", "Diagnostics for Google services.", CodeCategory::System),
    code("*#*#225#*#*", "Calendar Stats", "Number of events stored in the calendar.", CodeCategory::Information),
    code("*#*#759#*#*", "Debug Menu", "Advanced developer settings.", CodeCategory::Advanced),
];

/// Codes whose title contains `term` (case-insensitive) or whose dial string
/// contains it verbatim. An empty term matches everything.
pub fn search(term: &str) -> Vec<&'static SystemCode> {
    let term = term.trim();
    let lowered = term.to_lowercase();
    CATALOG
        .iter()
        .filter(|c| c.title.to_lowercase().contains(&lowered) || c.code.contains(term))
        .collect()
}
