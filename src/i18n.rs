/// UI language. Only the labels the shell itself renders are translated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Sw,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Sw];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Sw => "sw",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        if code.eq_ignore_ascii_case("en") {
            Some(Language::En)
        } else if code.eq_ignore_ascii_case("sw") {
            Some(Language::Sw)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Sw => "Kiswahili",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Text {
    TabSecurity,
    TabLens,
    TabCodes,
    TabDevice,
    TabSettings,
    ChooseFolder,
    StartAudit,
    Cancel,
    DeleteSelected,
    FormatFolder,
    CheckUpdates,
    Premium,
    Unavailable,
}

pub fn tr(language: Language, text: Text) -> &'static str {
    use Text::*;
    match (language, text) {
        (Language::En, TabSecurity) => "Security",
        (Language::Sw, TabSecurity) => "Usalama",
        (Language::En, TabLens) => "AI Lens",
        (Language::Sw, TabLens) => "Lenzi ya AI",
        (Language::En, TabCodes) => "Codes",
        (Language::Sw, TabCodes) => "Namba za Siri",
        (Language::En, TabDevice) => "Device",
        (Language::Sw, TabDevice) => "Kifaa",
        (Language::En, TabSettings) => "Settings",
        (Language::Sw, TabSettings) => "Mipangilio",
        (Language::En, ChooseFolder) => "Choose Folder",
        (Language::Sw, ChooseFolder) => "Chagua Folda",
        (Language::En, StartAudit) => "Scan Folder",
        (Language::Sw, StartAudit) => "Kagua Folda",
        (Language::En, Cancel) => "Cancel",
        (Language::Sw, Cancel) => "Ghairi",
        (Language::En, DeleteSelected) => "Delete Selected",
        (Language::Sw, DeleteSelected) => "Futa Zilizochaguliwa",
        (Language::En, FormatFolder) => "Format Folder",
        (Language::Sw, FormatFolder) => "Safisha Folda Yote",
        (Language::En, CheckUpdates) => "Check for Updates",
        (Language::Sw, CheckUpdates) => "Angalia Masasisho",
        (Language::En, Premium) => "Premium",
        (Language::Sw, Premium) => "Malipo",
        (Language::En, Unavailable) => "unavailable",
        (Language::Sw, Unavailable) => "haipatikani",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_case_insensitively() {
        assert_eq!(Language::from_code("SW"), Some(Language::Sw));
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("de"), None);
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn languages_render_different_tab_labels() {
        assert_ne!(
            tr(Language::En, Text::TabSettings),
            tr(Language::Sw, Text::TabSettings)
        );
    }
}
