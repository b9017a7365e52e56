//! Form language variants.

#[cfg(feature = "config")]
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Language variant of a form and of its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FormLanguage {
    /// English field names.
    English,
    /// Hebrew field names.
    Hebrew,
}

impl FormLanguage {
    /// All supported form languages.
    pub const ALL: [FormLanguage; 2] = [FormLanguage::English, FormLanguage::Hebrew];

    /// Detects the dominant script of OCR text.
    ///
    /// Counts Hebrew letters against Latin letters; ties (including text with
    /// no letters at all) resolve to English.
    pub fn detect(text: &str) -> Self {
        let (hebrew, latin) = text.chars().fold((0usize, 0usize), |(h, l), c| {
            if is_hebrew_letter(c) {
                (h + 1, l)
            } else if c.is_alphabetic() && is_latin(c) {
                (h, l + 1)
            } else {
                (h, l)
            }
        });

        if hebrew > latin {
            Self::Hebrew
        } else {
            Self::English
        }
    }
}

/// Language requested by the caller of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LanguageSelector {
    /// Use the English schema.
    English,
    /// Use the Hebrew schema.
    Hebrew,
    /// Detect the language from the OCR text.
    #[default]
    Auto,
}

impl LanguageSelector {
    /// Returns the explicitly requested language, if any.
    pub fn explicit(&self) -> Option<FormLanguage> {
        match self {
            Self::English => Some(FormLanguage::English),
            Self::Hebrew => Some(FormLanguage::Hebrew),
            Self::Auto => None,
        }
    }
}

impl From<FormLanguage> for LanguageSelector {
    fn from(language: FormLanguage) -> Self {
        match language {
            FormLanguage::English => Self::English,
            FormLanguage::Hebrew => Self::Hebrew,
        }
    }
}

/// Hebrew letters and the niqqud/cantillation marks that decorate them.
fn is_hebrew_letter(c: char) -> bool {
    ('\u{05D0}'..='\u{05EA}').contains(&c) || ('\u{0591}'..='\u{05C7}').contains(&c)
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_detect_hebrew_majority() {
        let text = "שם משפחה: כהן\nשם פרטי: דנה\nID 123456789";
        assert_eq!(FormLanguage::detect(text), FormLanguage::Hebrew);
    }

    #[test]
    fn test_detect_english_majority() {
        let text = "Last name: Cohen\nFirst name: Dana\nשם";
        assert_eq!(FormLanguage::detect(text), FormLanguage::English);
    }

    #[test]
    fn test_detect_tie_is_english() {
        assert_eq!(FormLanguage::detect("123 456"), FormLanguage::English);
        assert_eq!(FormLanguage::detect(""), FormLanguage::English);
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(<LanguageSelector as FromStr>::from_str("AUTO").unwrap(), LanguageSelector::Auto);
        assert_eq!(
            <LanguageSelector as FromStr>::from_str("hebrew").unwrap().explicit(),
            Some(FormLanguage::Hebrew)
        );
        assert_eq!(LanguageSelector::Auto.explicit(), None);
    }
}
