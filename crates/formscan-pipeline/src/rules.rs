//! Format rules shared by the interpreter's corrections and the validator.

use std::sync::LazyLock;

use jiff::civil::Date;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Day, month and year in any order, separated by `/`, `.`, `-` or spaces.
static DATE_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})[./\-\s]+(\d{1,2})[./\-\s]+(\d{1,4})$").expect("static regex")
});

/// A valid phone number shape: digits starting with `prefix`, `length` long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonePattern {
    /// Required leading digits.
    pub prefix: String,
    /// Total number of digits.
    pub length: usize,
}

impl PhonePattern {
    /// Creates a new pattern.
    pub fn new(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length,
        }
    }

    /// Returns true if `digits` is all ASCII digits and has this shape.
    pub fn matches(&self, digits: &str) -> bool {
        digits.len() == self.length
            && digits.starts_with(&self.prefix)
            && digits.bytes().all(|b| b.is_ascii_digit())
    }
}

/// A known OCR misread of a phone prefix, e.g. a leading `0` read as `8`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneCorrection {
    /// Misread prefix.
    pub from: String,
    /// Intended prefix.
    pub to: String,
}

impl PhoneCorrection {
    /// Creates a new correction rule.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Rewrites the prefix of `value`, if it starts with the misread prefix.
    pub fn apply(&self, value: &str) -> Option<String> {
        value
            .strip_prefix(self.from.as_str())
            .map(|rest| format!("{}{}", self.to, rest))
    }
}

/// Format rules for identity numbers and phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatRules {
    /// Accepted identity-number lengths.
    pub id_lengths: Vec<usize>,
    /// Accepted phone number shapes.
    pub phone_patterns: Vec<PhonePattern>,
    /// Phone prefix misreads to repair.
    pub phone_corrections: Vec<PhoneCorrection>,
}

impl Default for FormatRules {
    fn default() -> Self {
        let mut phone_patterns = vec![PhonePattern::new("05", 10), PhonePattern::new("07", 10)];
        phone_patterns.extend(
            ["02", "03", "04", "08", "09"]
                .into_iter()
                .map(|prefix| PhonePattern::new(prefix, 9)),
        );

        Self {
            id_lengths: vec![9, 10],
            phone_patterns,
            phone_corrections: vec![PhoneCorrection::new("8", "0")],
        }
    }
}

impl FormatRules {
    /// Checks that every rule is usable.
    pub fn validate(&self) -> Result<()> {
        if self.id_lengths.is_empty() {
            return Err(Error::config("rules.id_lengths must not be empty"));
        }
        if self.phone_patterns.is_empty() {
            return Err(Error::config("rules.phone_patterns must not be empty"));
        }

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        for pattern in &self.phone_patterns {
            if !all_digits(&pattern.prefix) || pattern.prefix.len() > pattern.length {
                return Err(Error::config(format!(
                    "invalid phone pattern '{}' of length {}",
                    pattern.prefix, pattern.length
                )));
            }
        }
        for correction in &self.phone_corrections {
            if !all_digits(&correction.from) || !all_digits(&correction.to) {
                return Err(Error::config(format!(
                    "invalid phone correction '{}' -> '{}'",
                    correction.from, correction.to
                )));
            }
        }

        Ok(())
    }

    /// Returns true if `value` is an identity number of an accepted length.
    pub fn is_valid_id(&self, value: &str) -> bool {
        value.bytes().all(|b| b.is_ascii_digit()) && self.id_lengths.contains(&value.len())
    }

    /// Returns true if `value` matches any accepted phone shape.
    pub fn is_valid_phone(&self, value: &str) -> bool {
        self.phone_patterns.iter().any(|p| p.matches(value))
    }

    /// Repairs a misread phone prefix.
    ///
    /// A rule applies only when `value` matches no phone pattern and the
    /// rewritten value does, so applying this to its own output is a no-op.
    pub fn correct_phone(&self, value: &str) -> Option<(String, &PhoneCorrection)> {
        if self.is_valid_phone(value) {
            return None;
        }

        self.phone_corrections.iter().find_map(|rule| {
            rule.apply(value)
                .filter(|corrected| self.is_valid_phone(corrected))
                .map(|corrected| (corrected, rule))
        })
    }
}

/// Maps Arabic-Indic, extended Arabic-Indic and full-width digits to ASCII.
pub fn normalize_digits(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            let offset = match c {
                '\u{0660}'..='\u{0669}' => Some(c as u32 - 0x0660),
                '\u{06F0}'..='\u{06F9}' => Some(c as u32 - 0x06F0),
                '\u{FF10}'..='\u{FF19}' => Some(c as u32 - 0xFF10),
                _ => None,
            };
            offset
                .and_then(|d| char::from_digit(d, 10))
                .unwrap_or(c)
        })
        .collect()
}

/// Collapses whitespace runs into single spaces and trims.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes the separators people and OCR put inside numbers.
pub fn strip_number_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '/' | '(' | ')'))
        .collect()
}

/// Rewrites a date with `/` separators and zero-padded day and month.
///
/// Year-first dates become ISO `YYYY-MM-DD`; anything that does not look
/// like a three-part numeric date is returned unchanged.
pub fn normalize_date(value: &str) -> String {
    let Some(caps) = DATE_PARTS.captures(value.trim()) else {
        return value.to_owned();
    };
    let (a, b, c) = (&caps[1], &caps[2], &caps[3]);

    if a.len() == 4 && c.len() <= 2 {
        format!("{}-{:0>2}-{:0>2}", a, b, c)
    } else if a.len() <= 2 {
        format!("{:0>2}/{:0>2}/{}", a, b, c)
    } else {
        value.to_owned()
    }
}

/// Parses a date written day/month/year, month/day/year or year-month-day.
///
/// Day-first is preferred over month-first when both give a real date.
pub fn parse_date(value: &str) -> Option<Date> {
    let caps = DATE_PARTS.captures(value.trim())?;
    let (a, b, c) = (&caps[1], &caps[2], &caps[3]);

    if a.len() == 4 {
        return civil_date(a, b, c);
    }
    if c.len() != 4 {
        return None;
    }

    civil_date(c, b, a).or_else(|| civil_date(c, a, b))
}

fn civil_date(year: &str, month: &str, day: &str) -> Option<Date> {
    let year = year.parse::<i16>().ok()?;
    let month = month.parse::<i8>().ok()?;
    let day = day.parse::<i8>().ok()?;
    Date::new(year, month, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phone_patterns() {
        let rules = FormatRules::default();
        assert!(rules.is_valid_phone("0501234567"));
        assert!(rules.is_valid_phone("0771234567"));
        assert!(rules.is_valid_phone("026543210"));
        assert!(!rules.is_valid_phone("8501234567"));
        assert!(!rules.is_valid_phone("050123456"));
        assert!(!rules.is_valid_phone("05012345a7"));
    }

    #[test]
    fn test_phone_correction_example() {
        let rules = FormatRules::default();
        let (corrected, rule) = rules.correct_phone("8501234567").unwrap();
        assert_eq!(corrected, "0501234567");
        assert_eq!(rule, &PhoneCorrection::new("8", "0"));
    }

    #[test]
    fn test_phone_correction_is_idempotent() {
        let rules = FormatRules::default();
        for input in ["8501234567", "0501234567", "85012345", "12345", "823456789"] {
            let once = rules
                .correct_phone(input)
                .map_or_else(|| input.to_owned(), |(c, _)| c);
            let twice = rules.correct_phone(&once).map_or(once.clone(), |(c, _)| c);
            assert_eq!(once, twice, "input {input}");
        }
    }

    #[test]
    fn test_correction_requires_valid_result() {
        let rules = FormatRules::default();
        assert!(rules.correct_phone("85012345").is_none());
        assert!(rules.correct_phone("0501234567").is_none());
    }

    #[test]
    fn test_id_lengths() {
        let rules = FormatRules::default();
        assert!(rules.is_valid_id("123456782"));
        assert!(rules.is_valid_id("1234567820"));
        assert!(!rules.is_valid_id("12345678"));
        assert!(!rules.is_valid_id("12345678a"));
    }

    #[test]
    fn test_normalize_digits() {
        assert_eq!(normalize_digits("٠٥٠١٢"), "05012");
        assert_eq!(normalize_digits("۰۵"), "05");
        assert_eq!(normalize_digits("０５0"), "050");
        assert_eq!(normalize_digits("abc 12"), "abc 12");
    }

    #[test]
    fn test_separators_and_whitespace() {
        assert_eq!(strip_number_separators("050-123 45.67"), "0501234567");
        assert_eq!(strip_number_separators("(02) 654/3210"), "026543210");
        assert_eq!(collapse_whitespace("  Tel   Aviv \n Yafo "), "Tel Aviv Yafo");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2.3.1985"), "02/03/1985");
        assert_eq!(normalize_date("02-03-1985"), "02/03/1985");
        assert_eq!(normalize_date("1985-3-2"), "1985-03-02");
        assert_eq!(normalize_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_parse_date_orders() {
        assert_eq!(parse_date("02/03/1985"), Some(Date::constant(1985, 3, 2)));
        assert_eq!(parse_date("12/31/2023"), Some(Date::constant(2023, 12, 31)));
        assert_eq!(parse_date("2023-12-31"), Some(Date::constant(2023, 12, 31)));
        assert_eq!(parse_date("31/02/2023"), None);
        assert_eq!(parse_date("02/03/85"), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_validate_rules() {
        assert!(FormatRules::default().validate().is_ok());

        let mut rules = FormatRules::default();
        rules.phone_corrections.push(PhoneCorrection::new("", "0"));
        assert!(rules.validate().is_err());

        let rules = FormatRules {
            id_lengths: vec![],
            ..FormatRules::default()
        };
        assert!(rules.validate().is_err());
    }
}
