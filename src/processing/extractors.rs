// Field extraction for Aadhaar-style identity cards.
// Each field is recovered by an ordered list of pure rules; the first rule
// that yields a value wins. Rules never fail, a field is simply absent.

use crate::models::{ExtractedIdentity, Gender};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Twelve digits, optionally grouped 4-4-4 by single spaces. Not anchored,
    // so a longer digit run still yields its first twelve digits.
    static ref ID_NUMBER_PATTERN: Regex = Regex::new(r"[0-9]{4}\s?[0-9]{4}\s?[0-9]{4}").unwrap();
    static ref ID_LINE_PATTERN: Regex = Regex::new(r"^[0-9]{4}\s?[0-9]{4}\s?[0-9]{4}$").unwrap();
    static ref DOB_PATTERN: Regex = Regex::new(r"[0-9]{2}[/-][0-9]{2}[/-][0-9]{4}").unwrap();
    static ref GENDER_PATTERN: Regex = Regex::new(r"\b(?:Male|Female|MALE|FEMALE|M|F)\b").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Words that mark a line as a label or card header rather than a name.
const NAME_STOP_WORDS: [&str; 5] = ["male", "female", "dob", "birth", "government"];

/// OCR text prepared for the field rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    /// The text exactly as the OCR provider returned it.
    pub original: String,
    /// Trimmed, non-empty lines in reading order.
    pub lines: Vec<String>,
    /// All whitespace runs, newlines included, collapsed to one space.
    pub flattened: String,
}

impl TextLayout {
    pub fn new(raw: &str) -> Self {
        let lines = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let flattened = WHITESPACE_RUN.replace_all(raw, " ").trim().to_string();

        TextLayout {
            original: raw.to_string(),
            lines,
            flattened,
        }
    }
}

pub type FieldRule<T> = fn(&TextLayout) -> Option<T>;

/// First twelve-digit number in the flattened text, spaces removed.
pub fn id_number_rule(layout: &TextLayout) -> Option<String> {
    ID_NUMBER_PATTERN
        .find(&layout.flattened)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
}

/// First line that is not the ID number, holds no digit and no label word.
pub fn name_rule(layout: &TextLayout) -> Option<String> {
    layout
        .lines
        .iter()
        .find(|line| {
            if ID_LINE_PATTERN.is_match(line) || line.chars().any(|c| c.is_ascii_digit()) {
                return false;
            }
            let lower = line.to_lowercase();
            !NAME_STOP_WORDS.iter().any(|word| lower.contains(word))
        })
        .cloned()
}

/// First `DD/MM/YYYY` or `DD-MM-YYYY` date, kept verbatim.
pub fn date_of_birth_rule(layout: &TextLayout) -> Option<String> {
    DOB_PATTERN
        .find(&layout.flattened)
        .map(|m| m.as_str().to_string())
}

/// First gender token in the original text. Anything containing an `f` is
/// female, every other token male.
pub fn gender_rule(layout: &TextLayout) -> Option<Gender> {
    GENDER_PATTERN.find(&layout.original).map(|m| {
        if m.as_str().to_lowercase().contains('f') {
            Gender::Female
        } else {
            Gender::Male
        }
    })
}

fn first_match<T>(rules: &[FieldRule<T>], layout: &TextLayout) -> Option<T> {
    rules.iter().find_map(|rule| rule(layout))
}

/// Runs the rule chains for every identity field.
#[derive(Clone)]
pub struct IdentityExtractor {
    id_number_rules: Vec<FieldRule<String>>,
    name_rules: Vec<FieldRule<String>>,
    date_of_birth_rules: Vec<FieldRule<String>>,
    gender_rules: Vec<FieldRule<Gender>>,
}

impl Default for IdentityExtractor {
    fn default() -> Self {
        IdentityExtractor {
            id_number_rules: vec![id_number_rule],
            name_rules: vec![name_rule],
            date_of_birth_rules: vec![date_of_birth_rule],
            gender_rules: vec![gender_rule],
        }
    }
}

impl IdentityExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fallback rule, tried after the existing ones.
    pub fn with_id_number_rule(mut self, rule: FieldRule<String>) -> Self {
        self.id_number_rules.push(rule);
        self
    }

    pub fn with_name_rule(mut self, rule: FieldRule<String>) -> Self {
        self.name_rules.push(rule);
        self
    }

    pub fn with_date_of_birth_rule(mut self, rule: FieldRule<String>) -> Self {
        self.date_of_birth_rules.push(rule);
        self
    }

    pub fn with_gender_rule(mut self, rule: FieldRule<Gender>) -> Self {
        self.gender_rules.push(rule);
        self
    }

    pub fn extract(&self, raw_text: &str) -> ExtractedIdentity {
        let layout = TextLayout::new(raw_text);

        let identity = ExtractedIdentity {
            id_number: first_match(&self.id_number_rules, &layout),
            name: first_match(&self.name_rules, &layout),
            date_of_birth: first_match(&self.date_of_birth_rules, &layout),
            gender: first_match(&self.gender_rules, &layout),
        };

        log::debug!(
            "Extracted fields: id={} name={} dob={} gender={}",
            identity.id_number.is_some(),
            identity.name.is_some(),
            identity.date_of_birth.is_some(),
            identity.gender.is_some()
        );
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(text: &str) -> TextLayout {
        TextLayout::new(text)
    }

    #[test]
    fn test_layout_lines_and_flattening() {
        let l = layout("  GOVERNMENT OF INDIA \r\n\n RAHUL   SHARMA\n\t1234 5678\n9012  ");
        assert_eq!(l.lines, vec!["GOVERNMENT OF INDIA", "RAHUL   SHARMA", "1234 5678", "9012"]);
        assert_eq!(l.flattened, "GOVERNMENT OF INDIA RAHUL SHARMA 1234 5678 9012");
    }

    #[test]
    fn test_id_number_grouped_or_not() {
        assert_eq!(id_number_rule(&layout("Aadhaar 1234 5678 9012")).as_deref(), Some("123456789012"));
        assert_eq!(id_number_rule(&layout("123456789012")).as_deref(), Some("123456789012"));
        assert_eq!(id_number_rule(&layout("1234 56789012")).as_deref(), Some("123456789012"));
        assert_eq!(id_number_rule(&layout("no number here")), None);
    }

    #[test]
    fn test_id_number_across_line_break() {
        assert_eq!(id_number_rule(&layout("1234 5678\n9012")).as_deref(), Some("123456789012"));
    }

    #[test]
    fn test_id_number_inside_longer_digit_run() {
        assert_eq!(id_number_rule(&layout("1234567890123")).as_deref(), Some("123456789012"));
    }

    #[test]
    fn test_id_number_rejects_short_groups() {
        assert_eq!(id_number_rule(&layout("1234 5678 901")), None);
        assert_eq!(id_number_rule(&layout("1234  5678 9012x")).as_deref(), Some("123456789012"));
    }

    #[test]
    fn test_name_skips_lines_with_digits() {
        let l = layout("John123\nPRIYA PATEL");
        assert_eq!(name_rule(&l).as_deref(), Some("PRIYA PATEL"));
    }

    #[test]
    fn test_name_skips_label_lines() {
        let l = layout("GOVERNMENT OF INDIA\nDate of Birth\ndob\nFemale\nAMIT KUMAR");
        assert_eq!(name_rule(&l).as_deref(), Some("AMIT KUMAR"));
        assert_eq!(name_rule(&layout("Government of India\nMALE")), None);
    }

    #[test]
    fn test_name_first_candidate_wins() {
        let l = layout("भारत सरकार\nRAHUL SHARMA");
        assert_eq!(name_rule(&l).as_deref(), Some("भारत सरकार"));
    }

    #[test]
    fn test_date_of_birth_verbatim() {
        assert_eq!(date_of_birth_rule(&layout("DOB: 15-08-1990")).as_deref(), Some("15-08-1990"));
        assert_eq!(date_of_birth_rule(&layout("DOB: 01/01/1990")).as_deref(), Some("01/01/1990"));
        assert_eq!(date_of_birth_rule(&layout("DOB: 31/02-1990")).as_deref(), Some("31/02-1990"));
        assert_eq!(date_of_birth_rule(&layout("Year of Birth: 1990")), None);
    }

    #[test]
    fn test_gender_tokens() {
        assert_eq!(gender_rule(&layout("Sex: F")), Some(Gender::Female));
        assert_eq!(gender_rule(&layout("FEMALE")), Some(Gender::Female));
        assert_eq!(gender_rule(&layout("MALE")), Some(Gender::Male));
        assert_eq!(gender_rule(&layout("पुरुष / Male")), Some(Gender::Male));
        assert_eq!(gender_rule(&layout("Gender: M")), Some(Gender::Male));
        assert_eq!(gender_rule(&layout("no gender here")), None);
    }

    #[test]
    fn test_gender_first_token_wins() {
        assert_eq!(gender_rule(&layout("M\nFemale")), Some(Gender::Male));
    }

    #[test]
    fn test_extract_full_card() {
        let identity = IdentityExtractor::new().extract(
            "GOVERNMENT OF INDIA\nRAHUL SHARMA\n1234 5678 9012\nDOB: 01/01/1990\nMale",
        );
        assert_eq!(
            identity,
            ExtractedIdentity {
                id_number: Some("123456789012".to_string()),
                name: Some("RAHUL SHARMA".to_string()),
                date_of_birth: Some("01/01/1990".to_string()),
                gender: Some(Gender::Male),
            }
        );
    }

    #[test]
    fn test_extract_never_fails_on_noise() {
        let identity = IdentityExtractor::new().extract("");
        assert_eq!(identity, ExtractedIdentity::default());

        let identity = IdentityExtractor::new().extract("@@ ## \n\n\t ~~");
        assert_eq!(identity.id_number, None);
        assert_eq!(identity.name.as_deref(), Some("@@ ##"));
    }

    #[test]
    fn test_fallback_rule_runs_after_default() {
        fn labelled_year(layout: &TextLayout) -> Option<String> {
            layout
                .flattened
                .split("Year of Birth: ")
                .nth(1)
                .map(|rest| rest.chars().take(4).collect())
        }

        let extractor = IdentityExtractor::new().with_date_of_birth_rule(labelled_year);
        let identity = extractor.extract("Year of Birth: 1990");
        assert_eq!(identity.date_of_birth.as_deref(), Some("1990"));

        let identity = extractor.extract("DOB: 02/03/1991 Year of Birth: 1990");
        assert_eq!(identity.date_of_birth.as_deref(), Some("02/03/1991"));
    }
}
