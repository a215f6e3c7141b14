//! Record cleaner
//!
//! Per-field value normalization. Every rule is idempotent: cleaning an
//! already-cleaned record returns it unchanged.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};

use crate::models::{CanonicalField, CanonicalRecord};

/// Width of a cleaned postal code
pub const ZIP_WIDTH: usize = 5;

/// Output format for dates of birth
pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// Cleaned batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedBatch {
    pub records: Vec<CanonicalRecord>,
    /// Rows dropped for having no first name, last name, or email
    pub dropped_without_identity: usize,
}

/// Clean every record, dropping rows without any identity signal
pub fn clean_records(records: Vec<CanonicalRecord>) -> CleanedBatch {
    let mut batch = CleanedBatch::default();

    for record in records {
        let cleaned = clean_record(&record);
        if has_identity(&cleaned) {
            batch.records.push(cleaned);
        } else {
            batch.dropped_without_identity += 1;
        }
    }

    batch
}

/// A record identifies someone when it has a first name, last name, or email
pub fn has_identity(record: &CanonicalRecord) -> bool {
    [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Email,
    ]
    .into_iter()
    .any(|field| !record.get(field).is_empty())
}

/// Clean one record field by field
pub fn clean_record(record: &CanonicalRecord) -> CanonicalRecord {
    let mut cleaned = CanonicalRecord::default();
    for field in CanonicalField::ALL {
        cleaned.set(field, clean_value(field, record.get(field)));
    }
    cleaned
}

/// Clean a single value according to its field
pub fn clean_value(field: CanonicalField, raw: &str) -> String {
    let value = collapse_whitespace(raw);
    if value.is_empty() {
        return value;
    }

    match field {
        CanonicalField::FirstName | CanonicalField::LastName | CanonicalField::City => {
            title_case(&value)
        }
        CanonicalField::Email => value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase(),
        CanonicalField::Phone => digits_only(strip_float_suffix(&value)),
        CanonicalField::State => value.to_uppercase(),
        CanonicalField::ZipCode => clean_zip(&value),
        CanonicalField::Dob => clean_dob(&value),
        CanonicalField::AddressOne
        | CanonicalField::AddressTwo
        | CanonicalField::Organization
        | CanonicalField::Local => value,
    }
}

/// Trim and squeeze internal whitespace runs to one space
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalize the first letter of each word, lower-case the rest
///
/// Words break on spaces, hyphens and apostrophes, so "o'brien-smith"
/// becomes "O'Brien-Smith". Letters whose case mapping is not a single
/// character are left untouched.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut word_start = true;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            let mapped = if word_start {
                single_char(ch.to_uppercase())
            } else {
                single_char(ch.to_lowercase())
            };
            out.push(mapped.unwrap_or(ch));
            word_start = false;
        } else {
            out.push(ch);
            word_start = matches!(ch, ' ' | '-' | '\'');
        }
    }

    out
}

fn single_char(mut mapping: impl Iterator<Item = char>) -> Option<char> {
    let first = mapping.next()?;
    match mapping.next() {
        None => Some(first),
        Some(_) => None,
    }
}

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Drop a ".0" style fraction left behind by spreadsheet number cells
fn strip_float_suffix(value: &str) -> &str {
    match value.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty()
                && whole.chars().all(|c| c.is_ascii_digit())
                && !fraction.is_empty()
                && fraction.chars().all(|c| c == '0') =>
        {
            whole
        }
        _ => value,
    }
}

/// Normalize a US postal code to five digits
///
/// Short codes (leading zeros lost in a spreadsheet) are left-padded,
/// ZIP+4 keeps its first five digits, anything else is blanked.
fn clean_zip(value: &str) -> String {
    let digits = digits_only(strip_float_suffix(value));
    match digits.len() {
        1..=ZIP_WIDTH => format!("{:0>width$}", digits, width = ZIP_WIDTH),
        9 => digits[..ZIP_WIDTH].to_string(),
        _ => String::new(),
    }
}

const FOUR_DIGIT_YEAR_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const TWO_DIGIT_YEAR_FORMATS: [&str; 3] = ["%m/%d/%y", "%m-%d-%y", "%d-%b-%y"];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Earliest plausible year for a four-digit-year parse
const MIN_BIRTH_YEAR: i32 = 1800;

/// Render a date of birth as `YYYY-MM-DD`; unparseable values pass through
fn clean_dob(value: &str) -> String {
    parse_dob(value)
        .map(|date| date.format(DOB_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

fn parse_dob(value: &str) -> Option<NaiveDate> {
    let plausible = |date: &NaiveDate| date.year() >= MIN_BIRTH_YEAR;

    for format in FOUR_DIGIT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if plausible(&date) {
                return Some(date);
            }
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            if plausible(&datetime.date()) {
                return Some(datetime.date());
            }
        }
    }

    if value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()) {
        let year = value[0..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        let day = value[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).filter(plausible);
    }

    for format in TWO_DIGIT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(not_in_future(date));
        }
    }

    parse_spreadsheet_serial(value)
}

/// A birth date cannot be in the future: "01/02/30" means 1930
fn not_in_future(date: NaiveDate) -> NaiveDate {
    let today = Utc::now().date_naive();
    if date > today {
        date.checked_sub_months(Months::new(1200)).unwrap_or(date)
    } else {
        date
    }
}

/// Five-digit spreadsheet day serials (epoch 1899-12-30)
///
/// Four-digit numbers are left alone since they read as bare years.
fn parse_spreadsheet_serial(value: &str) -> Option<NaiveDate> {
    let digits = strip_float_suffix(value);
    if digits.len() != 5 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let days: i64 = digits.parse().ok()?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(days))?;
    (date <= Utc::now().date_naive()).then_some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[(CanonicalField, &str)]) -> CanonicalRecord {
        let mut record = CanonicalRecord::default();
        for (field, value) in values {
            record.set(*field, *value);
        }
        record
    }

    #[test]
    fn test_trims_and_collapses_whitespace() {
        assert_eq!(
            clean_value(CanonicalField::AddressOne, "  12   Main  St \t"),
            "12 Main St"
        );
        assert_eq!(clean_value(CanonicalField::Organization, "   "), "");
    }

    #[test]
    fn test_names_are_title_cased() {
        assert_eq!(clean_value(CanonicalField::FirstName, "  aNN  "), "Ann");
        assert_eq!(clean_value(CanonicalField::LastName, "o'brien-SMITH"), "O'Brien-Smith");
        assert_eq!(clean_value(CanonicalField::City, "NEW YORK"), "New York");
        assert_eq!(clean_value(CanonicalField::FirstName, "mary ann"), "Mary Ann");
    }

    #[test]
    fn test_email_is_lowercased_and_trimmed() {
        assert_eq!(
            clean_value(CanonicalField::Email, "  Ann.Lee@Example.ORG "),
            "ann.lee@example.org"
        );
        assert_eq!(clean_value(CanonicalField::Email, "ann @x.org"), "ann@x.org");
    }

    #[test]
    fn test_phone_keeps_digits_only() {
        assert_eq!(clean_value(CanonicalField::Phone, "(555) 123-4567"), "5551234567");
        assert_eq!(clean_value(CanonicalField::Phone, "+1 555.123.4567"), "15551234567");
        assert_eq!(clean_value(CanonicalField::Phone, "5551234567.0"), "5551234567");
        assert_eq!(clean_value(CanonicalField::Phone, "n/a"), "");
    }

    #[test]
    fn test_state_is_uppercased() {
        assert_eq!(clean_value(CanonicalField::State, " ma "), "MA");
    }

    #[test]
    fn test_zip_codes() {
        assert_eq!(clean_value(CanonicalField::ZipCode, "2134"), "02134");
        assert_eq!(clean_value(CanonicalField::ZipCode, "2134.0"), "02134");
        assert_eq!(clean_value(CanonicalField::ZipCode, "02134"), "02134");
        assert_eq!(clean_value(CanonicalField::ZipCode, "02134-1234"), "02134");
        assert_eq!(clean_value(CanonicalField::ZipCode, "1234567"), "");
        assert_eq!(clean_value(CanonicalField::ZipCode, "unknown"), "");
    }

    #[test]
    fn test_dob_formats_normalize_to_iso() {
        let cases = [
            ("1985-01-02", "1985-01-02"),
            ("1985/01/02", "1985-01-02"),
            ("01/02/1985", "1985-01-02"),
            ("1/2/1985", "1985-01-02"),
            ("01-02-1985", "1985-01-02"),
            ("02-Jan-1985", "1985-01-02"),
            ("Jan 2, 1985", "1985-01-02"),
            ("January 2, 1985", "1985-01-02"),
            ("1985-01-02 00:00:00", "1985-01-02"),
            ("19850102", "1985-01-02"),
            ("01/02/85", "1985-01-02"),
            ("31049", "1985-01-02"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_value(CanonicalField::Dob, input), expected, "input {}", input);
        }
    }

    #[test]
    fn test_two_digit_years_never_land_in_future() {
        let cleaned = clean_value(CanonicalField::Dob, "03/04/99");
        assert_eq!(cleaned, "1999-03-04");

        let today = Utc::now().date_naive();
        let next_year = (today.year() + 1) % 100;
        let input = format!("01/01/{:02}", next_year);
        let parsed = NaiveDate::parse_from_str(
            &clean_value(CanonicalField::Dob, &input),
            DOB_FORMAT,
        )
        .unwrap();
        assert!(parsed <= today);
    }

    #[test]
    fn test_unparseable_dob_passes_through_trimmed() {
        assert_eq!(clean_value(CanonicalField::Dob, "  unknown  "), "unknown");
        assert_eq!(clean_value(CanonicalField::Dob, "1985"), "1985");
    }

    #[test]
    fn test_rows_without_identity_are_dropped_and_counted() {
        let records = vec![
            record(&[(CanonicalField::FirstName, "ann")]),
            record(&[(CanonicalField::Phone, "555"), (CanonicalField::City, "boston")]),
            record(&[(CanonicalField::Email, " B@X.ORG ")]),
            record(&[(CanonicalField::LastName, "   ")]),
        ];

        let batch = clean_records(records);

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.dropped_without_identity, 2);
        assert_eq!(batch.records[0].get(CanonicalField::FirstName), "Ann");
        assert_eq!(batch.records[1].get(CanonicalField::Email), "b@x.org");
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let records = vec![
            record(&[
                (CanonicalField::FirstName, "  mARY-jane "),
                (CanonicalField::LastName, "o'NEIL"),
                (CanonicalField::Email, " MJ@Example.COM"),
                (CanonicalField::Phone, "(555) 010-9999"),
                (CanonicalField::AddressOne, " 1  Elm   St"),
                (CanonicalField::City, "sPRINGFIELD"),
                (CanonicalField::State, "il"),
                (CanonicalField::ZipCode, "627.0"),
                (CanonicalField::Organization, " Acme  Union "),
                (CanonicalField::Local, "Local 12"),
                (CanonicalField::Dob, "7/4/76"),
            ]),
            record(&[
                (CanonicalField::FirstName, "ßtraße"),
                (CanonicalField::Dob, "not a date"),
                (CanonicalField::ZipCode, "12345-6789"),
            ]),
            record(&[(CanonicalField::Email, "x@y.z"), (CanonicalField::Dob, "31048")]),
            record(&[(CanonicalField::Phone, "123")]),
        ];

        let once = clean_records(records);
        let twice = clean_records(once.records.clone());

        assert_eq!(twice.records, once.records);
        assert_eq!(twice.dropped_without_identity, 0);
    }
}
