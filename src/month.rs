//! Normalizes user supplied dates and month names into a two-digit month token.

use std::fmt::Display;

use time::{
    Date, Month, OffsetDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A calendar month used to filter products by their date of sale.
///
/// The year is ignored, so `2021-03-01` and `2022-03-31` share the token `"03"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthToken {
    month: Month,
}

impl MonthToken {
    /// Read a month from `input`.
    ///
    /// Accepts dates (`2022-03-15`), RFC 3339 date-times
    /// (`2022-03-15T10:00:00Z`), year-months (`2022-03`), month numbers (`3`,
    /// `03`) and English month names or their three-letter abbreviations
    /// (`March`, `mar`).
    ///
    /// # Errors
    /// Returns [Error::InvalidDateInput] if no month can be read from `input`.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();

        parse_date(trimmed)
            .map(|date| date.month())
            .or_else(|| parse_year_month(trimmed))
            .or_else(|| parse_month_number(trimmed))
            .or_else(|| parse_month_name(trimmed))
            .map(Self::from)
            .ok_or_else(|| Error::InvalidDateInput(input.to_owned()))
    }

    /// The two-digit month token, `"01"` to `"12"`.
    pub fn as_str(&self) -> &'static str {
        const TOKENS: [&str; 12] = [
            "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
        ];

        TOKENS[usize::from(u8::from(self.month)) - 1]
    }

    /// The calendar month.
    pub fn month(&self) -> Month {
        self.month
    }
}

impl From<Month> for MonthToken {
    fn from(month: Month) -> Self {
        Self { month }
    }
}

impl Display for MonthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a date of sale as stored in the product table.
///
/// Accepts RFC 3339 date-times and `YYYY-MM-DD` dates, optionally followed by
/// a time part. The date is taken literally, without converting the offset.
pub(crate) fn parse_date(text: &str) -> Option<Date> {
    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time.date());
    }

    let date_part = match text.get(10..11) {
        None if text.len() == 10 => text,
        Some("T") | Some(" ") => text.get(..10)?,
        _ => return None,
    };

    Date::parse(date_part, DATE_FORMAT).ok()
}

fn parse_year_month(text: &str) -> Option<Month> {
    if text.len() != 7 {
        return None;
    }

    Date::parse(&format!("{text}-01"), DATE_FORMAT)
        .ok()
        .map(|date| date.month())
}

fn parse_month_number(text: &str) -> Option<Month> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    text.parse::<u8>()
        .ok()
        .and_then(|number| Month::try_from(number).ok())
}

fn parse_month_name(text: &str) -> Option<Month> {
    let month = match text.to_lowercase().as_str() {
        "january" | "jan" => Month::January,
        "february" | "feb" => Month::February,
        "march" | "mar" => Month::March,
        "april" | "apr" => Month::April,
        "may" => Month::May,
        "june" | "jun" => Month::June,
        "july" | "jul" => Month::July,
        "august" | "aug" => Month::August,
        "september" | "sep" => Month::September,
        "october" | "oct" => Month::October,
        "november" | "nov" => Month::November,
        "december" | "dec" => Month::December,
        _ => return None,
    };

    Some(month)
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::Error;

    use super::{MonthToken, parse_date};

    #[track_caller]
    fn assert_token(input: &str, want: &str) {
        let got = MonthToken::parse(input)
            .unwrap_or_else(|error| panic!("could not parse {input:?}: {error}"));

        assert_eq!(got.as_str(), want, "wrong token for input {input:?}");
    }

    #[test]
    fn parses_dates() {
        assert_token("2022-03-15", "03");
        assert_token("2021-12-01", "12");
        assert_token(" 2022-01-31 ", "01");
    }

    #[test]
    fn parses_date_times() {
        assert_token("2021-11-27T20:29:54+05:30", "11");
        assert_token("2022-03-15T10:00:00Z", "03");
        assert_token("2022-07-04 12:00", "07");
    }

    #[test]
    fn parses_year_months() {
        assert_token("2022-03", "03");
        assert_token("1999-10", "10");
    }

    #[test]
    fn parses_month_numbers() {
        assert_token("3", "03");
        assert_token("03", "03");
        assert_token("12", "12");
    }

    #[test]
    fn parses_month_names() {
        assert_token("March", "03");
        assert_token("mar", "03");
        assert_token("SEPTEMBER", "09");
        assert_token("May", "05");
    }

    #[test]
    fn rejects_invalid_input() {
        for input in [
            "", "   ", "NaN", "0", "13", "2022-13-01", "2022-02-30", "2022-00", "Marchh", "-3",
            "003",
        ] {
            assert_eq!(
                MonthToken::parse(input),
                Err(Error::InvalidDateInput(input.to_owned())),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn exposes_calendar_month() {
        let token = MonthToken::parse("2022-08-01").unwrap();

        assert_eq!(token.month(), Month::August);
        assert_eq!(token.to_string(), "08");
    }

    #[test]
    fn parse_date_reads_the_literal_date() {
        assert_eq!(
            parse_date("2021-11-30T23:30:00-05:00"),
            Some(date!(2021 - 11 - 30))
        );
        assert_eq!(parse_date("2021-11-30"), Some(date!(2021 - 11 - 30)));
        assert_eq!(parse_date("2021-11-30x"), None);
        assert_eq!(parse_date("30/11/2021"), None);
        assert_eq!(parse_date(""), None);
    }
}
