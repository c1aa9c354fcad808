//! Display formatting for date-like values.
//!
//! # Responsibility
//! - Parse loosely typed date input (text, epoch millis, chrono values).
//! - Render locale-style or ISO strings for list and form views.
//!
//! # Invariants
//! - Formatting never fails loudly: bad input yields [`INVALID_DATE`], an
//!   unusable output request yields [`FORMAT_FAILURE`].
//! - Values are interpreted in UTC; date-only input means midnight UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Returned when the input cannot be read as a date.
pub const INVALID_DATE: &str = "Data Inválida!";
/// Returned when a parsed date cannot be rendered as requested.
pub const FORMAT_FAILURE: &str = "Erro na Formatação.";

/// Locale used when the caller passes an empty tag.
pub const DEFAULT_LOCALE: &str = "pt-BR";

static YMD_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid yyyy-MM-dd regex"));
static YMD_SLASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})/(\d{2})/(\d{2})$").expect("valid yyyy/MM/dd regex"));
static TWO_TWO_FOUR_SLASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("valid xx/xx/yyyy regex"));
static TWO_TWO_FOUR_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})-(\d{2})-(\d{4})$").expect("valid xx-xx-yyyy regex"));
static COMPACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("valid yyyyMMdd regex"));
static LOCALE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(?:-[A-Za-z0-9]{2,8})*$").expect("valid locale tag regex")
});

/// Date-like value accepted by the formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    Text(&'a str),
    EpochMillis(i64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

/// Explicit text layout for [`DateInput::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `yyyy-MM-dd`
    YearMonthDay,
    /// `dd/MM/yyyy`
    DaySlashMonthYear,
    /// `MM/dd/yyyy`
    MonthSlashDayYear,
    /// `yyyy/MM/dd`
    YearSlashMonthDay,
    /// `dd-MM-yyyy`
    DayDashMonthYear,
    /// `MM-dd-yyyy`
    MonthDashDayYear,
    /// `yyyyMMdd`
    Compact,
}

impl InputFormat {
    /// Formats tried, in order, when the caller gives none.
    pub const ALL: [Self; 7] = [
        Self::YearMonthDay,
        Self::DaySlashMonthYear,
        Self::MonthSlashDayYear,
        Self::YearSlashMonthDay,
        Self::DayDashMonthYear,
        Self::MonthDashDayYear,
        Self::Compact,
    ];

    pub fn pattern(self) -> &'static str {
        match self {
            Self::YearMonthDay => "yyyy-MM-dd",
            Self::DaySlashMonthYear => "dd/MM/yyyy",
            Self::MonthSlashDayYear => "MM/dd/yyyy",
            Self::YearSlashMonthDay => "yyyy/MM/dd",
            Self::DayDashMonthYear => "dd-MM-yyyy",
            Self::MonthDashDayYear => "MM-dd-yyyy",
            Self::Compact => "yyyyMMdd",
        }
    }

    /// Looks a format up by its pattern string.
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.pattern() == pattern)
    }

    fn parse(self, text: &str) -> Option<NaiveDate> {
        let (re, order): (&Regex, [usize; 3]) = match self {
            Self::YearMonthDay => (&*YMD_DASH_RE, [1, 2, 3]),
            Self::YearSlashMonthDay => (&*YMD_SLASH_RE, [1, 2, 3]),
            Self::Compact => (&*COMPACT_RE, [1, 2, 3]),
            Self::DaySlashMonthYear => (&*TWO_TWO_FOUR_SLASH_RE, [3, 2, 1]),
            Self::MonthSlashDayYear => (&*TWO_TWO_FOUR_SLASH_RE, [3, 1, 2]),
            Self::DayDashMonthYear => (&*TWO_TWO_FOUR_DASH_RE, [3, 2, 1]),
            Self::MonthDashDayYear => (&*TWO_TWO_FOUR_DASH_RE, [3, 1, 2]),
        };

        let captures = re.captures(text)?;
        let field = |group: usize| captures.get(group)?.as_str().parse::<u32>().ok();
        let year = i32::try_from(field(order[0])?).ok()?;
        NaiveDate::from_ymd_opt(year, field(order[1])?, field(order[2])?)
    }
}

/// ISO rendering style for [`format_iso_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsoStyle {
    /// `yyyy-MM-dd`
    Date,
    /// `yyyy-MM-ddTHH:mm:ss.SSSZ`
    #[default]
    DateTime,
    /// `yyyy-MM-dd HH:mm:ss`
    DateTimeLocal,
}

/// Formats `input` as a numeric day/month/year string for `locale`.
///
/// An empty `locale` means [`DEFAULT_LOCALE`]; a malformed tag yields
/// [`FORMAT_FAILURE`].
pub fn format_locale_date(
    input: Option<DateInput<'_>>,
    input_format: Option<InputFormat>,
    locale: &str,
) -> String {
    let Some(value) = resolve(input, input_format) else {
        debug!("event=date_format module=date_format status=invalid_input style=locale");
        return INVALID_DATE.to_string();
    };

    let locale = match locale.trim() {
        "" => DEFAULT_LOCALE,
        other => other,
    };
    match locale_pattern(locale) {
        Some(pattern) => value.format(pattern).to_string(),
        None => {
            debug!("event=date_format module=date_format status=error error_code=bad_locale");
            FORMAT_FAILURE.to_string()
        }
    }
}

/// Formats `input` in one of the ISO 8601 styles.
///
/// Years outside `0..=9999` cannot be written as four-digit ISO years and
/// yield [`FORMAT_FAILURE`].
pub fn format_iso_date(
    input: Option<DateInput<'_>>,
    input_format: Option<InputFormat>,
    style: IsoStyle,
) -> String {
    let Some(value) = resolve(input, input_format) else {
        return INVALID_DATE.to_string();
    };

    if !(0..=9999).contains(&value.year()) {
        return FORMAT_FAILURE.to_string();
    }

    let pattern = match style {
        IsoStyle::Date => "%Y-%m-%d",
        IsoStyle::DateTime => "%Y-%m-%dT%H:%M:%S%.3fZ",
        IsoStyle::DateTimeLocal => "%Y-%m-%d %H:%M:%S",
    };
    value.format(pattern).to_string()
}

fn resolve(
    input: Option<DateInput<'_>>,
    input_format: Option<InputFormat>,
) -> Option<NaiveDateTime> {
    match input? {
        DateInput::Text(text) => parse_text(text.trim(), input_format),
        DateInput::EpochMillis(millis) => Utc
            .timestamp_millis_opt(millis)
            .single()
            .map(|value| value.naive_utc()),
        DateInput::Date(date) => date.and_hms_opt(0, 0, 0),
        DateInput::DateTime(value) => Some(value.naive_utc()),
    }
}

fn parse_text(text: &str, input_format: Option<InputFormat>) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }

    let explicit;
    let candidates: &[InputFormat] = match input_format {
        Some(format) => {
            explicit = [format];
            &explicit
        }
        None => &InputFormat::ALL,
    };

    candidates
        .iter()
        .find_map(|format| format.parse(text))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .or_else(|| parse_timestamp(text))
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
}

fn locale_pattern(locale: &str) -> Option<&'static str> {
    if !LOCALE_TAG_RE.is_match(locale) {
        return None;
    }

    let normalized = locale.to_ascii_lowercase();
    let mut subtags = normalized.split('-');
    let language = subtags.next().unwrap_or_default();
    let region = subtags.next();

    let pattern = match (language, region) {
        ("pt", Some("br")) | ("en", Some("gb")) => "%d/%m/%Y",
        ("en", Some("us")) => "%m/%d/%Y",
        _ => "%Y-%m-%d",
    };
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::{
        format_iso_date, format_locale_date, DateInput, InputFormat, IsoStyle, FORMAT_FAILURE,
        INVALID_DATE,
    };
    use chrono::NaiveDate;

    #[test]
    fn formats_iso_text_for_default_locale() {
        let out = format_locale_date(Some(DateInput::Text("2020-01-31")), None, "");
        assert_eq!(out, "31/01/2020");

        let out = format_locale_date(Some(DateInput::Text("2020-01-31")), None, "en-US");
        assert_eq!(out, "01/31/2020");
    }

    #[test]
    fn default_format_list_prefers_day_first_for_ambiguous_slash_dates() {
        let out = format_iso_date(Some(DateInput::Text("03/04/2021")), None, IsoStyle::Date);
        assert_eq!(out, "2021-04-03");

        let out = format_iso_date(
            Some(DateInput::Text("03/04/2021")),
            Some(InputFormat::MonthSlashDayYear),
            IsoStyle::Date,
        );
        assert_eq!(out, "2021-03-04");
    }

    #[test]
    fn missing_or_unparseable_input_is_invalid() {
        assert_eq!(format_iso_date(None, None, IsoStyle::Date), INVALID_DATE);
        assert_eq!(
            format_iso_date(Some(DateInput::Text("  ")), None, IsoStyle::Date),
            INVALID_DATE
        );
        assert_eq!(
            format_locale_date(Some(DateInput::Text("31/02/2020")), None, "pt-BR"),
            INVALID_DATE
        );
        assert_eq!(
            format_locale_date(Some(DateInput::Text("yesterday")), None, "pt-BR"),
            INVALID_DATE
        );
    }

    #[test]
    fn renders_all_iso_styles() {
        let input = Some(DateInput::Text("2024-05-06T07:08:09.250Z"));
        assert_eq!(format_iso_date(input, None, IsoStyle::Date), "2024-05-06");
        assert_eq!(
            format_iso_date(input, None, IsoStyle::DateTimeLocal),
            "2024-05-06 07:08:09"
        );
        assert_eq!(
            format_iso_date(input, None, IsoStyle::DateTime),
            "2024-05-06T07:08:09.250Z"
        );
    }

    #[test]
    fn accepts_epoch_millis_and_chrono_values() {
        assert_eq!(
            format_iso_date(Some(DateInput::EpochMillis(0)), None, IsoStyle::DateTime),
            "1970-01-01T00:00:00.000Z"
        );
        let date = NaiveDate::from_ymd_opt(2022, 12, 25).unwrap();
        assert_eq!(
            format_locale_date(Some(DateInput::Date(date)), None, "en-GB"),
            "25/12/2022"
        );
    }

    #[test]
    fn other_well_formed_locales_fall_back_to_iso_date() {
        let date = Some(DateInput::Date(NaiveDate::from_ymd_opt(2022, 12, 25).unwrap()));
        assert_eq!(format_locale_date(date, None, "de-DE"), "2022-12-25");
        assert_eq!(
            format_locale_date(Some(DateInput::Text("20221225")), None, "ko"),
            "2022-12-25"
        );
        assert_eq!(
            format_locale_date(Some(DateInput::Text("2022-12-25")), None, "EN-us"),
            "12/25/2022"
        );
    }

    #[test]
    fn malformed_locale_or_out_of_range_year_is_a_format_failure() {
        let input = Some(DateInput::Text("2020-01-01"));
        assert_eq!(format_locale_date(input, None, "not a locale"), FORMAT_FAILURE);

        let far = Some(DateInput::Date(NaiveDate::from_ymd_opt(12000, 1, 1).unwrap()));
        assert_eq!(format_iso_date(far, None, IsoStyle::Date), FORMAT_FAILURE);
    }

    #[test]
    fn input_format_round_trips_through_pattern() {
        for format in InputFormat::ALL {
            assert_eq!(InputFormat::from_pattern(format.pattern()), Some(format));
        }
        assert_eq!(InputFormat::from_pattern("dd.MM.yyyy"), None);
    }
}
