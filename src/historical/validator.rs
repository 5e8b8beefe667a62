use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Canonical textual form of a historical date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of a `YYYY-MM-DD` string
const DATE_LEN: usize = 10;

/// Why a candidate date string was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The string does not have the `YYYY-MM-DD` shape
    Pattern,
    /// The shape is right but the day does not exist (e.g. 2021-02-30)
    Calendar,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatErrorKind::Pattern => write!(f, "expected YYYY-MM-DD"),
            FormatErrorKind::Calendar => write!(f, "not a real calendar date"),
        }
    }
}

/// A date string that could not be turned into a [`HistoricalDate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date '{value}': {kind}")]
pub struct FormatError {
    pub value: String,
    pub kind: FormatErrorKind,
}

impl FormatError {
    fn new(value: &str, kind: FormatErrorKind) -> Self {
        FormatError {
            value: value.to_string(),
            kind,
        }
    }
}

/// A validated, day-granular point in time for which historical data is requested.
///
/// Always derived from a string matching `YYYY-MM-DD` that names a real calendar day,
/// so formatting it with [`fmt::Display`] reproduces the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HistoricalDate(NaiveDate);

impl HistoricalDate {
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for HistoricalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for HistoricalDate {
    type Err = FormatError;

    /// Parse strictly: four-digit year, two-digit month and day, dashes in between.
    ///
    /// chrono's `%Y-%m-%d` alone accepts unpadded fields and signed years, so the
    /// shape is checked byte by byte before the calendar check.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == DATE_LEN
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shape_ok {
            return Err(FormatError::new(s, FormatErrorKind::Pattern));
        }

        // Shape is verified, so these slices are ASCII digits
        let year: i32 = s[0..4]
            .parse()
            .map_err(|_| FormatError::new(s, FormatErrorKind::Pattern))?;
        let month: u32 = s[5..7]
            .parse()
            .map_err(|_| FormatError::new(s, FormatErrorKind::Pattern))?;
        let day: u32 = s[8..10]
            .parse()
            .map_err(|_| FormatError::new(s, FormatErrorKind::Pattern))?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(HistoricalDate)
            .ok_or_else(|| FormatError::new(s, FormatErrorKind::Calendar))
    }
}

impl From<HistoricalDate> for NaiveDate {
    fn from(date: HistoricalDate) -> Self {
        date.0
    }
}

/// Validate the resolved candidate string.
///
/// `None` means no historical date was requested and succeeds with `Ok(None)`
/// (use latest data). A present string must parse as a [`HistoricalDate`].
pub fn validate(candidate: Option<&str>) -> Result<Option<HistoricalDate>, FormatError> {
    match candidate {
        None => Ok(None),
        Some(value) => value.parse::<HistoricalDate>().map(Some),
    }
}
