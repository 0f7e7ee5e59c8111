use std::error::Error;
use std::fmt::{Display, Formatter};

/// The only date layout the export produces, e.g. `20240115`.
const EXPORT_DATE_LEN: usize = 8;

/// Returned when a date in the export is not in `yyyymmdd` form.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DateFormatError {
    input: String,
}

impl DateFormatError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for DateFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid date format '{}'. Expected 'yyyymmdd'.",
            self.input
        )
    }
}

impl Error for DateFormatError {}

/// Rearranges a `yyyymmdd` date into `dd/mm/yyyy`.
///
/// Only the length is checked. The characters are sliced at fixed offsets and are not validated
/// as a calendar date.
pub(crate) fn format_date(date: &str) -> Result<String, DateFormatError> {
    let chars: Vec<char> = date.chars().collect();
    if chars.len() != EXPORT_DATE_LEN {
        return Err(DateFormatError {
            input: date.to_string(),
        });
    }
    let part = |range: std::ops::Range<usize>| chars[range].iter().collect::<String>();
    Ok(format!("{}/{}/{}", part(6..8), part(4..6), part(0..4)))
}
