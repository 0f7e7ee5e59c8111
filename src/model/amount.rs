//! Amount type for the monetary values found in the exported CSV.
//!
//! This module provides the `Amount` type which wraps `Decimal`. The CSV carries plain decimal
//! strings such as `45.50` or `-2000`, and the spreadsheet expects numbers, so an `Amount`
//! serializes as a JSON number rather than as text.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a monetary amount from the CSV export.
///
/// # Examples
///
/// ```
/// # use sesterce_sync::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("45.50").unwrap();
/// assert_eq!(amount.to_f64(), 45.5);
/// ```
///
/// Scientific notation is accepted:
/// ```
/// # use sesterce_sync::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1.5e3").unwrap();
/// assert_eq!(amount.to_f64(), 1500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// The value as a float, which is how the Sheets API receives numbers.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    source: Option<rust_decimal::Error>,
}

impl AmountError {
    fn new(input: &str, source: Option<rust_decimal::Error>) -> Self {
        Self {
            input: input.to_string(),
            source,
        }
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmountError")
            .field("input", &self.input)
            .field("source", &self.source)
            .finish()
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount '{}'", self.input)
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::new(s, None));
        }

        let value = match Decimal::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => Decimal::from_scientific(trimmed).map_err(|e| AmountError::new(s, Some(e)))?,
        };
        Ok(Amount::new(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}
