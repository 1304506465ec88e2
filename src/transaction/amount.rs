//! Validated, fixed precision money amounts.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use crate::Error;

/// The number of digits kept after the decimal point.
pub const DECIMAL_PLACES: u32 = 2;
/// The maximum number of digits allowed before the decimal point.
pub const MAX_WHOLE_DIGITS: usize = 8;

/// A non-negative amount of money with exactly two decimal places.
///
/// Amounts are stored in the database as text, e.g. "12.50", so that no
/// precision is lost to floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount from `value`.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `value` is negative, has more than
    /// two decimal places or more than eight digits before the decimal point.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidAmount(
                "Ensure this value is greater than or equal to 0.".to_owned(),
            ));
        }

        if value.scale() > DECIMAL_PLACES {
            return Err(Error::InvalidAmount(format!(
                "Ensure that there are no more than {DECIMAL_PLACES} decimal places."
            )));
        }

        if count_whole_digits(value) > MAX_WHOLE_DIGITS {
            return Err(Error::InvalidAmount(format!(
                "Ensure that there are no more than {MAX_WHOLE_DIGITS} digits before the decimal point."
            )));
        }

        let mut value = value.abs();
        value.rescale(DECIMAL_PLACES);

        Ok(Self(value))
    }

    /// The amount as a decimal number.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

fn count_whole_digits(value: Decimal) -> usize {
    let whole = value.trunc().abs();

    if whole.is_zero() {
        0
    } else {
        whole.normalize().to_string().len()
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parse an amount entered by a user, e.g. "12.5".
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `s` is empty, not a number, or fails
    /// the checks in [Amount::new].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(Error::InvalidAmount("This field is required.".to_owned()));
        }

        let value =
            Decimal::from_str(s).map_err(|_| Error::InvalidAmount("Enter a number.".to_owned()))?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        let decimal =
            Decimal::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))?;

        Amount::new(decimal).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
