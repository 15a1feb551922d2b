//! Field Value Types
//!
//! Callers pack multi-valued scalars into a single string with two
//! out-of-band separators: `a|b|c` is an enumeration and `low..high` is an
//! interval. `FieldValue` is the typed view of such a string.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Separates the members of an enumeration
pub const ENUMERATION_SEPARATOR: &str = "|";

/// Separates the bounds of an interval
pub const INTERVAL_SEPARATOR: &str = "..";

/// A scalar, an enumeration of scalars, or a closed interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<T> {
    Scalar(T),
    Enumeration(Vec<T>),
    Interval { low: T, high: T },
}

impl<T> FieldValue<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    /// Interpret `raw`. The enumeration separator takes precedence, so
    /// `1..2|3` is a two-member enumeration whose first member fails to
    /// parse as a number.
    pub fn parse(raw: &str) -> Result<Self> {
        let element = |part: &str| {
            part.trim().parse::<T>().map_err(|e| Error::Value {
                raw: raw.to_string(),
                reason: format!("{part:?}: {e}"),
            })
        };

        if raw.contains(ENUMERATION_SEPARATOR) {
            let members = raw
                .split(ENUMERATION_SEPARATOR)
                .map(element)
                .collect::<Result<Vec<_>>>()?;
            return Ok(FieldValue::Enumeration(members));
        }

        if let Some((low, high)) = raw.split_once(INTERVAL_SEPARATOR) {
            if high.contains(INTERVAL_SEPARATOR) {
                return Err(Error::Value {
                    raw: raw.to_string(),
                    reason: "interval has more than two bounds".to_string(),
                });
            }
            return Ok(FieldValue::Interval {
                low: element(low)?,
                high: element(high)?,
            });
        }

        element(raw).map(FieldValue::Scalar)
    }
}

impl<T> FieldValue<T> {
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldValue::Scalar(_))
    }

    /// Every scalar mentioned by the value, in written order
    pub fn members(&self) -> Vec<&T> {
        match self {
            FieldValue::Scalar(v) => vec![v],
            FieldValue::Enumeration(vs) => vs.iter().collect(),
            FieldValue::Interval { low, high } => vec![low, high],
        }
    }
}

impl<T: PartialOrd> FieldValue<T> {
    /// Whether `candidate` equals the scalar, is one of the enumerated
    /// members, or lies within the interval bounds (inclusive)
    pub fn admits(&self, candidate: &T) -> bool {
        match self {
            FieldValue::Scalar(v) => v == candidate,
            FieldValue::Enumeration(vs) => vs.iter().any(|v| v == candidate),
            FieldValue::Interval { low, high } => low <= candidate && candidate <= high,
        }
    }
}

impl<T: fmt::Display> fmt::Display for FieldValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(v) => write!(f, "{v}"),
            FieldValue::Enumeration(vs) => {
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(ENUMERATION_SEPARATOR)?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            FieldValue::Interval { low, high } => write!(f, "{low}{INTERVAL_SEPARATOR}{high}"),
        }
    }
}

impl<T> FromStr for FieldValue<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
