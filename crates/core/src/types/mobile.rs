//! Mobile number type for the local numbering plan.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum MobileNumberError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input contains a non-digit character.
    #[error("mobile number must contain only digits")]
    NonDigit,
    /// The input does not start with the local mobile prefix.
    #[error("mobile number must start with 01")]
    InvalidPrefix,
    /// The input is not 9-11 digits long.
    #[error("mobile number must be {min}-{max} digits")]
    InvalidLength {
        /// Minimum number of digits.
        min: usize,
        /// Maximum number of digits.
        max: usize,
    },
    /// The carrier digit (third digit) is not allocated at this length.
    #[error("mobile number carrier digit is invalid")]
    InvalidCarrierDigit,
}

/// A validated local mobile number.
///
/// Accepts the shapes the local numbering plan allocates: the `01` prefix, a
/// carrier digit, then a 6-8 digit subscriber part. Equivalent to the
/// pattern `^(01)[0-46-9]*[0-9]{7,8}$` at 9-11 total digits: only an
/// 11-digit number constrains the carrier digit (no `015x` range exists).
///
/// ## Examples
///
/// ```
/// use phonebook_core::MobileNumber;
///
/// assert!(MobileNumber::parse("0121234511").is_ok());
/// assert!(MobileNumber::parse("011234567890").is_err()); // 12 digits
/// assert!(MobileNumber::parse("0212345678").is_err());   // wrong prefix
/// assert!(MobileNumber::parse("01512345678").is_err());  // no 015x range
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 9;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 11;

    /// Parse a `MobileNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Contains a non-digit character
    /// - Does not start with `01`
    /// - Is not 9-11 digits long
    /// - Is 11 digits with an unallocated carrier digit (`5`)
    pub fn parse(s: &str) -> Result<Self, MobileNumberError> {
        if s.is_empty() {
            return Err(MobileNumberError::Empty);
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MobileNumberError::NonDigit);
        }

        if !s.starts_with("01") {
            return Err(MobileNumberError::InvalidPrefix);
        }

        if s.len() < Self::MIN_DIGITS || s.len() > Self::MAX_DIGITS {
            return Err(MobileNumberError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        // An 11-digit number leaves 9 digits after the prefix; the subscriber
        // part covers at most 8 of them, so the carrier digit must be drawn
        // from the allocated [0-46-9] class.
        if s.len() == Self::MAX_DIGITS && s.as_bytes().get(2) == Some(&b'5') {
            return Err(MobileNumberError::InvalidCarrierDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the mobile number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `MobileNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MobileNumber {
    type Err = MobileNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for MobileNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for MobileNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for MobileNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for MobileNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
