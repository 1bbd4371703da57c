//! Validated primitive types shared across the MedPulse crates.
//!
//! Intake data arrives as free-form strings and JSON numbers; these wrappers
//! guarantee at the type level that a value has already passed validation, so
//! downstream code never re-checks.

/// Errors that can occur when creating a validated [`NonEmptyText`].
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating a validated [`Age`].
#[derive(Debug, thiserror::Error)]
pub enum AgeError {
    /// The value was outside the accepted 1..=120 range
    #[error("Age must be between 1 and 120")]
    OutOfRange,
}

/// A string guaranteed to hold at least one non-whitespace character.
///
/// Patient names and symptom descriptions are required fields; wrapping them
/// in this type means a blank value cannot survive past intake validation.
/// Input is trimmed of surrounding whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a `NonEmptyText` from the given input, trimming surrounding
    /// whitespace.
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` when the trimmed input is non-empty, or
    /// `Err(TextError::Empty)` when it is empty or whitespace only.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A patient age, guaranteed to lie in the clinically accepted 1..=120 range.
///
/// Construction takes an `i64` because JSON numbers can be negative or far
/// outside `u8` range; the stored value is a plain year count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Age(u8);

impl Age {
    /// Creates a new `Age` from the given number of years.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Age)` for values in 1..=120, or `Err(AgeError::OutOfRange)`
    /// otherwise.
    pub fn new(years: i64) -> Result<Self, AgeError> {
        if !(1..=120).contains(&years) {
            return Err(AgeError::OutOfRange);
        }
        Ok(Self(years as u8))
    }

    /// Returns the age in years.
    pub fn years(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Age {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Age {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let years = i64::deserialize(deserializer)?;
        Age::new(years).map_err(serde::de::Error::custom)
    }
}
