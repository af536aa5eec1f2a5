//! Member identity value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the member value object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyId,
    IdNotNumeric,
    IdTooLong { max: usize },
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    DisplayNameInvalidCharacters,
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "member id must not be empty"),
            Self::IdNotNumeric => write!(f, "member id must contain only ASCII digits"),
            Self::IdTooLong { max } => write!(f, "member id must be at most {max} digits"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::DisplayNameInvalidCharacters => write!(
                f,
                "display name may only contain letters, numbers, spaces, hyphens, or apostrophes",
            ),
        }
    }
}

impl std::error::Error for MemberValidationError {}

/// Maximum allowed length for a member id.
pub const MEMBER_ID_MAX: usize = 32;

/// Externally assigned numeric member identifier.
///
/// Members key in their id on the kiosk pad, so the id is a digit string
/// rather than a number: leading zeros are significant and must survive
/// round-trips through storage and transport.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    /// Validate and construct a [`MemberId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, MemberValidationError> {
        if id.is_empty() {
            return Err(MemberValidationError::EmptyId);
        }
        if id.len() > MEMBER_ID_MAX {
            return Err(MemberValidationError::IdTooLong { max: MEMBER_ID_MAX });
        }
        if !id.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(MemberValidationError::IdNotNumeric);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for MemberId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<MemberId> for String {
    fn from(value: MemberId) -> Self {
        value.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable display name for a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, MemberValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, MemberValidationError> {
        if display_name.trim().is_empty() {
            return Err(MemberValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(MemberValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        let allowed = |ch: char| ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '\'' | '.');
        if !display_name.chars().all(allowed) {
            return Err(MemberValidationError::DisplayNameInvalidCharacters);
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
