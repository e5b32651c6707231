//! User-related DTOs for API requests and responses.

use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::utils::{DOB_FORMAT, validate_dob};

// ============================================================================
// Request DTOs
// ============================================================================

/// Body of create and update requests.
///
/// Missing and `null` fields deserialize as empty strings so they are
/// reported by validation rather than as a malformed body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 3, message = "must be at least 3 characters long"))]
    pub name: String,

    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_dob"))]
    pub dob: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl UserPayload {
    /// Split into the name and the parsed birth date.
    ///
    /// Call after `validate()`; a dob that still fails to parse is reported
    /// as a validation error.
    pub fn into_parts(self) -> AppResult<(String, Date)> {
        let dob = Date::strptime(DOB_FORMAT, &self.dob)
            .map_err(|_| AppError::validation("dob: must be a valid calendar date"))?;
        Ok((self.name, dob))
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Derived age of a user.
///
/// Create responses never compute it; read, list and update responses do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Age {
    #[default]
    NotComputed,
    Computed(i32),
}

impl Age {
    /// Omitted from JSON when not computed or zero
    pub fn is_omitted(&self) -> bool {
        matches!(self, Age::NotComputed | Age::Computed(0))
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Age::Computed(years) => serializer.serialize_i32(*years),
            Age::NotComputed => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    /// `YYYY-MM-DD`
    pub dob: String,
    #[serde(skip_serializing_if = "Age::is_omitted")]
    pub age: Age,
}

impl UserResponse {
    pub fn from_user(user: User, age: Age) -> Self {
        Self {
            id: user.id,
            dob: user.dob().strftime(DOB_FORMAT).to_string(),
            name: user.name,
            age,
        }
    }
}
