//! Domain primitives for profile lookups.
//!
//! Usernames are the only external identity of a cached profile, so they are
//! wrapped in a newtype that can only be built through normalization.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

fn username_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9._]{1,30}$").expect("Invalid regex"))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username cannot be empty")]
    Empty,

    #[error("Invalid username '{0}': use up to 30 letters, numbers, periods or underscores")]
    Invalid(String),
}

/// A lowercase-normalized Instagram handle.
///
/// # Examples
///
/// ```rust
/// use glimpse::domain::Username;
///
/// let name = Username::parse("  @Alex.Doe ").unwrap();
/// assert_eq!(name.as_str(), "alex.doe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    /// Trims whitespace, strips a leading `@`, lowercases and validates.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }

        let normalized = trimmed.to_lowercase();
        if !username_pattern().is_match(&normalized) {
            return Err(UsernameError::Invalid(trimmed.to_string()));
        }

        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Username {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The three AI-derived documents stored on a profile.
///
/// Generators, CLI flags and the HTTP surface refer to a kind rather than to
/// column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Insights,
    Strategy,
    Personas,
}

impl InsightKind {
    /// Generation order used by the lookup pipeline.
    pub const ALL: [Self; 3] = [Self::Insights, Self::Strategy, Self::Personas];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Strategy => "strategy",
            Self::Personas => "personas",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "insights" => Some(Self::Insights),
            "strategy" | "prep" | "prep_guide" | "prep-guide" => Some(Self::Strategy),
            "personas" => Some(Self::Personas),
            _ => None,
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_normalized() {
        assert_eq!(Username::parse("Alex").unwrap().as_str(), "alex");
        assert_eq!(Username::parse("@nat_geo").unwrap().as_str(), "nat_geo");
        assert_eq!(Username::parse("  some.one  ").unwrap().as_str(), "some.one");
    }

    #[test]
    fn username_rejects_bad_input() {
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
        assert_eq!(Username::parse("@"), Err(UsernameError::Empty));
        assert!(matches!(
            Username::parse("has space"),
            Err(UsernameError::Invalid(_))
        ));
        assert!(matches!(
            Username::parse(&"a".repeat(31)),
            Err(UsernameError::Invalid(_))
        ));
        assert!(matches!(
            Username::parse("drop;table"),
            Err(UsernameError::Invalid(_))
        ));
    }

    #[test]
    fn insight_kind_names() {
        assert_eq!(InsightKind::from_name("Insights"), Some(InsightKind::Insights));
        assert_eq!(InsightKind::from_name("prep-guide"), Some(InsightKind::Strategy));
        assert_eq!(InsightKind::from_name("personas"), Some(InsightKind::Personas));
        assert_eq!(InsightKind::from_name("all"), None);
        assert_eq!(InsightKind::Strategy.to_string(), "strategy");
    }
}
