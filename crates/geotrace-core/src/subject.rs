//! Identities that can be geo-located.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("subject JSON is missing field \"{0}\"")]
    MissingField(&'static str),

    #[error("subject must not be empty")]
    Empty,
}

/// Something a geo-locator can resolve, typically an IP address or host name.
///
/// Implementations must be cheap to clone and immutable: they are used as
/// cache keys, and a cached location shares its subject with every copy handed
/// out to callers.
pub trait Subject: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {
    fn to_json(&self) -> serde_json::Value;

    /// Rebuilds a subject from the value produced by [`Subject::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`SubjectError`] if `value` does not describe a subject of this type.
    fn from_json(value: &serde_json::Value) -> Result<Self, SubjectError>;
}

/// A subject wrapping a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringSubject(Arc<str>);

impl StringSubject {
    /// # Errors
    ///
    /// Returns [`SubjectError::Empty`] for an empty or blank string.
    pub fn new(value: &str) -> Result<Self, SubjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SubjectError::Empty);
        }
        Ok(Self(Arc::from(trimmed)))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Whether `other` shares this subject's backing allocation.
    #[must_use]
    pub fn same_reference(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Display for StringSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Subject for StringSubject {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "value": &*self.0 })
    }

    fn from_json(value: &serde_json::Value) -> Result<Self, SubjectError> {
        let raw = value
            .get("value")
            .and_then(serde_json::Value::as_str)
            .ok_or(SubjectError::MissingField("value"))?;
        Self::new(raw)
    }
}
