use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NamespaceError {
    #[error("user id is empty")]
    EmptyUserId,

    #[error("unrecognized namespace key: {0}")]
    UnknownKey(String),
}

/// Opaque identifier handed over by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// # Errors
    ///
    /// Returns `NamespaceError::EmptyUserId` if the id is blank after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, NamespaceError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NamespaceError::EmptyUserId);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Storage partition: one signed-in user, or the shared guest slot.
///
/// Every persisted row is keyed by `storage_key()`, so switching namespace
/// never surfaces another user's progress or history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    Guest,
    User(UserId),
}

const GUEST_KEY: &str = "guest";
const USER_PREFIX: &str = "user-";

impl Namespace {
    #[must_use]
    pub fn guest() -> Self {
        Self::Guest
    }

    #[must_use]
    pub fn user(id: UserId) -> Self {
        Self::User(id)
    }

    /// Namespace for an optional signed-in user id; `None` or blank means guest.
    #[must_use]
    pub fn from_optional_user(raw: Option<&str>) -> Self {
        raw.and_then(|id| UserId::new(id).ok())
            .map_or(Self::Guest, Self::User)
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Guest => GUEST_KEY.to_string(),
            Self::User(id) => format!("{USER_PREFIX}{}", id.as_str()),
        }
    }

    /// Inverse of `storage_key`.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError` if the key is neither `guest` nor `user-<id>`.
    pub fn from_storage_key(key: &str) -> Result<Self, NamespaceError> {
        if key == GUEST_KEY {
            return Ok(Self::Guest);
        }
        match key.strip_prefix(USER_PREFIX) {
            Some(id) => Ok(Self::User(UserId::new(id)?)),
            None => Err(NamespaceError::UnknownKey(key.to_string())),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}
