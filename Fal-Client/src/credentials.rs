use std::fmt;

use crate::error::{FalError, Result};

/// Environment variable read by [`FalCredentials::from_env`].
pub const FAL_KEY_ENV: &str = "FAL_KEY";

/// fal.ai API key.
///
/// Passed explicitly to [`FalClient`](crate::FalClient) and shared
/// read-only by every request; nothing in this crate writes the key into
/// the process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct FalCredentials {
    key: String,
}

impl FalCredentials {
    /// Wrap an API key. Surrounding whitespace is removed.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(FalError::MissingCredentials("API key is empty".into()));
        }
        Ok(Self { key })
    }

    /// Read the key from `FAL_KEY`, once.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(FAL_KEY_ENV)
            .map_err(|_| FalError::MissingCredentials(format!("{} is not set", FAL_KEY_ENV)))?;
        Self::new(key)
    }

    /// Value for the `Authorization` header.
    pub(crate) fn authorization(&self) -> String {
        format!("Key {}", self.key)
    }
}

impl fmt::Debug for FalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        f.debug_struct("FalCredentials")
            .field("key", &format_args!("***{}", tail))
            .finish()
    }
}
