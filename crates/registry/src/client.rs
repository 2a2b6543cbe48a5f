//! Registry trait and error types.

use async_trait::async_trait;
use cast_core::character::{CharacterProfile, RegistryCharacter};

/// Errors from the registry layer.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The registry returned a non-2xx status code.
    #[error("Registry API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    #[error("Registry request timed out")]
    Timeout,

    #[error("Registry integration is disabled")]
    Disabled,
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}

/// Outcome counts for one `submit` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitAck {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

/// External system of record for a project's characters.
#[async_trait]
pub trait CharacterRegistry: Send + Sync {
    /// Snapshot of the characters stored for `project_id`.
    async fn fetch(&self, project_id: &str) -> Result<Vec<RegistryCharacter>, RegistryError>;

    /// Upsert profiles by name within `project_id`.
    ///
    /// Individual profile failures are counted in the acknowledgement; an
    /// error is returned only when nothing in the batch could be written.
    async fn submit(
        &self,
        project_id: &str,
        profiles: &[CharacterProfile],
    ) -> Result<SubmitAck, RegistryError>;
}
