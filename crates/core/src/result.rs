//! Final output of a generation request and the unresolved-reference model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::character::CharacterProfile;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

pub const ERROR_LACKING_GUIDANCE: &str = "lacking_guidance";
pub const ERROR_VALIDATION: &str = "validation_error";
pub const ERROR_INTERNAL: &str = "internal_error";

// ---------------------------------------------------------------------------
// Unresolved references
// ---------------------------------------------------------------------------

/// Why no profile could be produced for a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No goal in any scene and never primary.
    LackingGuidance,
    /// Beyond the per-request character limit.
    CapacityExceeded,
    /// Provider call failed, exceeded its own timeout, or returned
    /// unparseable output.
    ProviderError(String),
    /// Provider answered with the `lacking_guidance` sentinel.
    ProviderLackingGuidance,
    /// Still in flight when the synthesis phase deadline passed.
    Timeout,
    /// Provider integration is switched off.
    SynthesisDisabled,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LackingGuidance => f.write_str("no goal and no primary appearance"),
            Self::CapacityExceeded => f.write_str("character limit per request exceeded"),
            Self::ProviderError(detail) => write!(f, "provider error: {detail}"),
            Self::ProviderLackingGuidance => f.write_str("provider reported lacking guidance"),
            Self::Timeout => f.write_str("profile generation timed out"),
            Self::SynthesisDisabled => f.write_str("profile synthesis is disabled"),
        }
    }
}

/// A character name for which no profile was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// First-appearance position of the character.
    pub ordinal: usize,
    pub name: String,
    pub reason: UnresolvedReason,
}

// ---------------------------------------------------------------------------
// GenerationResult
// ---------------------------------------------------------------------------

/// Output of `generate_character_profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub character_profiles: Vec<CharacterProfile>,
    pub unresolved_references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenerationResult {
    /// A failed result with no profiles and no unresolved names.
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            character_profiles: Vec::new(),
            unresolved_references: Vec::new(),
            error: Some(code.to_string()),
            message: Some(message.into()),
        }
    }
}
