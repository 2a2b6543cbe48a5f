//! Character types shared across pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extraction::CharacterMention;

// ---------------------------------------------------------------------------
// Registry snapshot
// ---------------------------------------------------------------------------

/// A character already stored in the external registry for a project.
///
/// Read-only; one snapshot is taken per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCharacter {
    pub id: String,
    pub canonical_name: String,
    pub project_id: String,
    /// Alternative names stored on the registry record.
    #[serde(default)]
    pub aliases: Vec<String>,
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Narrative role derived from scene listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Protagonist,
    Support,
}

impl Role {
    /// Protagonist if primary in at least one scene, otherwise support.
    pub fn for_mention(mention: &CharacterMention) -> Self {
        if mention.is_primary_anywhere {
            Role::Protagonist
        } else {
            Role::Support
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Protagonist => "protagonist",
            Role::Support => "support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolved character
// ---------------------------------------------------------------------------

/// A mention after deduplication, carrying its request-unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCharacter {
    /// Position in first-appearance order; used to keep output ordering
    /// stable regardless of which stage produced an entry.
    pub ordinal: usize,
    pub canonical_name: String,
    pub source_mention: CharacterMention,
    pub role: Role,
    /// Id of the matched registry record, `None` for new characters.
    pub registry_id: Option<String>,
    /// Set by the guidance classifier.
    pub eligible_for_synthesis: bool,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Generated profile for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub role: Role,
    pub motivation: String,
    pub visual_signature: String,
    /// Empty unless relationship data is supplied with the request.
    #[serde(default)]
    pub relationships: Vec<String>,
    #[serde(default)]
    pub continuity_notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(is_primary: bool) -> CharacterMention {
        CharacterMention {
            raw_name: "Rhea".to_string(),
            normalized_key: "rhea".to_string(),
            scene_refs: vec![1],
            goals: vec![],
            is_primary_anywhere: is_primary,
        }
    }

    #[test]
    fn primary_anywhere_is_protagonist() {
        assert_eq!(Role::for_mention(&mention(true)), Role::Protagonist);
        assert_eq!(Role::for_mention(&mention(false)), Role::Support);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Role::Protagonist).unwrap(),
            serde_json::json!("protagonist")
        );
        assert_eq!(Role::Support.to_string(), "support");
    }
}
