//! Request input types and up-front validation.
//!
//! [`validate_request`] runs before any external call is made. Anything it
//! rejects surfaces as [`CoreError::Validation`] and aborts the request.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::SceneNumber;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One scene from an episode breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SceneEntry {
    #[validate(range(min = 1, message = "scene_number must be a positive integer"))]
    pub scene_number: SceneNumber,
    #[validate(length(min = 1, message = "primary_characters must not be empty"))]
    pub primary_characters: Vec<String>,
    #[serde(default)]
    pub secondary_characters: Vec<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

impl SceneEntry {
    /// The scene goal, if present and not blank.
    pub fn goal_text(&self) -> Option<&str> {
        self.goal
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

/// Project-level creative context shared by every character prompt.
///
/// Tags and keywords are sets; `BTreeSet` keeps prompt rendering stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ConceptBrief {
    #[serde(default)]
    pub genre_tags: BTreeSet<String>,
    #[serde(default)]
    pub tone_keywords: BTreeSet<String>,
    #[validate(length(min = 1, message = "core_conflict must not be empty"))]
    pub core_conflict: String,
}

/// Input of the `generate_character_profiles` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(nested)]
    pub scene_list: Vec<SceneEntry>,
    #[validate(nested)]
    pub concept_brief: ConceptBrief,
    #[validate(length(min = 1, message = "project_id must not be empty"))]
    pub project_id: String,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a generation request.
///
/// Rules:
/// - `scene_list` must not be empty
/// - `project_id` and `core_conflict` must not be blank
/// - every `scene_number` is positive and unique
/// - every scene lists at least one primary character
pub fn validate_request(request: &GenerateRequest) -> Result<(), CoreError> {
    if request.scene_list.is_empty() {
        return Err(CoreError::Validation(
            "scene_list cannot be empty".to_string(),
        ));
    }
    if request.project_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "project_id must not be empty".to_string(),
        ));
    }
    if request.concept_brief.core_conflict.trim().is_empty() {
        return Err(CoreError::Validation(
            "core_conflict must not be empty".to_string(),
        ));
    }

    request
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    validate_scene_numbers(&request.scene_list)
}

/// Reject non-positive and duplicated scene numbers.
pub fn validate_scene_numbers(scenes: &[SceneEntry]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(scenes.len());
    for scene in scenes {
        if scene.scene_number <= 0 {
            return Err(CoreError::Validation(format!(
                "scene_number must be a positive integer, got {}",
                scene.scene_number
            )));
        }
        if !seen.insert(scene.scene_number) {
            return Err(CoreError::Validation(format!(
                "Duplicate scene_number: {}",
                scene.scene_number
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
