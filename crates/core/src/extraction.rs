//! Character mention extraction from scene listings.
//!
//! Folds every name appearing in a scene's primary or secondary list into a
//! [`CharacterMention`] keyed by its normalized form. Mention order is the
//! first-appearance order (lowest scene number first, then primary before
//! secondary, then listing order). Downstream suffix assignment depends on
//! this order being stable.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::scene::{validate_scene_numbers, SceneEntry};
use crate::types::SceneNumber;

/// Aggregated appearances of one character name across a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterMention {
    /// The name as first written in the scene list.
    pub raw_name: String,
    /// Case-folded, trimmed form used for matching.
    pub normalized_key: String,
    /// Scenes the name appears in, ascending, without repeats.
    pub scene_refs: Vec<SceneNumber>,
    /// Non-empty goals of the scenes listing this name as primary, in scene
    /// order.
    pub goals: Vec<String>,
    /// `true` if the name is listed as primary in at least one scene.
    pub is_primary_anywhere: bool,
}

impl CharacterMention {
    fn new(raw_name: &str, normalized_key: String) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            normalized_key,
            scene_refs: Vec::new(),
            goals: Vec::new(),
            is_primary_anywhere: false,
        }
    }

    /// Goals that carry actual text.
    pub fn non_empty_goals(&self) -> impl Iterator<Item = &str> {
        self.goals
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
    }
}

/// Normalize a character name for matching: trim, then case-fold.
///
/// Returns `None` for names that are blank after trimming.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Extract character mentions from a scene list.
///
/// Scenes may arrive in any order; they are processed by ascending
/// `scene_number`. Blank names are skipped. Fails with
/// [`CoreError::Validation`] when the list is empty, a scene number is
/// non-positive or duplicated, or no scene names any character.
pub fn extract_mentions(scenes: &[SceneEntry]) -> Result<Vec<CharacterMention>, CoreError> {
    if scenes.is_empty() {
        return Err(CoreError::Validation(
            "scene_list cannot be empty".to_string(),
        ));
    }
    validate_scene_numbers(scenes)?;

    let mut ordered: Vec<&SceneEntry> = scenes.iter().collect();
    ordered.sort_by_key(|s| s.scene_number);

    let mut mentions: Vec<CharacterMention> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for scene in ordered {
        let goal = scene.goal_text();
        let listed = scene
            .primary_characters
            .iter()
            .map(|name| (name, true))
            .chain(scene.secondary_characters.iter().map(|name| (name, false)));

        for (name, is_primary) in listed {
            let Some(key) = normalize_name(name) else {
                continue;
            };

            let slot = *index.entry(key.clone()).or_insert_with(|| {
                mentions.push(CharacterMention::new(name, key));
                mentions.len() - 1
            });
            let mention = &mut mentions[slot];

            // A name listed twice in one scene still counts as one appearance.
            if mention.scene_refs.last() != Some(&scene.scene_number) {
                mention.scene_refs.push(scene.scene_number);
                // A scene's goal belongs to its primary characters.
                if let Some(goal) = goal.filter(|_| is_primary) {
                    mention.goals.push(goal.to_string());
                }
            }
            if is_primary {
                mention.is_primary_anywhere = true;
            }
        }
    }

    if mentions.is_empty() {
        return Err(CoreError::Validation(
            "scene_list does not name any characters".to_string(),
        ));
    }

    Ok(mentions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
