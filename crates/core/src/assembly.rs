//! Final result assembly.
//!
//! Merges synthesized attributes with continuity notes into profiles and
//! folds every unresolved reference into one [`GenerationResult`]. Output
//! lists follow first-appearance order regardless of the order in which
//! synthesis tasks finished.

use std::collections::BTreeSet;

use crate::character::{CharacterProfile, ResolvedCharacter};
use crate::extraction::CharacterMention;
use crate::response_parser::SynthesizedAttributes;
use crate::result::{GenerationResult, UnresolvedReference, ERROR_LACKING_GUIDANCE};

/// Continuity notes for a character's scene and goal footprint.
pub fn continuity_notes(mention: &CharacterMention) -> Vec<String> {
    let scenes = mention
        .scene_refs
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let mut notes = vec![format!("Appears in scenes: {scenes}")];

    let goals: Vec<&str> = mention.non_empty_goals().collect();
    let distinct: BTreeSet<&str> = goals.iter().copied().collect();
    match distinct.len() {
        0 => {}
        1 => notes.push(format!("Primary goal: {}", goals[0])),
        _ => notes.push(format!("Multiple goals across {} scenes", goals.len())),
    }

    notes
}

/// Build the profile for one synthesized character.
pub fn build_profile(
    character: &ResolvedCharacter,
    attributes: SynthesizedAttributes,
) -> CharacterProfile {
    CharacterProfile {
        name: character.canonical_name.clone(),
        role: character.role,
        motivation: attributes.motivation,
        visual_signature: attributes.visual_signature,
        relationships: Vec::new(),
        continuity_notes: continuity_notes(&character.source_mention),
    }
}

/// Combine synthesis output and unresolved references into the result.
///
/// Zero profiles is a `lacking_guidance` failure naming the first
/// unresolved character; otherwise the result succeeds and still lists
/// every unresolved name.
pub fn assemble(
    mut completed: Vec<(ResolvedCharacter, SynthesizedAttributes)>,
    mut unresolved: Vec<UnresolvedReference>,
) -> GenerationResult {
    completed.sort_by_key(|(character, _)| character.ordinal);
    unresolved.sort_by_key(|u| u.ordinal);

    let character_profiles: Vec<CharacterProfile> = completed
        .into_iter()
        .map(|(character, attributes)| build_profile(&character, attributes))
        .collect();
    let unresolved_references: Vec<String> = unresolved.iter().map(|u| u.name.clone()).collect();

    if !character_profiles.is_empty() {
        return GenerationResult {
            success: true,
            character_profiles,
            unresolved_references,
            error: None,
            message: None,
        };
    }

    let message = match unresolved.first() {
        Some(first) => format!(
            "Insufficient guidance for character: {} ({})",
            first.name, first.reason
        ),
        None => "No characters available for profile generation".to_string(),
    };

    GenerationResult {
        unresolved_references,
        ..GenerationResult::failure(ERROR_LACKING_GUIDANCE, message)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
