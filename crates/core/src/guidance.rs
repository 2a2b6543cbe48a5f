//! Guidance-sufficiency classification and synthesis planning.
//!
//! A character lacks guidance when it has no non-empty goal in any scene
//! *and* is never listed as primary. Such characters never reach the
//! provider. Everyone else is eligible, subject to the per-request
//! character limit applied by [`plan_synthesis`].

use crate::character::ResolvedCharacter;
use crate::extraction::CharacterMention;
use crate::result::{UnresolvedReason, UnresolvedReference};

/// Whether a mention carries enough context to synthesize a profile.
pub fn has_guidance(mention: &CharacterMention) -> bool {
    mention.is_primary_anywhere || mention.non_empty_goals().next().is_some()
}

/// Set `eligible_for_synthesis` on every character.
pub fn classify(mut characters: Vec<ResolvedCharacter>) -> Vec<ResolvedCharacter> {
    for character in &mut characters {
        character.eligible_for_synthesis = has_guidance(&character.source_mention);
    }
    characters
}

/// Characters split by what happens to them next.
#[derive(Debug, Default)]
pub struct SynthesisPlan {
    /// Characters that get a provider call, in first-appearance order.
    pub to_synthesize: Vec<ResolvedCharacter>,
    /// Characters already known to be unresolved.
    pub unresolved: Vec<UnresolvedReference>,
}

/// Partition classified characters into synthesis work and unresolved names.
///
/// Eligible characters beyond `max_characters` (in first-appearance order)
/// are unresolved with [`UnresolvedReason::CapacityExceeded`].
pub fn plan_synthesis(characters: Vec<ResolvedCharacter>, max_characters: usize) -> SynthesisPlan {
    let mut plan = SynthesisPlan::default();

    for character in characters {
        if !character.eligible_for_synthesis {
            plan.unresolved
                .push(unresolved(&character, UnresolvedReason::LackingGuidance));
        } else if plan.to_synthesize.len() >= max_characters {
            plan.unresolved
                .push(unresolved(&character, UnresolvedReason::CapacityExceeded));
        } else {
            plan.to_synthesize.push(character);
        }
    }

    plan
}

/// Build an unresolved reference for a character.
pub fn unresolved(character: &ResolvedCharacter, reason: UnresolvedReason) -> UnresolvedReference {
    UnresolvedReference {
        ordinal: character.ordinal,
        name: character.canonical_name.clone(),
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
