//! Prompt templates for character attribute synthesis.
//!
//! Templates use `{placeholder}` markers. Rendering is a single pass, so
//! text substituted into the prompt (names, goals) is never re-scanned for
//! placeholders. Unknown placeholders are left as-is.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::character::ResolvedCharacter;
use crate::error::CoreError;
use crate::scene::ConceptBrief;
use crate::word_limit::WordLimits;

/// Built-in `master_reference` template.
pub const MASTER_REFERENCE_TEMPLATE: &str = "\
You are generating a concise character anchor for storyboard and image teams.
Context: {genre_tags}, tone {tone_keywords}, conflict {core_conflict}.
Character: {name}, role {role}, scenes {scene_numbers}.

Based on the character's appearances and goals: {goals}

Provide a motivation (<= {motivation_word_limit} words) and a visual signature \
(<= {visual_signature_word_limit} words) using neutral, bias-free descriptors.

If you lack sufficient information to write a field, answer with exactly \
\"lacking_guidance\" for that field.

Answer in exactly this format:
Motivation: <text>
Visual signature: <text>
";

/// Placeholder every template must contain.
const REQUIRED_PLACEHOLDER: &str = "{name}";

/// Rendered in place of an empty goal list.
const NO_GOALS: &str = "none stated";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// A validated prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    /// Wrap a template string, rejecting ones without a `{name}` marker.
    pub fn new(source: impl Into<String>) -> Result<Self, CoreError> {
        let source = source.into();
        if !source.contains(REQUIRED_PLACEHOLDER) {
            return Err(CoreError::Validation(format!(
                "Prompt template must contain the {REQUIRED_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self { source })
    }

    /// The built-in template.
    pub fn master_reference() -> Self {
        Self {
            source: MASTER_REFERENCE_TEMPLATE.to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render the prompt for one character.
    pub fn render(
        &self,
        brief: &ConceptBrief,
        character: &ResolvedCharacter,
        limits: WordLimits,
    ) -> String {
        let mention = &character.source_mention;
        let goals: Vec<&str> = mention.non_empty_goals().collect();

        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| {
                match &caps[1] {
                    "genre_tags" => join_set(brief.genre_tags.iter()),
                    "tone_keywords" => join_set(brief.tone_keywords.iter()),
                    "core_conflict" => brief.core_conflict.trim().to_string(),
                    "name" => character.canonical_name.clone(),
                    "role" => character.role.to_string(),
                    "scene_numbers" => mention
                        .scene_refs
                        .iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    "goals" if goals.is_empty() => NO_GOALS.to_string(),
                    "goals" => goals.join("; "),
                    "motivation_word_limit" => limits.motivation.to_string(),
                    "visual_signature_word_limit" => limits.visual_signature.to_string(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::master_reference()
    }
}

fn join_set<'a>(items: impl Iterator<Item = &'a String>) -> String {
    let joined = items
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "unspecified".to_string()
    } else {
        joined
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
