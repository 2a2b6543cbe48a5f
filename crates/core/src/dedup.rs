//! Deterministic character deduplication and suffix assignment.
//!
//! Each mention is first matched case-insensitively against the registry
//! snapshot; a match adopts the registry's canonical spelling verbatim.
//! Unmatched mentions use their trimmed raw name. Collisions between
//! candidates are then resolved in first-appearance order: the first holder
//! of a case-insensitive name keeps it bare, later ones get the next unused
//! letter suffix (`"John"`, `"John A"`, `"John B"`, ...).
//!
//! A suffixed name counts as used if it was assigned earlier in the same
//! request or if the registry already holds a character with that name.

use std::collections::{HashMap, HashSet};

use crate::character::{RegistryCharacter, ResolvedCharacter, Role};
use crate::error::CoreError;
use crate::extraction::{normalize_name, CharacterMention};

/// Suffix letters, in assignment order.
const SUFFIX_LETTERS: std::ops::RangeInclusive<char> = 'A'..='Z';

// ---------------------------------------------------------------------------
// Registry index
// ---------------------------------------------------------------------------

/// Case-folded lookup structures over one registry snapshot.
///
/// Canonical names take precedence over aliases: an alias never shadows a
/// different record whose canonical name has the same folded form.
pub struct RegistryIndex<'a> {
    by_name: HashMap<String, &'a RegistryCharacter>,
    by_alias: HashMap<String, &'a RegistryCharacter>,
}

impl<'a> RegistryIndex<'a> {
    pub fn new(snapshot: &'a [RegistryCharacter]) -> Self {
        let mut by_name = HashMap::with_capacity(snapshot.len());
        let mut by_alias = HashMap::new();

        for character in snapshot {
            let Some(key) = normalize_name(&character.canonical_name) else {
                continue;
            };
            // First record wins on duplicate registry names.
            by_name.entry(key).or_insert(character);

            for alias in &character.aliases {
                if let Some(alias_key) = normalize_name(alias) {
                    by_alias.entry(alias_key).or_insert(character);
                }
            }
        }

        Self { by_name, by_alias }
    }

    /// Find the registry record matching a normalized key.
    pub fn lookup(&self, normalized_key: &str) -> Option<&'a RegistryCharacter> {
        self.by_name
            .get(normalized_key)
            .or_else(|| self.by_alias.get(normalized_key))
            .copied()
    }

    /// Whether a canonical registry name folds to `folded`.
    pub fn contains_name(&self, folded: &str) -> bool {
        self.by_name.contains_key(folded)
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Name assignment
// ---------------------------------------------------------------------------

/// Tracks names handed out so far within one request.
struct NameAllocator<'r, 'a> {
    assigned: HashSet<String>,
    registry: &'r RegistryIndex<'a>,
}

impl<'r, 'a> NameAllocator<'r, 'a> {
    fn new(registry: &'r RegistryIndex<'a>) -> Self {
        Self {
            assigned: HashSet::new(),
            registry,
        }
    }

    /// Claim `candidate` or, if taken, the first free suffixed variant.
    ///
    /// Returns the assigned name and whether a suffix was applied.
    fn claim(&mut self, candidate: &str) -> Result<(String, bool), CoreError> {
        if self.assigned.insert(candidate.to_lowercase()) {
            return Ok((candidate.to_string(), false));
        }

        for letter in SUFFIX_LETTERS {
            let suffixed = format!("{candidate} {letter}");
            let folded = suffixed.to_lowercase();
            if self.assigned.contains(&folded) || self.registry.contains_name(&folded) {
                continue;
            }
            self.assigned.insert(folded);
            return Ok((suffixed, true));
        }

        Err(CoreError::Capacity(format!(
            "Dedup suffix space exhausted for '{candidate}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Deduplicate
// ---------------------------------------------------------------------------

/// Resolve every mention to exactly one uniquely named character.
///
/// Output order equals input order, so the mapping from mentions to
/// resolved characters is total and positional. Fails with
/// [`CoreError::Capacity`] only when all 26 suffixes of one base name are
/// taken.
pub fn deduplicate(
    mentions: Vec<CharacterMention>,
    registry: &RegistryIndex<'_>,
) -> Result<Vec<ResolvedCharacter>, CoreError> {
    let mut allocator = NameAllocator::new(registry);
    let mut resolved = Vec::with_capacity(mentions.len());

    for (ordinal, mention) in mentions.into_iter().enumerate() {
        let (candidate, registry_id) = match registry.lookup(&mention.normalized_key) {
            Some(existing) => (existing.canonical_name.clone(), Some(existing.id.clone())),
            None => (mention.raw_name.trim().to_string(), None),
        };

        let (canonical_name, suffixed) = allocator.claim(&candidate)?;

        resolved.push(ResolvedCharacter {
            ordinal,
            canonical_name,
            role: Role::for_mention(&mention),
            // A suffixed name denotes a new character, not the registry record.
            registry_id: if suffixed { None } else { registry_id },
            source_mention: mention,
            eligible_for_synthesis: false,
        });
    }

    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
