//! Provider fan-out for eligible characters.
//!
//! One task per character, at most `max_characters` provider calls in
//! flight (semaphore), each call bounded by `provider_timeout` once it holds
//! a permit. The phase as a whole is bounded by `phase_timeout`: when it
//! elapses, outstanding tasks are aborted and their characters come back
//! unresolved with [`UnresolvedReason::Timeout`]. Profiles completed before
//! the deadline are kept.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use cast_core::character::ResolvedCharacter;
use cast_core::guidance::unresolved;
use cast_core::prompt::PromptTemplate;
use cast_core::response_parser::{parse_provider_output, ParsedResponse, SynthesizedAttributes};
use cast_core::result::{UnresolvedReason, UnresolvedReference};
use cast_core::scene::ConceptBrief;
use cast_core::word_limit::{truncate_words, word_count, WordLimits};
use cast_llm::{CompletionRequest, ProviderError, TextGenerator};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::GenerationConfig;

/// Result of one synthesis phase.
#[derive(Debug, Default)]
pub struct SynthesisOutcome {
    pub completed: Vec<(ResolvedCharacter, SynthesizedAttributes)>,
    pub unresolved: Vec<UnresolvedReference>,
}

/// Builds prompts, calls the provider and interprets the replies.
pub struct ProfileSynthesizer {
    provider: Arc<dyn TextGenerator>,
    template: PromptTemplate,
    limits: WordLimits,
    max_concurrency: usize,
    provider_timeout: Duration,
    phase_timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl ProfileSynthesizer {
    pub fn new(provider: Arc<dyn TextGenerator>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            template: config.template.clone(),
            limits: config.word_limits,
            max_concurrency: config.max_characters.max(1),
            provider_timeout: config.provider_timeout,
            phase_timeout: config.phase_timeout,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Synthesize attributes for every character in `characters`.
    ///
    /// Never fails as a whole; every input character ends up either in
    /// `completed` or in `unresolved`.
    pub async fn synthesize(
        &self,
        brief: &ConceptBrief,
        characters: Vec<ResolvedCharacter>,
    ) -> SynthesisOutcome {
        let deadline = Instant::now() + self.phase_timeout;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut pending: BTreeMap<usize, ResolvedCharacter> = BTreeMap::new();
        let mut tasks = JoinSet::new();

        for character in characters {
            let request = CompletionRequest {
                prompt: self.template.render(brief, &character, self.limits),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let call_timeout = self.provider_timeout;
            let ordinal = character.ordinal;
            pending.insert(ordinal, character);

            tasks.spawn(async move {
                // The semaphore is never closed; a permit is always granted.
                let _permit = semaphore.acquire_owned().await.ok();
                let reply = match tokio::time::timeout(call_timeout, provider.complete(&request))
                    .await
                {
                    Ok(reply) => reply,
                    Err(_) => Err(ProviderError::Timeout),
                };
                (ordinal, reply)
            });
        }

        let mut outcome = SynthesisOutcome::default();
        let mut phase_expired = false;

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((ordinal, reply)))) => {
                    if let Some(character) = pending.remove(&ordinal) {
                        self.record(&mut outcome, character, reply);
                    }
                }
                Ok(Some(Err(e))) => {
                    tracing::error!(error = %e, "Synthesis task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        in_flight = pending.len(),
                        timeout_secs = self.phase_timeout.as_secs(),
                        "Profile generation phase timed out, cancelling outstanding calls",
                    );
                    tasks.abort_all();
                    phase_expired = true;
                    break;
                }
            }
        }

        // Anything left either missed the deadline or lost its task.
        for character in pending.into_values() {
            let reason = if phase_expired {
                UnresolvedReason::Timeout
            } else {
                UnresolvedReason::ProviderError("synthesis task aborted".to_string())
            };
            outcome.unresolved.push(unresolved(&character, reason));
        }

        outcome
    }

    fn record(
        &self,
        outcome: &mut SynthesisOutcome,
        character: ResolvedCharacter,
        reply: Result<String, ProviderError>,
    ) {
        let name = character.canonical_name.as_str();

        let raw = match reply {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    character = %name,
                    provider = self.provider.name(),
                    error = %e,
                    "Provider call failed",
                );
                let reason = UnresolvedReason::ProviderError(e.to_string());
                outcome.unresolved.push(unresolved(&character, reason));
                return;
            }
        };

        match parse_provider_output(&raw) {
            ParsedResponse::Attributes(attributes) => {
                let attributes = self.apply_word_limits(name, attributes);
                outcome.completed.push((character, attributes));
            }
            ParsedResponse::LackingGuidance => {
                tracing::info!(character = %name, "Provider reported lacking guidance");
                outcome.unresolved.push(unresolved(
                    &character,
                    UnresolvedReason::ProviderLackingGuidance,
                ));
            }
            ParsedResponse::Unparseable(detail) => {
                tracing::warn!(character = %name, detail = %detail, "Unparseable provider reply");
                let reason = UnresolvedReason::ProviderError(format!("unparseable reply: {detail}"));
                outcome.unresolved.push(unresolved(&character, reason));
            }
        }
    }

    fn apply_word_limits(
        &self,
        character: &str,
        attributes: SynthesizedAttributes,
    ) -> SynthesizedAttributes {
        SynthesizedAttributes {
            motivation: limit_field(
                character,
                "motivation",
                &attributes.motivation,
                self.limits.motivation,
            ),
            visual_signature: limit_field(
                character,
                "visual_signature",
                &attributes.visual_signature,
                self.limits.visual_signature,
            ),
        }
    }
}

fn limit_field(character: &str, field: &str, text: &str, limit: usize) -> String {
    let words = word_count(text);
    if words > limit {
        tracing::debug!(character, field, words, limit, "Truncating over-limit text");
    }
    truncate_words(text, limit)
}
