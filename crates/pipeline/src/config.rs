//! Generation tuning knobs.

use std::time::Duration;

use cast_core::prompt::PromptTemplate;
use cast_core::word_limit::WordLimits;

/// Default cap on profiles synthesized per request.
pub const DEFAULT_MAX_CHARACTERS_PER_REQUEST: usize = 4;
/// Default bound on the whole synthesis phase.
pub const DEFAULT_PROFILE_GENERATION_TIMEOUT: Duration = Duration::from_secs(300);
/// Default bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default bound on registry reads and writes.
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RECONCILER_QUEUE_CAPACITY: usize = 64;

/// Settings consumed by [`crate::ProfileGenerator`] and its collaborators.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Maximum profiles per request; also the provider concurrency bound.
    pub max_characters: usize,
    /// Overall deadline for the synthesis phase.
    pub phase_timeout: Duration,
    /// Deadline for each provider call, measured once it holds a slot.
    pub provider_timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub word_limits: WordLimits,
    pub registry_timeout: Duration,
    pub reconciler_queue_capacity: usize,
    pub template: PromptTemplate,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_characters: DEFAULT_MAX_CHARACTERS_PER_REQUEST,
            phase_timeout: DEFAULT_PROFILE_GENERATION_TIMEOUT,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            word_limits: WordLimits::default(),
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
            reconciler_queue_capacity: DEFAULT_RECONCILER_QUEUE_CAPACITY,
            template: PromptTemplate::master_reference(),
        }
    }
}
