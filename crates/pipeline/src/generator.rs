//! Request orchestration for `generate_character_profiles`.

use std::sync::Arc;

use cast_core::assembly::assemble;
use cast_core::character::RegistryCharacter;
use cast_core::dedup::{deduplicate, RegistryIndex};
use cast_core::error::CoreError;
use cast_core::extraction::extract_mentions;
use cast_core::guidance::{self, classify, plan_synthesis, SynthesisPlan};
use cast_core::result::{GenerationResult, UnresolvedReason};
use cast_core::scene::{validate_request, GenerateRequest};
use cast_llm::TextGenerator;
use cast_registry::CharacterRegistry;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::GenerationConfig;
use crate::reconciler::{ReconcileJob, ReconcilerHandle};
use crate::synthesizer::ProfileSynthesizer;

/// Runs a generation request end to end.
///
/// Integrations are optional: without a registry every mention is treated
/// as new, without a provider every eligible character is unresolved, and
/// without a reconciler nothing is written back.
pub struct ProfileGenerator {
    config: GenerationConfig,
    registry: Option<Arc<dyn CharacterRegistry>>,
    synthesizer: Option<ProfileSynthesizer>,
    reconciler: Option<ReconcilerHandle>,
}

impl ProfileGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            registry: None,
            synthesizer: None,
            reconciler: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn CharacterRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn TextGenerator>) -> Self {
        self.synthesizer = Some(ProfileSynthesizer::new(provider, &self.config));
        self
    }

    pub fn with_reconciler(mut self, handle: ReconcilerHandle) -> Self {
        self.reconciler = Some(handle);
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate profiles for every character named in `request`.
    ///
    /// Business outcomes (including an all-unresolved request) come back as
    /// `Ok`; only validation failures and dedup capacity exhaustion are
    /// errors.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerationResult, CoreError> {
        let span = tracing::info_span!(
            "generate_character_profiles",
            request_id = %Uuid::new_v4(),
            project_id = %request.project_id,
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &GenerateRequest) -> Result<GenerationResult, CoreError> {
        validate_request(request)?;
        let mentions = extract_mentions(&request.scene_list)?;

        let snapshot = self.fetch_snapshot(&request.project_id).await;
        let index = RegistryIndex::new(&snapshot);
        let resolved = deduplicate(mentions, &index)?;

        let SynthesisPlan {
            to_synthesize,
            mut unresolved,
        } = plan_synthesis(classify(resolved), self.config.max_characters);

        for reference in &unresolved {
            tracing::debug!(
                character = %reference.name,
                reason = %reference.reason,
                "Character not eligible for synthesis",
            );
        }

        let completed = match &self.synthesizer {
            Some(synthesizer) if !to_synthesize.is_empty() => {
                let outcome = synthesizer
                    .synthesize(&request.concept_brief, to_synthesize)
                    .await;
                unresolved.extend(outcome.unresolved);
                outcome.completed
            }
            Some(_) => Vec::new(),
            None => {
                if !to_synthesize.is_empty() {
                    tracing::info!(
                        count = to_synthesize.len(),
                        "Profile synthesis disabled, leaving eligible characters unresolved",
                    );
                }
                unresolved.extend(
                    to_synthesize
                        .iter()
                        .map(|c| guidance::unresolved(c, UnresolvedReason::SynthesisDisabled)),
                );
                Vec::new()
            }
        };

        let result = assemble(completed, unresolved);

        if let Some(handle) = &self.reconciler {
            if !result.character_profiles.is_empty() {
                handle.enqueue(ReconcileJob::new(
                    request.project_id.clone(),
                    result.character_profiles.clone(),
                ));
            }
        }

        tracing::info!(
            success = result.success,
            profile_count = result.character_profiles.len(),
            unresolved_count = result.unresolved_references.len(),
            "Character profile generation finished",
        );
        Ok(result)
    }

    /// Registry snapshot for the project, or empty if it cannot be read.
    async fn fetch_snapshot(&self, project_id: &str) -> Vec<RegistryCharacter> {
        let Some(registry) = &self.registry else {
            return Vec::new();
        };

        match tokio::time::timeout(self.config.registry_timeout, registry.fetch(project_id)).await {
            Ok(Ok(characters)) => characters,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Registry fetch failed, continuing with empty snapshot");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.config.registry_timeout.as_secs(),
                    "Registry fetch timed out, continuing with empty snapshot",
                );
                Vec::new()
            }
        }
    }
}
