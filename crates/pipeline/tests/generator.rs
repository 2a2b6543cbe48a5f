mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use cast_core::character::Role;
use cast_core::error::CoreError;
use cast_core::result::ERROR_LACKING_GUIDANCE;
use cast_pipeline::{GenerationConfig, ProfileGenerator, Reconciler};
use common::*;
use tokio_util::sync::CancellationToken;

fn generator(registry: Arc<MockRegistry>, provider: Arc<ScriptedProvider>) -> ProfileGenerator {
    ProfileGenerator::new(GenerationConfig::default())
        .with_registry(registry)
        .with_provider(provider)
}

fn profile_names(result: &cast_core::result::GenerationResult) -> Vec<&str> {
    result
        .character_profiles
        .iter()
        .map(|p| p.name.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Documented scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn documented_example_profiles_eligible_characters() {
    let registry = Arc::new(MockRegistry::new(Vec::new()));
    let provider = provider(ScriptedProvider::new());

    let result = generator(registry, provider.clone())
        .generate(&documented_request())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(profile_names(&result), vec!["Rhea", "Marcus"]);
    assert_eq!(result.unresolved_references, vec!["Guard"]);

    let rhea = &result.character_profiles[0];
    assert_eq!(rhea.role, Role::Protagonist);
    assert_eq!(rhea.motivation, "Rhea seeks freedom.");
    assert_eq!(
        rhea.continuity_notes,
        vec!["Appears in scenes: 1, 2", "Multiple goals across 2 scenes"]
    );

    let mut calls = provider.calls();
    calls.sort();
    assert_eq!(calls, vec!["Marcus", "Rhea"]);
}

#[tokio::test]
async fn registry_alias_adopts_canonical_name() {
    let registry = Arc::new(MockRegistry::new(vec![registry_character(
        "reg-1",
        "John Smith",
        &["john"],
    )]));
    let provider = provider(ScriptedProvider::new());
    let req = request(vec![scene(1, &["john"], &[], Some("Find the map"))]);

    let result = generator(registry, provider).generate(&req).await.unwrap();

    assert_eq!(profile_names(&result), vec!["John Smith"]);
}

#[tokio::test]
async fn two_aliases_of_one_record_are_suffixed() {
    let registry = Arc::new(MockRegistry::new(vec![registry_character(
        "reg-1",
        "John Smith",
        &["Johnny", "J. Smith"],
    )]));
    let provider = provider(ScriptedProvider::new());
    let req = request(vec![
        scene(1, &["Johnny"], &[], Some("Hide")),
        scene(2, &["J. Smith"], &[], Some("Run")),
    ]);

    let result = generator(registry, provider).generate(&req).await.unwrap();

    assert_eq!(profile_names(&result), vec!["John Smith", "John Smith A"]);
}

#[tokio::test(start_paused = true)]
async fn slow_provider_call_demotes_only_that_character() {
    let registry = Arc::new(MockRegistry::new(Vec::new()));
    let provider = provider(ScriptedProvider::new().script(
        "Marcus",
        Script::Delayed(Duration::from_secs(120), ScriptedProvider::default_reply("Marcus")),
    ));
    let req = request(vec![scene(1, &["Rhea", "Marcus", "Ila"], &[], Some("Escape"))]);

    let result = generator(registry, provider).generate(&req).await.unwrap();

    assert!(result.success);
    assert_eq!(profile_names(&result), vec!["Rhea", "Ila"]);
    assert_eq!(result.unresolved_references, vec!["Marcus"]);
}

// ---------------------------------------------------------------------------
// Synthesis phase
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn phase_timeout_keeps_completed_profiles() {
    let config = GenerationConfig {
        phase_timeout: Duration::from_secs(10),
        provider_timeout: Duration::from_secs(600),
        ..GenerationConfig::default()
    };
    let provider = provider(ScriptedProvider::new().script(
        "Ila",
        Script::Delayed(Duration::from_secs(50), ScriptedProvider::default_reply("Ila")),
    ));
    let generator = ProfileGenerator::new(config).with_provider(provider);
    let req = request(vec![scene(1, &["Rhea", "Ila"], &[], Some("Escape"))]);

    let result = generator.generate(&req).await.unwrap();

    assert!(result.success);
    assert_eq!(profile_names(&result), vec!["Rhea"]);
    assert_eq!(result.unresolved_references, vec!["Ila"]);
}

#[tokio::test]
async fn provider_errors_and_unparseable_replies_are_unresolved() {
    let provider = provider(
        ScriptedProvider::new()
            .script("Marcus", Script::Fail(502))
            .script("Ila", Script::Reply("I would rather not say.".to_string())),
    );
    let generator = ProfileGenerator::new(GenerationConfig::default()).with_provider(provider);
    let req = request(vec![scene(1, &["Rhea", "Marcus", "Ila"], &[], Some("Escape"))]);

    let result = generator.generate(&req).await.unwrap();

    assert!(result.success);
    assert_eq!(profile_names(&result), vec!["Rhea"]);
    assert_eq!(result.unresolved_references, vec!["Marcus", "Ila"]);
}

#[tokio::test]
async fn every_character_unresolved_is_lacking_guidance() {
    let provider = provider(
        ScriptedProvider::new()
            .script("Rhea", Script::Reply("lacking_guidance".to_string()))
            .script("Guard", Script::Fail(500)),
    );
    let generator = ProfileGenerator::new(GenerationConfig::default()).with_provider(provider);
    let req = request(vec![scene(1, &["Rhea"], &["Guard"], None)]);

    let result = generator.generate(&req).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some(ERROR_LACKING_GUIDANCE));
    assert!(result.character_profiles.is_empty());
    assert_eq!(result.unresolved_references, vec!["Rhea", "Guard"]);
    assert!(result.message.unwrap().contains("Rhea"));
}

#[tokio::test]
async fn over_limit_text_is_truncated_at_word_boundary() {
    let long_motivation = (1..=60).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let provider = provider(ScriptedProvider::new().script(
        "Rhea",
        Script::Reply(format!("Motivation: {long_motivation}\nVisual signature: Red scarf")),
    ));
    let generator = ProfileGenerator::new(GenerationConfig::default()).with_provider(provider);
    let req = request(vec![scene(1, &["Rhea"], &[], Some("Escape"))]);

    let result = generator.generate(&req).await.unwrap();

    let motivation = &result.character_profiles[0].motivation;
    assert_eq!(motivation.split_whitespace().count(), 50);
    assert!(motivation.ends_with("w50"));
    assert_eq!(result.character_profiles[0].visual_signature, "Red scarf");
}

#[tokio::test]
async fn characters_beyond_limit_are_unresolved() {
    let provider = provider(ScriptedProvider::new());
    let generator =
        ProfileGenerator::new(GenerationConfig::default()).with_provider(provider.clone());
    let req = request(vec![scene(
        1,
        &["A1", "A2", "A3", "A4", "A5", "A6"],
        &[],
        Some("Win"),
    )]);

    let result = generator.generate(&req).await.unwrap();

    assert_eq!(profile_names(&result), vec!["A1", "A2", "A3", "A4"]);
    assert_eq!(result.unresolved_references, vec!["A5", "A6"]);
    assert_eq!(provider.calls().len(), 4);
    assert!(provider.peak_in_flight() <= 4);
}

#[tokio::test]
async fn disabled_provider_leaves_everyone_unresolved() {
    let registry = Arc::new(MockRegistry::new(Vec::new()));
    let generator = ProfileGenerator::new(GenerationConfig::default()).with_registry(registry);

    let result = generator.generate(&documented_request()).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some(ERROR_LACKING_GUIDANCE));
    assert_eq!(result.unresolved_references, vec!["Rhea", "Marcus", "Guard"]);
}

// ---------------------------------------------------------------------------
// Registry degradation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registry_failure_degrades_to_empty_snapshot() {
    let registry = Arc::new(MockRegistry::with_fetch(FetchBehavior::Fail));
    let provider = provider(ScriptedProvider::new());

    let result = generator(registry.clone(), provider)
        .generate(&documented_request())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(profile_names(&result), vec!["Rhea", "Marcus"]);
    assert_eq!(registry.fetch_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_registry_is_abandoned_after_timeout() {
    let registry = Arc::new(MockRegistry::with_fetch(FetchBehavior::Hang(
        Duration::from_secs(3600),
    )));
    let config = GenerationConfig {
        registry_timeout: Duration::from_secs(2),
        ..GenerationConfig::default()
    };
    let generator = ProfileGenerator::new(config)
        .with_registry(registry)
        .with_provider(provider(ScriptedProvider::new()));

    let started = tokio::time::Instant::now();
    let result = generator.generate(&documented_request()).await.unwrap();

    assert!(result.success);
    assert!(started.elapsed() < Duration::from_secs(60));
}

// ---------------------------------------------------------------------------
// Validation and determinism
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_request_fails_before_any_external_call() {
    let registry = Arc::new(MockRegistry::new(Vec::new()));
    let provider = provider(ScriptedProvider::new());
    let generator = generator(registry.clone(), provider.clone());

    let err = generator.generate(&request(Vec::new())).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    let duplicate = request(vec![
        scene(1, &["Rhea"], &[], None),
        scene(1, &["Marcus"], &[], None),
    ]);
    assert_matches!(
        generator.generate(&duplicate).await,
        Err(CoreError::Validation(_))
    );

    assert_eq!(registry.fetch_calls(), 0);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let registry = Arc::new(MockRegistry::new(vec![registry_character(
        "reg-1",
        "John Smith",
        &["john", "jo"],
    )]));
    let generator = generator(registry, provider(ScriptedProvider::new()));
    let req = request(vec![
        scene(2, &["jo"], &["Clerk"], Some("Hide")),
        scene(1, &["john", "Mara"], &[], Some("Run")),
    ]);

    let first = generator.generate(&req).await.unwrap();
    let second = generator.generate(&req).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(profile_names(&first), vec!["John Smith", "Mara", "John Smith A"]);
    assert_eq!(first.unresolved_references, vec!["Clerk"]);
}

// ---------------------------------------------------------------------------
// Write-back
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generated_profiles_are_queued_for_write_back() {
    let registry = Arc::new(MockRegistry::new(Vec::new()));
    let (reconciler, handle) = Reconciler::new(registry.clone(), 8, Duration::from_secs(5));
    let generator = generator(registry.clone(), provider(ScriptedProvider::new()))
        .with_reconciler(handle);

    let result = generator.generate(&documented_request()).await.unwrap();

    // Submissions only happen once the worker runs.
    assert!(registry.submissions().is_empty());

    let cancel = CancellationToken::new();
    cancel.cancel();
    reconciler.run(cancel).await;

    let submissions = registry.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].0, "test-project");
    assert_eq!(submissions[0].1, result.character_profiles);
}
