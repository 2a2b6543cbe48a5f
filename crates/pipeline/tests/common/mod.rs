//! Shared test doubles for pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cast_core::character::{CharacterProfile, RegistryCharacter};
use cast_core::scene::{ConceptBrief, GenerateRequest, SceneEntry};
use cast_llm::{CompletionRequest, ProviderError, TextGenerator};
use cast_registry::{CharacterRegistry, RegistryError, SubmitAck};

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

pub fn scene(number: i64, primary: &[&str], secondary: &[&str], goal: Option<&str>) -> SceneEntry {
    SceneEntry {
        scene_number: number,
        primary_characters: primary.iter().map(|s| s.to_string()).collect(),
        secondary_characters: secondary.iter().map(|s| s.to_string()).collect(),
        goal: goal.map(str::to_string),
    }
}

pub fn brief() -> ConceptBrief {
    ConceptBrief {
        genre_tags: ["adventure".to_string(), "action".to_string()].into(),
        tone_keywords: ["suspenseful".to_string()].into(),
        core_conflict: "Fight against corruption".to_string(),
    }
}

pub fn request(scenes: Vec<SceneEntry>) -> GenerateRequest {
    GenerateRequest {
        scene_list: scenes,
        concept_brief: brief(),
        project_id: "test-project".to_string(),
    }
}

/// Scene 1: Rhea and Marcus primary, Guard secondary, with a goal.
/// Scene 2: Rhea alone, with a second goal.
pub fn documented_request() -> GenerateRequest {
    request(vec![
        scene(1, &["Rhea", "Marcus"], &["Guard"], Some("Escape from prison")),
        scene(2, &["Rhea"], &[], Some("Find the hidden treasure")),
    ])
}

pub fn registry_character(id: &str, name: &str, aliases: &[&str]) -> RegistryCharacter {
    RegistryCharacter {
        id: id.to_string(),
        canonical_name: name.to_string(),
        project_id: "test-project".to_string(),
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Registry double
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FetchBehavior {
    Return(Vec<RegistryCharacter>),
    Fail,
    Hang(Duration),
}

/// In-memory registry that records submissions.
pub struct MockRegistry {
    fetch: FetchBehavior,
    submit_fails: bool,
    submit_delay: Option<Duration>,
    fetch_calls: AtomicUsize,
    submissions: Mutex<Vec<(String, Vec<CharacterProfile>)>>,
}

impl MockRegistry {
    pub fn new(characters: Vec<RegistryCharacter>) -> Self {
        Self::with_fetch(FetchBehavior::Return(characters))
    }

    pub fn with_fetch(fetch: FetchBehavior) -> Self {
        Self {
            fetch,
            submit_fails: false,
            submit_delay: None,
            fetch_calls: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_submit(mut self) -> Self {
        self.submit_fails = true;
        self
    }

    pub fn slow_submit(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<(String, Vec<CharacterProfile>)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl CharacterRegistry for MockRegistry {
    async fn fetch(&self, _project_id: &str) -> Result<Vec<RegistryCharacter>, RegistryError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fetch {
            FetchBehavior::Return(characters) => Ok(characters.clone()),
            FetchBehavior::Fail => Err(RegistryError::ApiError {
                status: 503,
                body: "unavailable".to_string(),
            }),
            FetchBehavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Vec::new())
            }
        }
    }

    async fn submit(
        &self,
        project_id: &str,
        profiles: &[CharacterProfile],
    ) -> Result<SubmitAck, RegistryError> {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        self.submissions
            .lock()
            .unwrap()
            .push((project_id.to_string(), profiles.to_vec()));
        if self.submit_fails {
            return Err(RegistryError::ApiError {
                status: 500,
                body: "write rejected".to_string(),
            });
        }
        Ok(SubmitAck {
            created: profiles.len(),
            updated: 0,
            failed: 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Provider double
// ---------------------------------------------------------------------------

/// Scripted reply for one character.
#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Delayed(Duration, String),
    Fail(u16),
}

/// Provider that answers per character name, read from the
/// `Character: <name>,` line of the rendered prompt.
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn script(mut self, name: &str, script: Script) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn default_reply(name: &str) -> String {
        format!("Motivation: {name} seeks freedom.\nVisual signature: {name} wears a grey cloak.")
    }
}

fn character_name(prompt: &str) -> String {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("Character: "))
        .and_then(|rest| rest.split(',').next())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl TextGenerator for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let name = character_name(&request.prompt);
        self.calls.lock().unwrap().push(name.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let reply = match self.scripts.get(&name).cloned() {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Script::Fail(status)) => Err(ProviderError::ApiError {
                status,
                body: "scripted failure".to_string(),
            }),
            None => {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Self::default_reply(&name))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}

pub fn provider(scripted: ScriptedProvider) -> Arc<ScriptedProvider> {
    Arc::new(scripted)
}
