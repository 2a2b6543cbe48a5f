//! REST client for a Payload CMS `characters` collection.
//!
//! Endpoints used:
//!
//! - `GET  /api/characters?where[project_id][equals]=..&limit=100` (fetch)
//! - `GET  /api/characters?where[project_id][equals]=..&where[name][equals]=..&limit=1`
//! - `PATCH /api/characters/{id}` (update existing)
//! - `POST /api/characters` (create)

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use cast_core::character::{CharacterProfile, RegistryCharacter, Role};
use serde::{Deserialize, Serialize};

use crate::client::{CharacterRegistry, RegistryError, SubmitAck};

/// Maximum records requested per fetch.
const FETCH_LIMIT: &str = "100";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection settings for the registry.
#[derive(Clone)]
pub struct RegistryConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Bearer token, if the collection requires one.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***masked***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Payload returns `{ "docs": [...] }`; plain arrays are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Paginated { docs: Vec<CharacterRecord> },
    Bare(Vec<CharacterRecord>),
}

impl ListResponse {
    fn into_docs(self) -> Vec<CharacterRecord> {
        match self {
            Self::Paginated { docs } | Self::Bare(docs) => docs,
        }
    }
}

/// Record ids may be strings or numbers depending on the database adapter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Array fields in Payload come back as `[{ "alias": "..." }]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AliasEntry {
    Plain(String),
    Row { alias: String },
}

impl AliasEntry {
    fn into_string(self) -> String {
        match self {
            Self::Plain(s) | Self::Row { alias: s } => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CharacterRecord {
    id: RecordId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    aliases: Vec<AliasEntry>,
}

impl CharacterRecord {
    /// Convert to the domain type; records without a usable name are dropped.
    fn into_registry_character(self, project_id: &str) -> Option<RegistryCharacter> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        Some(RegistryCharacter {
            id: self.id.to_string(),
            canonical_name: name,
            project_id: self.project_id.unwrap_or_else(|| project_id.to_string()),
            aliases: self
                .aliases
                .into_iter()
                .map(AliasEntry::into_string)
                .collect(),
        })
    }
}

/// Document body for create and update calls.
#[derive(Debug, Serialize)]
struct CharacterDocument<'a> {
    name: &'a str,
    project_id: &'a str,
    role: Role,
    motivation: &'a str,
    visual_signature: &'a str,
    relationships: &'a [String],
    continuity_notes: &'a [String],
}

impl<'a> CharacterDocument<'a> {
    fn new(project_id: &'a str, profile: &'a CharacterProfile) -> Self {
        Self {
            name: &profile.name,
            project_id,
            role: profile.role,
            motivation: &profile.motivation,
            visual_signature: &profile.visual_signature,
            relationships: &profile.relationships,
            continuity_notes: &profile.continuity_notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upserted {
    Created,
    Updated,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one Payload CMS instance.
pub struct PayloadRegistry {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PayloadRegistry {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: RegistryConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/characters", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Look up a record id by exact name within the project.
    async fn find_id_by_name(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Option<String>, RegistryError> {
        let request = self.client.get(self.collection_url()).query(&[
            ("where[project_id][equals]", project_id),
            ("where[name][equals]", name),
            ("limit", "1"),
        ]);
        let response = self.authorize(request).send().await?;
        let list: ListResponse = Self::parse_response(response).await?;
        Ok(list
            .into_docs()
            .into_iter()
            .next()
            .map(|record| record.id.to_string()))
    }

    async fn upsert(
        &self,
        project_id: &str,
        profile: &CharacterProfile,
    ) -> Result<Upserted, RegistryError> {
        let document = CharacterDocument::new(project_id, profile);

        match self.find_id_by_name(project_id, &profile.name).await? {
            Some(id) => {
                let request = self
                    .client
                    .patch(format!("{}/{}", self.collection_url(), id))
                    .json(&document);
                let response = self.authorize(request).send().await?;
                Self::check_status(response).await?;
                Ok(Upserted::Updated)
            }
            None => {
                let request = self.client.post(self.collection_url()).json(&document);
                let response = self.authorize(request).send().await?;
                Self::check_status(response).await?;
                Ok(Upserted::Created)
            }
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or turn it into a
    /// [`RegistryError::ApiError`] carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RegistryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RegistryError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RegistryError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), RegistryError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CharacterRegistry for PayloadRegistry {
    async fn fetch(&self, project_id: &str) -> Result<Vec<RegistryCharacter>, RegistryError> {
        let request = self.client.get(self.collection_url()).query(&[
            ("where[project_id][equals]", project_id),
            ("limit", FETCH_LIMIT),
        ]);
        let response = self.authorize(request).send().await?;
        let list: ListResponse = Self::parse_response(response).await?;

        let characters: Vec<RegistryCharacter> = list
            .into_docs()
            .into_iter()
            .filter_map(|record| record.into_registry_character(project_id))
            .collect();

        tracing::debug!(project_id, count = characters.len(), "Fetched registry characters");
        Ok(characters)
    }

    async fn submit(
        &self,
        project_id: &str,
        profiles: &[CharacterProfile],
    ) -> Result<SubmitAck, RegistryError> {
        let mut ack = SubmitAck::default();
        let mut last_error = None;

        for profile in profiles {
            match self.upsert(project_id, profile).await {
                Ok(Upserted::Created) => ack.created += 1,
                Ok(Upserted::Updated) => ack.updated += 1,
                Err(e) => {
                    tracing::warn!(
                        project_id,
                        character = %profile.name,
                        error = %e,
                        "Registry upsert failed",
                    );
                    ack.failed += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if ack.failed == profiles.len() => Err(e),
            _ => Ok(ack),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
