use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::future::Future;

use crate::config::SpeciesConfig;
use crate::normalizer::CanonicalKey;
use crate::types::{SpeciesRecord, Stat};

/// Anything that can resolve a [`CanonicalKey`] to a [`SpeciesRecord`].
///
/// [`SpeciesClient`] is the real implementation. The cache is generic over
/// this trait so lookups can be served from other sources in tests.
pub trait SpeciesSource: Send + Sync {
    /// Fetch the record for `key`. Called at most once per cache miss.
    fn fetch(
        &self,
        key: &CanonicalKey,
    ) -> impl Future<Output = Result<SpeciesRecord, LookupError>> + Send;
}

/// Errors from the species data source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    /// HTTP 404: the data source does not know this species.
    #[error("No species named '{0}'")]
    NotFound(String),

    /// Timeout, transport failure, non-404 error status or bad JSON.
    #[error("{0}")]
    Failed(String),
}

/// HTTP client for PokéAPI's `/pokemon/{name}` resource.
///
/// # Example
/// ```no_run
/// use pokedex_vision::{normalize_name, SpeciesClient, SpeciesConfig, SpeciesSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SpeciesClient::new(SpeciesConfig::default());
/// let record = client.fetch(&normalize_name("Pikachu")?).await?;
/// println!("{} is {:?}", record.name, record.types);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SpeciesClient {
    http: Client,
    config: SpeciesConfig,
}

impl SpeciesClient {
    pub fn new(config: SpeciesConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

impl SpeciesSource for SpeciesClient {
    async fn fetch(&self, key: &CanonicalKey) -> Result<SpeciesRecord, LookupError> {
        let url = format!("{}/pokemon/{}", self.config.endpoint, key);
        tracing::debug!(%key, %url, "fetching species");

        let resp = self
            .http
            .get(&url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Failed(format!("request to {} timed out", self.config.endpoint))
                } else {
                    LookupError::Failed(format!(
                        "cannot connect to {}: {}",
                        self.config.endpoint, e
                    ))
                }
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!(%key, "species not found");
            return Err(LookupError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%key, status = status.as_u16(), "species lookup failed");
            return Err(LookupError::Failed(format!(
                "data source returned HTTP {}: {}",
                status.as_u16(),
                truncate(&body, 200)
            )));
        }

        let raw: RawPokemon = resp
            .json()
            .await
            .map_err(|e| LookupError::Failed(format!("invalid species payload: {}", e)))?;

        Ok(raw.into_record())
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ── PokéAPI payload ─────────────────────────────────────────────────
// Only the fields a SpeciesRecord needs; serde ignores the rest.

#[derive(Debug, Deserialize)]
struct RawPokemon {
    name: String,
    height: u32,
    weight: u32,
    types: Vec<RawTypeSlot>,
    abilities: Vec<RawAbilitySlot>,
    stats: Vec<RawStat>,
    sprites: RawSprites,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawAbilitySlot {
    ability: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawStat {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
struct RawSprites {
    front_default: Option<String>,
    #[serde(default)]
    other: Option<RawOtherSprites>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<RawArtwork>,
}

#[derive(Debug, Default, Deserialize)]
struct RawArtwork {
    front_default: Option<String>,
}

impl RawPokemon {
    fn into_record(self) -> SpeciesRecord {
        let sprite = self
            .sprites
            .other
            .and_then(|o| o.official_artwork)
            .and_then(|a| a.front_default)
            .or(self.sprites.front_default);

        SpeciesRecord {
            name: self.name,
            types: dedup(self.types.into_iter().map(|t| t.kind.name)),
            abilities: dedup(self.abilities.into_iter().map(|a| a.ability.name)),
            height: self.height,
            weight: self.weight,
            sprite,
            stats: self
                .stats
                .into_iter()
                .map(|s| Stat {
                    name: s.stat.name,
                    value: s.base_stat,
                })
                .collect(),
        }
    }
}

/// Drop repeated names, keeping first occurrences in order.
fn dedup(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.filter(|n| seen.insert(n.clone())).collect()
}
