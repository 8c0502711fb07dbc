use reqwest::Client;
use std::path::Path;
use std::time::Instant;

use crate::cache::SpeciesCache;
use crate::classifier;
use crate::config::{ClassifierConfig, PokedexConfig};
use crate::encoder;
use crate::error::Result;
use crate::normalizer::normalize_name;
use crate::species::{SpeciesClient, SpeciesSource};
use crate::types::{Identification, SpeciesRecord};

/// The identification-and-lookup pipeline.
///
/// `identify` runs encode → classify → normalize → cached lookup, strictly
/// in sequence. `lookup` skips the classifier and starts from a typed name.
///
/// One `Pokedex` owns one cache; share it (e.g. behind an `Arc`) to share
/// cached lookups between sessions.
pub struct Pokedex<S = SpeciesClient> {
    http: Client,
    classifier: ClassifierConfig,
    cache: SpeciesCache<S>,
}

impl<S> std::fmt::Debug for Pokedex<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pokedex")
            .field("classifier", &self.classifier)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Pokedex<SpeciesClient> {
    /// Build a pipeline backed by PokéAPI.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the classifier credential is missing.
    pub fn new(config: PokedexConfig) -> Result<Self> {
        config.require_credential()?;
        Ok(Self::lookup_only(config))
    }

    /// Build a pipeline without checking for a classifier credential.
    ///
    /// `lookup` works as usual; `identify` fails with a configuration error
    /// before any network call if no credential was configured.
    pub fn lookup_only(config: PokedexConfig) -> Self {
        let http = Client::new();
        let source = SpeciesClient::new(config.species.clone()).with_http_client(http.clone());
        Self::with_source(config, source).with_http_client(http)
    }

    /// Load configuration from the environment and build a pipeline.
    pub fn from_env() -> Result<Self> {
        Self::new(PokedexConfig::from_env()?)
    }
}

impl<S: SpeciesSource> Pokedex<S> {
    /// Build a pipeline around a custom species source.
    pub fn with_source(config: PokedexConfig, source: S) -> Self {
        Self {
            http: Client::new(),
            cache: SpeciesCache::new(source, &config.cache),
            classifier: config.classifier,
        }
    }

    /// Use a custom `reqwest::Client` for classifier calls.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Identify the Pokémon in an image and fetch its record.
    ///
    /// # Errors
    ///
    /// Any [`PokedexError`](crate::PokedexError) category. A missing
    /// credential is reported before the image is sent anywhere; an empty
    /// normalized name stops the run before the lookup.
    pub async fn identify(&self, image: &[u8]) -> Result<Identification> {
        self.classifier.require_credential()?;

        let started = Instant::now();
        let guess = classifier::classify_image(&self.http, &self.classifier, image).await?;
        let key = normalize_name(&guess)?;
        let record = self.cache.get_or_fetch(&key).await?;

        tracing::info!(
            %guess,
            %key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "identified species"
        );

        Ok(Identification { guess, key, record })
    }

    /// Read an image file and [`identify`](Self::identify) it.
    pub async fn identify_file(&self, path: &Path) -> Result<Identification> {
        let image = encoder::read_image(path)?;
        self.identify(&image).await
    }

    /// Normalize a free-text name and fetch its record through the cache.
    pub async fn lookup(&self, name: &str) -> Result<SpeciesRecord> {
        let key = normalize_name(name)?;
        Ok(self.cache.get_or_fetch(&key).await?)
    }

    pub fn cache(&self) -> &SpeciesCache<S> {
        &self.cache
    }

    pub fn classifier_config(&self) -> &ClassifierConfig {
        &self.classifier
    }
}
