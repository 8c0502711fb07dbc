use std::time::Duration;

use crate::error::{PokedexError, Result};

/// Environment variable names read by [`PokedexConfig::from_env`].
pub mod vars {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const CLASSIFIER_ENDPOINT: &str = "POKEDEX_CLASSIFIER_ENDPOINT";
    pub const MODEL: &str = "POKEDEX_MODEL";
    pub const SPECIES_ENDPOINT: &str = "POKEDEX_SPECIES_ENDPOINT";
    pub const TIMEOUT_SECS: &str = "POKEDEX_TIMEOUT_SECS";
    pub const CACHE_TTL_SECS: &str = "POKEDEX_CACHE_TTL_SECS";
    pub const CACHE_CAPACITY: &str = "POKEDEX_CACHE_CAPACITY";
}

pub const DEFAULT_CLASSIFIER_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_SPECIES_ENDPOINT: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Read a `.env` file from the working directory into the process
/// environment. A missing file is fine; an unreadable one is logged and
/// skipped.
pub fn load_dotenv() {
    warn_if_unreadable(dotenvy::dotenv());
}

/// Returns whether a warning was logged.
fn warn_if_unreadable<T>(loaded: dotenvy::Result<T>) -> bool {
    match loaded {
        Err(e) if !e.not_found() => {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
            true
        }
        _ => false,
    }
}

fn missing_credential() -> PokedexError {
    PokedexError::Configuration(format!(
        "required environment variable not set: {}",
        vars::OPENAI_API_KEY
    ))
}

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Configuration for the vision classifier client.
#[derive(Clone)]
pub struct ClassifierConfig {
    /// OpenAI-compatible API base (e.g., "https://api.openai.com/v1")
    pub endpoint: String,
    /// Vision model name (default: "gpt-4o")
    pub model: String,
    /// Bearer credential. Empty means "not configured".
    pub api_key: String,
    /// Request timeout (default: 5s)
    pub timeout: Duration,
    /// Maximum completion tokens; a name needs very few (default: 20)
    pub max_tokens: u32,
    /// Sampling temperature (default: 0.0)
    pub temperature: f32,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.trim().is_empty() { "<unset>" } else { "<redacted>" })
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CLASSIFIER_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(5),
            max_tokens: 20,
            temperature: 0.0,
        }
    }
}

impl ClassifierConfig {
    /// Create a new config with the given API key and default settings.
    /// Surrounding whitespace is trimmed from the key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            ..Default::default()
        }
    }

    /// Fail with [`PokedexError::Configuration`] unless a non-blank API key
    /// is set.
    pub fn require_credential(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(missing_credential());
        }
        Ok(())
    }

    /// Set the API base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = normalize(endpoint.into());
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the species data client.
#[derive(Debug, Clone)]
pub struct SpeciesConfig {
    /// PokéAPI base (e.g., "https://pokeapi.co/api/v2")
    pub endpoint: String,
    /// Request timeout (default: 5s)
    pub timeout: Duration,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SPECIES_ENDPOINT.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl SpeciesConfig {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = normalize(endpoint.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Cache policy for species lookups.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a lookup stays fresh (default: 1 hour)
    pub ttl: Duration,
    /// Maximum number of entries; `None` = unbounded (default: 128)
    pub capacity: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            capacity: Some(128),
        }
    }
}

/// Top-level configuration for a [`Pokedex`](crate::Pokedex).
#[derive(Debug, Clone, Default)]
pub struct PokedexConfig {
    pub classifier: ClassifierConfig,
    pub species: SpeciesConfig,
    pub cache: CacheConfig,
}

impl PokedexConfig {
    /// Load configuration from the process environment, after reading a
    /// `.env` file from the working directory if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`PokedexError::Configuration`] if `OPENAI_API_KEY` is unset or
    /// blank, or if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Same as [`from_env`](Self::from_env) without touching the process
    /// environment.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::from_vars_without_credential(&lookup)?;

        config.require_credential()?;
        Ok(config)
    }

    /// Like [`from_vars`](Self::from_vars) but does not require the
    /// classifier credential. Used by lookup-only commands.
    pub fn from_vars_without_credential<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup(vars::OPENAI_API_KEY) {
            config.classifier.api_key = key.trim().to_string();
        }
        if let Some(endpoint) = lookup(vars::CLASSIFIER_ENDPOINT) {
            config.classifier = config.classifier.endpoint(endpoint);
        }
        if let Some(model) = lookup(vars::MODEL) {
            config.classifier.model = model;
        }
        if let Some(endpoint) = lookup(vars::SPECIES_ENDPOINT) {
            config.species = config.species.endpoint(endpoint);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, vars::TIMEOUT_SECS)? {
            let timeout = Duration::from_secs(secs);
            config.classifier.timeout = timeout;
            config.species.timeout = timeout;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, vars::CACHE_TTL_SECS)? {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, vars::CACHE_CAPACITY)? {
            config.cache.capacity = (capacity > 0).then_some(capacity);
        }

        Ok(config)
    }

    /// Fail if the classifier credential is missing.
    pub fn require_credential(&self) -> Result<()> {
        self.classifier.require_credential()
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            PokedexError::Configuration(format!("invalid value for {}: {:?} ({})", name, raw, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = PokedexConfig::default();
        assert_eq!(config.classifier.endpoint, "https://api.openai.com/v1");
        assert_eq!(config.classifier.model, "gpt-4o");
        assert_eq!(config.classifier.timeout, Duration::from_secs(5));
        assert_eq!(config.classifier.max_tokens, 20);
        assert_eq!(config.species.endpoint, "https://pokeapi.co/api/v2");
        assert_eq!(config.species.timeout, Duration::from_secs(5));
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.cache.capacity, Some(128));
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let result = PokedexConfig::from_vars(lookup_from(&[]));
        assert!(matches!(result, Err(PokedexError::Configuration(_))));
    }

    #[test]
    fn blank_key_is_configuration_error() {
        let result = PokedexConfig::from_vars(lookup_from(&[("OPENAI_API_KEY", "   ")]));
        assert!(matches!(result, Err(PokedexError::Configuration(_))));
    }

    #[test]
    fn overrides_are_applied() {
        let config = PokedexConfig::from_vars(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("POKEDEX_CLASSIFIER_ENDPOINT", "http://localhost:9000/v1/"),
            ("POKEDEX_MODEL", "gpt-4o-mini"),
            ("POKEDEX_SPECIES_ENDPOINT", "http://localhost:9001/"),
            ("POKEDEX_TIMEOUT_SECS", "12"),
            ("POKEDEX_CACHE_TTL_SECS", "60"),
            ("POKEDEX_CACHE_CAPACITY", "0"),
        ]))
        .unwrap();

        assert_eq!(config.classifier.api_key, "sk-test");
        assert_eq!(config.classifier.endpoint, "http://localhost:9000/v1");
        assert_eq!(config.classifier.model, "gpt-4o-mini");
        assert_eq!(config.species.endpoint, "http://localhost:9001");
        assert_eq!(config.classifier.timeout, Duration::from_secs(12));
        assert_eq!(config.species.timeout, Duration::from_secs(12));
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.capacity, None);
    }

    #[test]
    fn unparseable_number_is_configuration_error() {
        let result = PokedexConfig::from_vars(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("POKEDEX_CACHE_TTL_SECS", "an hour"),
        ]));
        assert!(matches!(result, Err(PokedexError::Configuration(_))));
    }

    #[test]
    fn lookup_only_config_does_not_need_key() {
        let config = PokedexConfig::from_vars_without_credential(lookup_from(&[])).unwrap();
        assert!(config.require_credential().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ClassifierConfig::with_api_key("sk-very-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn with_api_key_trims_whitespace() {
        let config = ClassifierConfig::with_api_key("  sk-test \n");
        assert_eq!(config.api_key, "sk-test");
        assert!(config.require_credential().is_ok());
    }

    #[test]
    fn blank_api_key_fails_credential_check() {
        assert!(matches!(
            ClassifierConfig::with_api_key("   ").require_credential(),
            Err(PokedexError::Configuration(_))
        ));

        // A key assigned directly, bypassing the constructor, is judged the same way.
        let mut config = ClassifierConfig::default();
        config.api_key = " \t".to_string();
        assert!(config.require_credential().is_err());
    }

    #[test]
    fn missing_dotenv_is_silent_but_broken_one_warns() {
        use std::io::{Error, ErrorKind};

        assert!(!warn_if_unreadable(Ok(())));
        let missing = dotenvy::Error::Io(Error::new(ErrorKind::NotFound, "no .env"));
        assert!(!warn_if_unreadable::<()>(Err(missing)));

        let denied = dotenvy::Error::Io(Error::new(ErrorKind::PermissionDenied, "denied"));
        assert!(warn_if_unreadable::<()>(Err(denied)));
        let malformed = dotenvy::Error::LineParse("KEY=\"open".into(), 4);
        assert!(warn_if_unreadable::<()>(Err(malformed)));
    }
}
