//! # pokedex-vision
//!
//! Identify Pokémon from images with a vision LLM, then look them up on
//! [PokéAPI](https://pokeapi.co).
//!
//! ## Features
//!
//! - **Image classification** through any OpenAI-compatible chat completions
//!   endpoint (`gpt-4o` by default), with refusal detection
//! - **Name normalization** that turns chatty model answers
//!   (`"Pikachu!"`, `"Mr. Mime"`, `"Pikachu, possibly Raichu"`) into PokéAPI keys
//! - **Species lookup** with typed errors that keep "not found" apart from
//!   network failures
//! - **TTL cache** (1 hour by default) with an optional LRU capacity bound
//! - **Terminal presenter** and a per-user [`Session`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pokedex_vision::{render, Pokedex};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY (and .env) before any network call
//!     let dex = Pokedex::from_env()?;
//!
//!     match dex.identify_file(Path::new("photo.jpg")).await {
//!         Ok(found) => print!("{}", render::render_record(&found.record)),
//!         Err(e) => eprintln!("{}", render::render_error(&e)),
//!     }
//!
//!     // Lookups by name skip the classifier and hit the cache
//!     let pikachu = dex.lookup("Pikachu!").await?;
//!     assert!(pikachu.has_type("electric"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Name Normalization
//!
//! ```rust
//! use pokedex_vision::normalize_name;
//!
//! assert_eq!(normalize_name("Pikachu!").unwrap().as_str(), "pikachu");
//! assert_eq!(normalize_name("Mr. Mime").unwrap().as_str(), "mr-mime");
//! assert_eq!(normalize_name("Pikachu, possibly Raichu").unwrap().as_str(), "pikachu");
//! assert!(normalize_name("   ").is_err());
//! ```

pub mod cache;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod species;
pub mod types;

// Re-export main types at crate root
pub use cache::SpeciesCache;
pub use classifier::{classify, classify_image, ClassifierError};
pub use config::{CacheConfig, ClassifierConfig, PokedexConfig, SpeciesConfig};
pub use encoder::{encode_image, read_image_base64, sniff_mime};
pub use error::{PokedexError, Result};
pub use normalizer::{normalize_name, CanonicalKey};
pub use pipeline::Pokedex;
pub use session::Session;
pub use species::{LookupError, SpeciesClient, SpeciesSource};
pub use types::{Identification, SpeciesRecord, Stat};
