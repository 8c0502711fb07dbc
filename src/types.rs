use serde::{Deserialize, Serialize};

/// A single base stat, e.g. `("speed", 90)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub value: u32,
}

/// Structured attributes for one species as reported by PokéAPI.
///
/// `types` and `abilities` keep the API's order and never contain
/// duplicates. Units are PokéAPI's own: decimetres and hectograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub name: String,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Official artwork URL, if the API has one
    pub sprite: Option<String>,
    pub stats: Vec<Stat>,
}

impl SpeciesRecord {
    pub fn height_m(&self) -> f64 {
        f64::from(self.height) / 10.0
    }

    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight) / 10.0
    }

    /// Base value of the named stat (e.g. "hp", "special-attack").
    pub fn stat(&self, name: &str) -> Option<u32> {
        self.stats.iter().find(|s| s.name == name).map(|s| s.value)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }
}

/// Outcome of a full image-to-record run.
#[derive(Debug, Clone, Serialize)]
pub struct Identification {
    /// Raw answer from the vision model
    pub guess: String,
    /// Key derived from `guess` and used for the lookup
    pub key: crate::CanonicalKey,
    pub record: SpeciesRecord,
}
