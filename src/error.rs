use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::species::LookupError;

/// Every outcome the identification pipeline can surface to a presenter.
///
/// None of these are retried inside the crate. The remedy for any of them is
/// to run the pipeline again with a new image or a corrected name.
#[derive(Error, Debug)]
pub enum PokedexError {
    /// Missing or invalid configuration (e.g. no `OPENAI_API_KEY`).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The vision classifier call failed or produced no usable name.
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Name normalization produced an empty key.
    #[error("Invalid Pokémon name: {0:?}")]
    InvalidName(String),

    /// The species data source has no record for this key.
    #[error("No Pokémon named '{0}' was found")]
    NotFound(String),

    /// The species data source could not be reached or returned garbage.
    #[error("Species lookup failed: {0}")]
    LookupFailed(String),

    /// The image file could not be read.
    #[error("Failed to read image: {0}")]
    ImageRead(String),
}

impl PokedexError {
    /// Whether this is an expected "nothing recognised" outcome rather than a
    /// fault. Presenters use this to suggest retrying with a clearer image.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            PokedexError::InvalidName(_)
                | PokedexError::NotFound(_)
                | PokedexError::Classifier(ClassifierError::Unidentified(_))
        )
    }
}

impl From<LookupError> for PokedexError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(key) => PokedexError::NotFound(key),
            LookupError::Failed(message) => PokedexError::LookupFailed(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, PokedexError>;
