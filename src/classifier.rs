use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Instant;

use crate::config::ClassifierConfig;
use crate::encoder;

const SYSTEM_PROMPT: &str =
    "You are a Pokémon identifier. Respond with ONLY the Pokémon name in lowercase.";

const USER_PROMPT: &str = "What Pokémon is this?";

/// Answers a model gives when it cannot see a Pokémon.
const REFUSALS: &[&str] = &[
    "none",
    "unknown",
    "not a pokemon",
    "not a pokémon",
    "no pokemon",
    "no pokémon",
    "unable to identify",
];

/// Identify the Pokémon in a raw image.
///
/// Encodes the bytes, sniffs the MIME type and calls [`classify`].
pub async fn classify_image(
    client: &Client,
    config: &ClassifierConfig,
    image: &[u8],
) -> Result<String, ClassifierError> {
    let encoded = encoder::encode_image(image);
    classify(client, config, &encoded, encoder::sniff_mime(image)).await
}

/// Ask the vision model which Pokémon a base64-encoded image shows.
///
/// Issues exactly one `POST {endpoint}/chat/completions` request and returns
/// the model's trimmed answer. Nothing is cached and nothing is retried.
///
/// # Errors
///
/// Returns an error if:
/// - `image_b64` is empty (no request is sent)
/// - The request times out or the endpoint is unreachable
/// - The API rejects the credential (401/403) or rate-limits (429)
/// - The response has no usable message content
/// - The model answers with a refusal such as "unknown"
pub async fn classify(
    client: &Client,
    config: &ClassifierConfig,
    image_b64: &str,
    mime: &str,
) -> Result<String, ClassifierError> {
    if image_b64.is_empty() {
        return Err(ClassifierError::EmptyImage);
    }

    let body = json!({
        "model": config.model,
        "messages": [
            {
                "role": "system",
                "content": SYSTEM_PROMPT,
            },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": USER_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": encoder::data_url(mime, image_b64) },
                    },
                ],
            },
        ],
        "max_tokens": config.max_tokens,
        "temperature": config.temperature,
    });

    let url = format!("{}/chat/completions", config.endpoint);
    tracing::debug!(model = %config.model, bytes = image_b64.len(), "sending image to classifier");
    let started = Instant::now();

    let resp = client
        .post(&url)
        .timeout(config.timeout)
        .bearer_auth(&config.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout
            } else {
                ClassifierError::Connection(config.endpoint.clone(), e.to_string())
            }
        })?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "classifier rejected request");
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClassifierError::AuthRejected,
            StatusCode::TOO_MANY_REQUESTS => ClassifierError::RateLimited,
            _ => ClassifierError::Http(status.as_u16(), text),
        });
    }

    let json: Value = resp.json().await.map_err(|e| {
        if e.is_timeout() {
            ClassifierError::Timeout
        } else {
            ClassifierError::MalformedResponse(e.to_string())
        }
    })?;

    let guess = extract_content(&json)?;
    tracing::info!(
        guess = %guess,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "classifier answered"
    );

    if is_refusal(&guess) {
        return Err(ClassifierError::Unidentified(guess));
    }

    Ok(guess)
}

/// Pull `choices[0].message.content` out of a chat completion.
fn extract_content(json: &Value) -> Result<String, ClassifierError> {
    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ClassifierError::MalformedResponse("missing message content".into()))?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClassifierError::MalformedResponse("empty message content".into()));
    }
    Ok(trimmed.to_string())
}

fn is_refusal(guess: &str) -> bool {
    let lowered = guess
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();
    REFUSALS.contains(&lowered.as_str())
}

/// Errors that can occur while classifying an image.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Image is empty")]
    EmptyImage,

    #[error("Classifier request timed out")]
    Timeout,

    #[error("Cannot connect to classifier at {0}: {1}")]
    Connection(String, String),

    #[error("Classifier rejected the API key")]
    AuthRejected,

    #[error("Classifier rate limit exceeded")]
    RateLimited,

    #[error("Classifier returned HTTP {0}: {1}")]
    Http(u16, String),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("No Pokémon recognised (model said {0:?})")]
    Unidentified(String),
}
