//! Shared fixtures for integration tests.

#![allow(dead_code)]

use pokedex_vision::{ClassifierConfig, PokedexConfig, SpeciesConfig};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

pub const API_KEY: &str = "sk-test";
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// Smallest valid JPEG header, enough for MIME sniffing.
pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00";

/// Config pointing both APIs at one mock server.
pub fn config_for(server: &MockServer) -> PokedexConfig {
    PokedexConfig {
        classifier: ClassifierConfig::with_api_key(API_KEY)
            .endpoint(format!("{}/v1", server.uri()))
            .timeout(Duration::from_secs(2)),
        species: SpeciesConfig::default()
            .endpoint(format!("{}/api/v2", server.uri()))
            .timeout(Duration::from_secs(2)),
        ..Default::default()
    }
}

/// A chat completion whose first choice says `content`.
pub fn chat_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 800, "completion_tokens": 2, "total_tokens": 802}
    })
}

/// Trimmed-down PokéAPI `/pokemon/pikachu` payload.
pub fn pikachu_payload() -> Value {
    json!({
        "id": 25,
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "base_experience": 112,
        "types": [
            {"slot": 1, "type": {"name": "electric", "url": "https://pokeapi.co/api/v2/type/13/"}}
        ],
        "abilities": [
            {"ability": {"name": "static", "url": ""}, "is_hidden": false, "slot": 1},
            {"ability": {"name": "lightning-rod", "url": ""}, "is_hidden": true, "slot": 3}
        ],
        "stats": [
            {"base_stat": 35, "effort": 0, "stat": {"name": "hp"}},
            {"base_stat": 55, "effort": 0, "stat": {"name": "attack"}},
            {"base_stat": 40, "effort": 0, "stat": {"name": "defense"}},
            {"base_stat": 50, "effort": 0, "stat": {"name": "special-attack"}},
            {"base_stat": 50, "effort": 0, "stat": {"name": "special-defense"}},
            {"base_stat": 90, "effort": 2, "stat": {"name": "speed"}}
        ],
        "sprites": {
            "front_default": "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png",
            "other": {
                "official-artwork": {
                    "front_default": "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/25.png"
                }
            }
        }
    })
}
