//! Plain-text rendering of records and errors for terminals.

use std::fmt::Write;

use crate::error::PokedexError;
use crate::types::SpeciesRecord;

/// Base stats shown, in display order.
const STAT_LABELS: &[(&str, &str)] = &[
    ("hp", "HP"),
    ("attack", "Attack"),
    ("defense", "Defense"),
    ("special-attack", "Sp. Atk"),
    ("special-defense", "Sp. Def"),
    ("speed", "Speed"),
];

/// Highest base stat any Pokémon has; bars are scaled against it.
const MAX_STAT: u32 = 255;
const BAR_WIDTH: usize = 30;

const RETRY_HINT: &str = "Try again with a clear image of a Pokémon.";

/// Render a record as a multi-line text card.
pub fn render_record(record: &SpeciesRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== {} ==", display_name(&record.name));
    if let Some(sprite) = &record.sprite {
        let _ = writeln!(out, "Artwork:   {}", sprite);
    }
    let _ = writeln!(out, "Types:     {}", join_display(&record.types));
    let _ = writeln!(out, "Height:    {:.1}m", record.height_m());
    let _ = writeln!(out, "Weight:    {:.1}kg", record.weight_kg());
    let _ = writeln!(out, "Abilities: {}", join_display(&record.abilities));
    let _ = writeln!(out);
    let _ = writeln!(out, "Base Stats");

    for (key, label) in STAT_LABELS {
        let value = record.stat(key).unwrap_or(0);
        let _ = writeln!(out, "{:<8} {:>3} {}", label, value, stat_bar(value));
    }

    out
}

/// Render a pipeline error as a short message, with a retry hint for
/// "nothing recognised" outcomes.
pub fn render_error(err: &PokedexError) -> String {
    if err.is_user_recoverable() {
        format!("No Pokémon found: {}\n{}", err, RETRY_HINT)
    } else {
        format!("Error: {}", err)
    }
}

/// Render a record as pretty-printed JSON.
pub fn render_json(record: &SpeciesRecord) -> serde_json::Result<String> {
    serde_json::to_string_pretty(record)
}

fn stat_bar(value: u32) -> String {
    let filled = (value.min(MAX_STAT) as usize * BAR_WIDTH + MAX_STAT as usize / 2) / MAX_STAT as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// `mr-mime` → `Mr-Mime`
fn display_name(name: &str) -> String {
    name.split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_display(items: &[String]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(|s| display_name(s))
        .collect::<Vec<_>>()
        .join(", ")
}
