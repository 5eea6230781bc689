//! Turning raw page text into ranked restaurant records.

use serde::Deserialize;
use serde_json::Value;

use super::{Discovery, prompts};
use crate::Error;
use crate::dedup::dedupe;
use crate::price::PriceRange;
use crate::provider::CompletionRequest;
use crate::ranking::clamp_source_rank;
use crate::restaurant::{RankSource, Restaurant};

/// Characters per model call.
pub const CHUNK_SIZE: usize = 50_000;

#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    #[serde(default)]
    restaurants: Vec<ExtractedRestaurant>,
}

#[derive(Debug, Deserialize)]
struct ExtractedRestaurant {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cuisine_type: Option<String>,
    #[serde(default)]
    price_range: PriceRange,
    #[serde(default)]
    booking_website: Option<String>,
    #[serde(default)]
    source_rank: Option<Value>,
    #[serde(default)]
    ranking_reason: Option<String>,
}

fn rank_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Split on character boundaries into pieces of at most `size` characters.
/// Blank text yields no chunks.
pub fn chunk_text(text: &str, size: usize) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);
    chunks
}

/// Some models fence JSON even in JSON mode.
fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse one extraction response. The source rank lands in the field the
/// source name routes to; unrecognized sources keep all ranks at zero.
pub fn parse_extraction(source: &str, body: &str) -> Result<Vec<Restaurant>, Error> {
    let payload: ExtractionPayload =
        serde_json::from_str(strip_code_fence(body)).map_err(|e| Error::ExtractParse(format!("{source}: {e}")))?;

    let rank_field = RankSource::from_source_name(source);

    Ok(payload
        .restaurants
        .into_iter()
        .filter_map(|item| {
            let name = item.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
            let mut restaurant = Restaurant::new(name);
            restaurant.description = item.description.unwrap_or_default();
            restaurant.cuisine_type = item.cuisine_type.unwrap_or_default();
            restaurant.price_range = item.price_range;
            restaurant.booking_website = item.booking_website.unwrap_or_default();
            restaurant.priority_reasons = item.ranking_reason.unwrap_or_default();

            let rank = clamp_source_rank(rank_value(item.source_rank.as_ref()));
            if let Some(field) = rank_field
                && rank > 0.0
            {
                restaurant.ranks.set(field, rank);
            }
            Some(restaurant)
        })
        .collect())
}

impl Discovery {
    /// Extract and rank restaurants from `raw_text` attributed to `source`.
    ///
    /// Long text is split into chunks sent one at a time; a failed chunk
    /// contributes nothing and the rest continue.
    pub async fn extract(&self, source: &str, raw_text: &str) -> Vec<Restaurant> {
        let chunks = chunk_text(raw_text, CHUNK_SIZE);
        let total = chunks.len();
        let mut found = Vec::new();

        for (idx, chunk) in chunks.into_iter().enumerate() {
            let chunk_label = if total > 1 { format!(" (chunk {}/{total})", idx + 1) } else { String::new() };
            let request = CompletionRequest::json(
                prompts::EXTRACTION_SYSTEM,
                prompts::extraction(source, &self.location, chunk, &chunk_label),
            );

            let parsed = match self.llm.complete(&request).await {
                Ok(body) => parse_extraction(source, &body),
                Err(e) => Err(e),
            };

            match parsed {
                Ok(restaurants) => {
                    tracing::debug!(source, chunk = idx + 1, total, count = restaurants.len(), "chunk extracted");
                    found.extend(restaurants);
                }
                Err(e) => tracing::warn!(source, chunk = idx + 1, total, error = %e, "chunk extraction failed"),
            }
        }

        dedupe(found)
    }
}
