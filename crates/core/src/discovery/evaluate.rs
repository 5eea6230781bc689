//! Evaluation: aggregate ranks, write reasons, fill prices, filter, sort.

use super::{Discovery, fan_out, prompts};
use crate::Error;
use crate::cache::{CacheKind, price_identifier};
use crate::price::{PriceRange, parse_price_answer};
use crate::provider::{CompletionRequest, SearchQuery};
use crate::ranking::{aggregate, rankings_text, retain_priority, sort_by_priority};
use crate::restaurant::Restaurant;

const REASONS_POOL: usize = 10;

const PRICE_POOL: usize = 5;

const PRICE_RESULTS: u32 = 3;

/// Characters of page text kept per price search hit.
const PRICE_HIT_CHARS: usize = 2000;

impl Discovery {
    /// Turn deduplicated candidates into the ranked, filtered presentation list.
    pub async fn evaluate(&self, restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
        let mut restaurants = restaurants;
        restaurants.iter_mut().for_each(aggregate);

        let restaurants = self.write_reasons(restaurants).await;
        let restaurants = self.enrich_prices(restaurants).await;

        let before = restaurants.len();
        let mut kept = retain_priority(restaurants, self.min_priority_rank);
        sort_by_priority(&mut kept);

        tracing::info!(before, kept = kept.len(), threshold = self.min_priority_rank, "evaluation complete");
        kept
    }

    /// Ask the model why a ranked restaurant belongs on the list.
    pub async fn priority_reason(&self, restaurant: &Restaurant) -> Result<String, Error> {
        let request = CompletionRequest::text(
            prompts::REASONS_SYSTEM,
            prompts::reasons(
                &restaurant.name,
                &restaurant.description,
                restaurant.priority_rank,
                &rankings_text(restaurant),
            ),
        );
        let reason = self.llm.complete(&request).await?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::LlmFailed("empty reasons response".into()));
        }
        Ok(reason.to_string())
    }

    async fn write_reasons(&self, restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
        let ranked: Vec<(String, Restaurant)> = restaurants
            .iter()
            .filter(|r| r.priority_rank > 0.0)
            .map(|r| (r.name.clone(), r.clone()))
            .collect();

        let this = self.clone();
        let reports = fan_out(ranked, REASONS_POOL, move |restaurant| {
            let this = this.clone();
            async move { this.priority_reason(&restaurant).await }
        })
        .await;
        let mut reports = reports.into_iter();

        restaurants
            .into_iter()
            .map(|mut restaurant| {
                if restaurant.priority_rank > 0.0 {
                    restaurant.priority_reasons = match reports.next().map(|report| report.outcome) {
                        Some(Ok(reason)) => reason,
                        Some(Err(e)) => {
                            tracing::warn!(name = %restaurant.name, error = %e, "reasons failed");
                            prompts::GENERIC_REASON.to_string()
                        }
                        None => prompts::GENERIC_REASON.to_string(),
                    };
                } else if restaurant.priority_reasons.trim().is_empty() {
                    restaurant.priority_reasons = prompts::UNRANKED_REASON.to_string();
                }
                restaurant
            })
            .collect()
    }

    /// Look up the price tier of `name` in the configured location.
    ///
    /// Known tiers are cached; an undetermined tier is retried next run.
    pub async fn price_for(&self, name: &str) -> Result<PriceRange, Error> {
        let identifier = price_identifier(name, &self.location);
        if let Some(tier) = self.cache.get::<PriceRange>(&identifier, CacheKind::Price).await
            && !tier.is_unknown()
        {
            return Ok(tier);
        }

        let query = SearchQuery::new(format!(
            "{name} {} restaurant price cost per person menu",
            self.location
        ))
        .max_results(PRICE_RESULTS)
        .raw_content();
        let hits = self.search.search(&query).await?;

        let content = hits
            .iter()
            .map(|hit| match hit.raw_content.as_deref() {
                Some(raw) if !raw.trim().is_empty() => raw.chars().take(PRICE_HIT_CHARS).collect(),
                _ => hit.content.clone(),
            })
            .filter(|text: &String| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if content.is_empty() {
            return Ok(PriceRange::Unknown);
        }

        let request =
            CompletionRequest::text(prompts::PRICE_SYSTEM, prompts::price(name, &self.location, &content)).max_tokens(10);
        let tier = parse_price_answer(&self.llm.complete(&request).await?);

        if !tier.is_unknown() {
            self.cache.set(&identifier, CacheKind::Price, &tier).await;
        }
        Ok(tier)
    }

    /// Fill unknown price tiers. Lookup failures leave the tier unknown.
    async fn enrich_prices(&self, mut restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
        let unknown: Vec<(String, (usize, String))> = restaurants
            .iter()
            .enumerate()
            .filter(|(_, r)| r.price_range.is_unknown())
            .map(|(idx, r)| (r.name.clone(), (idx, r.name.clone())))
            .collect();
        if unknown.is_empty() {
            return restaurants;
        }

        let indices: Vec<usize> = unknown.iter().map(|(_, (idx, _))| *idx).collect();
        let this = self.clone();
        let reports = fan_out(unknown, PRICE_POOL, move |(_, name)| {
            let this = this.clone();
            async move { this.price_for(&name).await }
        })
        .await;

        let mut filled = 0;
        for (idx, report) in indices.into_iter().zip(reports) {
            match report.outcome {
                Ok(tier) if !tier.is_unknown() => {
                    restaurants[idx].price_range = tier;
                    filled += 1;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(name = %report.label, error = %e, "price lookup failed"),
            }
        }

        tracing::info!(filled, "prices enriched");
        restaurants
    }
}
