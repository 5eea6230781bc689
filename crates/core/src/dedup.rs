//! Fuzzy-name deduplication and merge.
//!
//! Records are first put into a canonical total order so that the streaming
//! merge produces the same canonical set no matter how the input arrived.
//! Within that order the first record seen for a name becomes the canonical
//! record and later duplicates are folded in with [`Restaurant::absorb`].

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::fuzzy;
use crate::restaurant::{RankSource, Restaurant};

/// Total order used before merging: shorter names first, then richer records.
fn canonical_order(a: &Restaurant, b: &Restaurant) -> Ordering {
    let (na, nb) = (a.normalized_name(), b.normalized_name());

    na.chars()
        .count()
        .cmp(&nb.chars().count())
        .then_with(|| na.cmp(&nb))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| {
            RankSource::ALL
                .iter()
                .map(|s| b.ranks.get(*s).total_cmp(&a.ranks.get(*s)))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.description.chars().count().cmp(&a.description.chars().count()))
        .then_with(|| a.description.cmp(&b.description))
        .then_with(|| b.price_range.cmp(&a.price_range))
        .then_with(|| a.cuisine_type.cmp(&b.cuisine_type))
        .then_with(|| a.booking_website.cmp(&b.booking_website))
        .then_with(|| a.priority_reasons.cmp(&b.priority_reasons))
        .then_with(|| b.priority_rank.total_cmp(&a.priority_rank))
        .then_with(|| a.date_added.cmp(&b.date_added))
}

/// Collapse duplicate restaurants into canonical records.
///
/// Order-insensitive and idempotent over the resulting set.
pub fn dedupe(restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
    let mut ordered = restaurants;
    ordered.sort_by(canonical_order);

    let mut canonical: Vec<Restaurant> = Vec::with_capacity(ordered.len());
    let mut keys: Vec<String> = Vec::with_capacity(ordered.len());
    let mut exact: HashMap<String, usize> = HashMap::new();

    for restaurant in ordered {
        let needle = restaurant.normalized_name();

        let found = exact
            .get(&needle)
            .copied()
            .or_else(|| keys.iter().position(|key| fuzzy::names_match(&needle, key)));

        match found {
            Some(idx) => canonical[idx].absorb(&restaurant),
            None => {
                exact.insert(needle.clone(), canonical.len());
                keys.push(needle);
                canonical.push(restaurant);
            }
        }
    }

    canonical
}
