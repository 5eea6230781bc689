//! Rank aggregation and filtering.

use crate::restaurant::Restaurant;

/// Recompute `priority_rank` as the mean of the populated source ranks.
pub fn aggregate(restaurant: &mut Restaurant) {
    let (sum, count) = restaurant
        .ranks
        .nonzero()
        .fold((0.0, 0usize), |(sum, count), (_, rank)| (sum + rank, count + 1));

    restaurant.priority_rank = if count == 0 { 0.0 } else { sum / count as f64 };
}

/// Keep records at or above `threshold`.
pub fn retain_priority(restaurants: Vec<Restaurant>, threshold: f64) -> Vec<Restaurant> {
    restaurants.into_iter().filter(|r| r.priority_rank >= threshold).collect()
}

/// Highest priority first, ties broken by name.
pub fn sort_by_priority(restaurants: &mut [Restaurant]) {
    restaurants.sort_by(|a, b| {
        b.priority_rank
            .total_cmp(&a.priority_rank)
            .then_with(|| a.normalized_name().cmp(&b.normalized_name()))
    });
}

/// Clamp a model-reported prominence rank onto the rubric scale.
///
/// Non-positive and non-finite values mean "not ranked".
pub fn clamp_source_rank(rank: f64) -> f64 {
    if !rank.is_finite() || rank <= 0.0 { 0.0 } else { rank.clamp(1.0, 5.0) }
}

/// One line per populated source, e.g. `- Eater DC: 4.0/5.0`.
pub fn rankings_text(restaurant: &Restaurant) -> String {
    restaurant
        .ranks
        .nonzero()
        .map(|(source, rank)| format!("- {}: {rank:.1}/5.0", source.label()))
        .collect::<Vec<_>>()
        .join("\n")
}
