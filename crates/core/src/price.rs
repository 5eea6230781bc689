//! Price tier normalization.
//!
//! Model output and scraped text describe price in many ways ("$$$-$$$$",
//! "$$ to $$$", "upscale", "mid-range"). Everything funnels through
//! [`normalize_price`] into one of five tiers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceRange {
    #[default]
    Unknown,
    Budget,
    Moderate,
    Upscale,
    FineDining,
}

impl PriceRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Unknown => "",
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Upscale => "$$$",
            PriceRange::FineDining => "$$$$",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, PriceRange::Unknown)
    }

    fn from_symbols(symbols: &str) -> Self {
        match symbols.len() {
            0 => PriceRange::Unknown,
            1 => PriceRange::Budget,
            2 => PriceRange::Moderate,
            3 => PriceRange::Upscale,
            _ => PriceRange::FineDining,
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PriceRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PriceRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(normalize_price).unwrap_or_default())
    }
}

static DOLLAR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\${1,4}").expect("valid regex"));

static RANGE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)-|–|\bto\b").expect("valid regex"));

/// Keyword tiers, checked most expensive first. Patterns anchor on a word
/// start only, so "moderately" and "cheaper" still hit their tier.
static KEYWORDS: LazyLock<Vec<(Regex, PriceRange)>> = LazyLock::new(|| {
    [
        (r"very expensive|fine dining|splurge|luxur", PriceRange::FineDining),
        (r"expensive|upscale|pricey", PriceRange::Upscale),
        (r"moderate|mid-range|reasonable", PriceRange::Moderate),
        (r"cheap|budget|inexpensive|affordable", PriceRange::Budget),
    ]
    .into_iter()
    .map(|(words, tier)| (Regex::new(&format!(r"(?i)\b(?:{words})")).expect("valid regex"), tier))
    .collect()
});

fn longest_run(text: &str) -> Option<PriceRange> {
    DOLLAR_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .max_by_key(|run| run.len())
        .map(PriceRange::from_symbols)
}

/// Normalize an arbitrary price description. Total and deterministic.
///
/// Exact symbols pass through; ranges and embedded symbols resolve to the
/// longest `$` run; expense keywords map to a tier; anything else is unknown.
pub fn normalize_price(raw: &str) -> PriceRange {
    let price = raw.trim();
    if price.is_empty() {
        return PriceRange::Unknown;
    }

    match price {
        "$" => return PriceRange::Budget,
        "$$" => return PriceRange::Moderate,
        "$$$" => return PriceRange::Upscale,
        "$$$$" => return PriceRange::FineDining,
        _ => {}
    }

    if RANGE_SEPARATOR.is_match(price)
        && let Some(tier) = longest_run(price)
    {
        return tier;
    }

    if let Some(tier) = longest_run(price) {
        return tier;
    }

    KEYWORDS
        .iter()
        .find(|(pattern, _)| pattern.is_match(price))
        .map(|(_, tier)| *tier)
        .unwrap_or_default()
}

/// Interpret a model's single-token price answer; anything unparseable is unknown.
pub fn parse_price_answer(answer: &str) -> PriceRange {
    let answer = answer.trim().trim_matches(|c| c == '"' || c == '\'' || c == '.');
    if answer.eq_ignore_ascii_case("unknown") {
        return PriceRange::Unknown;
    }
    normalize_price(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_table() {
        let cases = [
            ("$", "$"),
            ("$$", "$$"),
            ("$$$", "$$$"),
            ("$$$$", "$$$$"),
            ("  $$ ", "$$"),
            ("$$$-$$$$", "$$$$"),
            ("$$$ - $$$$", "$$$$"),
            ("$$–$$$", "$$$"),
            ("$$ to $$$", "$$$"),
            ("$$$$ to $$", "$$$$"),
            ("around $$$", "$$$"),
            ("$$$$$", "$$$$"),
            ("Very expensive", "$$$$"),
            ("fine dining", "$$$$"),
            ("a splurge", "$$$$"),
            ("luxury tasting menu", "$$$$"),
            ("Luxurious tasting menu", "$$$$"),
            ("expensive", "$$$"),
            ("Upscale casual", "$$$"),
            ("pricey", "$$$"),
            ("moderate", "$$"),
            ("mid-range", "$$"),
            ("reasonable", "$$"),
            ("Moderately priced", "$$"),
            ("reasonably priced", "$$"),
            ("cheap eats", "$"),
            ("cheaper eats", "$"),
            ("budget", "$"),
            ("inexpensive", "$"),
            ("affordable", "$"),
            ("", ""),
            ("   ", ""),
            ("free", ""),
            ("unknown", ""),
            ("USD 40", ""),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_price(input).as_str(), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["$$$-$$$$", "moderate", "free", "$", "upscale"] {
            let once = normalize_price(input);
            assert_eq!(normalize_price(once.as_str()), once);
        }
    }

    #[test]
    fn test_parse_price_answer() {
        assert_eq!(parse_price_answer("$$$"), PriceRange::Upscale);
        assert_eq!(parse_price_answer("\"$$\"."), PriceRange::Moderate);
        assert_eq!(parse_price_answer("Unknown"), PriceRange::Unknown);
        assert_eq!(parse_price_answer("I cannot tell"), PriceRange::Unknown);
    }

    #[test]
    fn test_serde_normalizes() {
        let tier: PriceRange = serde_json::from_str("\"$$$ - $$$$\"").unwrap();
        assert_eq!(tier, PriceRange::FineDining);
        let tier: PriceRange = serde_json::from_str("null").unwrap();
        assert_eq!(tier, PriceRange::Unknown);
        assert_eq!(serde_json::to_string(&PriceRange::Moderate).unwrap(), "\"$$\"");
    }
}
