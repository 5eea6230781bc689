//! Prompt templates for every model call the pipeline makes.

pub const EXTRACTION_SYSTEM: &str = "You extract and rank restaurants from food publications. You read web content \
from authoritative sources, return structured restaurant data, and rank each restaurant by how prominently \
the source features it.";

pub const PRICE_SYSTEM: &str = "You are a restaurant price analyst. Determine the price tier from search results.";

pub const REASONS_SYSTEM: &str = "You write short, persuasive notes on why a restaurant deserves a place on an \
upscale date night list.";

pub const EDIT_SYSTEM: &str = "You turn restaurant list management requests into structured actions.";

/// Model fallback when a reasons call fails.
pub const GENERIC_REASON: &str = "Featured in multiple authoritative DC food sources.";

/// Reason recorded for a record no source ranked.
pub const UNRANKED_REASON: &str = "No source rankings available";

/// Extraction prompt for one chunk. `chunk_label` is empty for single-chunk content.
pub fn extraction(source: &str, location: &str, content: &str, chunk_label: &str) -> String {
    format!(
        r#"Below is content from {source}{chunk_label}. Extract and rank the restaurants that are FEATURED ENTRIES in it.

SCOPE:
- Location: the {location} area, nearby suburbs included
- Only restaurants with their own entry (heading, write-up, address or booking details)
- Any price range; filtering happens later

SKIP:
- Restaurants only mentioned inside another entry ("from the team behind X", "sister spot to Y")
- "See more" or "Related" links
- Update notes describing what was added to or removed from the list

SOURCE CONTENT:
{content}

For each featured restaurant return:
1. name: the official name
2. description: 1-3 sentences drawn from the article
3. cuisine_type: e.g. Italian, French, Japanese
4. price_range: one of $, $$, $$$, $$$$ for dinner per person with one drink
   $ under $25, $$ $25-50, $$$ $50-100, $$$$ over $100.
   Without explicit prices: tasting menu, omakase or Michelin star means $$$$; "upscale" or "special occasion"
   means $$$ or $$$$; neighborhood or everyday spots are $$; counter service is $. Use "" when unknown.
5. booking_website: reservation URL if given, otherwise ""
6. source_rank: 1.0-5.0, how prominently THIS source features the restaurant.
   Weigh list position, awards (stars, Bib Gourmand, "Best New"), intensity of praise, lead vs footnote placement,
   and recency.
   5.0 top three, starred, or "best in the city"
   4.0 top ten, Bib Gourmand, "essential", strongly praised
   3.0 featured with a positive write-up
   2.0 included but not a standout
   1.0 passing mention, filler, or mixed review
7. ranking_reason: one sentence explaining the rank

Respond with JSON in exactly this shape:
{{
  "restaurants": [
    {{
      "name": "Restaurant Name",
      "description": "Brief description",
      "cuisine_type": "Italian",
      "price_range": "$$$",
      "booking_website": "https://...",
      "source_rank": 4.5,
      "ranking_reason": "Listed third on the essential list with a glowing review"
    }}
  ]
}}

If nothing qualifies, return {{"restaurants": []}}."#
    )
}

/// Price-tier prompt. `search_content` is truncated to 4000 characters.
pub fn price(name: &str, location: &str, search_content: &str) -> String {
    let excerpt: String = search_content.chars().take(4000).collect();
    format!(
        r#"From the search results below, determine the price tier of {name} in {location}.

SEARCH RESULTS:
{excerpt}

Tiers, per person for dinner with one drink:
- $: under $25
- $$: $25-50
- $$$: $50-100
- $$$$: over $100

Look for menu prices, tasting menu prices, average check mentions, and words like "fine dining", "casual" or "upscale".

Reply with ONLY the tier symbol ($, $$, $$$ or $$$$), or "unknown" if it cannot be determined."#
    )
}

/// Priority-reasons prompt.
pub fn reasons(name: &str, description: &str, priority_rank: f64, rankings_text: &str) -> String {
    format!(
        r#"In 1-3 sentences, explain why this restaurant is prioritized for an upscale date night list.

RESTAURANT:
Name: {name}
Description: {description}
Overall Ranking: {priority_rank:.1}/5.0

SOURCE RANKINGS:
{rankings_text}

Mention list placements or awards, standout qualities (cooking, creativity, atmosphere, drinks) and recent acclaim.
Reply with plain text only, no JSON."#
    )
}

/// Edit-command parsing prompt.
pub fn edit_command(user_message: &str) -> String {
    format!(
        r#"Turn this request into a structured action:

USER COMMAND: "{user_message}"

Actions:
- "remove": remove a restaurant from the list
- "add": add a restaurant by hand
- "update": change a restaurant's details

Extract the action, the restaurant name if one is mentioned, the field to change if any
(description, priority_rank, ...), and the new value if any.

Respond with JSON:
{{
  "action": "remove",
  "restaurant_name": "Restaurant X",
  "field": null,
  "new_value": null
}}"#
    )
}
