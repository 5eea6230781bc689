//! The restaurant record and its per-source rank fields.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::price::PriceRange;

/// A publication whose prominence rank we track in its own field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankSource {
    EaterDc,
    MichelinGuide,
    WashingtonPost,
    Washingtonian,
    Infatuation,
}

impl RankSource {
    pub const ALL: [RankSource; 5] = [
        RankSource::EaterDc,
        RankSource::MichelinGuide,
        RankSource::WashingtonPost,
        RankSource::Washingtonian,
        RankSource::Infatuation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RankSource::EaterDc => "Eater DC",
            RankSource::MichelinGuide => "Michelin Guide",
            RankSource::WashingtonPost => "Washington Post",
            RankSource::Washingtonian => "Washingtonian",
            RankSource::Infatuation => "Infatuation",
        }
    }

    /// Route a source name (possibly carrying a strategy suffix such as
    /// `" (direct)"`) to its rank field. Unrecognized names route nowhere.
    pub fn from_source_name(source: &str) -> Option<Self> {
        let base = source.replace(" (direct)", "").replace(" (deep)", "");
        let base = base.trim().to_lowercase();

        if base.contains("eater") {
            Some(RankSource::EaterDc)
        } else if base.contains("michelin") {
            Some(RankSource::MichelinGuide)
        } else if base.contains("washington post") {
            Some(RankSource::WashingtonPost)
        } else if base.contains("washingtonian") {
            Some(RankSource::Washingtonian)
        } else if base.contains("infatuation") {
            Some(RankSource::Infatuation)
        } else {
            None
        }
    }
}

/// Five independent rank fields, each in `[0, 5]` with 0 meaning unranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRanks {
    #[serde(default)]
    pub eater_dc_rank: f64,
    #[serde(default)]
    pub michelin_guide_rank: f64,
    #[serde(default)]
    pub washington_post_rank: f64,
    #[serde(default)]
    pub washingtonian_rank: f64,
    #[serde(default)]
    pub infatuation_rank: f64,
}

impl SourceRanks {
    pub fn get(&self, source: RankSource) -> f64 {
        match source {
            RankSource::EaterDc => self.eater_dc_rank,
            RankSource::MichelinGuide => self.michelin_guide_rank,
            RankSource::WashingtonPost => self.washington_post_rank,
            RankSource::Washingtonian => self.washingtonian_rank,
            RankSource::Infatuation => self.infatuation_rank,
        }
    }

    pub fn set(&mut self, source: RankSource, rank: f64) {
        let slot = match source {
            RankSource::EaterDc => &mut self.eater_dc_rank,
            RankSource::MichelinGuide => &mut self.michelin_guide_rank,
            RankSource::WashingtonPost => &mut self.washington_post_rank,
            RankSource::Washingtonian => &mut self.washingtonian_rank,
            RankSource::Infatuation => &mut self.infatuation_rank,
        };
        *slot = rank;
    }

    /// Populated ranks in field order.
    pub fn nonzero(&self) -> impl Iterator<Item = (RankSource, f64)> + '_ {
        RankSource::ALL
            .into_iter()
            .map(|s| (s, self.get(s)))
            .filter(|(_, r)| *r > 0.0)
    }

    /// Fill each unranked field from `other` if it has a value there.
    pub fn fill_from(&mut self, other: &SourceRanks) {
        for source in RankSource::ALL {
            let incoming = other.get(source);
            if self.get(source) == 0.0 && incoming > 0.0 {
                self.set(source, incoming);
            }
        }
    }
}

/// A discovered or persisted restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    #[serde(default)]
    pub booking_website: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub cuisine_type: String,
    #[serde(flatten)]
    pub ranks: SourceRanks,
    /// Mean of the nonzero source ranks as of the last aggregation.
    #[serde(default)]
    pub priority_rank: f64,
    #[serde(default)]
    pub priority_reasons: String,
    #[serde(default = "today")]
    pub date_added: NaiveDate,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Restaurant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            booking_website: String::new(),
            description: String::new(),
            price_range: PriceRange::Unknown,
            cuisine_type: String::new(),
            ranks: SourceRanks::default(),
            priority_rank: 0.0,
            priority_reasons: String::new(),
            date_added: today(),
        }
    }

    /// Lowercased, trimmed name used as the identity key.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Merge a duplicate report into this canonical record.
    ///
    /// String fields are filled only when empty, except the description which
    /// also takes the longer of two non-empty values. Rank fields keep the
    /// first nonzero value seen for each source.
    pub fn absorb(&mut self, other: &Restaurant) {
        if !other.description.is_empty() && other.description.chars().count() > self.description.chars().count() {
            self.description = other.description.clone();
        }
        if self.price_range.is_unknown() && !other.price_range.is_unknown() {
            self.price_range = other.price_range;
        }
        if self.cuisine_type.is_empty() && !other.cuisine_type.is_empty() {
            self.cuisine_type = other.cuisine_type.clone();
        }
        if self.booking_website.is_empty() && !other.booking_website.is_empty() {
            self.booking_website = other.booking_website.clone();
        }
        self.ranks.fill_from(&other.ranks);
    }

    /// Multi-line block used when presenting a recommendation.
    pub fn detail_block(&self, position: usize) -> String {
        format!(
            "{position}. **{}**\n   Description: {}\n   Overall Priority Rank: {:.1}/5.0\n   Priority Reasons: {}\n   Cuisine: {} | Price: {}\n",
            self.name,
            self.description,
            self.priority_rank,
            self.priority_reasons,
            self.cuisine_type,
            self.price_range
        )
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
