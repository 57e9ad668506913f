//! Data Marketplace
//!
//! Catalog of shareable vehicle data streams and the reward math behind them.
//! Features:
//! - Static listing catalog with per-listing sharing toggle
//! - Daily reward totals over shared listings
//! - Per-kind reward multipliers that compose multiplicatively
//! - Category filtering for the listing view
//!
//! Listings are session state; nothing here is persisted.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Base DCL reward per shared data kind
pub const BASE_REWARD: f64 = 0.001;

/// Reward token unit shown next to amounts
pub const TOKEN_UNIT: &str = "DCL";

/// Listing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataCategory {
    /// Trips and positions
    Location,
    /// Speed, rpm and other live readings
    Metrics,
    /// Trouble codes and maintenance
    Diagnostics,
    /// Fuel and energy use
    Efficiency,
    /// Driving behavior
    Safety,
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataCategory::Location => "Location",
            DataCategory::Metrics => "Metrics",
            DataCategory::Diagnostics => "Diagnostics",
            DataCategory::Efficiency => "Efficiency",
            DataCategory::Safety => "Safety",
        };
        f.write_str(name)
    }
}

/// How much a listing reveals about the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrivacyLevel {
    /// Aggregated, hard to trace back
    Low,
    /// Partly identifying
    Medium,
    /// Identifies where the driver goes
    High,
}

impl PrivacyLevel {
    /// Badge color used by the listing card
    pub fn badge_color(&self) -> &'static str {
        match self {
            PrivacyLevel::Low => "#4CD964",
            PrivacyLevel::Medium => "#FF9500",
            PrivacyLevel::High => "#FF3B30",
        }
    }
}

/// A marketplace entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataListingItem {
    /// Stable listing id
    pub id: String,
    /// Display name
    pub name: String,
    /// What the buyer receives
    pub description: String,
    /// Listing category
    pub category: DataCategory,
    /// Whether the driver currently shares this data
    pub shared: bool,
    /// DCL per day while shared
    pub rewards_per_day: f64,
    /// Privacy exposure of the data
    pub privacy_level: PrivacyLevel,
    /// Icon symbol name
    pub icon: String,
}

impl DataListingItem {
    /// Daily reward formatted for the listing card, e.g. `0.05 DCL/day`
    pub fn formatted_reward(&self) -> String {
        format!("{:.2} {}/day", self.rewards_per_day, TOKEN_UNIT)
    }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: &str,
    name: &str,
    description: &str,
    category: DataCategory,
    shared: bool,
    rewards_per_day: f64,
    privacy_level: PrivacyLevel,
    icon: &str,
) -> DataListingItem {
    DataListingItem {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        shared,
        rewards_per_day,
        privacy_level,
        icon: icon.to_string(),
    }
}

/// Catalog loaded at session start
pub fn default_catalog() -> Vec<DataListingItem> {
    vec![
        listing(
            "1",
            "Location History",
            "Anonymized GPS traces used for traffic and mobility planning.",
            DataCategory::Location,
            true,
            0.05,
            PrivacyLevel::High,
            "location.fill",
        ),
        listing(
            "2",
            "Driving Metrics",
            "Speed, RPM and throttle samples for driving-behavior research.",
            DataCategory::Metrics,
            false,
            0.04,
            PrivacyLevel::Medium,
            "speedometer",
        ),
        listing(
            "3",
            "Diagnostic Codes",
            "Trouble codes and engine health for predictive maintenance.",
            DataCategory::Diagnostics,
            true,
            0.07,
            PrivacyLevel::Low,
            "wrench.and.screwdriver.fill",
        ),
        listing(
            "4",
            "Energy Efficiency",
            "Battery, range and power usage for EV charging networks.",
            DataCategory::Efficiency,
            false,
            0.03,
            PrivacyLevel::Low,
            "leaf.fill",
        ),
        listing(
            "5",
            "Safety Events",
            "Hard braking and rapid acceleration events for road-safety studies.",
            DataCategory::Safety,
            true,
            0.12,
            PrivacyLevel::Medium,
            "shield.fill",
        ),
    ]
}

/// Flip `shared` on the listing with `id`. Unknown ids leave the listings untouched.
pub fn toggle_sharing(mut listings: Vec<DataListingItem>, id: &str) -> Vec<DataListingItem> {
    match listings.iter_mut().find(|item| item.id == id) {
        Some(item) => item.shared = !item.shared,
        None => tracing::warn!("Toggle requested for unknown listing {id:?}"),
    }
    listings
}

/// Sum of `rewards_per_day` over shared listings
pub fn total_daily_reward(listings: &[DataListingItem]) -> f64 {
    listings
        .iter()
        .filter(|item| item.shared)
        .map(|item| item.rewards_per_day)
        .sum()
}

/// Multiplier applied when a data kind is shared
pub fn kind_multiplier(kind: &str) -> f64 {
    match kind {
        "location" => 1.5,
        "diagnostics" => 1.3,
        "speed" => 1.1,
        _ => 1.0,
    }
}

/// Reward for sharing a set of data kinds.
///
/// `BASE_REWARD × distinct kinds × product of per-kind multipliers`. Kinds are
/// matched case-insensitively; unknown kinds count toward the total with a
/// multiplier of 1.
pub fn calculate_reward<I, S>(shared_kinds: I) -> f64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let kinds: BTreeSet<String> = shared_kinds
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let multiplier: f64 = kinds.iter().map(|k| kind_multiplier(k)).product();
    BASE_REWARD * kinds.len() as f64 * multiplier
}

/// Owned listing collection for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marketplace {
    listings: Vec<DataListingItem>,
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl Marketplace {
    /// Wrap an existing listing collection
    pub fn new(listings: Vec<DataListingItem>) -> Self {
        Self { listings }
    }

    /// All listings in catalog order
    pub fn listings(&self) -> &[DataListingItem] {
        &self.listings
    }

    /// Find a listing by id
    pub fn get(&self, id: &str) -> Option<&DataListingItem> {
        self.listings.iter().find(|item| item.id == id)
    }

    /// Flip a listing's sharing flag. Returns the new flag, `None` for unknown ids.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let listings = std::mem::take(&mut self.listings);
        self.listings = toggle_sharing(listings, id);
        self.get(id).map(|item| item.shared)
    }

    /// Set a listing's sharing flag explicitly. Returns false for unknown ids.
    pub fn set_sharing(&mut self, id: &str, shared: bool) -> bool {
        match self.listings.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.shared = shared;
                true
            }
            None => {
                tracing::warn!("Sharing update for unknown listing {id:?}");
                false
            }
        }
    }

    /// Daily reward over shared listings
    pub fn total_daily_reward(&self) -> f64 {
        total_daily_reward(&self.listings)
    }

    /// Listings shared right now
    pub fn shared(&self) -> impl Iterator<Item = &DataListingItem> {
        self.listings.iter().filter(|item| item.shared)
    }

    /// Listings in one category, or all of them for `None`
    pub fn filter_by_category(
        &self,
        category: Option<DataCategory>,
    ) -> impl Iterator<Item = &DataListingItem> {
        self.listings
            .iter()
            .filter(move |item| category.map_or(true, |c| item.category == c))
    }

    /// Distinct categories in catalog order
    pub fn categories(&self) -> Vec<DataCategory> {
        let mut seen = Vec::new();
        for item in &self.listings {
            if !seen.contains(&item.category) {
                seen.push(item.category);
            }
        }
        seen
    }
}
