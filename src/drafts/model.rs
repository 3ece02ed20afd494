//! Data structures backing the creator profile draft.
//!
//! Section payloads are strongly typed once they pass shape checking in
//! [`super::schema`]; anything stored in a [`ProfileDraft`] is therefore
//! shape-valid, while business validity is evaluated on read.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the creator account that owns a draft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// The fixed set of profile sections, declared in wizard order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Overview,
    Pricing,
    DescriptionFaq,
    Gallery,
    Social,
    Personal,
}

impl SectionName {
    /// Every section in sequence order.
    pub const ALL: [SectionName; 6] = [
        SectionName::Overview,
        SectionName::Pricing,
        SectionName::DescriptionFaq,
        SectionName::Gallery,
        SectionName::Social,
        SectionName::Personal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionName::Overview => "overview",
            SectionName::Pricing => "pricing",
            SectionName::DescriptionFaq => "description_faq",
            SectionName::Gallery => "gallery",
            SectionName::Social => "social",
            SectionName::Personal => "personal",
        }
    }

    /// Zero-based position in the wizard sequence.
    pub fn index(self) -> usize {
        match self {
            SectionName::Overview => 0,
            SectionName::Pricing => 1,
            SectionName::DescriptionFaq => 2,
            SectionName::Gallery => 3,
            SectionName::Social => 4,
            SectionName::Personal => 5,
        }
    }

    pub fn next(self) -> Option<SectionName> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<SectionName> {
        self.index().checked_sub(1).map(|idx| Self::ALL[idx])
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionName {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(SectionName::Overview),
            "pricing" => Ok(SectionName::Pricing),
            "description_faq" | "description" | "faq" => Ok(SectionName::DescriptionFaq),
            "gallery" => Ok(SectionName::Gallery),
            "social" => Ok(SectionName::Social),
            "personal" => Ok(SectionName::Personal),
            other => Err(format!("Unknown profile section '{other}'")),
        }
    }
}

/// Lifecycle status of a draft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    Draft,
    Publishing,
    Published,
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Publishing => "publishing",
            DraftStatus::Published => "published",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OverviewSection {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageTier {
    pub name: String,
    pub description: String,
    pub price: u64,
    pub delivery_days: u64,
    pub revisions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PricingSection {
    pub basic: PackageTier,
    pub standard: PackageTier,
    pub premium: PackageTier,
}

impl PricingSection {
    pub fn tiers(&self) -> [(&'static str, &PackageTier); 3] {
        [
            ("basic", &self.basic),
            ("standard", &self.standard),
            ("premium", &self.premium),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DescriptionFaqSection {
    pub description: String,
    #[serde(default)]
    pub faqs: Vec<FaqEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Opaque reference returned by the upload service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MediaRef {
    pub url: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GallerySection {
    pub images: Vec<MediaRef>,
    #[serde(default)]
    pub videos: Vec<MediaRef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Instagram,
    Tiktok,
    Youtube,
    Twitter,
    Facebook,
    Twitch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SocialLink {
    pub platform: SocialPlatform,
    pub handle: String,
    #[serde(default)]
    pub followers: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SocialSection {
    pub links: Vec<SocialLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PersonalSection {
    pub display_name: String,
    pub country: String,
    pub languages: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// A shape-valid section payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SectionValue {
    Overview(OverviewSection),
    Pricing(PricingSection),
    DescriptionFaq(DescriptionFaqSection),
    Gallery(GallerySection),
    Social(SocialSection),
    Personal(PersonalSection),
}

impl SectionValue {
    pub fn section(&self) -> SectionName {
        match self {
            SectionValue::Overview(_) => SectionName::Overview,
            SectionValue::Pricing(_) => SectionName::Pricing,
            SectionValue::DescriptionFaq(_) => SectionName::DescriptionFaq,
            SectionValue::Gallery(_) => SectionName::Gallery,
            SectionValue::Social(_) => SectionName::Social,
            SectionValue::Personal(_) => SectionName::Personal,
        }
    }

    /// Raw JSON form, as submitted to the remote service and the cache.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// One stored section plus its sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub value: SectionValue,
    /// Draft revision at which this value was written.
    pub revision: u64,
    /// Remote revision this value is based on.
    pub base: u64,
    /// Whether the remote service has acknowledged this exact value.
    pub synced: bool,
}

/// The aggregate being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub owner_id: OwnerId,
    pub sections: BTreeMap<SectionName, SectionEntry>,
    pub revision: u64,
    /// Last remote revision confirmed by a load or an uninterrupted ack chain.
    pub remote_revision: u64,
    pub status: DraftStatus,
}

impl ProfileDraft {
    pub fn empty(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            sections: BTreeMap::new(),
            revision: 0,
            remote_revision: 0,
            status: DraftStatus::Draft,
        }
    }

    pub fn section(&self, name: SectionName) -> Option<&SectionValue> {
        self.sections.get(&name).map(|entry| &entry.value)
    }

    /// Sections holding edits the remote service has not acknowledged.
    pub fn dirty_sections(&self) -> Vec<SectionName> {
        self.sections
            .iter()
            .filter(|(_, entry)| !entry.synced)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Lowercase hex SHA-256 over the canonical JSON of the section values.
    pub fn fingerprint(&self) -> String {
        let values: BTreeMap<SectionName, &SectionValue> = self
            .sections
            .iter()
            .map(|(name, entry)| (*name, &entry.value))
            .collect();
        let bytes = serde_json::to_vec(&values).unwrap_or_default();
        super::cache::compute_hash(&bytes)
    }
}
