//! Section schema registry.
//!
//! Each section declares its field shape as static data plus a business
//! rule set. Shape is enforced on write (see [`parse_section`]); business
//! rules are evaluated on read (see [`validate`]). Rules for one section
//! never look at another section.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{FieldIssue, ShapeError};
use super::model::{
    DescriptionFaqSection, GallerySection, MediaKind, MediaRef, OverviewSection, PersonalSection,
    PricingSection, SectionName, SectionValue, SocialSection,
};

pub const TITLE_MIN_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 80;
pub const MAX_TAGS: usize = 5;
pub const TIER_DESCRIPTION_MIN_CHARS: usize = 20;
pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 1200;
pub const MAX_FAQS: usize = 10;
pub const MAX_GALLERY_IMAGES: usize = 5;
pub const MAX_GALLERY_VIDEOS: usize = 1;

/// Type of a single field in a section payload.
#[derive(Debug, Clone, Copy)]
pub enum ShapeKind {
    Text,
    TextList,
    UnsignedInt,
    OneOf(&'static [&'static str]),
    Object(&'static [FieldShape]),
    ObjectList(&'static [FieldShape]),
}

/// Declared field of a section payload.
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    pub name: &'static str,
    pub kind: ShapeKind,
    pub required: bool,
}

const fn required(name: &'static str, kind: ShapeKind) -> FieldShape {
    FieldShape {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: ShapeKind) -> FieldShape {
    FieldShape {
        name,
        kind,
        required: false,
    }
}

/// Shape declaration for one section.
#[derive(Debug)]
pub struct SectionSchema {
    pub section: SectionName,
    pub fields: &'static [FieldShape],
}

const OVERVIEW_FIELDS: &[FieldShape] = &[
    required("title", ShapeKind::Text),
    required("category", ShapeKind::Text),
    optional("subcategory", ShapeKind::Text),
    required("tags", ShapeKind::TextList),
];

const TIER_FIELDS: &[FieldShape] = &[
    required("name", ShapeKind::Text),
    required("description", ShapeKind::Text),
    required("price", ShapeKind::UnsignedInt),
    required("delivery_days", ShapeKind::UnsignedInt),
    required("revisions", ShapeKind::UnsignedInt),
];

const PRICING_FIELDS: &[FieldShape] = &[
    required("basic", ShapeKind::Object(TIER_FIELDS)),
    required("standard", ShapeKind::Object(TIER_FIELDS)),
    required("premium", ShapeKind::Object(TIER_FIELDS)),
];

const FAQ_FIELDS: &[FieldShape] = &[
    required("question", ShapeKind::Text),
    required("answer", ShapeKind::Text),
];

const DESCRIPTION_FAQ_FIELDS: &[FieldShape] = &[
    required("description", ShapeKind::Text),
    optional("faqs", ShapeKind::ObjectList(FAQ_FIELDS)),
];

const MEDIA_KINDS: &[&str] = &["image", "video"];

const MEDIA_FIELDS: &[FieldShape] = &[
    required("url", ShapeKind::Text),
    required("kind", ShapeKind::OneOf(MEDIA_KINDS)),
];

const GALLERY_FIELDS: &[FieldShape] = &[
    required("images", ShapeKind::ObjectList(MEDIA_FIELDS)),
    optional("videos", ShapeKind::ObjectList(MEDIA_FIELDS)),
];

const PLATFORMS: &[&str] = &[
    "instagram",
    "tiktok",
    "youtube",
    "twitter",
    "facebook",
    "twitch",
];

const SOCIAL_LINK_FIELDS: &[FieldShape] = &[
    required("platform", ShapeKind::OneOf(PLATFORMS)),
    required("handle", ShapeKind::Text),
    optional("followers", ShapeKind::UnsignedInt),
];

const SOCIAL_FIELDS: &[FieldShape] = &[required("links", ShapeKind::ObjectList(SOCIAL_LINK_FIELDS))];

const PERSONAL_FIELDS: &[FieldShape] = &[
    required("display_name", ShapeKind::Text),
    required("country", ShapeKind::Text),
    required("languages", ShapeKind::TextList),
    optional("bio", ShapeKind::Text),
];

static SCHEMAS: [SectionSchema; 6] = [
    SectionSchema {
        section: SectionName::Overview,
        fields: OVERVIEW_FIELDS,
    },
    SectionSchema {
        section: SectionName::Pricing,
        fields: PRICING_FIELDS,
    },
    SectionSchema {
        section: SectionName::DescriptionFaq,
        fields: DESCRIPTION_FAQ_FIELDS,
    },
    SectionSchema {
        section: SectionName::Gallery,
        fields: GALLERY_FIELDS,
    },
    SectionSchema {
        section: SectionName::Social,
        fields: SOCIAL_FIELDS,
    },
    SectionSchema {
        section: SectionName::Personal,
        fields: PERSONAL_FIELDS,
    },
];

/// Returns the declared shape of a section.
pub fn schema_for(section: SectionName) -> &'static SectionSchema {
    &SCHEMAS[section.index()]
}

/// Checks `raw` against the section shape and converts it into a typed value.
///
/// All offending fields are collected before failing, so the caller can
/// highlight every problem at once.
pub fn parse_section(section: SectionName, raw: &Value) -> Result<SectionValue, ShapeError> {
    let mut issues = Vec::new();
    check_object(schema_for(section).fields, raw, "", &mut issues);
    if !issues.is_empty() {
        return Err(ShapeError { section, issues });
    }
    match section {
        SectionName::Overview => typed::<OverviewSection>(section, raw).map(SectionValue::Overview),
        SectionName::Pricing => typed::<PricingSection>(section, raw).map(SectionValue::Pricing),
        SectionName::DescriptionFaq => {
            typed::<DescriptionFaqSection>(section, raw).map(SectionValue::DescriptionFaq)
        }
        SectionName::Gallery => typed::<GallerySection>(section, raw).map(SectionValue::Gallery),
        SectionName::Social => typed::<SocialSection>(section, raw).map(SectionValue::Social),
        SectionName::Personal => typed::<PersonalSection>(section, raw).map(SectionValue::Personal),
    }
}

fn typed<T: DeserializeOwned>(section: SectionName, raw: &Value) -> Result<T, ShapeError> {
    serde_json::from_value(raw.clone()).map_err(|err| ShapeError {
        section,
        issues: vec![FieldIssue::new("", err.to_string())],
    })
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn check_object(fields: &[FieldShape], value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    let Some(map) = value.as_object() else {
        issues.push(FieldIssue::new(path, "expected an object"));
        return;
    };
    for field in fields {
        let field_path = join_path(path, field.name);
        match map.get(field.name) {
            None | Some(Value::Null) if field.required => {
                issues.push(FieldIssue::new(field_path, "missing required field"));
            }
            None => {}
            Some(Value::Null) if matches!(field.kind, ShapeKind::Text | ShapeKind::UnsignedInt) => {}
            Some(inner) => check_field(field.kind, inner, &field_path, issues),
        }
    }
    report_unknown(fields, map, path, issues);
}

fn report_unknown(
    fields: &[FieldShape],
    map: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) {
    for key in map.keys() {
        if !fields.iter().any(|field| field.name == key.as_str()) {
            issues.push(FieldIssue::new(join_path(path, key), "unknown field"));
        }
    }
}

fn check_field(kind: ShapeKind, value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    match kind {
        ShapeKind::Text => {
            if !value.is_string() {
                issues.push(FieldIssue::new(path, "expected a string"));
            }
        }
        ShapeKind::UnsignedInt => {
            if value.as_u64().is_none() {
                issues.push(FieldIssue::new(path, "expected a non-negative integer"));
            }
        }
        ShapeKind::OneOf(allowed) => match value.as_str() {
            Some(raw) if allowed.contains(&raw) => {}
            _ => issues.push(FieldIssue::new(
                path,
                format!("expected one of: {}", allowed.join(", ")),
            )),
        },
        ShapeKind::TextList => match value.as_array() {
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        issues.push(FieldIssue::new(format!("{path}[{idx}]"), "expected a string"));
                    }
                }
            }
            None => issues.push(FieldIssue::new(path, "expected a list of strings")),
        },
        ShapeKind::Object(fields) => check_object(fields, value, path, issues),
        ShapeKind::ObjectList(fields) => match value.as_array() {
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    check_object(fields, item, &format!("{path}[{idx}]"), issues);
                }
            }
            None => issues.push(FieldIssue::new(path, "expected a list")),
        },
    }
}

/// A business rule a stored section does not meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub field: String,
    pub rule: &'static str,
    pub message: String,
}

impl RuleViolation {
    fn new(field: impl Into<String>, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }
}

/// Business validation of a stored section; empty means valid.
pub fn validate(value: &SectionValue) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    match value {
        SectionValue::Overview(section) => overview_rules(section, &mut violations),
        SectionValue::Pricing(section) => pricing_rules(section, &mut violations),
        SectionValue::DescriptionFaq(section) => description_rules(section, &mut violations),
        SectionValue::Gallery(section) => gallery_rules(section, &mut violations),
        SectionValue::Social(section) => social_rules(section, &mut violations),
        SectionValue::Personal(section) => personal_rules(section, &mut violations),
    }
    violations
}

pub fn is_valid(value: &SectionValue) -> bool {
    validate(value).is_empty()
}

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

fn overview_rules(section: &OverviewSection, out: &mut Vec<RuleViolation>) {
    let title_len = char_len(&section.title);
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        out.push(RuleViolation::new(
            "title",
            "title_length",
            format!("Title must be {TITLE_MIN_CHARS}-{TITLE_MAX_CHARS} characters"),
        ));
    }
    if section.category.trim().is_empty() {
        out.push(RuleViolation::new("category", "required", "Pick a category"));
    }
    if section.tags.is_empty() || section.tags.len() > MAX_TAGS {
        out.push(RuleViolation::new(
            "tags",
            "tag_count",
            format!("Add between 1 and {MAX_TAGS} tags"),
        ));
    }
    for (idx, tag) in section.tags.iter().enumerate() {
        if tag.trim().is_empty() {
            out.push(RuleViolation::new(format!("tags[{idx}]"), "required", "Tags cannot be blank"));
        }
    }
}

fn pricing_rules(section: &PricingSection, out: &mut Vec<RuleViolation>) {
    for (tier_name, tier) in section.tiers() {
        if tier.name.trim().is_empty() {
            out.push(RuleViolation::new(
                format!("{tier_name}.name"),
                "required",
                "Give the package a name",
            ));
        }
        if tier.price == 0 {
            out.push(RuleViolation::new(
                format!("{tier_name}.price"),
                "positive_price",
                "Price must be greater than zero",
            ));
        }
        if char_len(&tier.description) < TIER_DESCRIPTION_MIN_CHARS {
            out.push(RuleViolation::new(
                format!("{tier_name}.description"),
                "description_length",
                format!("Describe the package in at least {TIER_DESCRIPTION_MIN_CHARS} characters"),
            ));
        }
        if tier.delivery_days < 1 {
            out.push(RuleViolation::new(
                format!("{tier_name}.delivery_days"),
                "delivery_days",
                "Delivery time must be at least one day",
            ));
        }
    }
}

fn description_rules(section: &DescriptionFaqSection, out: &mut Vec<RuleViolation>) {
    let len = char_len(&section.description);
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len) {
        out.push(RuleViolation::new(
            "description",
            "description_length",
            format!("Description must be {DESCRIPTION_MIN_CHARS}-{DESCRIPTION_MAX_CHARS} characters"),
        ));
    }
    if section.faqs.len() > MAX_FAQS {
        out.push(RuleViolation::new(
            "faqs",
            "faq_count",
            format!("At most {MAX_FAQS} questions"),
        ));
    }
    for (idx, faq) in section.faqs.iter().enumerate() {
        if faq.question.trim().is_empty() || faq.answer.trim().is_empty() {
            out.push(RuleViolation::new(
                format!("faqs[{idx}]"),
                "faq_complete",
                "Each question needs an answer",
            ));
        }
    }
}

fn media_rules(
    list: &str,
    refs: &[MediaRef],
    expected: MediaKind,
    out: &mut Vec<RuleViolation>,
) {
    for (idx, media) in refs.iter().enumerate() {
        if media.kind != expected {
            out.push(RuleViolation::new(
                format!("{list}[{idx}].kind"),
                "media_kind",
                format!("Only {expected:?} references belong in {list}").to_lowercase(),
            ));
        }
        if media.url.trim().is_empty() {
            out.push(RuleViolation::new(
                format!("{list}[{idx}].url"),
                "required",
                "Upload did not return a reference",
            ));
        }
    }
}

fn gallery_rules(section: &GallerySection, out: &mut Vec<RuleViolation>) {
    if section.images.is_empty() || section.images.len() > MAX_GALLERY_IMAGES {
        out.push(RuleViolation::new(
            "images",
            "image_count",
            format!("Upload between 1 and {MAX_GALLERY_IMAGES} images"),
        ));
    }
    if section.videos.len() > MAX_GALLERY_VIDEOS {
        out.push(RuleViolation::new(
            "videos",
            "video_count",
            format!("At most {MAX_GALLERY_VIDEOS} video"),
        ));
    }
    media_rules("images", &section.images, MediaKind::Image, out);
    media_rules("videos", &section.videos, MediaKind::Video, out);
}

fn social_rules(section: &SocialSection, out: &mut Vec<RuleViolation>) {
    if section.links.is_empty() {
        out.push(RuleViolation::new(
            "links",
            "link_count",
            "Connect at least one social account",
        ));
    }
    let mut seen = BTreeSet::new();
    for (idx, link) in section.links.iter().enumerate() {
        if !seen.insert(link.platform) {
            out.push(RuleViolation::new(
                format!("links[{idx}].platform"),
                "unique_platform",
                "Each platform can only be linked once",
            ));
        }
        if link.handle.trim().is_empty() {
            out.push(RuleViolation::new(
                format!("links[{idx}].handle"),
                "required",
                "Handle cannot be blank",
            ));
        }
    }
}

fn personal_rules(section: &PersonalSection, out: &mut Vec<RuleViolation>) {
    if section.display_name.trim().is_empty() {
        out.push(RuleViolation::new("display_name", "required", "Enter your name"));
    }
    let country = section.country.as_bytes();
    if country.len() != 2 || !country.iter().all(|b| b.is_ascii_uppercase()) {
        out.push(RuleViolation::new(
            "country",
            "country_code",
            "Use a two-letter country code such as US",
        ));
    }
    if section.languages.iter().all(|lang| lang.trim().is_empty()) {
        out.push(RuleViolation::new(
            "languages",
            "language_count",
            "List at least one language",
        ));
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Valid raw payloads for every section, shared by unit tests.

    use serde_json::{json, Value};

    use super::SectionName;

    pub fn tier(name: &str, price: u64) -> Value {
        json!({
            "name": name,
            "description": "One sponsored post with two story mentions",
            "price": price,
            "delivery_days": 3,
            "revisions": 1
        })
    }

    pub fn valid(section: SectionName) -> Value {
        match section {
            SectionName::Overview => json!({
                "title": "Lifestyle reels for outdoor brands",
                "category": "lifestyle",
                "tags": ["outdoors", "travel"]
            }),
            SectionName::Pricing => json!({
                "basic": tier("Starter", 150),
                "standard": tier("Growth", 400),
                "premium": tier("Campaign", 900)
            }),
            SectionName::DescriptionFaq => json!({
                "description": "I create short-form video for outdoor and travel brands, shot on location across the Alps.",
                "faqs": [{ "question": "Do you travel?", "answer": "Yes, within Europe." }]
            }),
            SectionName::Gallery => json!({
                "images": [{ "url": "https://cdn.example.com/a.jpg", "kind": "image" }],
                "videos": [{ "url": "https://cdn.example.com/reel.mp4", "kind": "video" }]
            }),
            SectionName::Social => json!({
                "links": [
                    { "platform": "instagram", "handle": "@alpine.maker", "followers": 48000 },
                    { "platform": "tiktok", "handle": "@alpinemaker" }
                ]
            }),
            SectionName::Personal => json!({
                "display_name": "Mara Keller",
                "country": "CH",
                "languages": ["German", "English"]
            }),
        }
    }
}
