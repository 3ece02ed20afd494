use creatordraft::drafts::SectionName;
use serde_json::{json, Value};

pub fn tier(name: &str, price: i64) -> Value {
    json!({
        "name": name,
        "description": "Two feed posts and a story set with swipe-up link",
        "price": price,
        "delivery_days": 5,
        "revisions": 2
    })
}

pub fn pricing_with_basic_price(price: i64) -> Value {
    json!({
        "basic": tier("Basic", price),
        "standard": tier("Standard", 650),
        "premium": tier("Premium", 1400)
    })
}

/// A business-valid payload for every section.
pub fn valid(section: SectionName) -> Value {
    match section {
        SectionName::Overview => json!({
            "title": "Fitness content for athletic apparel",
            "category": "fitness",
            "subcategory": "strength",
            "tags": ["gym", "running", "nutrition"]
        }),
        SectionName::Pricing => pricing_with_basic_price(250),
        SectionName::DescriptionFaq => json!({
            "description": "Certified coach producing workout tutorials and honest product reviews for a loyal audience.",
            "faqs": [
                { "question": "Can I see past campaigns?", "answer": "Portfolio links are in the gallery." }
            ]
        }),
        SectionName::Gallery => json!({
            "images": [
                { "url": "https://uploads.example.com/u/1.jpg", "kind": "image" },
                { "url": "https://uploads.example.com/u/2.jpg", "kind": "image" }
            ]
        }),
        SectionName::Social => json!({
            "links": [{ "platform": "youtube", "handle": "@liftwithlena", "followers": 120000 }]
        }),
        SectionName::Personal => json!({
            "display_name": "Lena Ortiz",
            "country": "ES",
            "languages": ["Spanish", "English"],
            "bio": "Former sprinter."
        }),
    }
}
