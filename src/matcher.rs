//! Entity matching
//!
//! An item is about an entity when any of the entity's aliases occurs as a
//! substring of the lower-cased `title + " " + summary`. No stemming, fuzzy
//! matching or negation handling.

use crate::feed::NewsItem;
use crate::registry::TrackedEntity;
use serde::{Deserialize, Serialize};

/// A news item attributed to one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedItem {
    pub item: NewsItem,
    pub entity_id: String,
}

/// Lower-cased text surface of an item
fn surface(item: &NewsItem) -> String {
    item.text().to_lowercase()
}

/// Returns true if the item mentions the entity
pub fn matches(item: &NewsItem, entity: &TrackedEntity) -> bool {
    let text = surface(item);
    entity.aliases().iter().any(|alias| text.contains(alias.as_str()))
}

/// Keep the items that mention the entity, in input order.
///
/// An item matching several aliases yields a single `MatchedItem`.
pub fn match_items(items: &[NewsItem], entity: &TrackedEntity) -> Vec<MatchedItem> {
    items
        .iter()
        .filter(|item| matches(item, entity))
        .map(|item| MatchedItem {
            item: item.clone(),
            entity_id: entity.id().to_string(),
        })
        .collect()
}
