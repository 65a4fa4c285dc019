//! Entity registry
//!
//! The immutable watch-list of tracked entities. Entities are validated once
//! at load time and never mutated afterwards.

pub mod watchlist;


use crate::error::{Result, SentimentError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Entity category; decides which feeds are consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Stock,
    Saas,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Stock, Category::Saas];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Stock => "stock",
            Category::Saas => "saas",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Raw entity declaration as it appears in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDef {
    pub id: String,
    pub category: Category,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A validated, tracked entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEntity {
    id: String,
    category: Category,
    /// Lower-cased, deduplicated; always contains the lower-cased id
    aliases: BTreeSet<String>,
}

impl TrackedEntity {
    /// Build an entity, folding the id into the alias set.
    pub fn new<I, S>(id: &str, category: Category, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = id.trim();
        if id.is_empty() {
            return Err(SentimentError::InvalidEntity {
                id: String::new(),
                reason: "id is empty".to_string(),
            });
        }

        let mut set: BTreeSet<String> = aliases
            .into_iter()
            .map(|a| a.as_ref().trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        set.insert(id.to_lowercase());

        Ok(Self {
            id: id.to_string(),
            category,
            aliases: set,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }
}

impl TryFrom<&EntityDef> for TrackedEntity {
    type Error = SentimentError;

    fn try_from(def: &EntityDef) -> Result<Self> {
        TrackedEntity::new(&def.id, def.category, &def.aliases)
    }
}

/// Ordered, immutable collection of tracked entities
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entities: Arc<[TrackedEntity]>,
}

impl EntityRegistry {
    /// Validate and freeze a list of entities.
    ///
    /// Fails with `EmptyRegistry` when nothing is tracked and with
    /// `InvalidEntity` on duplicate ids.
    pub fn new(entities: Vec<TrackedEntity>) -> Result<Self> {
        if entities.is_empty() {
            return Err(SentimentError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity.id().to_uppercase()) {
                return Err(SentimentError::InvalidEntity {
                    id: entity.id().to_string(),
                    reason: "duplicate id".to_string(),
                });
            }
        }

        Ok(Self {
            entities: entities.into(),
        })
    }

    /// Build from configuration declarations
    pub fn from_defs(defs: &[EntityDef]) -> Result<Self> {
        let entities = defs
            .iter()
            .map(TrackedEntity::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(entities)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.iter()
    }

    pub fn get(&self, id: &str) -> Option<&TrackedEntity> {
        self.entities.iter().find(|e| e.id().eq_ignore_ascii_case(id))
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.iter().filter(move |e| e.category() == category)
    }

    /// Narrow the registry to the given ids, keeping registry order.
    /// An id that is not tracked is a configuration error.
    pub fn retain_ids(&self, ids: &[String]) -> Result<Self> {
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(SentimentError::Config(format!("unknown entity id: {}", unknown)));
        }

        let kept = self
            .entities
            .iter()
            .filter(|e| ids.iter().any(|id| e.id().eq_ignore_ascii_case(id)))
            .cloned()
            .collect();
        Self::new(kept)
    }
}

impl<'a> IntoIterator for &'a EntityRegistry {
    type Item = &'a TrackedEntity;
    type IntoIter = std::slice::Iter<'a, TrackedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
