use serde::{Deserialize, Serialize};

/// Numeric help center entity id, as it appears in API payloads and in page
/// paths (parsed through `FromStr`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(EntityId)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Section {
    pub id: EntityId,
    pub category_id: EntityId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Article {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    pub section_id: EntityId,
}

// Single-entity endpoints wrap the payload under the resource name.

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct CategoryEnvelope {
    pub category: Category,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct SectionEnvelope {
    pub section: Section,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct ArticleEnvelope {
    pub article: Article,
}
