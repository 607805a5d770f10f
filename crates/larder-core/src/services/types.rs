//! Plain-data types exchanged with the collaborator services.
//!
//! Search hits keep their wire field names (camelCase) so adapters can
//! deserialize responses directly; everything else is shaped for the
//! planner rather than for any particular backend.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Recipe service
// ---------------------------------------------------------------------------

/// Portal login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Result of a successful portal login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInfo {
    pub username: String,
    pub subscription_active: bool,
}

/// The two native collection kinds the portal exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// The user's own collections (the "preferred" candidate source).
    Custom,
    /// Shared/managed collections (the "curated" candidate source).
    Managed,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Custom => "custom",
            Self::Managed => "managed",
        };
        f.write_str(s)
    }
}

/// Pagination summary for a collection kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollectionCount {
    /// Total number of collections.
    pub total: u32,
    /// Number of pages to fetch.
    pub pages: u32,
}

/// One collection with its chapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub chapters: Vec<Chapter>,
}

/// A chapter groups recipes within a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub recipes: Vec<CollectionRecipe>,
}

/// A recipe as listed inside a collection chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRecipe {
    pub id: String,
    pub name: String,
    /// Total cook time in seconds, `0` when unspecified.
    #[serde(default)]
    pub total_time: u32,
}

/// Display metadata fetched during enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

/// The recipes planned on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub recipe_ids: Vec<String>,
}

/// One ingredient line of a recipe, as returned for shopping-list export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    /// Quantity/preparation note, e.g. `200 g, gewürfelt`.
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Search service
// ---------------------------------------------------------------------------

/// A search request against the recipe index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Optional index filter expression (e.g. `language:de-DE`).
    pub filters: Option<String>,
    pub hits_per_page: u32,
    /// Restrict the attributes returned per hit; `None` returns the
    /// default set.
    pub attributes_to_retrieve: Option<Vec<String>>,
}

impl SearchRequest {
    /// A plain query with the default attribute set.
    pub fn new(query: impl Into<String>, hits_per_page: u32) -> Self {
        Self {
            query: query.into(),
            filters: None,
            hits_per_page,
            attributes_to_retrieve: None,
        }
    }

    /// Attach an index filter expression.
    pub fn with_filters(mut self, filters: Option<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Restrict the returned attributes.
    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes_to_retrieve =
            Some(attributes.iter().map(|a| (*a).to_string()).collect());
        self
    }
}

/// A page of search hits plus the index's approximate total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    /// Approximate total matches in the index (`nbHits`).
    pub total_hits: u64,
}

/// One raw hit from the search index.
///
/// Rating may arrive under any of three attribute names depending on index
/// generation; [`SearchHit::rating`] picks the first present one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Total cook time in seconds; the index stores it as a float.
    #[serde(default, rename = "totalTime")]
    pub total_time: Option<f64>,
    /// Image URL, possibly with `{assethost}`/`{transformation}`
    /// placeholders.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, rename = "averageRating")]
    pub average_rating: Option<f64>,
    #[serde(default, rename = "ratingValue")]
    pub rating_value: Option<f64>,
    #[serde(default, rename = "ingredientNames")]
    pub ingredient_names: Option<Vec<IngredientEntry>>,
    #[serde(default, rename = "ingredientList")]
    pub ingredient_list: Option<Vec<IngredientEntry>>,
}

impl SearchHit {
    /// The hit's rating, from whichever attribute the index populated.
    pub fn rating(&self) -> f64 {
        self.rating
            .or(self.average_rating)
            .or(self.rating_value)
            .unwrap_or(0.0)
    }

    /// Total cook time in whole seconds, `0` when unspecified.
    pub fn total_time_seconds(&self) -> u32 {
        self.total_time.map(|t| t.max(0.0) as u32).unwrap_or(0)
    }
}

/// An ingredient-list entry on a hit: either a bare string or a structured
/// object carrying a name/title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientEntry {
    Text(String),
    Structured {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
}

impl IngredientEntry {
    /// The displayable ingredient name, if the entry carries one.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Text(s) if !s.is_empty() => Some(s),
            Self::Text(_) => None,
            Self::Structured { name, title } => name
                .as_deref()
                .filter(|s| !s.is_empty())
                .or_else(|| title.as_deref().filter(|s| !s.is_empty())),
        }
    }
}

/// One facet-value hit from a facet query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetHit {
    pub value: String,
    #[serde(default = "default_facet_count")]
    pub count: u64,
}

fn default_facet_count() -> u64 {
    1
}

// ---------------------------------------------------------------------------
// Shopping service
// ---------------------------------------------------------------------------

/// One shopping list on the external shopping service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub uuid: String,
    pub name: String,
}
