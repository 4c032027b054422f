//! Data structures and traits for cocktail recipe retrieval.
//!
//! This module provides structures to represent cocktails, their ingredients
//! and the filter menus offered by the recipe directory, as well as the trait
//! implemented by directory clients.
mod thecocktaildb;
mod thecocktaildb_types;

pub use thecocktaildb::TheCocktailDb;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while talking to the recipe directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The request could not be built from the given parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request never produced an HTTP response (connect, timeout, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The directory answered with a non-success status code
    #[error("Invalid response: HTTP {status}")]
    InvalidResponse { status: u16 },

    /// The body did not match the expected envelope
    #[error("Failed to decode API response: {0}")]
    DecodingFailed(String),
}

/// A single ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name, never empty
    pub name: String,
    /// Free-text measure ("1 1/2 oz"), empty when the recipe gives none
    pub measure: String,
}

/// A fully hydrated cocktail recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cocktail {
    /// Identifier assigned by the directory
    pub id: String,
    /// Display name
    pub name: String,
    /// Comma-separated tags, if any
    pub tags: Option<String>,
    /// Category label ("Cocktail", "Shot", ...)
    pub category: String,
    /// Alcohol-content label ("Alcoholic", "Non alcoholic", ...)
    pub alcoholic: String,
    /// Glassware label
    pub glass: String,
    /// Preparation instructions
    pub instructions: String,
    /// Thumbnail image URL
    pub thumbnail: String,
    /// Ingredient lines in recipe order
    pub ingredients: Vec<Ingredient>,
    /// Whether the user marked this cocktail as favorite
    #[serde(default)]
    pub is_favorite: bool,
}

impl Cocktail {
    /// Splits the comma-separated tag string into trimmed, non-empty tags.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns a copy of this record with the favorite flag set to `favorite`.
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.is_favorite = favorite;
        self
    }
}

/// A cocktail as returned by the filter endpoint: no recipe details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CocktailSummary {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
}

/// The four ways the directory can filter cocktails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Category,
    Glass,
    Ingredient,
    Alcoholic,
}

impl FilterKind {
    /// All filter kinds in menu order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Category,
        FilterKind::Glass,
        FilterKind::Ingredient,
        FilterKind::Alcoholic,
    ];

    /// Query parameter used by the `filter.php` and `list.php` endpoints.
    pub fn query_key(self) -> &'static str {
        match self {
            FilterKind::Category => "c",
            FilterKind::Glass => "g",
            FilterKind::Ingredient => "i",
            FilterKind::Alcoholic => "a",
        }
    }

    /// Human-readable menu title.
    pub fn display_name(self) -> &'static str {
        match self {
            FilterKind::Category => "Categories",
            FilterKind::Glass => "Glasses",
            FilterKind::Ingredient => "Ingredients",
            FilterKind::Alcoholic => "Alcohol content",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            FilterKind::Category => 0,
            FilterKind::Glass => 1,
            FilterKind::Ingredient => 2,
            FilterKind::Alcoholic => 3,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKind::Category => "category",
            FilterKind::Glass => "glass",
            FilterKind::Ingredient => "ingredient",
            FilterKind::Alcoholic => "alcoholic",
        };
        f.write_str(name)
    }
}

/// One section of the filter menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCategory {
    pub kind: FilterKind,
    /// Menu title
    pub name: String,
    /// Available option labels in upstream order
    pub options: Vec<String>,
}

/// Trait for recipe directories that can search, look up and filter cocktails.
///
/// Implementors only talk to the remote service; caching, pacing and
/// cancellation are layered on top by the
/// [`FetchOrchestrator`](crate::FetchOrchestrator).
#[async_trait]
pub trait CocktailDirectory: Send + Sync {
    /// Searches cocktails by (partial) name. No match yields an empty list.
    async fn search_by_name(&self, name: &str) -> Result<Vec<Cocktail>, DirectoryError>;

    /// Lists all cocktails whose name starts with `letter`.
    async fn search_by_first_letter(&self, letter: char)
    -> Result<Vec<Cocktail>, DirectoryError>;

    /// Looks up a single cocktail by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DecodingFailed`] when the directory knows no
    /// cocktail with that identifier.
    async fn lookup_by_id(&self, id: &str) -> Result<Cocktail, DirectoryError>;

    /// Fetches one random cocktail.
    async fn random(&self) -> Result<Cocktail, DirectoryError>;

    /// Lists summaries of all cocktails matching a filter selection.
    async fn filter(
        &self,
        kind: FilterKind,
        value: &str,
    ) -> Result<Vec<CocktailSummary>, DirectoryError>;

    /// Lists the distinct option labels available for a filter kind.
    async fn list_options(&self, kind: FilterKind) -> Result<Vec<String>, DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tags: Option<&str>) -> Cocktail {
        Cocktail {
            id: "11000".to_string(),
            name: "Mojito".to_string(),
            tags: tags.map(str::to_string),
            category: "Cocktail".to_string(),
            alcoholic: "Alcoholic".to_string(),
            glass: "Highball glass".to_string(),
            instructions: "Muddle mint leaves with sugar and lime juice.".to_string(),
            thumbnail: "https://example.invalid/mojito.jpg".to_string(),
            ingredients: Vec::new(),
            is_favorite: false,
        }
    }

    #[test]
    fn test_tag_list() {
        assert_eq!(
            sample(Some("IBA, ContemporaryClassic,,Alcoholic ")).tag_list(),
            vec!["IBA", "ContemporaryClassic", "Alcoholic"]
        );
        assert!(sample(None).tag_list().is_empty());
    }

    #[test]
    fn test_with_favorite_keeps_identity() {
        let favorite = sample(None).with_favorite(true);
        assert!(favorite.is_favorite);
        assert_eq!(favorite.id, "11000");
    }

    #[test]
    fn test_filter_kind_keys() {
        let keys: Vec<_> = FilterKind::ALL.iter().map(|k| k.query_key()).collect();
        assert_eq!(keys, vec!["c", "g", "i", "a"]);
        for (position, kind) in FilterKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }
}
