/// TheCocktailDB directory implementation.
use super::thecocktaildb_types::{DrinksEnvelope, FilteredDrink, ListEntry, RawDrink};
use super::{Cocktail, CocktailDirectory, CocktailSummary, DirectoryError, FilterKind};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Recipe directory backed by the TheCocktailDB v1 JSON API.
///
/// All endpoints answer with a `{"drinks": [...]}` envelope; this client maps
/// non-success statuses to [`DirectoryError::InvalidResponse`] and undecodable
/// bodies to [`DirectoryError::DecodingFailed`].
pub struct TheCocktailDb {
    client: reqwest::Client,
    base_url: String,
}

impl TheCocktailDb {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidRequest`] if the HTTP client cannot be
    /// built (e.g. the TLS backend fails to initialize).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Issues a GET against `endpoint` and decodes the drinks envelope.
    async fn get_drinks<T>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, DirectoryError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, ?query, "requesting cocktail directory");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    DirectoryError::InvalidRequest(e.to_string())
                } else {
                    DirectoryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::InvalidResponse {
                status: status.as_u16(),
            });
        }

        let envelope: DrinksEnvelope<T> = response
            .json()
            .await
            .map_err(|e| DirectoryError::DecodingFailed(e.to_string()))?;

        Ok(envelope.into_vec())
    }

    /// Fetches an endpoint that must yield at least one full drink.
    async fn get_single_drink(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Cocktail, DirectoryError> {
        self.get_drinks::<RawDrink>(endpoint, query)
            .await?
            .into_iter()
            .next()
            .map(Cocktail::from)
            .ok_or_else(|| {
                DirectoryError::DecodingFailed(format!("{endpoint} returned no drinks"))
            })
    }
}

#[async_trait]
impl CocktailDirectory for TheCocktailDb {
    async fn search_by_name(&self, name: &str) -> Result<Vec<Cocktail>, DirectoryError> {
        let drinks: Vec<RawDrink> = self.get_drinks("search.php", &[("s", name)]).await?;
        Ok(drinks.into_iter().map(Cocktail::from).collect())
    }

    async fn search_by_first_letter(
        &self,
        letter: char,
    ) -> Result<Vec<Cocktail>, DirectoryError> {
        if !letter.is_ascii_alphanumeric() {
            return Err(DirectoryError::InvalidRequest(format!(
                "'{letter}' is not a letter or digit"
            )));
        }

        let letter = letter.to_ascii_lowercase().to_string();
        let drinks: Vec<RawDrink> = self
            .get_drinks("search.php", &[("f", letter.as_str())])
            .await?;
        Ok(drinks.into_iter().map(Cocktail::from).collect())
    }

    async fn lookup_by_id(&self, id: &str) -> Result<Cocktail, DirectoryError> {
        if id.trim().is_empty() {
            return Err(DirectoryError::InvalidRequest(
                "cocktail id must not be empty".to_string(),
            ));
        }
        self.get_single_drink("lookup.php", &[("i", id)]).await
    }

    async fn random(&self) -> Result<Cocktail, DirectoryError> {
        self.get_single_drink("random.php", &[]).await
    }

    async fn filter(
        &self,
        kind: FilterKind,
        value: &str,
    ) -> Result<Vec<CocktailSummary>, DirectoryError> {
        let drinks: Vec<FilteredDrink> = self
            .get_drinks("filter.php", &[(kind.query_key(), value)])
            .await?;
        Ok(drinks.into_iter().map(CocktailSummary::from).collect())
    }

    async fn list_options(&self, kind: FilterKind) -> Result<Vec<String>, DirectoryError> {
        let field = list_field(kind);
        let entries: Vec<ListEntry> = self
            .get_drinks("list.php", &[(kind.query_key(), "list")])
            .await?;

        Ok(entries
            .into_iter()
            .filter_map(|mut entry| entry.remove(field).flatten())
            .collect())
    }
}

/// Field carrying the option label in `list.php` responses.
fn list_field(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Category => "strCategory",
        FilterKind::Glass => "strGlass",
        FilterKind::Ingredient => "strIngredient1",
        FilterKind::Alcoholic => "strAlcoholic",
    }
}
