//! Test doubles shared by the unit tests.

use crate::directory::{
    Cocktail, CocktailDirectory, CocktailSummary, DirectoryError, FilterKind, Ingredient,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Builds a minimal cocktail record.
pub(crate) fn cocktail(id: &str, name: &str) -> Cocktail {
    Cocktail {
        id: id.to_string(),
        name: name.to_string(),
        tags: None,
        category: "Cocktail".to_string(),
        alcoholic: "Alcoholic".to_string(),
        glass: "Highball glass".to_string(),
        instructions: format!("Mix the {name}."),
        thumbnail: format!("https://example.invalid/{id}.jpg"),
        ingredients: vec![Ingredient {
            name: "Ice".to_string(),
            measure: "1 cup".to_string(),
        }],
        is_favorite: false,
    }
}

/// In-memory directory with call counters and failure injection.
///
/// Unknown ids behave like the real API: the lookup yields no drink, which is
/// a decoding failure.
#[derive(Default)]
pub(crate) struct MockDirectory {
    cocktails: Vec<Cocktail>,
    filters: HashMap<(FilterKind, String), Vec<String>>,
    options: HashMap<FilterKind, Vec<String>>,
    failing_ids: HashSet<String>,
    failing_lists: HashSet<FilterKind>,
    /// id -> number of lookups that still fail before succeeding
    flaky: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
    lookup_calls: AtomicUsize,
    filter_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cocktail(mut self, cocktail: Cocktail) -> Self {
        self.cocktails.push(cocktail);
        self
    }

    pub fn with_filter(mut self, kind: FilterKind, value: &str, ids: &[impl AsRef<str>]) -> Self {
        self.filters.insert(
            (kind, value.to_string()),
            ids.iter().map(|id| id.as_ref().to_string()).collect(),
        );
        self
    }

    pub fn with_options(mut self, kind: FilterKind, options: &[&str]) -> Self {
        self.options
            .insert(kind, options.iter().map(|o| o.to_string()).collect());
        self
    }

    /// Every lookup of `id` answers HTTP 500.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    /// The first `failures` lookups of `id` answer HTTP 503.
    pub fn flaky(self, id: &str, failures: usize) -> Self {
        if let Ok(mut flaky) = self.flaky.lock() {
            flaky.insert(id.to_string(), failures);
        }
        self
    }

    pub fn failing_list(mut self, kind: FilterKind) -> Self {
        self.failing_lists.insert(kind);
        self
    }

    /// While offline every request fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), DirectoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(DirectoryError::Transport("network unreachable".to_string()))
        } else {
            Ok(())
        }
    }

    fn take_flaky_failure(&self, id: &str) -> bool {
        let Ok(mut flaky) = self.flaky.lock() else {
            return false;
        };
        match flaky.get_mut(id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl CocktailDirectory for MockDirectory {
    async fn search_by_name(&self, name: &str) -> Result<Vec<Cocktail>, DirectoryError> {
        self.check_online()?;
        let needle = name.to_lowercase();
        Ok(self
            .cocktails
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_by_first_letter(
        &self,
        letter: char,
    ) -> Result<Vec<Cocktail>, DirectoryError> {
        self.check_online()?;
        let letter = letter.to_ascii_lowercase();
        Ok(self
            .cocktails
            .iter()
            .filter(|c| c.name.to_lowercase().starts_with(letter))
            .cloned()
            .collect())
    }

    async fn lookup_by_id(&self, id: &str) -> Result<Cocktail, DirectoryError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        if self.failing_ids.contains(id) {
            return Err(DirectoryError::InvalidResponse { status: 500 });
        }
        if self.take_flaky_failure(id) {
            return Err(DirectoryError::InvalidResponse { status: 503 });
        }

        self.cocktails
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::DecodingFailed("lookup.php returned no drinks".into()))
    }

    async fn random(&self) -> Result<Cocktail, DirectoryError> {
        self.check_online()?;
        self.cocktails
            .first()
            .cloned()
            .ok_or_else(|| DirectoryError::DecodingFailed("random.php returned no drinks".into()))
    }

    async fn filter(
        &self,
        kind: FilterKind,
        value: &str,
    ) -> Result<Vec<CocktailSummary>, DirectoryError> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let ids = self
            .filters
            .get(&(kind, value.to_string()))
            .cloned()
            .unwrap_or_default();

        Ok(ids
            .into_iter()
            .map(|id| CocktailSummary {
                name: format!("Drink {id}"),
                thumbnail: format!("https://example.invalid/{id}.jpg"),
                id,
            })
            .collect())
    }

    async fn list_options(&self, kind: FilterKind) -> Result<Vec<String>, DirectoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        if self.failing_lists.contains(&kind) {
            return Err(DirectoryError::InvalidResponse { status: 500 });
        }
        Ok(self.options.get(&kind).cloned().unwrap_or_default())
    }
}
