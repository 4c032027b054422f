/// TheCocktailDB API response types for deserialization.
///
/// These structures mirror the JSON response format of the v1 API.
use super::{Cocktail, CocktailSummary, Ingredient};
use serde::Deserialize;
use std::collections::HashMap;

/// Number of ingredient/measure slots in a drink record.
const INGREDIENT_SLOTS: usize = 15;

/// The `{"drinks": ...}` envelope every endpoint responds with.
#[derive(Debug, Deserialize)]
pub(super) struct DrinksEnvelope<T> {
    #[serde(default = "Drinks::none")]
    drinks: Drinks<T>,
}

/// The payload of the envelope.
///
/// Empty results come back as `null` or as a string sentinel such as
/// `"None Found"`, both of which mean "no drinks".
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Drinks<T> {
    List(Vec<T>),
    Empty(Option<String>),
}

impl<T> Drinks<T> {
    fn none() -> Self {
        Drinks::Empty(None)
    }
}

impl<T> DrinksEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self.drinks {
            Drinks::List(items) => items,
            Drinks::Empty(_) => Vec::new(),
        }
    }
}

/// A full drink record from the search, lookup and random endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct RawDrink {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strTags")]
    pub tags: Option<String>,
    #[serde(rename = "strCategory")]
    pub category: String,
    #[serde(rename = "strAlcoholic")]
    pub alcoholic: String,
    #[serde(rename = "strGlass")]
    pub glass: String,
    #[serde(rename = "strInstructions")]
    pub instructions: String,
    #[serde(rename = "strDrinkThumb")]
    pub thumbnail: String,
    /// Everything else, including `strIngredientN` and `strMeasureN`
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl RawDrink {
    fn slot(&self, prefix: &str, index: usize) -> Option<&str> {
        self.extra
            .get(&format!("{prefix}{index}"))
            .and_then(serde_json::Value::as_str)
    }

    /// Collects the populated ingredient slots in slot order.
    ///
    /// Slots with a missing or blank ingredient name are skipped. An
    /// ingredient without a measure ("Soda water" topped up to taste) is kept
    /// with an empty measure rather than dropped from the recipe.
    fn ingredients(&self) -> Vec<Ingredient> {
        (1..=INGREDIENT_SLOTS)
            .filter_map(|index| {
                let name = self.slot("strIngredient", index)?;
                if name.trim().is_empty() {
                    return None;
                }
                Some(Ingredient {
                    name: name.to_string(),
                    measure: self
                        .slot("strMeasure", index)
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect()
    }
}

impl From<RawDrink> for Cocktail {
    fn from(raw: RawDrink) -> Self {
        let ingredients = raw.ingredients();
        Cocktail {
            id: raw.id,
            name: raw.name,
            tags: raw.tags.filter(|tags| !tags.trim().is_empty()),
            category: raw.category,
            alcoholic: raw.alcoholic,
            glass: raw.glass,
            instructions: raw.instructions,
            thumbnail: raw.thumbnail,
            ingredients,
            is_favorite: false,
        }
    }
}

/// A drink from the filter endpoint, which only carries id, name and thumbnail.
#[derive(Debug, Deserialize)]
pub(super) struct FilteredDrink {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strDrinkThumb")]
    pub thumbnail: String,
}

impl From<FilteredDrink> for CocktailSummary {
    fn from(drink: FilteredDrink) -> Self {
        CocktailSummary {
            id: drink.id,
            name: drink.name,
            thumbnail: drink.thumbnail,
        }
    }
}

/// An entry of a `list.php` response, e.g. `{"strGlass": "Highball glass"}`.
pub(super) type ListEntry = HashMap<String, Option<String>>;

#[cfg(test)]
mod tests {
    use super::*;

    const MOJITO: &str = r#"{
        "drinks": [{
            "idDrink": "11000",
            "strDrink": "Mojito",
            "strTags": "IBA,ContemporaryClassic,Alcoholic,USA",
            "strCategory": "Cocktail",
            "strAlcoholic": "Alcoholic",
            "strGlass": "Highball glass",
            "strInstructions": "Muddle mint leaves with sugar and lime juice.",
            "strDrinkThumb": "https://www.thecocktaildb.com/images/media/drink/metwgh1606770327.jpg",
            "strIngredient1": "Light rum",
            "strIngredient2": "Lime",
            "strIngredient3": "Sugar",
            "strIngredient4": "",
            "strIngredient5": "Soda water",
            "strIngredient6": null,
            "strMeasure1": "2-3 oz ",
            "strMeasure2": "Juice of 1 ",
            "strMeasure3": "2 tsp ",
            "strMeasure4": null,
            "strMeasure5": null,
            "strMeasure6": null,
            "dateModified": "2016-11-04 09:17:09"
        }]
    }"#;

    #[test]
    fn test_decode_full_drink() {
        let envelope: DrinksEnvelope<RawDrink> = serde_json::from_str(MOJITO).unwrap();
        let drinks = envelope.into_vec();
        assert_eq!(drinks.len(), 1);

        let cocktail = Cocktail::from(drinks.into_iter().next().unwrap());
        assert_eq!(cocktail.id, "11000");
        assert_eq!(cocktail.name, "Mojito");
        assert_eq!(cocktail.glass, "Highball glass");
        assert!(!cocktail.is_favorite);

        let names: Vec<_> = cocktail.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Light rum", "Lime", "Sugar", "Soda water"]);
        assert_eq!(cocktail.ingredients[0].measure, "2-3 oz ");
        assert_eq!(cocktail.ingredients[3].measure, "");
    }

    #[test]
    fn test_ingredient_without_measure_is_kept() {
        let body = r#"{"drinks": [{
            "idDrink": "17222",
            "strDrink": "A1",
            "strTags": null,
            "strCategory": "Cocktail",
            "strAlcoholic": "Alcoholic",
            "strGlass": "Cocktail glass",
            "strInstructions": "Shake and strain.",
            "strDrinkThumb": "https://www.thecocktaildb.com/images/media/drink/2x8thr1504816928.jpg",
            "strIngredient1": "Gin",
            "strIngredient2": "Grand Marnier",
            "strIngredient3": "Lemon Juice",
            "strMeasure1": "1 3/4 shot ",
            "strMeasure2": null
        }]}"#;
        let envelope: DrinksEnvelope<RawDrink> = serde_json::from_str(body).unwrap();
        let cocktail = Cocktail::from(envelope.into_vec().into_iter().next().unwrap());

        assert_eq!(
            cocktail.ingredients,
            vec![
                Ingredient {
                    name: "Gin".to_string(),
                    measure: "1 3/4 shot ".to_string(),
                },
                Ingredient {
                    name: "Grand Marnier".to_string(),
                    measure: String::new(),
                },
                Ingredient {
                    name: "Lemon Juice".to_string(),
                    measure: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_empty_envelopes_decode_to_empty_list() {
        for body in [r#"{"drinks": null}"#, r#"{}"#, r#"{"drinks": "None Found"}"#] {
            let envelope: DrinksEnvelope<FilteredDrink> = serde_json::from_str(body).unwrap();
            assert!(envelope.into_vec().is_empty(), "body: {body}");
        }
    }

    #[test]
    fn test_missing_required_field_fails() {
        let body = r#"{"drinks": [{"idDrink": "1", "strDrink": "Broken"}]}"#;
        assert!(serde_json::from_str::<DrinksEnvelope<RawDrink>>(body).is_err());
    }

    #[test]
    fn test_decode_list_entries() {
        let body = r#"{"drinks": [{"strIngredient1": "Light rum"}, {"strIngredient1": "Gin"}]}"#;
        let envelope: DrinksEnvelope<ListEntry> = serde_json::from_str(body).unwrap();
        let entries = envelope.into_vec();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[1].get("strIngredient1").cloned().flatten().as_deref(),
            Some("Gin")
        );
    }
}
