//! # Search
//!
//! Everything the front end can filter or search by, done in process over
//! the collections the store hands back.
//!
//!
//!
//! ## Dish Filter
//! - `search`: case-insensitive substring of the name, the category or any
//!   ingredient
//! - `category`: exact match
//! - `min_price` / `max_price`: inclusive bounds
//!
//! Every supplied predicate must hold. Results are sorted by name with the
//! Unicode collation algorithm (CLDR root order), so accented, Cyrillic and
//! Latin names interleave the way a person would sort them.
//!
//!
//!
//! ## Unified Search
//! The query is a comma separated list of terms, e.g. `pizza, sushi`. A
//! record is a hit when any term is a substring of any of its searchable
//! fields.
//!
//! - Restaurants: name, address, type
//! - Dishes: name, category, ingredients
//!
//! No ranking. Hits come back in collection order, at most [`SEARCH_LIMIT`]
//! per list.
//!
//!
//!
//! ## Database Mode
//! The database is only asked for whole collections and the filtering below
//! runs on those, so both data sources agree on every result.
use bank::models::{Dish, Restaurant};
use feruca::Collator;
use serde::Serialize;
use tracing::debug;

use crate::{error::AppError, store::Store};

pub const SEARCH_LIMIT: usize = 20;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DishFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    #[default]
    All,
    Restaurants,
    Dishes,
}

impl SearchScope {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("all") => SearchScope::All,
            Some("restaurants") => SearchScope::Restaurants,
            Some("dishes") => SearchScope::Dishes,
            Some(other) => {
                debug!("Unknown search type '{other}', searching everything");
                SearchScope::All
            }
        }
    }

    fn restaurants(self) -> bool {
        matches!(self, SearchScope::All | SearchScope::Restaurants)
    }

    fn dishes(self) -> bool {
        matches!(self, SearchScope::All | SearchScope::Dishes)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurants: Option<Vec<Restaurant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dishes: Option<Vec<Dish>>,
}

pub fn filter_dishes(dishes: Vec<Dish>, filter: &DishFilter) -> Vec<Dish> {
    let needle = filter.search.as_deref().map(str::to_lowercase);

    let mut matched: Vec<Dish> = dishes
        .into_iter()
        .filter(|dish| {
            needle
                .as_deref()
                .is_none_or(|needle| dish_matches(dish, &[needle]))
                && filter
                    .category
                    .as_deref()
                    .is_none_or(|category| dish.category == category)
                && filter.min_price.is_none_or(|min| dish.price >= min)
                && filter.max_price.is_none_or(|max| dish.price <= max)
        })
        .collect();

    sort_by_name(&mut matched);

    matched
}

/// Collation order first, then exact, so `apple` and `Apple` sit together
/// and `Éclair` lands before `Fish`.
pub fn sort_by_name(dishes: &mut [Dish]) {
    let mut collator = Collator::default();

    dishes.sort_by(|a, b| {
        collator
            .collate(a.name.as_str(), b.name.as_str())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Splits a raw query into trimmed, lower-cased, non-empty terms.
pub fn parse_terms(query: &str) -> Vec<String> {
    query
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

pub fn search_restaurants<T: AsRef<str>>(
    restaurants: Vec<Restaurant>,
    terms: &[T],
) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|restaurant| restaurant_matches(restaurant, terms))
        .take(SEARCH_LIMIT)
        .collect()
}

pub fn search_dishes<T: AsRef<str>>(dishes: Vec<Dish>, terms: &[T]) -> Vec<Dish> {
    dishes
        .into_iter()
        .filter(|dish| dish_matches(dish, terms))
        .take(SEARCH_LIMIT)
        .collect()
}

pub async fn unified_search(
    store: &Store,
    query: Option<&str>,
    scope: SearchScope,
) -> Result<SearchResults, AppError> {
    let query = query
        .filter(|query| !query.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Search query is required".to_string()))?;

    let terms = parse_terms(query);
    let mut results = SearchResults::default();

    if scope.restaurants() {
        let restaurants = store.catalog_restaurants().await?;
        results.restaurants = Some(search_restaurants(restaurants, &terms));
    }

    if scope.dishes() {
        let dishes = store.dishes().await?;
        results.dishes = Some(search_dishes(dishes, &terms));
    }

    Ok(results)
}

fn restaurant_matches<T: AsRef<str>>(restaurant: &Restaurant, terms: &[T]) -> bool {
    let fields = [
        restaurant.name.to_lowercase(),
        restaurant.address.to_lowercase(),
        restaurant.kind.to_lowercase(),
    ];

    any_term_in(terms, fields.iter().map(String::as_str))
}

fn dish_matches<T: AsRef<str>>(dish: &Dish, terms: &[T]) -> bool {
    let fields: Vec<String> = [&dish.name, &dish.category]
        .into_iter()
        .chain(&dish.ingredients)
        .map(|field| field.to_lowercase())
        .collect();

    any_term_in(terms, fields.iter().map(String::as_str))
}

fn any_term_in<'a, T: AsRef<str>>(
    terms: &[T],
    fields: impl Iterator<Item = &'a str> + Clone,
) -> bool {
    terms.iter().any(|term| {
        let term = term.as_ref();
        fields.clone().any(|field| field.contains(term))
    })
}
