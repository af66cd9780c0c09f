//! # Catalog Records
//!
//! Restaurants and dishes as served to the map front end.
//!
//! Snapshot files are loosely typed, so every record is first read into a
//! `Raw*` shape where almost everything is optional, then validated into the
//! strict record. Validation is where blank dish names and bad prices get
//! rejected and where missing coordinates get patched.
//!
//! ## Fallback coordinates
//!
//! Restaurants without a position are dropped somewhere inside a fixed
//! bounding box around the city center so they still show up on the map.
//! The point is derived from the restaurant id, so the same restaurant lands
//! on the same spot on every read.
use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Deserializer, Serialize};

pub type RestaurantId = i64;
pub type DishId = i64;

/// Latitude span of the fallback bounding box (south, north).
pub const FALLBACK_LATITUDE: (f64, f64) = (41.25, 41.35);
/// Longitude span of the fallback bounding box (west, east).
pub const FALLBACK_LONGITUDE: (f64, f64) = (69.2, 69.35);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub rating: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub ingredients: Vec<String>,
    pub restaurant_ids: Vec<RestaurantId>,
}

#[derive(Debug, Deserialize)]
pub struct RawRestaurant {
    pub id: RestaurantId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<f64>,
    #[serde(default, alias = "lat", deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon", deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawDish {
    pub id: DishId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_ingredients")]
    pub ingredients: Option<Vec<String>>,
    #[serde(
        default,
        alias = "restaurantIds",
        alias = "restaurants",
        deserialize_with = "lenient_ids"
    )]
    pub restaurant_ids: Option<Vec<RestaurantId>>,
}

/// Why a dish record was left out of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NotAnObject,
    Malformed(String),
    BlankName,
    InvalidPrice(f64),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAnObject => write!(f, "record is not an object"),
            Rejection::Malformed(reason) => write!(f, "malformed record: {reason}"),
            Rejection::BlankName => write!(f, "name is missing or blank"),
            Rejection::InvalidPrice(price) => write!(f, "invalid price {price}"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

// Database exports tend to carry DECIMAL columns as strings.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrText>::deserialize(deserializer)? {
            Some(NumberOrText::Number(value)) => Some(value),
            Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
            None => None,
        },
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText<T> {
    List(Vec<T>),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrText {
    Id(RestaurantId),
    Text(String),
}

fn lenient_ingredients<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<ListOrText<String>>::deserialize(deserializer)? {
            Some(ListOrText::List(ingredients)) => Some(ingredients),
            Some(ListOrText::Text(text)) => Some(parse_ingredients(&text)),
            None => None,
        },
    )
}

// Ids that are not numbers are dropped, the dish itself is kept.
fn lenient_ids<'de, D>(deserializer: D) -> Result<Option<Vec<RestaurantId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<ListOrText<IdOrText>>::deserialize(deserializer)? {
            Some(ListOrText::List(ids)) => Some(
                ids.into_iter()
                    .filter_map(|id| match id {
                        IdOrText::Id(id) => Some(id),
                        IdOrText::Text(text) => text.trim().parse().ok(),
                    })
                    .collect(),
            ),
            Some(ListOrText::Text(text)) => Some(
                text.split(',')
                    .filter_map(|id| id.trim().parse().ok())
                    .collect(),
            ),
            None => None,
        },
    )
}

/// Ingredients stored as text: a JSON array, or comma separated names.
pub fn parse_ingredients(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    serde_json::from_str(raw).unwrap_or_else(|_| {
        raw.split(',')
            .map(str::trim)
            .filter(|ingredient| !ingredient.is_empty())
            .map(String::from)
            .collect()
    })
}

impl RawRestaurant {
    pub fn into_restaurant(self) -> Restaurant {
        let (latitude, longitude) = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => (latitude, longitude),
            _ => fallback_coordinates(self.id),
        };

        Restaurant {
            id: self.id,
            name: self.name.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            latitude,
            longitude,
        }
    }
}

impl RawDish {
    pub fn validate(self) -> Result<Dish, Rejection> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(Rejection::BlankName),
        };

        let price = self.price.unwrap_or_default();
        if !price.is_finite() || price < 0.0 {
            return Err(Rejection::InvalidPrice(price));
        }

        let mut restaurant_ids = self.restaurant_ids.unwrap_or_default();
        dedup_in_order(&mut restaurant_ids);

        Ok(Dish {
            id: self.id,
            name,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            price,
            ingredients: self.ingredients.unwrap_or_default(),
            restaurant_ids,
        })
    }
}

/// Pseudo-random point inside the fallback bounding box, stable per id.
pub fn fallback_coordinates(id: RestaurantId) -> (f64, f64) {
    let mut rng = StdRng::seed_from_u64(id as u64);

    (
        rng.gen_range(FALLBACK_LATITUDE.0..FALLBACK_LATITUDE.1),
        rng.gen_range(FALLBACK_LONGITUDE.0..FALLBACK_LONGITUDE.1),
    )
}

/// Highest rated first. Stable, so equal ratings keep collection order.
pub fn sort_by_rating(restaurants: &mut [Restaurant]) {
    restaurants.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

fn dedup_in_order(ids: &mut Vec<RestaurantId>) {
    let mut seen = Vec::with_capacity(ids.len());
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_dish(value: serde_json::Value) -> RawDish {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_coordinates_land_in_fallback_box() {
        let raw: RawRestaurant = serde_json::from_value(json!({
            "id": 7,
            "name": "Chorsu",
            "latitude": 41.3
        }))
        .unwrap();

        let restaurant = raw.into_restaurant();
        assert!((FALLBACK_LATITUDE.0..FALLBACK_LATITUDE.1).contains(&restaurant.latitude));
        assert!((FALLBACK_LONGITUDE.0..FALLBACK_LONGITUDE.1).contains(&restaurant.longitude));
        assert_eq!(fallback_coordinates(7), (restaurant.latitude, restaurant.longitude));
    }

    #[test]
    fn test_present_coordinates_are_kept() {
        let raw: RawRestaurant = serde_json::from_value(json!({
            "id": 1,
            "name": "Plov Center",
            "lat": 41.0,
            "lng": 69.0
        }))
        .unwrap();

        let restaurant = raw.into_restaurant();
        assert_eq!((restaurant.latitude, restaurant.longitude), (41.0, 69.0));
    }

    #[test]
    fn test_rating_accepts_text() {
        let raw: RawRestaurant =
            serde_json::from_value(json!({ "id": 1, "rating": "4.5" })).unwrap();
        assert_eq!(raw.rating, Some(4.5));

        let raw: RawRestaurant =
            serde_json::from_value(json!({ "id": 1, "rating": "n/a" })).unwrap();
        assert_eq!(raw.rating, None);
    }

    #[test]
    fn test_blank_names_rejected() {
        let missing = raw_dish(json!({ "id": 1, "price": 3 }));
        assert_eq!(missing.validate(), Err(Rejection::BlankName));

        let blank = raw_dish(json!({ "id": 2, "name": "   ", "price": 3 }));
        assert_eq!(blank.validate(), Err(Rejection::BlankName));
    }

    #[test]
    fn test_negative_price_rejected() {
        let dish = raw_dish(json!({ "id": 1, "name": "Somsa", "price": -1 }));
        assert_eq!(dish.validate(), Err(Rejection::InvalidPrice(-1.0)));
    }

    #[test]
    fn test_restaurant_ids_deduplicated() {
        let dish = raw_dish(json!({
            "id": 1,
            "name": "Lagman",
            "price": 5,
            "restaurantIds": [3, 1, 3, 2, 1]
        }))
        .validate()
        .unwrap();

        assert_eq!(dish.restaurant_ids, vec![3, 1, 2]);
        assert!(dish.ingredients.is_empty());
    }

    #[test]
    fn test_ingredients_json_or_text() {
        assert_eq!(
            parse_ingredients(r#"["rice", "carrot", "lamb"]"#),
            vec!["rice", "carrot", "lamb"]
        );
        assert_eq!(
            parse_ingredients("beet, cabbage ,, potato"),
            vec!["beet", "cabbage", "potato"]
        );
        assert!(parse_ingredients("   ").is_empty());
    }

    #[test]
    fn test_loosely_typed_lists_accepted() {
        let dish = raw_dish(json!({
            "id": 1,
            "name": "Pilaf",
            "ingredients": "rice, lamb",
            "restaurant_ids": ["1", 2, "x", " 3 "]
        }))
        .validate()
        .unwrap();

        assert_eq!(dish.ingredients, vec!["rice", "lamb"]);
        assert_eq!(dish.restaurant_ids, vec![1, 2, 3]);

        let dish = raw_dish(json!({
            "id": 2,
            "name": "Manti",
            "restaurants": "6, 7",
            "ingredients": null
        }))
        .validate()
        .unwrap();
        assert_eq!(dish.restaurant_ids, vec![6, 7]);
        assert!(dish.ingredients.is_empty());
    }

    #[test]
    fn test_sort_by_rating_is_stable() {
        let mut restaurants: Vec<Restaurant> = [(1, 4.0), (2, 4.8), (3, 4.0)]
            .into_iter()
            .map(|(id, rating)| {
                RawRestaurant {
                    id,
                    name: None,
                    address: None,
                    kind: None,
                    rating: Some(rating),
                    latitude: Some(0.0),
                    longitude: Some(0.0),
                }
                .into_restaurant()
            })
            .collect();

        sort_by_rating(&mut restaurants);
        let ids: Vec<_> = restaurants.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
