//! # Snapshot Parsing
//!
//! A snapshot is a pair of JSON arrays, one of restaurants and one of dishes.
//! Bad records are skipped with a warning instead of failing the whole load;
//! only a file that is not a JSON array at all is an error.
use std::collections::HashSet;

use anyhow::{Context, Error};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Dish, RawDish, RawRestaurant, Rejection, Restaurant};

pub fn parse_restaurants(bytes: &[u8]) -> Result<Vec<Restaurant>, Error> {
    let records: Vec<Value> =
        serde_json::from_slice(bytes).context("restaurant snapshot is not a JSON array")?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut restaurants = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let raw: RawRestaurant = match serde_json::from_value(record) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping restaurant #{index}: {e}");
                continue;
            }
        };

        if !seen.insert(raw.id) {
            warn!("Skipping restaurant #{index}: duplicate id {}", raw.id);
            continue;
        }

        if raw.latitude.is_none() || raw.longitude.is_none() {
            debug!("Restaurant {} has no coordinates, using fallback", raw.id);
        }

        restaurants.push(raw.into_restaurant());
    }

    Ok(restaurants)
}

pub fn parse_dishes(bytes: &[u8]) -> Result<Vec<Dish>, Error> {
    let records: Vec<Value> =
        serde_json::from_slice(bytes).context("dish snapshot is not a JSON array")?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut dishes = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        match parse_dish(record) {
            Ok(dish) if seen.insert(dish.id) => dishes.push(dish),
            Ok(dish) => warn!("Skipping dish #{index}: duplicate id {}", dish.id),
            Err(rejection) => warn!("Skipping dish #{index}: {rejection}"),
        }
    }

    Ok(dishes)
}

fn parse_dish(record: Value) -> Result<Dish, Rejection> {
    if !record.is_object() {
        return Err(Rejection::NotAnObject);
    }

    serde_json::from_value::<RawDish>(record)
        .map_err(|e| Rejection::Malformed(e.to_string()))?
        .validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_dishes_are_dropped() {
        let json = br#"[
            { "id": 1, "name": "Pilaf", "price": 10, "restaurant_ids": [1] },
            "not a dish",
            null,
            { "id": 2, "name": "", "price": 4 },
            { "id": 3, "price": 4 },
            { "id": "four", "name": "Manti" },
            { "id": 5, "name": "Borscht", "price": 6 },
            { "id": 5, "name": "Borscht again", "price": 6 }
        ]"#;

        let dishes = parse_dishes(json).unwrap();
        let names: Vec<_> = dishes.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Pilaf", "Borscht"]);
    }

    #[test]
    fn test_named_dishes_with_text_fields_are_kept() {
        let json = br#"[
            { "id": 1, "name": "Pilaf", "ingredients": "rice, lamb" },
            { "id": 2, "name": "Manti", "restaurant_ids": ["1"] }
        ]"#;

        let dishes = parse_dishes(json).unwrap();
        assert_eq!(dishes.len(), 2);
        assert_eq!(dishes[0].ingredients, vec!["rice", "lamb"]);
        assert_eq!(dishes[1].restaurant_ids, vec![1]);
    }

    #[test]
    fn test_duplicate_restaurant_ids_keep_first() {
        let json = br#"[
            { "id": 1, "name": "First", "latitude": 41.3, "longitude": 69.2 },
            { "id": 1, "name": "Second" },
            [1, 2, 3],
            { "id": 2, "name": "Other" }
        ]"#;

        let restaurants = parse_restaurants(json).unwrap();
        assert_eq!(restaurants.len(), 2);
        assert_eq!(restaurants[0].name, "First");
        assert_eq!(restaurants[1].id, 2);
    }

    #[test]
    fn test_non_array_is_an_error() {
        assert!(parse_restaurants(br#"{ "id": 1 }"#).is_err());
        assert!(parse_dishes(b"not json").is_err());
    }
}
