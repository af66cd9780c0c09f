//! # Bank
//!
//! The restaurant and dish catalog behind the map.
//!
//! A bank is loaded once, either from a snapshot directory on disk or from a
//! remote copy of the same files, and never changes afterwards. Everything
//! the server does in snapshot mode is a scan over these two vectors.
//!
//! ## Files
//! - `restaurants.json`: array of restaurants
//! - `dishes.json`: array of dishes, each carrying the ids of the
//!   restaurants that serve it
use std::{fs, path::Path};

use anyhow::{Context, Error};

pub mod models;
pub mod relations;
pub mod remote;
pub mod snapshot;

use models::{Dish, DishId, Restaurant, RestaurantId, sort_by_rating};
use snapshot::{parse_dishes, parse_restaurants};

pub use remote::get_bank_remote;

pub const RESTAURANTS_FILE: &str = "restaurants.json";
pub const DISHES_FILE: &str = "dishes.json";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bank {
    pub restaurants: Vec<Restaurant>,
    pub dishes: Vec<Dish>,
}

impl Bank {
    pub fn from_slices(restaurants: &[u8], dishes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            restaurants: parse_restaurants(restaurants)?,
            dishes: parse_dishes(dishes)?,
        })
    }

    pub fn restaurant(&self, id: RestaurantId) -> Option<&Restaurant> {
        self.restaurants.iter().find(|restaurant| restaurant.id == id)
    }

    pub fn dish(&self, id: DishId) -> Option<&Dish> {
        self.dishes.iter().find(|dish| dish.id == id)
    }

    pub fn restaurants_by_rating(&self) -> Vec<Restaurant> {
        let mut restaurants = self.restaurants.clone();
        sort_by_rating(&mut restaurants);

        restaurants
    }
}

pub fn get_bank(dir: &Path) -> Result<Bank, Error> {
    let restaurants_path = dir.join(RESTAURANTS_FILE);
    let dishes_path = dir.join(DISHES_FILE);

    let restaurants = fs::read(&restaurants_path)
        .with_context(|| format!("reading {}", restaurants_path.display()))?;
    let dishes =
        fs::read(&dishes_path).with_context(|| format!("reading {}", dishes_path.display()))?;

    Bank::from_slices(&restaurants, &dishes)
}

pub fn write_bank(dir: &Path, bank: &Bank) -> Result<(), Error> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    fs::write(
        dir.join(RESTAURANTS_FILE),
        serde_json::to_vec_pretty(&bank.restaurants)?,
    )?;
    fs::write(dir.join(DISHES_FILE), serde_json::to_vec_pretty(&bank.dishes)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESTAURANTS: &[u8] = br#"[
        {
            "id": 1, "name": "Plov Center", "type": "Uzbek", "rating": 4.2,
            "latitude": 41.3, "longitude": 69.25
        },
        { "id": 2, "name": "Kiev Kitchen", "type": "Ukrainian", "rating": 4.7 }
    ]"#;

    const DISHES: &[u8] = br#"[
        { "id": 1, "name": "Pilaf", "price": 10, "restaurant_ids": [1] },
        { "id": 2, "name": "Borscht", "price": 6, "restaurant_ids": [2] }
    ]"#;

    #[test]
    fn test_lookup_by_id() {
        let bank = Bank::from_slices(RESTAURANTS, DISHES).unwrap();

        for restaurant in &bank.restaurants {
            assert_eq!(bank.restaurant(restaurant.id), Some(restaurant));
        }
        assert_eq!(bank.dish(2).map(|d| d.name.as_str()), Some("Borscht"));
        assert!(bank.restaurant(99).is_none());
        assert!(bank.dish(99).is_none());
    }

    #[test]
    fn test_restaurants_by_rating() {
        let bank = Bank::from_slices(RESTAURANTS, DISHES).unwrap();
        let ids: Vec<_> = bank.restaurants_by_rating().iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![2, 1]);
        assert_eq!(bank.restaurants[0].id, 1);
    }

    #[test]
    fn test_write_then_read_keeps_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let bank = Bank::from_slices(RESTAURANTS, DISHES).unwrap();

        write_bank(dir.path(), &bank).unwrap();
        let reloaded = get_bank(dir.path()).unwrap();

        assert_eq!(reloaded.dishes, bank.dishes);
        for (before, after) in bank.restaurants.iter().zip(&reloaded.restaurants) {
            assert_eq!(before.id, after.id);
            assert!((before.latitude - after.latitude).abs() < 1e-9);
            assert!((before.longitude - after.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(get_bank(&dir.path().join("nope")).is_err());
    }
}
