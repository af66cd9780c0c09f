//! # MySQL
//!
//! Relational backing store.
//!
//! ## Schema
//!
//! - `restaurants`: one row per restaurant, coordinates nullable
//! - `dishes`: one row per dish, `ingredients` as a JSON array (older dumps
//!   use comma separated text, both are accepted)
//! - `restaurant_dishes`: the serving relation, one row per pair
//!
//! See `sql/schema.sql`.
//!
//! ## Connection
//!
//! The pool connects lazily. A database that is down at startup only costs
//! a warning; every query against it fails later and turns into a 500.
//!
//! Whole-collection reads are fine here, the catalog is a few hundred rows.
use std::{collections::HashMap, time::Duration};

use bank::models::{Dish, DishId, RawRestaurant, Restaurant, RestaurantId, parse_ingredients};
use sqlx::{
    FromRow, MySql, MySqlPool, QueryBuilder,
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
};

use crate::config::Config;

const RESTAURANT_COLUMNS: &str =
    "r.id, r.name, r.address, r.`type`, r.rating, r.latitude, r.longitude";
const DISH_COLUMNS: &str = "d.id, d.name, d.description, d.category, d.price, d.ingredients";

#[derive(FromRow)]
struct RestaurantRow {
    id: i64,
    name: Option<String>,
    address: Option<String>,
    #[sqlx(rename = "type")]
    kind: Option<String>,
    rating: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(FromRow)]
struct DishRow {
    id: i64,
    name: String,
    description: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    ingredients: Option<String>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        RawRestaurant {
            id: row.id,
            name: row.name,
            address: row.address,
            kind: row.kind,
            rating: row.rating,
            latitude: row.latitude,
            longitude: row.longitude,
        }
        .into_restaurant()
    }
}

impl DishRow {
    fn into_dish(self, restaurant_ids: Vec<RestaurantId>) -> Dish {
        Dish {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            ingredients: self
                .ingredients
                .as_deref()
                .map(parse_ingredients)
                .unwrap_or_default(),
            restaurant_ids,
        }
    }
}

pub fn init_database(config: &Config) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .username(&config.db_user)
        .password(&config.db_password)
        .database(&config.db_name)
        .charset("utf8mb4");

    MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_lazy_with(options)
}

pub async fn ping(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Restaurants in table order.
pub async fn restaurants(pool: &MySqlPool) -> Result<Vec<Restaurant>, sqlx::Error> {
    fetch_restaurants(
        pool,
        &format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants r ORDER BY r.id"),
    )
    .await
}

pub async fn restaurants_by_rating(pool: &MySqlPool) -> Result<Vec<Restaurant>, sqlx::Error> {
    fetch_restaurants(
        pool,
        &format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants r ORDER BY r.rating DESC, r.id"),
    )
    .await
}

pub async fn restaurant(
    pool: &MySqlPool,
    id: RestaurantId,
) -> Result<Option<Restaurant>, sqlx::Error> {
    let row: Option<RestaurantRow> =
        sqlx::query_as(&format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants r WHERE r.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(Restaurant::from))
}

pub async fn dishes(pool: &MySqlPool) -> Result<Vec<Dish>, sqlx::Error> {
    let rows: Vec<DishRow> =
        sqlx::query_as(&format!("SELECT {DISH_COLUMNS} FROM dishes d ORDER BY d.id"))
            .fetch_all(pool)
            .await?;

    let pairs: Vec<(DishId, RestaurantId)> = sqlx::query_as(
        "SELECT dish_id, restaurant_id FROM restaurant_dishes ORDER BY dish_id, restaurant_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(attach(rows, group_by_dish(pairs)))
}

pub async fn dish(pool: &MySqlPool, id: DishId) -> Result<Option<Dish>, sqlx::Error> {
    let row: Option<DishRow> =
        sqlx::query_as(&format!("SELECT {DISH_COLUMNS} FROM dishes d WHERE d.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut relation = serving_relation(pool, &[row.id]).await?;
    let restaurant_ids = relation.remove(&row.id).unwrap_or_default();

    Ok(Some(row.into_dish(restaurant_ids)))
}

pub async fn menu(pool: &MySqlPool, restaurant_id: RestaurantId) -> Result<Vec<Dish>, sqlx::Error> {
    let rows: Vec<DishRow> = sqlx::query_as(&format!(
        "SELECT {DISH_COLUMNS} FROM dishes d \
         JOIN restaurant_dishes rd ON rd.dish_id = d.id \
         WHERE rd.restaurant_id = ? ORDER BY d.id"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<DishId> = rows.iter().map(|row| row.id).collect();
    let relation = serving_relation(pool, &ids).await?;

    Ok(attach(rows, relation))
}

pub async fn restaurants_serving(
    pool: &MySqlPool,
    dish_id: DishId,
) -> Result<Vec<Restaurant>, sqlx::Error> {
    let rows: Vec<RestaurantRow> = sqlx::query_as(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants r \
         JOIN restaurant_dishes rd ON rd.restaurant_id = r.id \
         WHERE rd.dish_id = ? ORDER BY r.id"
    ))
    .bind(dish_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Restaurant::from).collect())
}

pub async fn counts(pool: &MySqlPool) -> Result<(usize, usize), sqlx::Error> {
    let (restaurants, dishes): (i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM restaurants), (SELECT COUNT(*) FROM dishes)",
    )
    .fetch_one(pool)
    .await?;

    Ok((restaurants as usize, dishes as usize))
}

async fn fetch_restaurants(pool: &MySqlPool, sql: &str) -> Result<Vec<Restaurant>, sqlx::Error> {
    let rows: Vec<RestaurantRow> = sqlx::query_as(sql).fetch_all(pool).await?;

    Ok(rows.into_iter().map(Restaurant::from).collect())
}

async fn serving_relation(
    pool: &MySqlPool,
    dish_ids: &[DishId],
) -> Result<HashMap<DishId, Vec<RestaurantId>>, sqlx::Error> {
    if dish_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder = QueryBuilder::<MySql>::new(
        "SELECT dish_id, restaurant_id FROM restaurant_dishes WHERE dish_id IN (",
    );

    let mut separated = builder.separated(", ");
    for id in dish_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY dish_id, restaurant_id");

    let pairs: Vec<(DishId, RestaurantId)> = builder.build_query_as().fetch_all(pool).await?;

    Ok(group_by_dish(pairs))
}

fn group_by_dish(pairs: Vec<(DishId, RestaurantId)>) -> HashMap<DishId, Vec<RestaurantId>> {
    let mut relation: HashMap<DishId, Vec<RestaurantId>> = HashMap::new();

    for (dish_id, restaurant_id) in pairs {
        let ids = relation.entry(dish_id).or_default();
        if !ids.contains(&restaurant_id) {
            ids.push(restaurant_id);
        }
    }

    relation
}

fn attach(rows: Vec<DishRow>, mut relation: HashMap<DishId, Vec<RestaurantId>>) -> Vec<Dish> {
    rows.into_iter()
        .map(|row| {
            let restaurant_ids = relation.remove(&row.id).unwrap_or_default();
            row.into_dish(restaurant_ids)
        })
        .collect()
}
