//! # Catalog Store
//!
//! One read-only view over whichever source the server was started with.
//!
//! - `Database`: every call is a query against MySQL
//! - `Snapshot`: every call is a scan over the bank loaded at startup,
//!   shared between requests without locking
//! - `Unavailable`: the snapshot failed to load, every call fails with the
//!   reason so the server can keep running in degraded mode
use std::sync::Arc;

use bank::{
    Bank, get_bank, get_bank_remote,
    models::{Dish, DishId, Restaurant, RestaurantId},
};
use sqlx::MySqlPool;
use tracing::{error, info, warn};

use crate::{
    config::{Config, DataSource},
    database,
    error::AppError,
};

pub enum Store {
    Database(MySqlPool),
    Snapshot(Arc<Bank>),
    Unavailable { source: DataSource, reason: String },
}

impl Store {
    pub async fn load(config: &Config) -> Self {
        match config.data_source {
            DataSource::Database => {
                let pool = database::init_database(config);
                let target = format!("{}:{}/{}", config.db_host, config.db_port, config.db_name);

                match database::ping(&pool).await {
                    Ok(()) => info!("Connected to database at {target}"),
                    Err(e) => warn!("Database at {target} unreachable, serving degraded: {e}"),
                }

                Store::Database(pool)
            }
            DataSource::Snapshot => {
                let loaded = match &config.snapshot_url {
                    Some(url) => {
                        info!("Fetching snapshot from {url}");
                        get_bank_remote(url).await
                    }
                    None => {
                        info!("Reading snapshot from {}", config.snapshot_dir.display());
                        get_bank(&config.snapshot_dir)
                    }
                };

                match loaded {
                    Ok(bank) => {
                        info!(
                            "Loaded {} restaurants and {} dishes",
                            bank.restaurants.len(),
                            bank.dishes.len()
                        );
                        Store::Snapshot(Arc::new(bank))
                    }
                    Err(e) => {
                        error!("Failed to load snapshot, serving degraded: {e:#}");
                        Store::Unavailable {
                            source: DataSource::Snapshot,
                            reason: format!("{e:#}"),
                        }
                    }
                }
            }
        }
    }

    pub fn source(&self) -> DataSource {
        match self {
            Store::Database(_) => DataSource::Database,
            Store::Snapshot(_) => DataSource::Snapshot,
            Store::Unavailable { source, .. } => *source,
        }
    }

    /// Restaurants sorted by rating, highest first.
    pub async fn restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        match self {
            Store::Database(pool) => Ok(database::restaurants_by_rating(pool).await?),
            Store::Snapshot(bank) => Ok(bank.restaurants_by_rating()),
            Store::Unavailable { reason, .. } => Err(unavailable(reason)),
        }
    }

    /// Restaurants in collection order, as scanned by search.
    pub async fn catalog_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        match self {
            Store::Database(pool) => Ok(database::restaurants(pool).await?),
            Store::Snapshot(bank) => Ok(bank.restaurants.clone()),
            Store::Unavailable { reason, .. } => Err(unavailable(reason)),
        }
    }

    pub async fn restaurant(&self, id: RestaurantId) -> Result<Restaurant, AppError> {
        let found = match self {
            Store::Database(pool) => database::restaurant(pool, id).await?,
            Store::Snapshot(bank) => bank.restaurant(id).cloned(),
            Store::Unavailable { reason, .. } => return Err(unavailable(reason)),
        };

        found.ok_or(AppError::NotFound("Restaurant"))
    }

    pub async fn dishes(&self) -> Result<Vec<Dish>, AppError> {
        match self {
            Store::Database(pool) => Ok(database::dishes(pool).await?),
            Store::Snapshot(bank) => Ok(bank.dishes.clone()),
            Store::Unavailable { reason, .. } => Err(unavailable(reason)),
        }
    }

    pub async fn dish(&self, id: DishId) -> Result<Dish, AppError> {
        let found = match self {
            Store::Database(pool) => database::dish(pool, id).await?,
            Store::Snapshot(bank) => bank.dish(id).cloned(),
            Store::Unavailable { reason, .. } => return Err(unavailable(reason)),
        };

        found.ok_or(AppError::NotFound("Dish"))
    }

    pub async fn menu(&self, restaurant_id: RestaurantId) -> Result<Vec<Dish>, AppError> {
        match self {
            Store::Database(pool) => Ok(database::menu(pool, restaurant_id).await?),
            Store::Snapshot(bank) => Ok(bank.menu_for(restaurant_id)),
            Store::Unavailable { reason, .. } => Err(unavailable(reason)),
        }
    }

    pub async fn restaurants_serving(&self, dish_id: DishId) -> Result<Vec<Restaurant>, AppError> {
        match self {
            Store::Database(pool) => Ok(database::restaurants_serving(pool, dish_id).await?),
            Store::Snapshot(bank) => Ok(bank.restaurants_serving(dish_id)),
            Store::Unavailable { reason, .. } => Err(unavailable(reason)),
        }
    }

    /// Restaurant and dish counts, used by the health check.
    pub async fn counts(&self) -> Result<(usize, usize), AppError> {
        match self {
            Store::Database(pool) => Ok(database::counts(pool).await?),
            Store::Snapshot(bank) => Ok((bank.restaurants.len(), bank.dishes.len())),
            Store::Unavailable { reason, .. } => Err(unavailable(reason)),
        }
    }
}

fn unavailable(reason: &str) -> AppError {
    AppError::StoreUnavailable(reason.to_string())
}
