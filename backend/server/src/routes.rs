use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use bank::models::{Dish, Restaurant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
#[cfg(feature = "verbose")]
use tracing::info;

use crate::{
    error::AppError,
    search::{DishFilter, SearchResults, SearchScope, filter_dishes, unified_search},
    state::AppState,
    utils::parse_id,
};

#[derive(Debug, Default, Deserialize)]
pub struct DishParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub source: &'static str,
    pub restaurants: usize,
    pub dishes: usize,
    pub timestamp: DateTime<Utc>,
}

pub async fn restaurants_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    Ok(Json(state.store.restaurants().await?))
}

pub async fn restaurant_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, AppError> {
    let id = parse_id(&id).ok_or(AppError::NotFound("Restaurant"))?;

    Ok(Json(state.store.restaurant(id).await?))
}

pub async fn menu_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Dish>>, AppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Vec::new()));
    };

    Ok(Json(state.store.menu(id).await?))
}

pub async fn dishes_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DishParams>,
) -> Result<Json<Vec<Dish>>, AppError> {
    let filter = DishFilter::from(params);

    #[cfg(feature = "verbose")]
    info!("Filtering dishes with {filter:?}");

    let dishes = state.store.dishes().await?;

    Ok(Json(filter_dishes(dishes, &filter)))
}

pub async fn dish_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Dish>, AppError> {
    let id = parse_id(&id).ok_or(AppError::NotFound("Dish"))?;

    Ok(Json(state.store.dish(id).await?))
}

pub async fn dish_restaurants_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Vec::new()));
    };

    Ok(Json(state.store.restaurants_serving(id).await?))
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, AppError> {
    let scope = SearchScope::parse(params.scope.as_deref());

    #[cfg(feature = "verbose")]
    info!("Searching {scope:?} for {:?}", params.query);

    let results = unified_search(&state.store, params.query.as_deref(), scope).await?;

    Ok(Json(results))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Result<Json<Health>, AppError> {
    let (restaurants, dishes) = state.store.counts().await?;

    Ok(Json(Health {
        status: "ok",
        source: state.store.source().as_str(),
        restaurants,
        dishes,
        timestamp: Utc::now(),
    }))
}

pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "path": uri.path(),
            "hint": "Try /api/restaurants, /api/dishes, /api/search?query=... or /health",
        })),
    )
}
