use anyhow::Error;
use reqwest::get;

use crate::{Bank, DISHES_FILE, RESTAURANTS_FILE};

/// Fetches `restaurants.json` and `dishes.json` from `base_url`.
pub async fn get_bank_remote(base_url: &str) -> Result<Bank, Error> {
    let restaurants = fetch(&file_url(base_url, RESTAURANTS_FILE)).await?;
    let dishes = fetch(&file_url(base_url, DISHES_FILE)).await?;

    Bank::from_slices(&restaurants, &dishes)
}

async fn fetch(url: &str) -> Result<Vec<u8>, Error> {
    let response = get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    Ok(bytes.to_vec())
}

fn file_url(base_url: &str, file: &str) -> String {
    format!("{}/{file}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_joins_once() {
        assert_eq!(
            file_url("https://cdn.example.com/data/", RESTAURANTS_FILE),
            "https://cdn.example.com/data/restaurants.json"
        );
        assert_eq!(
            file_url("https://cdn.example.com/data", DISHES_FILE),
            "https://cdn.example.com/data/dishes.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        assert!(get_bank_remote("http://127.0.0.1:1").await.is_err());
    }
}
