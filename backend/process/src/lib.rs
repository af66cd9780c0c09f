//! # Snapshot Processing
//!
//! Turns a raw catalog export into the snapshot the server reads.
//!
//! Raw exports come from hand-edited JSON or from a database dump and tend
//! to carry stray whitespace, dishes without names, and restaurants that
//! were never geocoded. The server copes with all of that at load time, but
//! a cleaned snapshot is easier to diff and review.
//!
//! ## Steps
//! 1. Load the raw snapshot from a directory or a base URL. Loading already
//!    drops malformed or nameless dishes and duplicate ids.
//!
//! 2. Collapse whitespace in every text field and drop empty ingredients.
//!
//! 3. Write the result. Fallback coordinates are written out as real
//!    coordinates, so the map stops moving them around if the fallback box
//!    ever changes.
//!
//! ## Usage
//!
//! Clean the bundled snapshot in place.
//! ```sh
//! cargo run -p process -- --input data --output data
//! ```
//!
//! Pull a published snapshot.
//! ```sh
//! cargo run -p process -- --url https://example.com/snapshot --output data
//! ```
use std::path::{Path, PathBuf};

use anyhow::Error;
use bank::{get_bank, get_bank_remote, models::fallback_coordinates, write_bank};

pub mod utils;

use utils::sanitize_bank;

pub enum Source {
    Local(PathBuf),
    Remote(String),
}

#[derive(Debug, Default, PartialEq)]
pub struct Report {
    pub restaurants: usize,
    pub dishes: usize,
    pub placed_by_fallback: usize,
    pub cleaned_fields: usize,
}

pub async fn load_snapshot(source: Source, output: &Path) -> Result<Report, Error> {
    let mut bank = match &source {
        Source::Local(dir) => {
            println!("Reading snapshot from {}", dir.display());
            get_bank(dir)?
        }
        Source::Remote(url) => {
            println!("Fetching snapshot from {url}");
            get_bank_remote(url).await?
        }
    };

    let cleaned_fields = sanitize_bank(&mut bank);

    let placed_by_fallback = bank
        .restaurants
        .iter()
        .filter(|r| (r.latitude, r.longitude) == fallback_coordinates(r.id))
        .count();

    let report = Report {
        restaurants: bank.restaurants.len(),
        dishes: bank.dishes.len(),
        placed_by_fallback,
        cleaned_fields,
    };

    println!("Loaded Restaurants: {}", report.restaurants);
    println!("Loaded Dishes: {}", report.dishes);
    println!("Placed By Fallback: {}", report.placed_by_fallback);
    println!("Cleaned Fields: {}\n", report.cleaned_fields);

    write_bank(output, &bank)?;
    println!("Snapshot written to {}", output.display());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[tokio::test]
    async fn test_load_snapshot_cleans_and_writes() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        fs::write(
            input.path().join(bank::RESTAURANTS_FILE),
            r#"[
                { "id": 1, "name": "  Plov   Center ", "latitude": 41.3, "longitude": 69.25 },
                { "id": 2, "name": "Samsa House" }
            ]"#,
        )
        .unwrap();
        fs::write(
            input.path().join(bank::DISHES_FILE),
            r#"[
                { "id": 1, "name": "Pilaf", "price": 10, "ingredients": ["rice", "  "] },
                { "id": 2, "name": " ", "price": 3 }
            ]"#,
        )
        .unwrap();

        let report = load_snapshot(Source::Local(input.path().to_path_buf()), output.path())
            .await
            .unwrap();

        assert_eq!(
            report,
            Report {
                restaurants: 2,
                dishes: 1,
                placed_by_fallback: 1,
                cleaned_fields: 2,
            }
        );

        let written = get_bank(output.path()).unwrap();
        assert_eq!(written.restaurants[0].name, "Plov Center");
        assert_eq!(written.dishes[0].ingredients, vec!["rice"]);
    }
}
