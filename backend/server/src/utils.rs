use bank::models::RestaurantId;
use tracing::debug;

use crate::{routes::DishParams, search::DishFilter};

/// Path ids that are not integers behave like ids with no record.
pub fn parse_id(raw: &str) -> Option<RestaurantId> {
    raw.trim().parse().ok()
}

impl From<DishParams> for DishFilter {
    fn from(params: DishParams) -> Self {
        Self {
            search: non_empty(params.search),
            category: non_empty(params.category),
            min_price: price_bound("min_price", params.min_price),
            max_price: price_bound("max_price", params.max_price),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn price_bound(key: &str, raw: Option<String>) -> Option<f64> {
    let raw = non_empty(raw)?;

    match raw.trim().parse::<f64>() {
        Ok(bound) if bound.is_finite() => Some(bound),
        _ => {
            debug!("Ignoring {key}={raw}, not a number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(search: &str, category: &str, min: &str, max: &str) -> DishParams {
        let some = |s: &str| Some(s.to_string());

        DishParams {
            search: some(search),
            category: some(category),
            min_price: some(min),
            max_price: some(max),
        }
    }

    #[test]
    fn test_empty_params_are_absent() {
        let filter = DishFilter::from(params("", "", "", ""));
        assert_eq!(filter, DishFilter::default());
    }

    #[test]
    fn test_prices_parsed() {
        let filter = DishFilter::from(params("plov", "Main", "2.5", " 10 "));

        assert_eq!(filter.search.as_deref(), Some("plov"));
        assert_eq!(filter.category.as_deref(), Some("Main"));
        assert_eq!(filter.min_price, Some(2.5));
        assert_eq!(filter.max_price, Some(10.0));
    }

    #[test]
    fn test_bad_prices_ignored() {
        let filter = DishFilter::from(params("", "", "cheap", "NaN"));

        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, None);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("forty-two"), None);
        assert_eq!(parse_id(""), None);
    }
}
