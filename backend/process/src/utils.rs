use std::sync::LazyLock;

use bank::Bank;
use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Cleans every text field in place, returning how many fields changed.
pub fn sanitize_bank(bank: &mut Bank) -> usize {
    let mut changed = 0;

    for restaurant in &mut bank.restaurants {
        for field in [
            &mut restaurant.name,
            &mut restaurant.address,
            &mut restaurant.kind,
        ] {
            changed += sanitize_field(field);
        }
    }

    for dish in &mut bank.dishes {
        for field in [&mut dish.name, &mut dish.description, &mut dish.category] {
            changed += sanitize_field(field);
        }

        let before = dish.ingredients.clone();
        dish.ingredients = before
            .iter()
            .map(|ingredient| sanitize(ingredient))
            .filter(|ingredient| !ingredient.is_empty())
            .collect();

        if dish.ingredients != before {
            changed += 1;
        }
    }

    changed
}

fn sanitize_field(field: &mut String) -> usize {
    let clean = sanitize(field);
    if clean == *field {
        return 0;
    }

    *field = clean;
    1
}

pub fn sanitize(input: &str) -> String {
    WHITESPACE.replace_all(input.trim(), " ").into_owned()
}
