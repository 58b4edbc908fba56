// ABOUTME: Shopping-list aggregator: sums cart ingredient amounts per (name, unit)
// ABOUTME: Pure functions; the route feeds them rows and serves the rendered text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Shopping List
//!
//! Every recipe in a cart contributes its `(ingredient, amount)` pairs.
//! Pairs are grouped by ingredient name and measurement unit, amounts are
//! summed per group, and groups are ordered by name ignoring case (ties by
//! unit). The report is a header line followed by one line per group:
//!
//! ```text
//! Список покупок:
//! Мука (г) — 300
//! Сахар (г) — 50
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::constants::shopping_list::HEADER;
use crate::errors::{AppError, AppResult};
use crate::models::RecipeIngredient;

/// One deduplicated line of the shopping list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Sum of amounts across all cart recipes
    pub total: i64,
}

/// Group by `(name, unit)`, sum amounts, and sort case-insensitively by name
#[must_use]
pub fn aggregate<I>(lines: I) -> Vec<ShoppingListItem>
where
    I: IntoIterator<Item = RecipeIngredient>,
{
    let mut totals: HashMap<(String, String), i64> = HashMap::new();
    for line in lines {
        let total = totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0);
        *total = total.saturating_add(line.amount);
    }

    let mut items: Vec<ShoppingListItem> = totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListItem {
            name,
            measurement_unit,
            total,
        })
        .collect();

    items.sort_by_cached_key(|item| {
        (
            item.name.to_lowercase(),
            item.measurement_unit.to_lowercase(),
            item.name.clone(),
            item.measurement_unit.clone(),
        )
    });
    items
}

/// Render the header and one `"{name} ({unit}) — {total}"` line per item
#[must_use]
pub fn render(items: &[ShoppingListItem]) -> String {
    let mut report = format!("{HEADER}\n");
    for item in items {
        let _ = writeln!(
            report,
            "{} ({}) — {}",
            item.name, item.measurement_unit, item.total
        );
    }
    report
}

/// Aggregate and render, refusing an empty cart
///
/// # Errors
///
/// Returns an `InvalidInput` error when there is nothing to shop for
pub fn build_report<I>(lines: I) -> AppResult<String>
where
    I: IntoIterator<Item = RecipeIngredient>,
{
    let items = aggregate(lines);
    if items.is_empty() {
        return Err(AppError::invalid_input("Shopping cart is empty"));
    }
    Ok(render(&items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn line(id: i64, name: &str, unit: &str, amount: i64) -> RecipeIngredient {
        RecipeIngredient {
            id,
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    #[test]
    fn test_two_recipes_flour_and_sugar() {
        // Recipe A: flour 200 g, sugar 50 g. Recipe B: flour 100 g.
        let report = build_report(vec![
            line(2, "Сахар", "г", 50),
            line(1, "Мука", "г", 200),
            line(1, "Мука", "г", 100),
        ])
        .unwrap();

        assert_eq!(report, "Список покупок:\nМука (г) — 300\nСахар (г) — 50\n");
    }

    #[test]
    fn test_totals_equal_sum_per_ingredient() {
        let lines = vec![
            line(1, "Соль", "г", 5),
            line(2, "Молоко", "мл", 250),
            line(1, "Соль", "г", 10),
            line(2, "Молоко", "мл", 750),
            line(1, "Соль", "г", 1),
        ];
        let items = aggregate(lines);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Молоко");
        assert_eq!(items[0].total, 1000);
        assert_eq!(items[1].name, "Соль");
        assert_eq!(items[1].total, 16);
    }

    #[test]
    fn test_same_name_different_units_stay_separate() {
        let items = aggregate(vec![
            line(1, "Яйца", "шт", 2),
            line(2, "Яйца", "г", 100),
            line(1, "Яйца", "шт", 3),
        ]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].measurement_unit, "г");
        assert_eq!(items[0].total, 100);
        assert_eq!(items[1].measurement_unit, "шт");
        assert_eq!(items[1].total, 5);
    }

    #[test]
    fn test_sort_ignores_case() {
        let items = aggregate(vec![
            line(1, "яблоко", "шт", 1),
            line(2, "Банан", "шт", 1),
            line(3, "апельсин", "шт", 1),
            line(4, "Butter", "g", 1),
            line(5, "apple", "pcs", 1),
        ]);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, vec!["apple", "Butter", "апельсин", "Банан", "яблоко"]);
    }

    #[test]
    fn test_every_line_ends_with_newline() {
        let report = render(&aggregate(vec![line(1, "Мука", "г", 1)]));
        assert_eq!(report.lines().count(), 2);
        assert!(report.ends_with('\n'));
        assert!(report.starts_with(HEADER));
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let error = build_report(Vec::new()).unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidInput);
    }
}
