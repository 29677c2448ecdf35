//! Nutrition arithmetic. Ingredient facts are per 100 units, so a line
//! contributes `quantity / 100 * fact` to each total.

use std::{collections::HashMap, iter::Sum, ops::Add};

use serde::Serialize;
use uuid::Uuid;

use super::repo_types::IngredientLine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

impl Add for NutritionTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            proteins: self.proteins + rhs.proteins,
            fats: self.fats + rhs.fats,
            carbs: self.carbs + rhs.carbs,
        }
    }
}

impl Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

pub fn line_totals(line: &IngredientLine) -> NutritionTotals {
    let factor = line.quantity / 100.0;
    NutritionTotals {
        calories: factor * line.calories,
        proteins: factor * line.proteins,
        fats: factor * line.fats,
        carbs: factor * line.carbs,
    }
}

/// Totals of one meal; no lines means all zeros.
pub fn meal_totals(lines: &[IngredientLine]) -> NutritionTotals {
    lines.iter().map(line_totals).sum()
}

/// Totals for every meal that appears in `lines`.
pub fn totals_by_meal(lines: &[IngredientLine]) -> HashMap<Uuid, NutritionTotals> {
    let mut out: HashMap<Uuid, NutritionTotals> = HashMap::new();
    for line in lines {
        let entry = out.entry(line.meal_id).or_default();
        *entry = *entry + line_totals(line);
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn line(meal_id: Uuid, quantity: f64, calories: f64, proteins: f64) -> IngredientLine {
        IngredientLine {
            meal_id,
            quantity,
            calories,
            proteins,
            fats: 5.0,
            carbs: 12.0,
        }
    }

    #[test]
    fn two_hundred_grams_doubles_per_hundred_facts() {
        let totals = meal_totals(&[line(Uuid::nil(), 200.0, 100.0, 10.0)]);
        assert_eq!(totals.calories, 200.0);
        assert_eq!(totals.proteins, 20.0);
        assert_eq!(totals.fats, 10.0);
        assert_eq!(totals.carbs, 24.0);
    }

    #[test]
    fn empty_meal_is_all_zero() {
        assert_eq!(meal_totals(&[]), NutritionTotals::default());
    }

    #[test]
    fn doubling_quantities_doubles_totals() {
        let meal = Uuid::new_v4();
        let lines = vec![line(meal, 150.0, 130.0, 2.7), line(meal, 35.0, 884.0, 0.0)];
        let doubled: Vec<_> = lines
            .iter()
            .map(|l| IngredientLine {
                quantity: l.quantity * 2.0,
                ..l.clone()
            })
            .collect();
        let base = meal_totals(&lines);
        let twice = meal_totals(&doubled);
        for (a, b) in [
            (base.calories, twice.calories),
            (base.proteins, twice.proteins),
            (base.fats, twice.fats),
            (base.carbs, twice.carbs),
        ] {
            assert!((a * 2.0 - b).abs() < 1e-9, "{a} * 2 != {b}");
        }
    }

    #[test]
    fn totals_are_grouped_per_meal() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let by_meal = totals_by_meal(&[
            line(a, 100.0, 50.0, 1.0),
            line(b, 50.0, 200.0, 4.0),
            line(a, 100.0, 25.0, 1.0),
        ]);
        assert_eq!(by_meal[&a].calories, 75.0);
        assert_eq!(by_meal[&b].calories, 100.0);
        assert_eq!(by_meal[&b].proteins, 2.0);
    }
}
