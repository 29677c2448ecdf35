use std::collections::HashMap;

use time::Date;
use uuid::Uuid;

use super::{dto::RangeQuery, repo_types::MealRecord};
use crate::{
    error::AppError,
    meals::services::NutritionTotals,
    measurements::services::trend_window,
};

pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// Resolve the inclusive date range and its length in days.
pub fn resolve_range(query: &RangeQuery, today: Date) -> Result<(Date, Date, i64), AppError> {
    match (query.start_date, query.end_date) {
        (None, None) => {
            let days = query.days.unwrap_or(DEFAULT_RANGE_DAYS);
            let (start, end) = trend_window(today, days)?;
            Ok((start, end, days))
        }
        (Some(start), Some(end)) => {
            if end < start {
                return Err(AppError::BadRequest(
                    "end_date must not be before start_date".into(),
                ));
            }
            Ok((start, end, (end - start).whole_days()))
        }
        (Some(start), None) => {
            let end = today.max(start);
            Ok((start, end, (end - start).whole_days()))
        }
        (None, Some(_)) => Err(AppError::BadRequest(
            "start_date is required with end_date".into(),
        )),
    }
}

/// A linked meal contributes its computed totals; otherwise the record's own
/// fields count, with missing values as zero.
pub fn record_totals(record: &MealRecord, by_meal: &HashMap<Uuid, NutritionTotals>) -> NutritionTotals {
    match record.meal_id {
        Some(meal_id) => by_meal.get(&meal_id).copied().unwrap_or_default(),
        None => NutritionTotals {
            calories: record.calories.unwrap_or(0.0),
            proteins: record.proteins.unwrap_or(0.0),
            fats: record.fats.unwrap_or(0.0),
            carbs: record.carbs.unwrap_or(0.0),
        },
    }
}

pub fn range_totals(records: &[MealRecord], by_meal: &HashMap<Uuid, NutritionTotals>) -> NutritionTotals {
    records.iter().map(|r| record_totals(r, by_meal)).sum()
}

/// Distinct linked meal ids, in first-seen order.
pub fn linked_meals(records: &[MealRecord]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in records.iter().filter_map(|r| r.meal_id) {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn record(meal_id: Option<Uuid>, calories: Option<f64>, proteins: Option<f64>) -> MealRecord {
        let ts = datetime!(2025-03-10 12:00 UTC);
        MealRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            meal_id,
            meal_name: None,
            quantity_grams: None,
            calories,
            proteins,
            carbs: None,
            fats: None,
            timestamp: ts,
            photo: None,
            feedback: String::new(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn unlinked_records_use_own_fields_with_nulls_as_zero() {
        let records: Vec<_> = (1..=7)
            .map(|i| record(None, Some(100.0 * i as f64), None))
            .collect();
        let totals = range_totals(&records, &HashMap::new());
        assert_eq!(totals.calories, 2800.0);
        assert_eq!(totals.proteins, 0.0);
    }

    #[test]
    fn linked_meal_totals_replace_own_fields() {
        let meal = Uuid::new_v4();
        let mut by_meal = HashMap::new();
        by_meal.insert(
            meal,
            NutritionTotals {
                calories: 640.0,
                proteins: 40.0,
                fats: 20.0,
                carbs: 70.0,
            },
        );
        let records = vec![
            record(Some(meal), Some(9999.0), None),
            record(None, Some(60.0), Some(5.0)),
        ];
        let totals = range_totals(&records, &by_meal);
        assert_eq!(totals.calories, 700.0);
        assert_eq!(totals.proteins, 45.0);
    }

    #[test]
    fn linked_meal_without_ingredients_counts_zero() {
        let records = vec![record(Some(Uuid::new_v4()), Some(300.0), None)];
        assert_eq!(range_totals(&records, &HashMap::new()), NutritionTotals::default());
    }

    #[test]
    fn range_defaults_to_last_week() {
        let (start, end, days) = resolve_range(&RangeQuery::default(), date!(2025 - 03 - 10)).unwrap();
        assert_eq!((start, end, days), (date!(2025 - 03 - 03), date!(2025 - 03 - 10), 7));
    }

    #[test]
    fn explicit_range_is_validated() {
        let today = date!(2025 - 03 - 10);
        let ok = RangeQuery {
            start_date: Some(date!(2025 - 03 - 01)),
            end_date: Some(date!(2025 - 03 - 05)),
            ..Default::default()
        };
        assert_eq!(resolve_range(&ok, today).unwrap().2, 4);

        let reversed = RangeQuery {
            start_date: Some(date!(2025 - 03 - 05)),
            end_date: Some(date!(2025 - 03 - 01)),
            ..Default::default()
        };
        assert!(resolve_range(&reversed, today).is_err());

        let end_only = RangeQuery {
            end_date: Some(date!(2025 - 03 - 01)),
            ..Default::default()
        };
        assert!(resolve_range(&end_only, today).is_err());
    }

    #[test]
    fn start_only_runs_to_today() {
        let q = RangeQuery {
            start_date: Some(date!(2025 - 03 - 08)),
            ..Default::default()
        };
        let (start, end, days) = resolve_range(&q, date!(2025 - 03 - 10)).unwrap();
        assert_eq!((start, end, days), (date!(2025 - 03 - 08), date!(2025 - 03 - 10), 2));
    }

    #[test]
    fn linked_meals_are_distinct() {
        let a = Uuid::new_v4();
        let records = vec![record(Some(a), None, None), record(None, None, None), record(Some(a), None, None)];
        assert_eq!(linked_meals(&records), vec![a]);
    }
}
