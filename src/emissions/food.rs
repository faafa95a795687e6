//! Food: weekly portions of each item in the food table

use super::{compute_row, sanitize, SectionCalculator};
use crate::core::{FoodItem, FoodPref, RowEmission, Section, UsageState};
use crate::reference::ReferenceData;

pub struct FoodCalculator;

impl FoodCalculator {
    /// Yearly emission of one food given the user's preference, if any
    pub fn row(data: &ReferenceData, food: &FoodItem, pref: Option<&FoodPref>) -> RowEmission {
        let weeks = data.defaults().food_weeks;
        let factor = food.factor.unwrap_or_else(|| data.factor_for(&food.name));
        let portions = pref.map(|p| p.portions).unwrap_or(0.0);
        let grams = pref.and_then(|p| p.grams).unwrap_or(food.portion_g);
        // kg consumed per week
        let quantity = sanitize(portions) * sanitize(grams) / 1000.0;

        RowEmission {
            section: Section::Food,
            group: "food",
            label: food.name.clone(),
            factor: sanitize(factor),
            quantity,
            multiplier: sanitize(weeks),
            emission: compute_row(factor, quantity, weeks),
        }
    }
}

impl SectionCalculator for FoodCalculator {
    fn section(&self) -> Section {
        Section::Food
    }

    fn rows(&self, data: &ReferenceData, state: &UsageState) -> Vec<RowEmission> {
        data.foods()
            .iter()
            .map(|food| Self::row(data, food, state.food_prefs.get(&food.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::test_support::reference_data;

    #[test]
    fn test_default_portion_size() {
        let data = reference_data();
        let mut state = UsageState::default();
        state.food_prefs.insert(
            "carne".into(),
            FoodPref {
                portions: 2.0,
                grams: None,
            },
        );

        let rows = FoodCalculator.rows(&data, &state);
        // 2 portions × 200 g = 0.4 kg/week
        assert!((rows[0].quantity - 0.4).abs() < 1e-9);
        assert!((rows[0].emission - 27.0 * 0.4 * 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_grams_and_factor_table_fallback() {
        let data = reference_data();
        let mut state = UsageState::default();
        state.food_prefs.insert(
            "pollo".into(),
            FoodPref {
                portions: 3.0,
                grams: Some(100.0),
            },
        );

        let rows = FoodCalculator.rows(&data, &state);
        assert_eq!(rows[1].factor, 6.9);
        assert!((rows[1].emission - 6.9 * 0.3 * 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_food_ids_are_ignored() {
        let data = reference_data();
        let mut state = UsageState::default();
        state.food_prefs.insert(
            "tofu".into(),
            FoodPref {
                portions: 7.0,
                grams: Some(100.0),
            },
        );

        assert_eq!(FoodCalculator.subtotal(&data, &state), 0.0);
    }
}
