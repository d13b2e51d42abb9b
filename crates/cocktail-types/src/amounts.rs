use serde::{Deserialize, Serialize};

use crate::ids::IngredientId;

/// Tolerance below which a requested or residual amount is treated as zero.
pub const MINIMUM_AMOUNT_ML: f64 = 0.2;

/// A single ingredient/quantity pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub ingredient: IngredientId,
    pub ml: f64,
}

impl IngredientAmount {
    pub fn new(ingredient: IngredientId, ml: f64) -> Self {
        Self { ingredient, ml }
    }
}

/// A canonicalized collection of ingredient amounts: sorted by ingredient id,
/// at most one entry per ingredient, amounts for the same ingredient summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientAmounts {
    entries: Vec<IngredientAmount>,
}

impl IngredientAmounts {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Builds a canonical form from a possibly-unsorted, possibly-duplicated list.
    pub fn from_amounts(amounts: impl IntoIterator<Item = IngredientAmount>) -> Self {
        let mut merged: Vec<IngredientAmount> = Vec::new();
        for amount in amounts {
            if let Some(existing) = merged.iter_mut().find(|e| e.ingredient == amount.ingredient) {
                existing.ml += amount.ml;
            } else {
                merged.push(amount);
            }
        }
        merged.sort_by(|a, b| a.ingredient.cmp(&b.ingredient));
        Self { entries: merged }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IngredientAmount> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.ml.abs() < f64::EPSILON)
    }

    pub fn get(&self, ingredient: &IngredientId) -> f64 {
        self.entries
            .iter()
            .find(|e| &e.ingredient == ingredient)
            .map(|e| e.ml)
            .unwrap_or(0.0)
    }

    /// Sum of absolute values across all entries (L1 norm).
    pub fn l1_abs(&self) -> f64 {
        self.entries.iter().map(|e| e.ml.abs()).sum()
    }

    /// Entrywise negation.
    pub fn neg(&self) -> Self {
        Self::from_amounts(
            self.entries
                .iter()
                .map(|e| IngredientAmount::new(e.ingredient.clone(), -e.ml)),
        )
    }

    /// Distance between two amount sets, defined as the L1 norm of their difference.
    pub fn dist(&self, other: &Self) -> f64 {
        (self.clone() - other.clone()).l1_abs()
    }
}

impl std::ops::Add for IngredientAmounts {
    type Output = IngredientAmounts;

    fn add(self, rhs: Self) -> Self::Output {
        let combined = self.entries.into_iter().chain(rhs.entries);
        IngredientAmounts::from_amounts(combined)
    }
}

impl std::ops::Sub for IngredientAmounts {
    type Output = IngredientAmounts;

    fn sub(self, rhs: Self) -> Self::Output {
        self + rhs.neg()
    }
}

impl FromIterator<IngredientAmount> for IngredientAmounts {
    fn from_iter<T: IntoIterator<Item = IngredientAmount>>(iter: T) -> Self {
        IngredientAmounts::from_amounts(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ia(name: &str, ml: f64) -> IngredientAmount {
        IngredientAmount::new(IngredientId::new(name), ml)
    }

    #[test]
    fn canonicalizes_duplicates_and_sorts() {
        let amounts = IngredientAmounts::from_amounts(vec![ia("vodka", 30.0), ia("gin", 10.0), ia("vodka", 20.0)]);
        let collected: Vec<_> = amounts.iter().map(|e| (e.ingredient.as_str().to_string(), e.ml)).collect();
        assert_eq!(collected, vec![("gin".to_string(), 10.0), ("vodka".to_string(), 50.0)]);
    }

    #[test]
    fn addition_is_commutative() {
        let a = IngredientAmounts::from_amounts(vec![ia("gin", 10.0)]);
        let b = IngredientAmounts::from_amounts(vec![ia("tonic", 40.0)]);
        assert_eq!(a.clone() + b.clone(), b + a);
    }

    #[test]
    fn self_minus_self_is_near_zero() {
        let a = IngredientAmounts::from_amounts(vec![ia("gin", 10.0), ia("tonic", 40.0)]);
        let diff = a.clone() - a;
        assert!(diff.l1_abs() <= MINIMUM_AMOUNT_ML);
    }
}
