use std::collections::HashMap;

use cocktail_types::{IngredientAmounts, MINIMUM_AMOUNT_ML};
use cocktail_types::{SlotPath, SlotStatus, StationKind};

/// Per-slot ml to draw, keyed by slot path, grouped by what a pump/zapf
/// sub-plan needs to know to emit its tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotAmounts {
    pub amounts: HashMap<SlotPath, f64>,
}

impl SlotAmounts {
    pub fn get(&self, path: &SlotPath) -> f64 {
        self.amounts.get(path).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientPlan {
    pub assigned: SlotAmounts,
    pub residual: IngredientAmounts,
}

/// Greedily assigns a requested ingredient mix to available slots: pump
/// stations first (cheaper/faster than manual zapf pours), then zapf, each
/// in stored slot order. Stops drawing from a slot once the remaining
/// request for that ingredient drops below `MINIMUM_AMOUNT_ML`.
pub fn plan_ingredients(available: &[SlotStatus], requested: &IngredientAmounts) -> IngredientPlan {
    let mut remaining_in_slot: HashMap<SlotPath, f64> =
        available.iter().map(|s| (s.path, s.ml_available)).collect();
    let mut assigned = SlotAmounts::default();
    let mut unmet = IngredientAmounts::new();

    for requested_amount in requested.iter() {
        let mut need = requested_amount.ml;

        for station in [StationKind::Pump, StationKind::Zapf] {
            if need < MINIMUM_AMOUNT_ML {
                break;
            }
            for slot in available.iter().filter(|s| s.path.station == station && s.ingredient == requested_amount.ingredient)
            {
                if need < MINIMUM_AMOUNT_ML {
                    break;
                }
                let have = remaining_in_slot.get(&slot.path).copied().unwrap_or(0.0);
                if have < MINIMUM_AMOUNT_ML {
                    continue;
                }
                let draw = have.min(need);
                *remaining_in_slot.get_mut(&slot.path).unwrap() -= draw;
                *assigned.amounts.entry(slot.path).or_insert(0.0) += draw;
                need -= draw;
            }
        }

        if need >= MINIMUM_AMOUNT_ML {
            unmet = unmet + IngredientAmounts::from_amounts([cocktail_types::IngredientAmount::new(
                requested_amount.ingredient.clone(),
                need,
            )]);
        }
    }

    IngredientPlan { assigned, residual: unmet }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_types::{IngredientAmount, IngredientId};

    fn slot(station: StationKind, slot_id: u8, ml: f64, ingredient: &str) -> SlotStatus {
        SlotStatus::new(SlotPath { station, slot_id }, ml, IngredientId::new(ingredient))
    }

    #[test]
    fn prefers_pump_over_zapf() {
        let slots = vec![slot(StationKind::Pump, 0, 50.0, "tequila"), slot(StationKind::Zapf, 0, 50.0, "tequila")];
        let requested = IngredientAmounts::from_amounts([IngredientAmount::new(IngredientId::new("tequila"), 30.0)]);
        let plan = plan_ingredients(&slots, &requested);
        assert_eq!(plan.assigned.get(&SlotPath::pump(0)), 30.0);
        assert_eq!(plan.assigned.get(&SlotPath::zapf(0)), 0.0);
        assert!(plan.residual.is_empty());
    }

    #[test]
    fn falls_back_to_zapf_when_pump_insufficient() {
        let slots = vec![slot(StationKind::Pump, 0, 10.0, "tequila"), slot(StationKind::Zapf, 0, 100.0, "tequila")];
        let requested = IngredientAmounts::from_amounts([IngredientAmount::new(IngredientId::new("tequila"), 30.0)]);
        let plan = plan_ingredients(&slots, &requested);
        assert_eq!(plan.assigned.get(&SlotPath::pump(0)), 10.0);
        assert_eq!(plan.assigned.get(&SlotPath::zapf(0)), 20.0);
        assert!(plan.residual.is_empty());
    }

    #[test]
    fn reports_residual_when_inventory_insufficient() {
        let slots = vec![slot(StationKind::Zapf, 0, 5.0, "gin")];
        let requested = IngredientAmounts::from_amounts([IngredientAmount::new(IngredientId::new("gin"), 30.0)]);
        let plan = plan_ingredients(&slots, &requested);
        assert!(plan.residual.l1_abs() > MINIMUM_AMOUNT_ML);
    }
}
