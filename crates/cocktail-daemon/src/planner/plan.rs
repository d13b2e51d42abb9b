use cocktail_types::{
    CocktailError, CocktailRecipe, CocktailResult, CocktailSystemPlan, IngredientAmounts,
    Position, RecipeInstruction, SlotPath, SlotStatus, StationKind, Task,
};

use crate::config::SystemConfig;

use super::ingredients::plan_ingredients;
use super::motion::shortest_path;

/// Builds a full task sequence realizing one recipe against the current
/// slot inventory, starting from the robot's current position. Deterministic
/// given its inputs. Fails with `IngredientsMissing` if the inventory cannot
/// satisfy a recipe step within tolerance.
pub fn plan_cocktail(
    recipe: &CocktailRecipe,
    slots: &[SlotStatus],
    start_position: Position,
    config: &SystemConfig,
) -> CocktailResult<CocktailSystemPlan> {
    let mut tasks = Vec::new();
    let mut position = start_position;
    let mut inventory: Vec<SlotStatus> = slots.to_vec();

    move_to(&mut tasks, &mut position, Position::Clean);
    tasks.push(Task::Clean);
    move_to(&mut tasks, &mut position, Position::Pump);
    tasks.push(Task::Pump { durations: [config.clean_duration_secs, 0.0, 0.0, 0.0] });
    move_to(&mut tasks, &mut position, Position::Clean);
    tasks.push(Task::Clean);

    for step in &recipe.steps {
        match &step.instruction {
            RecipeInstruction::Shake { seconds } => {
                move_to(&mut tasks, &mut position, Position::Pump);
                tasks.push(Task::Shake { num_shakes: config.shakes_for_duration(*seconds) });
            }
            RecipeInstruction::AddIngredients(amounts) => {
                add_ingredients(&mut tasks, &mut position, &mut inventory, amounts, config)?;
            }
        }
    }

    move_to(&mut tasks, &mut position, Position::Pour);
    tasks.push(Task::Pour);
    move_to(&mut tasks, &mut position, Position::Home);

    Ok(CocktailSystemPlan::new(tasks))
}

fn move_to(tasks: &mut Vec<Task>, position: &mut Position, target: Position) {
    for hop in shortest_path(*position, target) {
        tasks.push(Task::Move { to: hop });
    }
    *position = target;
}

fn add_ingredients(
    tasks: &mut Vec<Task>,
    position: &mut Position,
    inventory: &mut [SlotStatus],
    requested: &IngredientAmounts,
    config: &SystemConfig,
) -> CocktailResult<()> {
    let plan = plan_ingredients(inventory, requested);
    if plan.residual.l1_abs() > cocktail_types::MINIMUM_AMOUNT_ML {
        return Err(CocktailError::IngredientsMissing(plan.residual));
    }

    for slot in inventory.iter_mut() {
        let drawn = plan.assigned.get(&slot.path);
        if drawn > 0.0 {
            slot.ml_available -= drawn;
        }
    }

    let mut pump_durations = [0.0f64; cocktail_types::PUMP_CHANNELS];
    let mut any_pump = false;
    for slot_id in 0..config.pump_slot_count {
        let path = SlotPath { station: StationKind::Pump, slot_id };
        let ml = plan.assigned.get(&path);
        if ml > cocktail_types::MINIMUM_AMOUNT_ML {
            pump_durations[slot_id as usize] = config.seconds_for_ml(ml);
            any_pump = true;
        }
    }
    if any_pump {
        move_to(tasks, position, Position::Pump);
        tasks.push(Task::Pump { durations: pump_durations });
    }

    let mut zapf_slots: Vec<(u8, u8)> = Vec::new();
    for slot_id in 0..config.zapf_slot_count {
        let path = SlotPath { station: StationKind::Zapf, slot_id };
        let ml = plan.assigned.get(&path);
        if ml > cocktail_types::MINIMUM_AMOUNT_ML {
            zapf_slots.push((slot_id, config.zapf_pours_for_ml(ml)));
        }
    }
    if !zapf_slots.is_empty() {
        move_to(tasks, position, Position::Zapf);
        for (slot_id, pours) in zapf_slots {
            for _ in 0..pours {
                tasks.push(Task::Zapf { slot: slot_id });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_types::{CocktailRecipe, CocktailRecipeStep, IngredientAmount, IngredientId, RecipeId};

    fn zapf_slot(slot_id: u8, ml: f64, ingredient: &str) -> SlotStatus {
        SlotStatus::new(SlotPath { station: StationKind::Zapf, slot_id }, ml, IngredientId::new(ingredient))
    }

    #[test]
    fn s3_single_zapf_slot_plan() {
        let recipe = CocktailRecipe::new(
            RecipeId::new(),
            "tequila shot",
            vec![CocktailRecipeStep::add_ingredients(IngredientAmounts::from_amounts([IngredientAmount::new(
                IngredientId::new("tequila"),
                100.0,
            )]))],
        );
        let slots = vec![zapf_slot(0, 500.0, "tequila")];
        let config = SystemConfig::default();

        let plan = plan_cocktail(&recipe, &slots, Position::Home, &config).unwrap();
        let zapf_count = plan.tasks.iter().filter(|t| matches!(t, Task::Zapf { .. })).count();
        assert_eq!(zapf_count, 4);
        assert!(plan.tasks.contains(&Task::Pour));
    }

    #[test]
    fn fails_with_ingredients_missing_when_inventory_insufficient() {
        let recipe = CocktailRecipe::new(
            RecipeId::new(),
            "empty bar",
            vec![CocktailRecipeStep::add_ingredients(IngredientAmounts::from_amounts([IngredientAmount::new(
                IngredientId::new("gin"),
                100.0,
            )]))],
        );
        let config = SystemConfig::default();
        let err = plan_cocktail(&recipe, &[], Position::Home, &config);
        assert!(matches!(err, Err(CocktailError::IngredientsMissing(_))));
    }
}
