mod ingredients;
mod motion;
mod plan;

pub use ingredients::{plan_ingredients, IngredientPlan, SlotAmounts};
pub use motion::shortest_path;
pub use plan::plan_cocktail;
