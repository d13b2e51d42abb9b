#![forbid(unsafe_code)]
#![warn(clippy::all)]

//! Shared domain types for the cocktail-mixing cell control core: ingredient
//! amounts, slots, recipes, orders, plan tasks, and the bookkeeping event
//! schema. No I/O lives here.

pub mod amounts;
pub mod error;
pub mod event;
pub mod ids;
pub mod order;
pub mod recipe;
pub mod slots;
pub mod task;

pub use amounts::{IngredientAmount, IngredientAmounts, MINIMUM_AMOUNT_ML};
pub use error::{CocktailError, CocktailResult};
pub use event::{Event, TimestampedEvent};
pub use ids::{IngredientId, OrderId, RecipeId, UserId};
pub use order::{Order, OrderStatus};
pub use recipe::{CocktailRecipe, CocktailRecipeStep, RecipeInstruction};
pub use slots::{SlotPath, SlotStatus, StationKind};
pub use task::{CocktailSystemPlan, PlanProgress, Position, RobotState, Task, PUMP_CHANNELS};
