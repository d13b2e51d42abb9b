use serde::{Deserialize, Serialize};

use crate::amounts::IngredientAmounts;
use crate::ids::RecipeId;

/// One instruction within a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecipeInstruction {
    AddIngredients(IngredientAmounts),
    Shake { seconds: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocktailRecipeStep {
    pub instruction: RecipeInstruction,
}

impl CocktailRecipeStep {
    pub fn add_ingredients(amounts: IngredientAmounts) -> Self {
        Self { instruction: RecipeInstruction::AddIngredients(amounts) }
    }

    pub fn shake(seconds: f64) -> Self {
        Self { instruction: RecipeInstruction::Shake { seconds } }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocktailRecipe {
    pub id: RecipeId,
    pub title: String,
    pub steps: Vec<CocktailRecipeStep>,
}

impl CocktailRecipe {
    pub fn new(id: RecipeId, title: impl Into<String>, steps: Vec<CocktailRecipeStep>) -> Self {
        Self { id, title: title.into(), steps }
    }
}
