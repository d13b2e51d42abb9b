use serde::{Deserialize, Serialize};

use cocktail_types::{CocktailRecipeStep, IngredientId, OrderId, RecipeId, SlotPath, UserId};

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub recipe_id: RecipeId,
    pub user_id: UserId,
}

#[derive(Serialize)]
pub struct OrderIdResponse {
    pub order_id: OrderId,
}

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub steps: Vec<CocktailRecipeStep>,
    pub creator: UserId,
}

#[derive(Serialize)]
pub struct RecipeIdResponse {
    pub recipe_id: RecipeId,
}

#[derive(Deserialize)]
pub struct RefillSlotRequest {
    pub slot: SlotPath,
    pub ingredient: IngredientId,
    pub ml_available: f64,
}

#[derive(Serialize)]
pub struct SystemStatusResponse {
    pub queued_orders: usize,
    pub total_orders: usize,
    pub total_recipes: usize,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
