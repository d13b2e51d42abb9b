use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;

use cocktail_types::{CocktailError, CocktailRecipe, Event, Order, OrderId, RecipeId};

use super::responses::{
    AckResponse, CreateRecipeRequest, ErrorResponse, OrderIdResponse, PlaceOrderRequest,
    RecipeIdResponse, RefillSlotRequest, SystemStatusResponse,
};
use super::server::AppState;

pub struct ApiError(CocktailError);

impl From<CocktailError> for ApiError {
    fn from(e: CocktailError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CocktailError::InvalidOrderState(_) | CocktailError::IngredientsMissing(_) => StatusCode::CONFLICT,
            CocktailError::Planning(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<Json<OrderIdResponse>> {
    let order = Order::new(req.recipe_id, req.user_id);
    let order_id = order.id;
    state.store.persist_events(&[(Utc::now(), Event::OrderPlaced { order })])?;
    Ok(Json(OrderIdResponse { order_id }))
}

pub async fn enqueue_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> ApiResult<Json<AckResponse>> {
    let bar = state.store.current_state();
    let order = bar.orders.get(&order_id).ok_or_else(|| CocktailError::InvalidOrderState("order not found".into()))?;
    if order.status != cocktail_types::OrderStatus::Ordered {
        return Err(CocktailError::InvalidOrderState(format!("cannot enqueue order in state {:?}", order.status)).into());
    }
    state.store.persist_events(&[(Utc::now(), Event::OrderEnqueued { order_id })])?;
    Ok(Json(AckResponse::ok()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> ApiResult<Json<AckResponse>> {
    let bar = state.store.current_state();
    let order = bar.orders.get(&order_id).ok_or_else(|| CocktailError::InvalidOrderState("order not found".into()))?;
    if order.status.is_terminal() {
        return Err(CocktailError::InvalidOrderState(format!("order already {:?}", order.status)).into());
    }
    state.store.persist_events(&[(Utc::now(), Event::OrderCancelled { order_id })])?;
    Ok(Json(AckResponse::ok()))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<Json<RecipeIdResponse>> {
    let recipe = CocktailRecipe { id: RecipeId::new(), title: req.title, steps: req.steps };
    let recipe_id = recipe.id;
    state.store.persist_events(&[(Utc::now(), Event::RecipeCreated { recipe, creator: req.creator })])?;
    Ok(Json(RecipeIdResponse { recipe_id }))
}

pub async fn refill_slot(
    State(state): State<AppState>,
    Json(req): Json<RefillSlotRequest>,
) -> ApiResult<Json<AckResponse>> {
    let new_status = cocktail_types::SlotStatus {
        path: req.slot,
        ml_available: req.ml_available,
        ingredient: Some(req.ingredient),
    };
    state.store.persist_events(&[(Utc::now(), Event::SlotRefilled { new_status })])?;
    Ok(Json(AckResponse::ok()))
}

pub async fn list_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(state.store.current_state().orders.into_values().collect())
}

pub async fn get_order(State(state): State<AppState>, Path(order_id): Path<OrderId>) -> ApiResult<Json<Order>> {
    state
        .store
        .current_state()
        .orders
        .get(&order_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| CocktailError::InvalidOrderState("order not found".into()).into())
}

pub async fn list_recipes(State(state): State<AppState>) -> Json<Vec<CocktailRecipe>> {
    Json(state.store.current_state().recipes.into_values().collect())
}

pub async fn get_recipe(State(state): State<AppState>, Path(recipe_id): Path<RecipeId>) -> ApiResult<Json<CocktailRecipe>> {
    state
        .store
        .current_state()
        .recipes
        .get(&recipe_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| CocktailError::Planning("recipe not found".into()).into())
}

pub async fn list_slots(State(state): State<AppState>) -> Json<Vec<cocktail_types::SlotStatus>> {
    Json(state.store.current_state().slots)
}

pub async fn system_status(State(state): State<AppState>) -> Json<SystemStatusResponse> {
    let bar = state.store.current_state();
    Json(SystemStatusResponse {
        queued_orders: bar.order_queue.len(),
        total_orders: bar.orders.len(),
        total_recipes: bar.recipes.len(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn system_abort(State(state): State<AppState>) -> Json<AckResponse> {
    state.abort_flag.store(true, std::sync::atomic::Ordering::Relaxed);
    Json(AckResponse::ok())
}
