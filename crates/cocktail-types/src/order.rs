use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrderId, RecipeId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Ordered,
    Enqueued,
    Executing,
    Fulfilled,
    Cancelled,
    Dequeued,
    Aborted,
}

impl OrderStatus {
    /// A status is terminal when the order can no longer advance or re-enter the queue.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Fulfilled | OrderStatus::Cancelled | OrderStatus::Dequeued | OrderStatus::Aborted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub recipe_id: RecipeId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub time_of_order: DateTime<Utc>,
}

impl Order {
    pub fn new(id: OrderId, recipe_id: RecipeId, user_id: UserId, time_of_order: DateTime<Utc>) -> Self {
        Self { id, recipe_id, user_id, status: OrderStatus::Ordered, time_of_order }
    }
}
