use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrderId, UserId};
use crate::order::Order;
use crate::recipe::CocktailRecipe;
use crate::slots::{SlotPath, SlotStatus};

/// One fact appended to the bookkeeping log. The projected state is a pure
/// fold of a sequence of these starting from the empty state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    SlotRefilled { new_status: SlotStatus },
    AmountPoured { slot_path: SlotPath, ml: f64 },
    OrderPlaced { order: Order },
    OrderEnqueued { order_id: OrderId },
    OrderDequeued { order_id: OrderId },
    OrderExecuting { order_id: OrderId },
    OrderFulfilled { order_id: OrderId },
    OrderCancelled { order_id: OrderId },
    OrderAborted { order_id: OrderId },
    QueuePurged,
    RecipeCreated { recipe: CocktailRecipe, creator: UserId },
}

/// An event with the wall-clock time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

impl TimestampedEvent {
    pub fn new(timestamp: DateTime<Utc>, event: Event) -> Self {
        Self { timestamp, event }
    }
}
