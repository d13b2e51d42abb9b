use std::collections::{HashMap, VecDeque};

use cocktail_types::{
    CocktailRecipe, Event, Order, OrderId, OrderStatus, RecipeId, SlotPath, SlotStatus,
};
use tracing::warn;

/// The fold of the bookkeeping log: current order queue, slot inventory,
/// known orders and recipes. Pure function of the event sequence.
#[derive(Debug, Clone, Default)]
pub struct CocktailBarState {
    pub order_queue: VecDeque<OrderId>,
    pub slots: Vec<SlotStatus>,
    pub orders: HashMap<OrderId, Order>,
    pub recipes: HashMap<RecipeId, CocktailRecipe>,
}

impl CocktailBarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event, mutating the projection. Unknown-id references are
    /// logged and skipped rather than panicking: the log is the source of
    /// truth and a stray event should never take the whole projection down.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::SlotRefilled { new_status } => {
                if let Some(existing) = self.slots.iter_mut().find(|s| s.path == new_status.path) {
                    *existing = new_status.clone();
                } else {
                    self.slots.push(new_status.clone());
                }
            }
            Event::AmountPoured { slot_path, ml } => {
                self.apply_pour(slot_path, *ml);
            }
            Event::OrderPlaced { order } => {
                if self.orders.contains_key(&order.id) {
                    warn!(order_id = %order.id, "duplicate OrderPlaced event, ignoring");
                } else {
                    self.orders.insert(order.id, order.clone());
                }
            }
            Event::OrderEnqueued { order_id } => {
                self.set_status(*order_id, OrderStatus::Enqueued);
                self.order_queue.push_back(*order_id);
            }
            Event::OrderDequeued { order_id } => {
                self.set_status(*order_id, OrderStatus::Dequeued);
                self.remove_from_queue(*order_id);
            }
            Event::OrderExecuting { order_id } => {
                self.set_status(*order_id, OrderStatus::Executing);
                self.remove_from_queue(*order_id);
            }
            Event::OrderFulfilled { order_id } => {
                self.set_status(*order_id, OrderStatus::Fulfilled);
                self.remove_from_queue(*order_id);
            }
            Event::OrderCancelled { order_id } => {
                self.set_status(*order_id, OrderStatus::Cancelled);
                self.remove_from_queue(*order_id);
            }
            Event::OrderAborted { order_id } => {
                self.set_status(*order_id, OrderStatus::Aborted);
                self.remove_from_queue(*order_id);
            }
            Event::QueuePurged => {
                self.order_queue.clear();
            }
            Event::RecipeCreated { recipe, .. } => {
                self.recipes.insert(recipe.id, recipe.clone());
            }
        }
    }

    fn apply_pour(&mut self, slot_path: &SlotPath, ml: f64) {
        match self.slots.iter_mut().find(|s| &s.path == slot_path) {
            Some(slot) => slot.ml_available = (slot.ml_available - ml).max(0.0),
            None => warn!(?slot_path, ml, "AmountPoured for unknown slot, ignoring"),
        }
    }

    fn set_status(&mut self, order_id: OrderId, status: OrderStatus) {
        match self.orders.get_mut(&order_id) {
            Some(order) => order.status = status,
            None => warn!(%order_id, ?status, "status transition for unknown order, ignoring"),
        }
    }

    fn remove_from_queue(&mut self, order_id: OrderId) {
        self.order_queue.retain(|id| *id != order_id);
    }

    /// Rebuilds a projection by folding a full ordered event sequence.
    pub fn fold(events: impl IntoIterator<Item = Event>) -> Self {
        let mut state = Self::new();
        for event in events {
            state.apply(&event);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_types::{StationKind, UserId};
    use chrono::Utc;

    fn sample_order() -> Order {
        Order::new(OrderId::new(), RecipeId::new(), UserId::new(), Utc::now())
    }

    #[test]
    fn order_lifecycle_s5() {
        let order = sample_order();
        let id = order.id;
        let mut state = CocktailBarState::new();

        state.apply(&Event::OrderPlaced { order: order.clone() });
        assert_eq!(state.orders[&id].status, OrderStatus::Ordered);
        assert!(state.order_queue.is_empty());

        state.apply(&Event::OrderEnqueued { order_id: id });
        assert_eq!(state.orders[&id].status, OrderStatus::Enqueued);
        assert_eq!(state.order_queue.len(), 1);

        state.apply(&Event::OrderExecuting { order_id: id });
        assert_eq!(state.orders[&id].status, OrderStatus::Executing);
        assert!(state.order_queue.is_empty());

        state.apply(&Event::OrderFulfilled { order_id: id });
        assert_eq!(state.orders[&id].status, OrderStatus::Fulfilled);
        assert!(state.order_queue.is_empty());
    }

    #[test]
    fn fold_prefix_then_suffix_equals_fold_whole() {
        let order = sample_order();
        let id = order.id;
        let events = vec![
            Event::OrderPlaced { order: order.clone() },
            Event::OrderEnqueued { order_id: id },
            Event::OrderExecuting { order_id: id },
            Event::AmountPoured { slot_path: SlotPath { station: StationKind::Zapf, slot_id: 0 }, ml: 5.0 },
            Event::OrderFulfilled { order_id: id },
        ];

        for k in 0..=events.len() {
            let whole = CocktailBarState::fold(events.clone());
            let split = {
                let mut s = CocktailBarState::fold(events[..k].to_vec());
                for e in &events[k..] {
                    s.apply(e);
                }
                s
            };
            assert_eq!(whole.orders[&id].status, split.orders[&id].status);
            assert_eq!(whole.order_queue, split.order_queue);
        }
    }
}
