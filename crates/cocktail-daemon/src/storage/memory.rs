use std::sync::Mutex;

use chrono::{DateTime, Utc};
use cocktail_types::{CocktailResult, Event};

use super::events::EventRow;
use super::EventStore;

/// In-memory event log used for tests and `fake_system` mode.
#[derive(Default)]
pub struct MemoryEventStore {
    rows: Mutex<Vec<EventRow>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for MemoryEventStore {
    fn persist_events(&self, events: &[(DateTime<Utc>, Event)]) -> CocktailResult<()> {
        let mut rows = self.rows.lock().expect("event store mutex poisoned");
        for (timestamp, event) in events {
            let sequence = rows.len() as u64;
            rows.push(EventRow { sequence, timestamp: *timestamp, event: event.clone() });
        }
        Ok(())
    }

    fn load_all(&self) -> CocktailResult<Vec<EventRow>> {
        Ok(self.rows.lock().expect("event store mutex poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_types::OrderId;

    #[test]
    fn sequence_numbers_are_assigned_in_order() {
        let store = MemoryEventStore::new();
        let a = OrderId::new();
        let b = OrderId::new();
        store
            .persist_events(&[
                (Utc::now(), Event::OrderEnqueued { order_id: a }),
                (Utc::now(), Event::OrderEnqueued { order_id: b }),
            ])
            .unwrap();
        let rows = store.load_all().unwrap();
        assert_eq!(rows[0].sequence, 0);
        assert_eq!(rows[1].sequence, 1);
    }
}
