mod config;
mod events;
mod memory;
mod metrics;
pub mod projection;
mod sled_store;

pub use config::{MigrationRecord, SchemaInfo, StorageConfig};
pub use events::EventRow;
pub use memory::MemoryEventStore;
pub use metrics::{StorageMetrics, StorageMetricsSnapshot};
pub use projection::CocktailBarState;
pub use sled_store::SledEventStore;

use chrono::{DateTime, Utc};
use cocktail_types::{CocktailResult, Event};

/// Append-only log of bookkeeping events, reducible to a `CocktailBarState`.
///
/// Implementations must guarantee: events are durable once `persist_events`
/// returns, `load_all` replays in the order they were persisted, and the
/// projection returned by `current_state` is always the fold of everything
/// persisted so far.
pub trait EventStore: Send + Sync {
    fn persist_events(&self, events: &[(DateTime<Utc>, Event)]) -> CocktailResult<()>;

    fn load_all(&self) -> CocktailResult<Vec<EventRow>>;

    fn current_state(&self) -> CocktailBarState {
        CocktailBarState::fold(self.load_all().unwrap_or_default().into_iter().map(|row| row.event))
    }
}
