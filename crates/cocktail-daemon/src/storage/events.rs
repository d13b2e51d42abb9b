use chrono::{DateTime, Utc};
use cocktail_types::{CocktailError, CocktailResult, Event};
use serde::{Deserialize, Serialize};

/// On-disk/in-memory row shape: one event plus the time it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

pub fn encode_row(row: &EventRow) -> CocktailResult<Vec<u8>> {
    bincode::serialize(row).map_err(|e| CocktailError::Serialization(e.to_string()))
}

pub fn decode_row(bytes: &[u8]) -> CocktailResult<EventRow> {
    bincode::deserialize(bytes).map_err(|e| CocktailError::Serialization(e.to_string()))
}
