use serde::{Deserialize, Serialize};

use crate::ids::IngredientId;

/// A dispensing station, as addressed on the wire and in inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationKind {
    Zapf,
    Pump,
}

/// Addresses one bottle/channel position at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotPath {
    pub station: StationKind,
    pub slot_id: u8,
}

impl SlotPath {
    pub fn zapf(slot_id: u8) -> Self {
        Self { station: StationKind::Zapf, slot_id }
    }

    pub fn pump(slot_id: u8) -> Self {
        Self { station: StationKind::Pump, slot_id }
    }
}

/// Current fill state of one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotStatus {
    pub path: SlotPath,
    pub ml_available: f64,
    pub ingredient: IngredientId,
}

impl SlotStatus {
    pub fn new(path: SlotPath, ml_available: f64, ingredient: IngredientId) -> Self {
        Self { path, ml_available, ingredient }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_path_equality_is_by_station_and_id() {
        assert_eq!(SlotPath::zapf(1), SlotPath::zapf(1));
        assert_ne!(SlotPath::zapf(1), SlotPath::pump(1));
    }
}
