use serde::{Deserialize, Serialize};

/// Physical constants of the cell: how much a single action dispenses or
/// takes, used by both the planner and the management loop's progress
/// reconciliation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub ml_per_zapf: f64,
    pub ml_per_second: f64,
    pub single_shake_duration_in_s: f64,
    pub clean_duration_secs: f64,
    pub zapf_slot_count: u8,
    pub pump_slot_count: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            ml_per_zapf: 30.0,
            ml_per_second: 16.0,
            single_shake_duration_in_s: 1.0,
            clean_duration_secs: 3.0,
            zapf_slot_count: 8,
            pump_slot_count: 4,
        }
    }
}

impl SystemConfig {
    pub fn shakes_for_duration(&self, seconds: f64) -> u8 {
        (seconds / self.single_shake_duration_in_s).ceil().max(0.0) as u8
    }

    pub fn zapf_pours_for_ml(&self, ml: f64) -> u8 {
        (ml / self.ml_per_zapf).ceil().max(0.0) as u8
    }

    pub fn seconds_for_ml(&self, ml: f64) -> f64 {
        ml / self.ml_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake_count_rounds_up() {
        let config = SystemConfig { single_shake_duration_in_s: 2.0, ..Default::default() };
        assert_eq!(config.shakes_for_duration(3.0), 2);
    }
}
