use cocktail_types::PUMP_CHANNELS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    Ready,
    Pumping,
    Finished,
    Interrupted,
}

/// Drives the four-channel peristaltic pump from a single watchdog byte.
/// `update` must be called on every engine tick whether or not a pump task
/// is active, so `previous_now` always reflects real elapsed time.
pub struct PumpController {
    status: PumpStatus,
    remaining: [f64; PUMP_CHANNELS],
    previous_now: Option<f64>,
    watchdog_bit: bool,
}

impl PumpController {
    pub fn new() -> Self {
        Self { status: PumpStatus::Ready, remaining: [0.0; PUMP_CHANNELS], previous_now: None, watchdog_bit: false }
    }

    pub fn status(&self) -> PumpStatus {
        self.status
    }

    /// Starts a new pump task. Caller must ensure `status() == Ready`.
    pub fn request_pump(&mut self, durations: [f64; PUMP_CHANNELS]) {
        debug_assert_eq!(self.status, PumpStatus::Ready);
        self.remaining = durations;
        self.status = PumpStatus::Pumping;
    }

    /// Advances pump state by the elapsed time since the previous call.
    /// `robot_at_pump` reflects the robot's current position; pumping is
    /// interrupted (not resumed) if the robot leaves the pump station.
    pub fn update(&mut self, now: f64, robot_at_pump: bool) {
        let elapsed = self.previous_now.map(|prev| (now - prev).max(0.0)).unwrap_or(0.0);
        self.previous_now = Some(now);

        if self.status != PumpStatus::Pumping {
            return;
        }

        if !robot_at_pump {
            self.status = PumpStatus::Interrupted;
            return;
        }

        for channel in self.remaining.iter_mut() {
            *channel = (*channel - elapsed).max(0.0);
        }

        if self.remaining.iter().all(|&d| d <= 0.0) {
            self.status = PumpStatus::Finished;
        }
    }

    /// Encodes the current channel state into the single serial frame sent
    /// every tick: `0 0 0 watchdog chan3 chan2 chan1 chan0`.
    pub fn get_pump_msg(&self) -> u8 {
        let mut byte = 0u8;
        for (i, &remaining) in self.remaining.iter().enumerate() {
            if self.status == PumpStatus::Pumping && remaining > 0.0 {
                byte |= 1 << i;
            }
        }
        if self.watchdog_bit {
            byte |= 1 << 4;
        }
        byte
    }

    pub fn reset(&mut self) {
        self.status = PumpStatus::Ready;
        self.remaining = [0.0; PUMP_CHANNELS];
    }
}

impl Default for PumpController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_pump_state_machine() {
        let mut pump = PumpController::new();
        pump.update(0.0, true);
        pump.request_pump([1.0, 0.0, 0.5, 0.0]);

        pump.update(0.3, true);
        assert_eq!(pump.status(), PumpStatus::Pumping);
        assert_eq!(pump.get_pump_msg(), 0b0101);

        pump.update(0.6, true);
        assert_eq!(pump.status(), PumpStatus::Pumping);
        assert_eq!(pump.get_pump_msg(), 0b0001);

        pump.update(1.1, true);
        assert_eq!(pump.status(), PumpStatus::Finished);
        assert_eq!(pump.get_pump_msg(), 0);
    }

    #[test]
    fn interrupted_when_robot_leaves_pump_station() {
        let mut pump = PumpController::new();
        pump.update(0.0, true);
        pump.request_pump([2.0, 0.0, 0.0, 0.0]);
        pump.update(0.5, false);
        assert_eq!(pump.status(), PumpStatus::Interrupted);
        assert_eq!(pump.remaining[0], 2.0);
    }

    #[test]
    fn idle_byte_is_zero() {
        let pump = PumpController::new();
        assert_eq!(pump.get_pump_msg(), 0);
    }
}
