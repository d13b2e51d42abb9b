use std::collections::VecDeque;

use cocktail_types::{CocktailResult, Position, RobotState};

use crate::robot::{RobotTransport, SUCCESS_REPLY};

/// A synthetic robot controller used by `fake_system` mode and integration
/// tests: completes every queued task almost immediately and always reports
/// itself running, so a plan drains without real hardware attached.
pub struct FakeRobotTransport {
    state: RobotState,
    pending_completions: VecDeque<()>,
}

impl FakeRobotTransport {
    pub fn new() -> Self {
        Self {
            state: RobotState {
                position: Position::Home,
                ringbuffer_read_pos: 0,
                cup_placed: true,
                cup_full: false,
                shaker_empty: true,
                cup_id: 1,
            },
            pending_completions: VecDeque::new(),
        }
    }
}

impl Default for FakeRobotTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotTransport for FakeRobotTransport {
    fn exchange(&mut self, line: &str) -> CocktailResult<Option<String>> {
        if line.contains("IOREAD") {
            if self.pending_completions.pop_front().is_some() {
                self.state.ringbuffer_read_pos = (self.state.ringbuffer_read_pos + 1) % 4;
            }
            let bytes = [
                self.state.position as u8,
                self.state.ringbuffer_read_pos,
                0b001,
                self.state.cup_id,
                0,
            ];
            return Ok(Some(hex::encode(bytes)));
        }
        if line.contains("IOWRITE") {
            self.pending_completions.push_back(());
            return Ok(Some(SUCCESS_REPLY.to_string()));
        }
        Ok(Some(SUCCESS_REPLY.to_string()))
    }
}

/// A pump sink that simply discards frames, for `fake_system` mode.
pub struct NullPumpChannel;

impl NullPumpChannel {
    pub fn send(&mut self, _byte: u8) -> CocktailResult<()> {
        Ok(())
    }
}
