use cocktail_types::{CocktailError, CocktailResult, RobotState, Task};
use tracing::{info, warn};
use uuid::Uuid;

use super::protocol::{
    hold_request, ioread_request, iowrite_request, jseq_request, rstats_request, start_request,
    svon_request, RoboStatus, INPUT_RELAYS, JOB_NAME, OUTPUT_RELAYS,
};
use super::ring_buffer::{RoboCallRingbuffer, ARG_CNT};

/// One request/response exchange the link needs performed by a transport.
/// `line` is the outgoing request; the caller resumes with the raw reply
/// line, or `None` on a transport timeout.
pub trait RobotTransport {
    fn exchange(&mut self, line: &str) -> CocktailResult<Option<String>>;
}

/// Drives the ring-buffer feeding protocol and job lifecycle against one
/// robot controller connection. Holds no transport of its own: every
/// exchange is delegated to a `RobotTransport`, so the same link logic runs
/// against a real socket or a test double.
pub struct RobotLink {
    ringbuffer: Option<RoboCallRingbuffer>,
    state: Option<RobotState>,
    task_ids: [Option<Uuid>; 4],
    consecutive_timeouts: u32,
}

const MAX_CONSECUTIVE_TIMEOUTS: u32 = 5;

impl RobotLink {
    pub fn new() -> Self {
        Self { ringbuffer: None, state: None, task_ids: [None; 4], consecutive_timeouts: 0 }
    }

    pub fn is_initialized(&self) -> bool {
        self.ringbuffer.is_some() && self.state.is_some()
    }

    pub fn robot_state(&self) -> Option<RobotState> {
        self.state
    }

    fn exchange(&mut self, transport: &mut dyn RobotTransport, line: &str) -> CocktailResult<String> {
        match transport.exchange(line)? {
            Some(reply) => {
                self.consecutive_timeouts = 0;
                Ok(reply)
            }
            None => {
                self.consecutive_timeouts += 1;
                if self.consecutive_timeouts >= MAX_CONSECUTIVE_TIMEOUTS {
                    Err(CocktailError::RobotLink(format!(
                        "{} consecutive transport timeouts, link is fatal",
                        self.consecutive_timeouts
                    )))
                } else {
                    Err(CocktailError::Transport("single-exchange timeout".to_string()))
                }
            }
        }
    }

    fn read_state(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<RobotState> {
        let reply = self.exchange(transport, &ioread_request(OUTPUT_RELAYS))?;
        let bytes = parse_hex_bytes(&reply, OUTPUT_RELAYS.num_bytes)?;
        let array: [u8; 5] = bytes.try_into().map_err(|_| CocktailError::RobotLink("short output relay reply".into()))?;
        RobotState::parse_from_bytes(&array).ok_or_else(|| CocktailError::RobotLink("unknown robot position byte".into()))
    }

    fn write_state(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<()> {
        let bytes = self
            .ringbuffer
            .as_ref()
            .ok_or_else(|| CocktailError::RobotLink("link not initialized".into()))?
            .to_robo_bytes();
        let _ = self.exchange(transport, &iowrite_request(INPUT_RELAYS))?;
        let _ = transport.exchange(&to_hex_line(&bytes))?;
        Ok(())
    }

    /// Seeds local ring-buffer state from the robot's reported read position
    /// and clears the task-id table, then writes a freshly-zeroed input block.
    pub fn initialize(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<()> {
        let state = self.read_state(transport)?;
        self.state = Some(state);
        self.ringbuffer = Some(RoboCallRingbuffer::new(state.ringbuffer_read_pos));
        self.task_ids = [None; 4];
        self.write_state(transport)?;
        info!(read_pos = state.ringbuffer_read_pos, "robot link initialized");
        Ok(())
    }

    pub fn sync_state(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<()> {
        let state = self.read_state(transport)?;
        self.state = Some(state);
        self.write_state(transport)
    }

    /// Toggles hold, confirms the controller is stopped, resets the job
    /// cursor to line 0, then restarts the job.
    pub fn initialize_job(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<()> {
        let _ = self.exchange(transport, &hold_request(true))?;
        let status = self.read_status(transport)?;
        let _ = self.exchange(transport, &hold_request(false))?;
        let status = self.read_status(transport).unwrap_or(status);
        if status.running {
            return Err(CocktailError::RobotLink("controller still running after hold cycle".into()));
        }
        self.sync_state(transport)?;
        let reply = self.exchange(transport, &jseq_request(JOB_NAME, 0))?;
        if reply.trim() != super::protocol::SUCCESS_REPLY {
            return Err(CocktailError::RobotLink(format!("JSEQ reset rejected: {reply}")));
        }
        let _ = self.exchange(transport, &svon_request())?;
        let _ = self.exchange(transport, &start_request(JOB_NAME))?;
        self.sync_state(transport)
    }

    fn read_status(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<RoboStatus> {
        let reply = self.exchange(transport, &rstats_request())?;
        let bytes = parse_hex_bytes(&reply, 2)?;
        Ok(RoboStatus::parse(bytes[0], bytes[1]))
    }

    /// Attempts to feed one task into the ring; returns `false` if the ring
    /// is currently full.
    pub fn enqueue_task(&mut self, task_id: Uuid, task: &Task) -> CocktailResult<bool> {
        let state = self.state.ok_or_else(|| CocktailError::RobotLink("link not initialized".into()))?;
        let ringbuffer = self.ringbuffer.as_mut().ok_or_else(|| CocktailError::RobotLink("link not initialized".into()))?;
        let encoded = super::protocol::encode_task(task);
        debug_assert_eq!(encoded.len(), ARG_CNT);
        let write_pos = ringbuffer.write_pos() as usize;
        let fed = ringbuffer.try_feed(task_id, encoded, state.ringbuffer_read_pos);
        if fed {
            self.task_ids[write_pos] = Some(task_id);
        }
        Ok(fed)
    }

    /// Returns finished task ids, oldest first, and clears them from the
    /// local bookkeeping table.
    pub fn pop_finished_tasks(&mut self) -> CocktailResult<Vec<Uuid>> {
        let state = self.state.ok_or_else(|| CocktailError::RobotLink("link not initialized".into()))?;
        let ringbuffer = self.ringbuffer.as_mut().ok_or_else(|| CocktailError::RobotLink("link not initialized".into()))?;
        Ok(ringbuffer.report_finished(state.ringbuffer_read_pos))
    }

    /// Probes controller liveness; attempts a restart if it stopped with the
    /// safeguard engaged. This call intentionally does not escalate
    /// transport timeouts to fatal, matching a best-effort liveness check.
    pub fn assure_running(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<()> {
        let status = match self.read_status(transport) {
            Ok(s) => s,
            Err(_) => return Ok(()),
        };
        if !status.running {
            if status.safeguard {
                warn!("controller stopped with safeguard engaged, attempting restart");
                let _ = self.exchange(transport, &start_request(JOB_NAME));
            } else {
                warn!("controller stopped, waiting on safety door");
            }
        }
        Ok(())
    }
}

impl Default for RobotLink {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex_bytes(reply: &str, expected_len: usize) -> CocktailResult<Vec<u8>> {
    let bytes =
        hex::decode(reply.trim()).map_err(|e| CocktailError::RobotLink(format!("malformed relay reply: {e}")))?;
    if bytes.len() != expected_len {
        return Err(CocktailError::RobotLink(format!(
            "expected {expected_len} relay bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn to_hex_line(bytes: &[u8]) -> String {
    format!("{}\r\n", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_types::Position;

    struct ScriptedTransport {
        replies: std::collections::VecDeque<Option<String>>,
    }

    impl RobotTransport for ScriptedTransport {
        fn exchange(&mut self, _line: &str) -> CocktailResult<Option<String>> {
            Ok(self.replies.pop_front().flatten())
        }
    }

    fn output_state_hex(position: Position, read_pos: u8) -> String {
        hex::encode([position as u8, read_pos, 0, 0, 0])
    }

    #[test]
    fn initialize_seeds_ringbuffer_from_robot_read_pos() {
        let mut transport = ScriptedTransport {
            replies: vec![Some(output_state_hex(Position::Home, 0)), Some("OK".to_string()), Some("OK".to_string())]
                .into_iter()
                .collect(),
        };
        let mut link = RobotLink::new();
        link.initialize(&mut transport).unwrap();
        assert!(link.is_initialized());
        assert_eq!(link.robot_state().unwrap().ringbuffer_read_pos, 0);
    }

    #[test]
    fn enqueue_before_initialize_errors() {
        let mut link = RobotLink::new();
        let err = link.enqueue_task(Uuid::new_v4(), &Task::Pour);
        assert!(err.is_err());
    }
}
