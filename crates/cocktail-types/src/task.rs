use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A station the robot arm can occupy. Wire-encoded as its declared discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Position {
    Home = 0,
    Zapf = 1,
    Shake = 2,
    Pour = 3,
    Clean = 4,
    Pump = 5,
}

impl Position {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Position::Home),
            1 => Some(Position::Zapf),
            2 => Some(Position::Shake),
            3 => Some(Position::Pour),
            4 => Some(Position::Clean),
            5 => Some(Position::Pump),
            _ => None,
        }
    }

    /// Stations directly reachable from this one in a single hop.
    pub fn neighbors(self) -> &'static [Position] {
        match self {
            Position::Home => &[Position::Zapf, Position::Shake, Position::Clean, Position::Pump],
            Position::Zapf => &[Position::Home],
            Position::Shake => &[Position::Home, Position::Pour],
            Position::Pour => &[Position::Shake],
            Position::Clean => &[Position::Home, Position::Pump],
            Position::Pump => &[Position::Home, Position::Clean],
        }
    }
}

/// Number of independently controllable pump channels.
pub const PUMP_CHANNELS: usize = 4;

/// One atomic unit of work executed by the cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task {
    Move { to: Position },
    Zapf { slot: u8 },
    Shake { num_shakes: u8 },
    Pour,
    Clean,
    Pump { durations: [f64; PUMP_CHANNELS] },
}

impl Task {
    /// True for tasks fed through the robot ring buffer (everything but `Pump`).
    pub fn is_robot_task(&self) -> bool {
        !matches!(self, Task::Pump { .. })
    }
}

/// A totally ordered sequence of tasks realizing one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocktailSystemPlan {
    pub plan_id: Uuid,
    pub tasks: Vec<Task>,
}

impl CocktailSystemPlan {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { plan_id: Uuid::new_v4(), tasks }
    }
}

/// Tracks how far a plan has been fed to the robot link versus actually completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub plan: CocktailSystemPlan,
    pub queued_step_pos: i64,
    pub finished_step_pos: i64,
}

impl PlanProgress {
    pub fn new(plan: CocktailSystemPlan) -> Self {
        Self { plan, queued_step_pos: -1, finished_step_pos: -1 }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_step_pos + 1 == self.plan.tasks.len() as i64
    }
}

/// Snapshot of the robot controller's reported state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub position: Position,
    pub ringbuffer_read_pos: u8,
    pub cup_placed: bool,
    pub cup_full: bool,
    pub shaker_empty: bool,
    pub cup_id: u8,
}

impl RobotState {
    pub fn parse_from_bytes(data: &[u8; 5]) -> Option<Self> {
        let position = Position::from_byte(data[0])?;
        let ringbuffer_read_pos = data[1];
        let io_byte = data[2];
        Some(Self {
            position,
            ringbuffer_read_pos,
            cup_placed: io_byte & 0b001 != 0,
            cup_full: io_byte & 0b010 != 0,
            shaker_empty: io_byte & 0b100 != 0,
            cup_id: data[3],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_progress_starts_unstarted() {
        let plan = CocktailSystemPlan::new(vec![Task::Pour]);
        let progress = PlanProgress::new(plan);
        assert_eq!(progress.queued_step_pos, -1);
        assert_eq!(progress.finished_step_pos, -1);
        assert!(!progress.is_finished());
    }

    #[test]
    fn plan_progress_finished_at_last_index() {
        let plan = CocktailSystemPlan::new(vec![Task::Pour, Task::Clean]);
        let mut progress = PlanProgress::new(plan);
        progress.finished_step_pos = 1;
        assert!(progress.is_finished());
    }

    #[test]
    fn robot_state_roundtrips_io_bits() {
        let bytes = [Position::Pump as u8, 2, 0b011, 7, 0];
        let state = RobotState::parse_from_bytes(&bytes).unwrap();
        assert_eq!(state.position, Position::Pump);
        assert_eq!(state.ringbuffer_read_pos, 2);
        assert!(state.cup_placed);
        assert!(state.cup_full);
        assert!(!state.shaker_empty);
        assert_eq!(state.cup_id, 7);
    }
}
