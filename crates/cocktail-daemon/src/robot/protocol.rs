use cocktail_types::{Position, Task};

/// Relay address + byte width of one I/O block on the robot controller.
#[derive(Debug, Clone, Copy)]
pub struct RobotRelays {
    pub address: u32,
    pub num_bytes: usize,
}

pub const INPUT_RELAYS: RobotRelays = RobotRelays { address: 22010, num_bytes: 20 };
pub const OUTPUT_RELAYS: RobotRelays = RobotRelays { address: 32010, num_bytes: 5 };
pub const SAFEGUARD_RELAY_ADDRESS: u32 = 80020;
pub const SAFEGUARD_BIT: u32 = 3;
pub const SUCCESS_COUNTER_VARIABLE: u32 = 42;
pub const SUCCESS_REPLY: &str = "0000";
pub const JOB_NAME: &str = "COCK";

/// Opcode of one encoded ring-buffer command slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskOpcode {
    MoveTo = 1,
    Zapf = 2,
    Shake = 3,
    Pour = 4,
    Clean = 5,
}

/// Encodes one robot-queue task (everything but `Pump`) into its 4-byte slot.
pub fn encode_task(task: &Task) -> [u8; 4] {
    match task {
        Task::Move { to } => [TaskOpcode::MoveTo as u8, *to as u8, 0, 0],
        Task::Zapf { slot } => [TaskOpcode::Zapf as u8, *slot, 0, 0],
        Task::Shake { num_shakes } => [TaskOpcode::Shake as u8, *num_shakes, 0, 0],
        Task::Pour => [TaskOpcode::Pour as u8, 0, 0, 0],
        Task::Clean => [TaskOpcode::Clean as u8, 0, 0, 0],
        Task::Pump { .. } => panic!("pump tasks are never fed through the ring buffer"),
    }
}

/// One request line of the host-controller line protocol.
pub fn request_line(op: &str, arg_len: usize) -> String {
    format!("HOSTCTRL_REQUEST {op} {arg_len}\r\n")
}

pub fn iowrite_request(relays: RobotRelays) -> String {
    request_line("IOWRITE", relays.num_bytes)
}

pub fn ioread_request(relays: RobotRelays) -> String {
    request_line("IOREAD", relays.num_bytes)
}

pub fn svon_request() -> String {
    request_line("SVON", 0)
}

pub fn start_request(job: &str) -> String {
    format!("HOSTCTRL_REQUEST START {job}\r\n")
}

pub fn jseq_request(job: &str, line: u32) -> String {
    format!("HOSTCTRL_REQUEST JSEQ {job},{line}\r\n")
}

pub fn hold_request(on: bool) -> String {
    format!("HOSTCTRL_REQUEST HOLD {}\r\n", if on { 1 } else { 0 })
}

pub fn rstats_request() -> String {
    request_line("RSTATS", 0)
}

/// Parsed health of the robot controller, derived from `RSTATS` plus the
/// safeguard relay and success-counter variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoboStatus {
    pub running: bool,
    pub safeguard: bool,
}

impl RoboStatus {
    pub fn parse(running_byte: u8, safeguard_byte: u8) -> Self {
        Self { running: running_byte != 0, safeguard: (safeguard_byte >> SAFEGUARD_BIT) & 1 != 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_encodes_move_task() {
        let bytes = encode_task(&Task::Move { to: Position::Pour });
        assert_eq!(bytes, [TaskOpcode::MoveTo as u8, Position::Pour as u8, 0, 0]);
    }

    #[test]
    fn encodes_zapf_and_shake() {
        assert_eq!(encode_task(&Task::Zapf { slot: 2 }), [TaskOpcode::Zapf as u8, 2, 0, 0]);
        assert_eq!(encode_task(&Task::Shake { num_shakes: 3 }), [TaskOpcode::Shake as u8, 3, 0, 0]);
    }

    #[test]
    fn request_line_uses_crlf() {
        assert_eq!(iowrite_request(INPUT_RELAYS), "HOSTCTRL_REQUEST IOWRITE 20\r\n");
    }

    #[test]
    fn safeguard_bit_is_third() {
        let status = RoboStatus::parse(0, 0b1000);
        assert!(status.safeguard);
        assert!(!status.running);
    }
}
