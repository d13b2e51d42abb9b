mod link;
mod protocol;
mod ring_buffer;

pub use link::{RobotLink, RobotTransport};
pub use protocol::{
    encode_task, RoboStatus, TaskOpcode, INPUT_RELAYS, JOB_NAME, OUTPUT_RELAYS, SAFEGUARD_BIT,
    SAFEGUARD_RELAY_ADDRESS, SUCCESS_COUNTER_VARIABLE, SUCCESS_REPLY,
};
pub use ring_buffer::{RoboCallRingbuffer, ARG_CNT, RING_LEN};
