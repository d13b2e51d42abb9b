use uuid::Uuid;

pub const RING_LEN: usize = 4;
pub const ARG_CNT: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Slot {
    task_id: Uuid,
    bytes: [u8; ARG_CNT],
}

/// Host-side view of the 4-slot command ring shared with the robot controller.
/// The host owns `write_pos`; the robot reports its own `read_pos` out of band
/// via the output relay block. A slot is never overwritten before the robot
/// has read past it.
#[derive(Debug, Clone)]
pub struct RoboCallRingbuffer {
    write_pos: usize,
    slots: [Option<Slot>; RING_LEN],
}

impl RoboCallRingbuffer {
    pub fn new(initial_read_pos: u8) -> Self {
        Self { write_pos: (initial_read_pos as usize + 1) % RING_LEN, slots: [None; RING_LEN] }
    }

    pub fn write_pos(&self) -> u8 {
        self.write_pos as u8
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Attempts to feed one task into the ring. Returns `false` without
    /// mutating state when doing so would overwrite a slot the robot has not
    /// read yet.
    pub fn try_feed(&mut self, task_id: Uuid, bytes: [u8; ARG_CNT], read_pos: u8) -> bool {
        if (self.write_pos + 1) % RING_LEN == read_pos as usize {
            return false;
        }
        self.slots[self.write_pos] = Some(Slot { task_id, bytes });
        self.write_pos = (self.write_pos + 1) % RING_LEN;
        true
    }

    /// Walks backward from the robot-reported read position, collecting the
    /// task ids of slots the robot has finished, oldest first, and clearing
    /// them. Mirrors how the robot's own cursor only ever advances.
    pub fn report_finished(&mut self, robot_read_pos: u8) -> Vec<Uuid> {
        let mut finished = Vec::new();
        let mut pos = robot_read_pos as usize;
        while let Some(slot) = self.slots[pos].take() {
            finished.push(slot.task_id);
            pos = (pos + RING_LEN - 1) % RING_LEN;
        }
        finished.reverse();
        finished
    }

    /// Encodes the full input relay block: write_pos byte followed by the
    /// four fixed-width task slots, zero-padded where empty.
    pub fn to_robo_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + RING_LEN * ARG_CNT);
        out.push(self.write_pos as u8);
        for slot in &self.slots {
            match slot {
                Some(s) => out.extend_from_slice(&s.bytes),
                None => out.extend_from_slice(&[0u8; ARG_CNT]),
            }
        }
        out
    }

    pub fn clean(&mut self) {
        self.slots = [None; RING_LEN];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_write_pos_follows_read_pos() {
        let rb = RoboCallRingbuffer::new(0);
        assert_eq!(rb.write_pos(), 1);
    }

    #[test]
    fn s2_ring_buffer_round_trip() {
        let mut rb = RoboCallRingbuffer::new(0);
        assert_eq!(rb.write_pos(), 1);

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(rb.try_feed(a, [1, 0, 0, 0], 0));
        assert!(rb.try_feed(b, [1, 0, 0, 0], 0));
        assert_eq!(rb.write_pos(), 3);

        let c = Uuid::new_v4();
        assert!(!rb.try_feed(c, [1, 0, 0, 0], 0));

        assert!(rb.try_feed(c, [1, 0, 0, 0], 2));
        assert_eq!(rb.write_pos(), 0);
    }

    #[test]
    fn never_overwrites_unread_slot() {
        let mut rb = RoboCallRingbuffer::new(3);
        for _ in 0..3 {
            assert!(rb.try_feed(Uuid::new_v4(), [1, 0, 0, 0], 3));
        }
        assert!(!rb.try_feed(Uuid::new_v4(), [1, 0, 0, 0], 3));
    }

    #[test]
    fn finished_tasks_reported_oldest_first() {
        let mut rb = RoboCallRingbuffer::new(0);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        rb.try_feed(a, [1, 0, 0, 0], 0);
        rb.try_feed(b, [1, 0, 0, 0], 0);
        rb.try_feed(c, [1, 0, 0, 0], 0);

        let finished = rb.report_finished(3);
        assert_eq!(finished, vec![a, b, c]);
        assert!(rb.is_empty());
    }
}
