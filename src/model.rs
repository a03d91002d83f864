use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MotorId(pub u8);

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V1,
    V2,
}

/// One servo on the bus and the last position read back from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actuator {
    pub id: MotorId,
    pub present_position: i32,
    pub torque_enabled: bool,
}

impl Actuator {
    pub fn new(id: MotorId) -> Self {
        Self { id, present_position: 0, torque_enabled: false }
    }
}
