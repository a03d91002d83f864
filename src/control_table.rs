//! Control table items of the X / Pro series used by the jog controller.

pub const ADDR_TORQUE_ENABLE: u16 = 64;
pub const ADDR_GOAL_POSITION: u16 = 116;
pub const ADDR_PRESENT_POSITION: u16 = 132;

pub const TORQUE_ENABLE: u8 = 1;
pub const TORQUE_DISABLE: u8 = 0;

/// Extended position mode range accepted for jog targets.
pub const MIN_POSITION: i32 = -150_000;
pub const MAX_POSITION: i32 = 150_000;

pub const BROADCAST_ID: u8 = 0xFE;
