use thiserror::Error;

use crate::{keyboard::Key, keymap::Action};

#[derive(Debug, Error, Clone)]
pub enum MotorError {
    #[error("failed to open port {port}: {reason}")]
    PortOpen { port: String, reason: String },
    #[error("failed to change the baud rate to {baud_rate}: {reason}")]
    BaudRate { baud_rate: u32, reason: String },
    #[error("port is not open")]
    Closed,
    #[error("no actuators configured")]
    NoActuators,
    #[error("actuator {0} configured twice")]
    DuplicateActuator(u8),
    #[error("key {0:?} bound twice")]
    DuplicateBinding(Key),
    #[error("Esc always quits and cannot be bound to {0:?}")]
    ReservedEsc(Action),
    #[error("key {key:?} targets unmanaged actuator {id}")]
    UnknownActuator { key: Key, id: u8 },
    #[error("invalid position limits {min}..={max}")]
    InvalidLimits { min: i32, max: i32 },
    #[error("keyboard input failed: {0}")]
    Keyboard(String),
}

/// Outcome of a request/response exchange that never produced a usable status packet.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommError {
    #[error("port is in use or not open")]
    PortBusy,
    #[error("failed to transmit instruction packet")]
    TxFail,
    #[error("failed to receive status packet")]
    RxFail,
    #[error("incorrect instruction packet")]
    TxError,
    #[error("no status packet")]
    RxTimeout,
    #[error("incorrect status packet")]
    RxCorrupt,
    #[error("protocol does not support this request")]
    NotAvailable,
}
