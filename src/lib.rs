pub mod config;
pub mod control_loop;
pub mod control_table;
pub mod conversion;
pub mod error;
pub mod keyboard;
pub mod keymap;
pub mod model;
pub mod protocol;
pub mod transport;
pub mod transport_serial;

pub use config::{ControllerConfig, PositionLimits};
pub use control_loop::{Exit, JogController, LoopState};
pub use error::{CommError, MotorError};
pub use keyboard::{Key, Keyboard, StreamKeyboard, TerminalKeyboard};
pub use keymap::{Action, KeyMap};
pub use model::{Actuator, MotorId, ProtocolVersion};
pub use protocol::{DeviceError, DynamixelProtocol, RegisterClient, Status, TxRxResult};
pub use transport::Port;
pub use transport_serial::SerialPortHandler;
