use std::io;

use crate::error::MotorError;

/// Serial link to the servo bus.
///
/// Lifecycle calls report failures as [`MotorError`]; byte I/O is plain
/// `io::Result` and is interpreted by the protocol layer.
pub trait Port {
    fn name(&self) -> &str;
    fn open(&mut self) -> Result<(), MotorError>;
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), MotorError>;
    fn close(&mut self);
    fn is_open(&self) -> bool;

    fn clear_input(&mut self) -> io::Result<()>;
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()>;

    /// Returns `Ok(0)` when the read timeout elapses with no data.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
