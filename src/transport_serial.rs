use std::{
    io::{self, Read, Write},
    time::Duration,
};

use serialport::{ClearBuffer, SerialPort};

use crate::{error::MotorError, transport::Port};

/// Baud rate the port is opened at before the configured one is applied.
const OPEN_BAUD_RATE: u32 = 57_600;

pub struct SerialPortHandler {
    path: String,
    baud_rate: u32,
    timeout: Duration,
    io: Option<Box<dyn SerialPort>>,
}

impl SerialPortHandler {
    pub fn new(path: &str, timeout: Duration) -> Self {
        Self { path: path.to_string(), baud_rate: OPEN_BAUD_RATE, timeout, io: None }
    }

    fn io(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.io
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port is not open"))
    }
}

impl Port for SerialPortHandler {
    fn name(&self) -> &str {
        &self.path
    }

    fn open(&mut self) -> Result<(), MotorError> {
        let io = serialport::new(&self.path, self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| MotorError::PortOpen { port: self.path.clone(), reason: e.to_string() })?;

        self.io = Some(io);
        Ok(())
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), MotorError> {
        let io = self.io.as_mut().ok_or(MotorError::Closed)?;
        io.set_baud_rate(baud_rate)
            .map_err(|e| MotorError::BaudRate { baud_rate, reason: e.to_string() })?;

        self.baud_rate = baud_rate;
        Ok(())
    }

    fn close(&mut self) {
        self.io = None;
    }

    fn is_open(&self) -> bool {
        self.io.is_some()
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.io()?.clear(ClearBuffer::Input).map_err(io::Error::other)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        let io = self.io()?;
        io.write_all(data)?;
        io.flush()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.io()?.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }
}
