//! Register access over Dynamixel Protocol 1.0 and 2.0.
//!
//! Every transaction is a blocking instruction/status round trip. The result
//! separates the two failure layers: a [`CommError`] means no usable status
//! packet came back, while a non-zero [`DeviceError`] inside an `Ok` means the
//! servo answered but reported a fault.

use std::fmt;

use crc16::{State, BUYPASS};

use crate::{
    control_table::BROADCAST_ID,
    error::CommError,
    model::{MotorId, ProtocolVersion},
    transport::Port,
};

const INST_READ: u8 = 0x02;
const INST_WRITE: u8 = 0x03;
const INST_STATUS: u8 = 0x55;

const HEADER_V1: [u8; 2] = [0xFF, 0xFF];
const HEADER_V2: [u8; 4] = [0xFF, 0xFF, 0xFD, 0x00];
const STUFF_PATTERN: [u8; 3] = [0xFF, 0xFF, 0xFD];
const STUFF_BYTE: u8 = 0xFD;

const MAX_LENGTH_V2: usize = 1024;

const V1_ERROR_BITS: [&str; 7] =
    ["input voltage", "angle limit", "overheating", "range", "checksum", "overload", "instruction"];

/// Error byte of a status packet. Zero means the servo reported no fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceError {
    version: ProtocolVersion,
    bits: u8,
}

impl DeviceError {
    pub fn new(version: ProtocolVersion, bits: u8) -> Self {
        Self { version, bits }
    }

    pub fn none(version: ProtocolVersion) -> Self {
        Self::new(version, 0)
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn is_none(&self) -> bool {
        self.bits == 0
    }

    fn describe_v2(code: u8) -> Option<&'static str> {
        match code {
            1 => Some("failed to process the instruction packet"),
            2 => Some("undefined or malformed instruction"),
            3 => Some("CRC does not match"),
            4 => Some("data value is out of range"),
            5 => Some("data length does not match"),
            6 => Some("data value exceeds the limit"),
            7 => Some("register is not accessible"),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bits == 0 {
            return f.write_str("no error");
        }

        let mut parts = Vec::new();
        match self.version {
            ProtocolVersion::V1 => {
                for (bit, name) in V1_ERROR_BITS.iter().enumerate() {
                    if self.bits & (1 << bit) != 0 {
                        parts.push(format!("{name} error"));
                    }
                }
            }
            ProtocolVersion::V2 => {
                if self.bits & 0x80 != 0 {
                    parts.push("hardware alert, check Hardware Error Status".to_string());
                }
                let code = self.bits & 0x7F;
                if code != 0 {
                    parts.push(match Self::describe_v2(code) {
                        Some(text) => text.to_string(),
                        None => format!("unknown error code {code}"),
                    });
                }
            }
        }
        f.write_str(&parts.join(", "))
    }
}

/// A transaction that reached the servo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status<T> {
    pub value: T,
    pub error: DeviceError,
}

pub type TxRxResult<T> = Result<Status<T>, CommError>;

pub trait RegisterClient {
    fn protocol_version(&self) -> ProtocolVersion;

    fn write1<P: Port + ?Sized>(&mut self, port: &mut P, id: MotorId, address: u16, value: u8) -> TxRxResult<()>;

    fn write4<P: Port + ?Sized>(&mut self, port: &mut P, id: MotorId, address: u16, value: i32) -> TxRxResult<()>;

    fn read4<P: Port + ?Sized>(&mut self, port: &mut P, id: MotorId, address: u16) -> TxRxResult<i32>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    id: u8,
    error: u8,
    params: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct DynamixelProtocol {
    version: ProtocolVersion,
}

impl DynamixelProtocol {
    pub fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }

    fn field(&self, value: u16) -> Result<Vec<u8>, CommError> {
        match self.version {
            ProtocolVersion::V1 => u8::try_from(value).map(|v| vec![v]).map_err(|_| CommError::TxError),
            ProtocolVersion::V2 => Ok(value.to_le_bytes().to_vec()),
        }
    }

    fn txrx<P: Port + ?Sized>(
        &self,
        port: &mut P,
        id: MotorId,
        instruction: u8,
        params: &[u8],
    ) -> TxRxResult<Vec<u8>> {
        if id.0 == BROADCAST_ID {
            return Err(CommError::NotAvailable);
        }
        if !port.is_open() {
            return Err(CommError::PortBusy);
        }

        let packet = encode(self.version, id.0, instruction, params);
        port.clear_input().map_err(|_| CommError::TxFail)?;
        port.write_bytes(&packet).map_err(|_| CommError::TxFail)?;

        let frame = self.receive(port)?;
        if frame.id != id.0 {
            return Err(CommError::RxCorrupt);
        }

        Ok(Status { value: frame.params, error: DeviceError::new(self.version, frame.error) })
    }

    fn receive<P: Port + ?Sized>(&self, port: &mut P) -> Result<Frame, CommError> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 64];

        loop {
            if let Some(frame) = decode(self.version, &mut buf)? {
                return Ok(frame);
            }

            let n = port.read_bytes(&mut chunk).map_err(|_| CommError::RxFail)?;
            if n == 0 {
                return Err(if buf.is_empty() { CommError::RxTimeout } else { CommError::RxCorrupt });
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    fn write<P: Port + ?Sized>(&self, port: &mut P, id: MotorId, address: u16, data: &[u8]) -> TxRxResult<()> {
        let mut params = self.field(address)?;
        params.extend_from_slice(data);

        let status = self.txrx(port, id, INST_WRITE, &params)?;
        Ok(Status { value: (), error: status.error })
    }

    fn read<P: Port + ?Sized>(&self, port: &mut P, id: MotorId, address: u16, length: u16) -> TxRxResult<Vec<u8>> {
        let mut params = self.field(address)?;
        params.extend(self.field(length)?);

        let status = self.txrx(port, id, INST_READ, &params)?;
        if status.value.len() != length as usize {
            return Err(CommError::RxCorrupt);
        }
        Ok(status)
    }
}

impl RegisterClient for DynamixelProtocol {
    fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    fn write1<P: Port + ?Sized>(&mut self, port: &mut P, id: MotorId, address: u16, value: u8) -> TxRxResult<()> {
        self.write(port, id, address, &[value])
    }

    fn write4<P: Port + ?Sized>(&mut self, port: &mut P, id: MotorId, address: u16, value: i32) -> TxRxResult<()> {
        self.write(port, id, address, &value.to_le_bytes())
    }

    fn read4<P: Port + ?Sized>(&mut self, port: &mut P, id: MotorId, address: u16) -> TxRxResult<i32> {
        let status = self.read(port, id, address, 4)?;
        let bytes: [u8; 4] = status.value.as_slice().try_into().map_err(|_| CommError::RxCorrupt)?;
        Ok(Status { value: i32::from_le_bytes(bytes), error: status.error })
    }
}

/// Builds an instruction packet. For status packets `instruction` is the
/// instruction byte in 2.0 and the error byte in 1.0.
fn encode(version: ProtocolVersion, id: u8, instruction: u8, params: &[u8]) -> Vec<u8> {
    match version {
        ProtocolVersion::V1 => {
            let mut packet = HEADER_V1.to_vec();
            packet.push(id);
            packet.push((params.len() + 2) as u8);
            packet.push(instruction);
            packet.extend_from_slice(params);
            packet.push(checksum_v1(&packet[2..]));
            packet
        }
        ProtocolVersion::V2 => {
            let mut body = vec![instruction];
            body.extend_from_slice(params);
            let body = stuff(&body);

            let mut packet = HEADER_V2.to_vec();
            packet.push(id);
            packet.extend_from_slice(&((body.len() + 2) as u16).to_le_bytes());
            packet.extend_from_slice(&body);
            let crc = State::<BUYPASS>::calculate(&packet);
            packet.extend_from_slice(&crc.to_le_bytes());
            packet
        }
    }
}

/// Pulls one status frame out of `buf`, dropping noise before the header.
/// `Ok(None)` means more bytes are needed.
fn decode(version: ProtocolVersion, buf: &mut Vec<u8>) -> Result<Option<Frame>, CommError> {
    match version {
        ProtocolVersion::V1 => decode_v1(buf),
        ProtocolVersion::V2 => decode_v2(buf),
    }
}

fn decode_v1(buf: &mut Vec<u8>) -> Result<Option<Frame>, CommError> {
    if !align_to_header(buf, &HEADER_V1) {
        return Ok(None);
    }
    while buf.len() > 2 && buf[2] == 0xFF {
        buf.remove(0);
    }
    if buf.len() < 4 {
        return Ok(None);
    }

    let length = buf[3] as usize;
    if length < 2 {
        return Err(CommError::RxCorrupt);
    }
    let total = 4 + length;
    if buf.len() < total {
        return Ok(None);
    }
    if checksum_v1(&buf[2..total - 1]) != buf[total - 1] {
        return Err(CommError::RxCorrupt);
    }

    Ok(Some(Frame { id: buf[2], error: buf[4], params: buf[5..total - 1].to_vec() }))
}

fn decode_v2(buf: &mut Vec<u8>) -> Result<Option<Frame>, CommError> {
    if !align_to_header(buf, &HEADER_V2) || buf.len() < 7 {
        return Ok(None);
    }

    let length = u16::from_le_bytes([buf[5], buf[6]]) as usize;
    // instruction, error and the two CRC bytes at minimum
    if !(4..=MAX_LENGTH_V2).contains(&length) {
        return Err(CommError::RxCorrupt);
    }
    let total = 7 + length;
    if buf.len() < total {
        return Ok(None);
    }

    let crc = u16::from_le_bytes([buf[total - 2], buf[total - 1]]);
    if State::<BUYPASS>::calculate(&buf[..total - 2]) != crc {
        return Err(CommError::RxCorrupt);
    }

    let body = unstuff(&buf[7..total - 2]);
    if body[0] != INST_STATUS {
        return Err(CommError::RxCorrupt);
    }

    Ok(Some(Frame { id: buf[4], error: body[1], params: body[2..].to_vec() }))
}

/// Moves the first header occurrence to the front of `buf`. When there is
/// none, keeps only a tail that could still grow into one.
fn align_to_header(buf: &mut Vec<u8>, header: &[u8]) -> bool {
    match buf.windows(header.len()).position(|w| w == header) {
        Some(start) => {
            buf.drain(..start);
            true
        }
        None => {
            let keep = buf.len().min(header.len() - 1);
            let cut = buf.len() - keep;
            buf.drain(..cut);
            false
        }
    }
}

fn checksum_v1(bytes: &[u8]) -> u8 {
    !bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

fn stuff(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 2);
    for &b in body {
        out.push(b);
        if out.ends_with(&STUFF_PATTERN) {
            out.push(STUFF_BYTE);
        }
    }
    out
}

fn unstuff(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        out.push(body[i]);
        if out.ends_with(&STUFF_PATTERN) && body.get(i + 1) == Some(&STUFF_BYTE) {
            i += 1;
        }
        i += 1;
    }
    out
}
