use std::io::{self, Read};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};

use crate::error::MotorError;

const ESC: u8 = 0x1B;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Esc,
    Other,
}

impl Key {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            ESC => Key::Esc,
            b if b.is_ascii_graphic() || b == b' ' => Key::Char(b as char),
            _ => Key::Other,
        }
    }
}

/// Blocking single-key input.
pub trait Keyboard {
    fn read_key(&mut self) -> Result<Key, MotorError>;
}

fn keyboard_err(e: io::Error) -> MotorError {
    MotorError::Keyboard(e.to_string())
}

/// Interactive terminal input. Raw mode is held only while waiting for a
/// key so regular output stays line-oriented.
#[derive(Debug, Default)]
pub struct TerminalKeyboard;

impl TerminalKeyboard {
    fn next_press() -> Result<Key, MotorError> {
        loop {
            let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event::read().map_err(keyboard_err)? else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }

            return Ok(match code {
                KeyCode::Esc => Key::Esc,
                // raw mode swallows SIGINT, so Ctrl-C has to go through shutdown like Esc
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Key::Esc,
                KeyCode::Char(c) => Key::Char(c),
                _ => Key::Other,
            });
        }
    }
}

impl Keyboard for TerminalKeyboard {
    fn read_key(&mut self) -> Result<Key, MotorError> {
        terminal::enable_raw_mode().map_err(keyboard_err)?;
        let key = Self::next_press();
        terminal::disable_raw_mode().map_err(keyboard_err)?;
        key
    }
}

/// Keys taken byte by byte from a stream, e.g. piped stdin.
///
/// Line breaks are skipped so scripts can put one key per line. End of
/// input reads as Esc.
pub struct StreamKeyboard<R> {
    reader: R,
}

impl<R: Read> StreamKeyboard<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Keyboard for StreamKeyboard<R> {
    fn read_key(&mut self) -> Result<Key, MotorError> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(Key::Esc),
                Ok(_) if matches!(byte[0], b'\n' | b'\r') => continue,
                Ok(_) => return Ok(Key::from_byte(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(keyboard_err(e)),
            }
        }
    }
}
