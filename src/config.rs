use std::{collections::HashSet, time::Duration};

use crate::{
    control_table::{MAX_POSITION, MIN_POSITION},
    conversion::PositionConversion,
    error::MotorError,
    keymap::{Action, KeyMap},
    model::{MotorId, ProtocolVersion},
};

#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

pub const DEFAULT_BAUD_RATE: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionLimits {
    pub min: i32,
    pub max: i32,
}

impl PositionLimits {
    pub fn clamp(&self, position: i32) -> i32 {
        position.clamp(self.min, self.max)
    }
}

impl Default for PositionLimits {
    fn default() -> Self {
        Self { min: MIN_POSITION, max: MAX_POSITION }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub port: String,
    pub baud_rate: u32,
    pub protocol: ProtocolVersion,
    /// Per-read serial timeout; bounds every transaction.
    pub timeout: Duration,
    pub actuators: Vec<MotorId>,
    /// Jog targets are clamped into these when set.
    pub position_limits: Option<PositionLimits>,
    /// Skip jogs for actuators whose torque enable never succeeded.
    pub require_torque: bool,
    pub bindings: KeyMap,
    pub conversion: PositionConversion,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            protocol: ProtocolVersion::V2,
            timeout: Duration::from_millis(100),
            actuators: (11..=15).map(MotorId).collect(),
            position_limits: Some(PositionLimits::default()),
            require_torque: true,
            bindings: KeyMap::reference(),
            conversion: PositionConversion::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), MotorError> {
        if self.actuators.is_empty() {
            return Err(MotorError::NoActuators);
        }

        let mut seen = HashSet::new();
        for id in &self.actuators {
            if !seen.insert(*id) {
                return Err(MotorError::DuplicateActuator(id.0));
            }
        }

        for (key, action) in self.bindings.iter() {
            if let Action::Nudge { id, .. } = action {
                if !seen.contains(&id) {
                    return Err(MotorError::UnknownActuator { key, id: id.0 });
                }
            }
        }

        if let Some(PositionLimits { min, max }) = self.position_limits {
            if min > max {
                return Err(MotorError::InvalidLimits { min, max });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::Key;

    #[test]
    fn defaults_match_reference_chain() {
        let cfg = ControllerConfig::default();
        assert_eq!(cfg.actuators, vec![MotorId(11), MotorId(12), MotorId(13), MotorId(14), MotorId(15)]);
        assert_eq!(cfg.baud_rate, 1_000_000);
        assert_eq!(cfg.protocol, ProtocolVersion::V2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_actuator() {
        let cfg = ControllerConfig { actuators: vec![MotorId(11), MotorId(11)], ..Default::default() };
        assert!(matches!(cfg.validate(), Err(MotorError::DuplicateActuator(11))));
    }

    #[test]
    fn rejects_binding_to_unmanaged_actuator() {
        let cfg = ControllerConfig { actuators: vec![MotorId(11)], ..Default::default() };
        match cfg.validate() {
            Err(MotorError::UnknownActuator { id, key }) => {
                assert_ne!(id, 11);
                assert_ne!(key, Key::Esc);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_limits() {
        let cfg = ControllerConfig {
            position_limits: Some(PositionLimits { min: 10, max: -10 }),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(MotorError::InvalidLimits { min: 10, max: -10 })));
    }

    #[test]
    fn limits_clamp_both_ends() {
        let limits = PositionLimits::default();
        assert_eq!(limits.clamp(150_050), 150_000);
        assert_eq!(limits.clamp(-150_100), -150_000);
        assert_eq!(limits.clamp(1_050), 1_050);
    }
}
