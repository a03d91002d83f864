use tracing::{error, info, warn};

use crate::{
    config::ControllerConfig,
    control_table::{ADDR_GOAL_POSITION, ADDR_PRESENT_POSITION, ADDR_TORQUE_ENABLE, TORQUE_DISABLE, TORQUE_ENABLE},
    error::MotorError,
    keyboard::{Key, Keyboard},
    keymap::Action,
    model::{Actuator, MotorId},
    protocol::RegisterClient,
    transport::Port,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Startup,
    AwaitingKey,
    Polling(Key),
    ShuttingDown,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Esc (or end of input) led through a normal shutdown.
    Finished,
    /// The port could not be opened or configured; no servo was touched.
    StartupFailed,
    /// Key input broke mid-session; torque was still released.
    KeyboardFailed,
}

/// Single-threaded jog loop over one bus. Every register access is a
/// blocking round trip issued in ascending ID order.
pub struct JogController<P, C> {
    port: P,
    client: C,
    cfg: ControllerConfig,
    actuators: Vec<Actuator>,
    state: LoopState,
}

impl<P: Port, C: RegisterClient> JogController<P, C> {
    pub fn new(port: P, client: C, cfg: ControllerConfig) -> Result<Self, MotorError> {
        cfg.validate()?;

        let mut ids = cfg.actuators.clone();
        ids.sort();
        let actuators = ids.into_iter().map(Actuator::new).collect();

        Ok(Self { port, client, cfg, actuators, state: LoopState::Startup })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    pub fn actuator(&self, id: MotorId) -> Option<&Actuator> {
        self.actuators.iter().find(|a| a.id == id)
    }

    /// Drives the loop until it terminates. Keyboard failures are logged and
    /// end the session after the normal shutdown, they are not returned.
    pub fn run<K: Keyboard>(&mut self, keys: &mut K) -> Exit {
        if let Err(e) = self.startup() {
            error!("{e}");
            println!("Press any key to terminate...");
            self.state = LoopState::Terminated;
            if let Err(e) = keys.read_key() {
                warn!("{e}");
            }
            return Exit::StartupFailed;
        }

        loop {
            match self.state {
                LoopState::Startup | LoopState::AwaitingKey => {
                    println!("Press any key to continue! (or press ESC to quit!)");
                    match keys.read_key() {
                        Ok(key) => self.handle_key(key),
                        Err(e) => {
                            error!("{e}");
                            self.shutdown();
                            return Exit::KeyboardFailed;
                        }
                    }
                }
                LoopState::Polling(key) => {
                    self.poll_positions();
                    self.apply_key(key);
                    self.state = LoopState::AwaitingKey;
                }
                LoopState::ShuttingDown => self.shutdown(),
                LoopState::Terminated => return Exit::Finished,
            }
        }
    }

    /// Opens and configures the port, then enables torque on every actuator.
    /// Only port failures are fatal.
    fn startup(&mut self) -> Result<(), MotorError> {
        self.port.open()?;
        info!("opened port {} ({:?})", self.port.name(), self.client.protocol_version());

        if let Err(e) = self.port.set_baud_rate(self.cfg.baud_rate) {
            self.port.close();
            return Err(e);
        }
        info!("baud rate set to {}", self.cfg.baud_rate);

        self.set_torque_all(true);
        self.state = LoopState::AwaitingKey;
        Ok(())
    }

    fn handle_key(&mut self, key: Key) {
        self.state = match (key, self.cfg.bindings.lookup(key)) {
            (Key::Esc, _) | (_, Some(Action::Quit)) => LoopState::ShuttingDown,
            _ => LoopState::Polling(key),
        };
    }

    fn poll_positions(&mut self) {
        for actuator in &mut self.actuators {
            match self.client.read4(&mut self.port, actuator.id, ADDR_PRESENT_POSITION) {
                Ok(status) => {
                    if !status.error.is_none() {
                        warn!("[ID:{}] present position: {}", actuator.id, status.error);
                    }
                    actuator.present_position = status.value;
                }
                Err(e) => warn!("[ID:{}] present position: {e}", actuator.id),
            }

            println!(
                "[ID:{}] PresPos:{} ({:.1} deg)",
                actuator.id,
                actuator.present_position,
                self.cfg.conversion.tick_to_deg(actuator.present_position)
            );
        }
    }

    fn apply_key(&mut self, key: Key) {
        if let Some(Action::Nudge { id, delta }) = self.cfg.bindings.lookup(key) {
            self.nudge(id, delta);
        }
    }

    /// Writes `present_position + delta` as the goal of one actuator.
    fn nudge(&mut self, id: MotorId, delta: i32) {
        let Some(actuator) = self.actuators.iter().find(|a| a.id == id) else {
            warn!("[ID:{id}] not managed, ignoring jog");
            return;
        };
        if self.cfg.require_torque && !actuator.torque_enabled {
            warn!("[ID:{id}] torque was never enabled, ignoring jog");
            return;
        }

        let mut goal = actuator.present_position.saturating_add(delta);
        if let Some(limits) = self.cfg.position_limits {
            let clamped = limits.clamp(goal);
            if clamped != goal {
                warn!("[ID:{id}] goal {goal} outside {}..={}, using {clamped}", limits.min, limits.max);
                goal = clamped;
            }
        }

        match self.client.write4(&mut self.port, id, ADDR_GOAL_POSITION, goal) {
            Ok(status) if !status.error.is_none() => warn!("[ID:{id}] goal position: {}", status.error),
            Ok(_) => info!("[ID:{id}] GoalPos:{goal}"),
            Err(e) => warn!("[ID:{id}] goal position: {e}"),
        }
    }

    /// Disables torque on every actuator, then closes the port.
    fn shutdown(&mut self) {
        self.state = LoopState::ShuttingDown;
        self.set_torque_all(false);
        self.port.close();
        info!("closed port {}", self.port.name());
        self.state = LoopState::Terminated;
    }

    fn set_torque_all(&mut self, enable: bool) {
        let (value, label) = if enable { (TORQUE_ENABLE, "enable") } else { (TORQUE_DISABLE, "disable") };

        for actuator in &mut self.actuators {
            match self.client.write1(&mut self.port, actuator.id, ADDR_TORQUE_ENABLE, value) {
                Ok(status) if !status.error.is_none() => {
                    warn!("[ID:{}] torque {label}: {}", actuator.id, status.error);
                }
                Ok(_) => {
                    actuator.torque_enabled = enable;
                    if enable {
                        info!("Dynamixel#{} has been successfully connected", actuator.id.0);
                    }
                }
                Err(e) => warn!("[ID:{}] torque {label}: {e}", actuator.id),
            }
        }
    }
}
