use crate::simulation::events::EngineEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Combustion engine or electric motor owned by exactly one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub engine_type: String,
    pub horsepower: f64,
    pub cylinders: u32,
    #[serde(skip)]
    running: bool,
}

impl Engine {
    pub const ELECTRIC_MOTOR: &'static str = "Electric Motor";

    pub fn new(engine_type: impl Into<String>, horsepower: f64, cylinders: u32) -> Self {
        Engine {
            engine_type: engine_type.into(),
            horsepower,
            cylinders,
            running: false,
        }
    }

    /// The synthetic motor every electric car is built with.
    pub fn electric_motor() -> Self {
        Engine::new(Self::ELECTRIC_MOTOR, 300., 0)
    }

    pub fn start(&mut self) -> EngineEvent {
        if self.running {
            warn!("Engine is already running!");
            return EngineEvent::AlreadyRunning;
        }
        self.running = true;
        info!("{} engine started!", self.engine_type);
        EngineEvent::Started {
            engine_type: self.engine_type.clone(),
        }
    }

    pub fn stop(&mut self) -> EngineEvent {
        if !self.running {
            warn!("Engine is already stopped!");
            return EngineEvent::AlreadyStopped;
        }
        self.running = false;
        info!("{} engine stopped.", self.engine_type);
        EngineEvent::Stopped {
            engine_type: self.engine_type.clone(),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} Engine: {}HP, {} cylinders",
            self.engine_type, self.horsepower, self.cylinders
        )
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::engine::Engine;
    use crate::simulation::events::EngineEvent;

    #[test]
    fn start_and_stop() {
        let mut engine = Engine::new("V6", 280., 6);
        assert!(!engine.is_running());

        let event = engine.start();
        assert_eq!(
            event,
            EngineEvent::Started {
                engine_type: "V6".to_string()
            }
        );
        assert!(engine.is_running());

        let event = engine.stop();
        assert_eq!(
            event,
            EngineEvent::Stopped {
                engine_type: "V6".to_string()
            }
        );
        assert!(!engine.is_running());
    }

    #[test]
    fn start_twice_is_noop() {
        let mut engine = Engine::new("V8", 450., 8);
        engine.start();
        assert_eq!(engine.start(), EngineEvent::AlreadyRunning);
        assert!(engine.is_running());
    }

    #[test]
    fn stop_when_stopped_is_noop() {
        let mut engine = Engine::new("V8", 450., 8);
        assert_eq!(engine.stop(), EngineEvent::AlreadyStopped);
        assert!(!engine.is_running());
    }

    #[test]
    fn describe() {
        let engine = Engine::new("Turbocharged I4", 350., 4);
        assert_eq!(
            engine.describe(),
            "Turbocharged I4 Engine: 350HP, 4 cylinders"
        );
    }

    #[test]
    fn electric_motor() {
        let motor = Engine::electric_motor();
        assert_eq!(motor.describe(), "Electric Motor Engine: 300HP, 0 cylinders");
    }
}
