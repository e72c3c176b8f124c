use crate::simulation::events::{EventRecord, EventsManager, VehicleEvent};
use crate::simulation::vehicles::attributes::ParseAttributeError;
use crate::simulation::vehicles::{Vehicle, VehicleId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

/// A mutation a user can trigger on a vehicle, e.g. by pressing a button.
/// Serialized in its `name[:value]` form.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(into = "String", try_from = "String")]
pub enum Command {
    Start,
    Stop,
    Accelerate(f64),
    Brake(f64),
    Honk,
    ActivateTurbo,
    DeactivateTurbo,
    /// Minutes at the charger.
    Charge(f64),
}

impl Command {
    pub fn apply(self, vehicle: &mut Vehicle) -> VehicleEvent {
        match self {
            Command::Start => vehicle.start(),
            Command::Stop => vehicle.stop(),
            Command::Accelerate(delta) => vehicle.accelerate(delta),
            Command::Brake(delta) => vehicle.brake(delta),
            Command::Honk => vehicle.honk(),
            Command::ActivateTurbo => vehicle.activate_turbo(),
            Command::DeactivateTurbo => vehicle.deactivate_turbo(),
            Command::Charge(minutes) => vehicle.charge(minutes),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Start => write!(f, "start"),
            Command::Stop => write!(f, "stop"),
            Command::Accelerate(delta) => write!(f, "accelerate:{delta}"),
            Command::Brake(delta) => write!(f, "brake:{delta}"),
            Command::Honk => write!(f, "honk"),
            Command::ActivateTurbo => write!(f, "activate_turbo"),
            Command::DeactivateTurbo => write!(f, "deactivate_turbo"),
            Command::Charge(minutes) => write!(f, "charge:{minutes}"),
        }
    }
}

/// Parses the `name[:value]` form produced by [Display], e.g. `accelerate:50`.
impl FromStr for Command {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAttributeError {
            kind: "command",
            value: s.to_string(),
        };
        let (name, value) = match s.trim().split_once(':') {
            Some((name, value)) => (name, Some(value.trim().parse::<f64>().map_err(|_| err())?)),
            None => (s.trim(), None),
        };
        let command = match (name.to_lowercase().as_str(), value) {
            ("start", None) => Command::Start,
            ("stop", None) => Command::Stop,
            ("accelerate", Some(v)) => Command::Accelerate(v),
            ("brake", Some(v)) => Command::Brake(v),
            ("honk", None) => Command::Honk,
            ("activate_turbo", None) => Command::ActivateTurbo,
            ("deactivate_turbo", None) => Command::DeactivateTurbo,
            ("charge", Some(v)) => Command::Charge(v),
            _ => return Err(err()),
        };
        Ok(command)
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        command.to_string()
    }
}

impl TryFrom<String> for Command {
    type Error = ParseAttributeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Owns a fleet of vehicles and publishes the outcome of every command to its [EventsManager].
#[derive(Debug, Default)]
pub struct Garage {
    vehicles: Vec<Vehicle>,
    events: EventsManager,
    next_seq: u64,
}

impl Garage {
    pub fn new() -> Self {
        Garage {
            vehicles: Vec::new(),
            events: EventsManager::new(),
            next_seq: 0,
        }
    }

    pub fn add(&mut self, vehicle: Vehicle) -> VehicleId {
        let id = VehicleId(self.vehicles.len());
        debug!("Adding {} as vehicle {id}", vehicle.name());
        self.vehicles.push(vehicle);
        id
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleId, &Vehicle)> {
        self.vehicles
            .iter()
            .enumerate()
            .map(|(i, v)| (VehicleId(i), v))
    }

    pub fn events_mut(&mut self) -> &mut EventsManager {
        &mut self.events
    }

    /// Applies `command` to the vehicle with `id`. Returns `None` if there is no such vehicle.
    pub fn execute(&mut self, id: VehicleId, command: Command) -> Option<VehicleEvent> {
        let vehicle = self.vehicles.get_mut(id.0)?;
        let event = command.apply(vehicle);
        let record = EventRecord {
            seq: self.next_seq,
            vehicle: id,
            event,
        };
        self.next_seq += 1;
        self.events.publish_event(&record);
        Some(record.event)
    }

    /// Describes every vehicle through the capabilities all variants share.
    pub fn fleet_report(&self) -> Vec<String> {
        let mut lines = vec!["All cars information:".to_string()];
        for (id, vehicle) in self.iter() {
            lines.push(String::new());
            lines.push(format!("Car {}:", id.0 + 1));
            lines.push(format!("- {}", vehicle.describe()));
            lines.push(format!("- Max Speed: {} km/h", vehicle.max_speed()));
            lines.push(format!("- Fuel Type: {}", vehicle.fuel_type()));
            lines.push(format!("- Engine: {}", vehicle.engine().describe()));
        }
        lines
    }

    pub fn finish(&mut self) {
        self.events.finish();
    }
}
