use crate::simulation::engine::Engine;
use crate::simulation::events::VehicleEvent;
use crate::simulation::vehicles::attributes::{Color, FuelType, Transmission};
use crate::simulation::vehicles::electric_car::Battery;
use crate::simulation::vehicles::sports_car::{TURBO_CEILING_FACTOR, TURBO_MULTIPLIER, Turbo};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod attributes;
pub mod electric_car;
pub mod factory;
pub mod garage;
pub mod sports_car;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub usize);

impl Display for VehicleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variant specific state. Everything the variants share lives in [Vehicle].
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleKind {
    Car,
    SportsCar(Turbo),
    ElectricCar(Battery),
}

impl VehicleKind {
    pub fn name(&self) -> &'static str {
        match self {
            VehicleKind::Car => "Car",
            VehicleKind::SportsCar(_) => "SportsCar",
            VehicleKind::ElectricCar(_) => "ElectricCar",
        }
    }
}

/// Multiplier and ceiling applied when accelerating.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpeedPolicy {
    multiplier: f64,
    ceiling: f64,
}

impl SpeedPolicy {
    fn accelerate(&self, current: f64, delta: f64) -> f64 {
        self.bound(current + delta * self.multiplier)
    }

    fn brake(&self, current: f64, delta: f64) -> f64 {
        self.bound(current - delta)
    }

    // Not `f64::clamp`: the ceiling comes from an unchecked max speed and may be negative or NaN.
    fn bound(&self, speed: f64) -> f64 {
        speed.min(self.ceiling).max(0.)
    }
}

/// A car of any variant. Owns its engine exclusively; `running` implies `engine.is_running()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Color,
    pub doors: u32,
    pub transmission: Transmission,
    engine: Engine,
    running: bool,
    fuel_type: FuelType,
    max_speed: f64,
    current_speed: f64,
    kind: VehicleKind,
}

impl Vehicle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        make: String,
        model: String,
        year: i32,
        color: Color,
        engine: Engine,
        doors: u32,
        transmission: Transmission,
        fuel_type: FuelType,
        max_speed: f64,
        kind: VehicleKind,
    ) -> Self {
        Vehicle {
            make,
            model,
            year,
            color,
            doors,
            transmission,
            engine,
            running: false,
            fuel_type,
            max_speed,
            current_speed: 0.,
            kind,
        }
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    pub fn start(&mut self) -> VehicleEvent {
        if let VehicleKind::ElectricCar(battery) = &self.kind {
            if battery.is_depleted() {
                return VehicleEvent::BatteryDepleted.traced();
            }
        }
        if self.running {
            return VehicleEvent::AlreadyRunning { vehicle: self.name() }.traced();
        }
        let engine = self.engine.start();
        self.running = true;
        VehicleEvent::Started {
            vehicle: self.name(),
            electric: matches!(self.kind, VehicleKind::ElectricCar(_)),
            engine,
        }
        .traced()
    }

    pub fn stop(&mut self) -> VehicleEvent {
        if !self.running {
            return VehicleEvent::AlreadyStopped { vehicle: self.name() }.traced();
        }
        let engine = self.engine.stop();
        self.running = false;
        VehicleEvent::Stopped {
            vehicle: self.name(),
            engine,
        }
        .traced()
    }

    pub fn accelerate(&mut self, delta: f64) -> VehicleEvent {
        if !delta.is_finite() {
            return invalid_amount(delta);
        }
        if !self.running {
            return VehicleEvent::NotRunning.traced();
        }
        if let VehicleKind::ElectricCar(battery) = &mut self.kind {
            if battery.is_low() {
                return VehicleEvent::LowBattery {
                    charge: battery.charge(),
                }
                .traced();
            }
            battery.drain();
        }

        self.current_speed = self.speed_policy().accelerate(self.current_speed, delta);

        VehicleEvent::Accelerated {
            speed: self.current_speed,
            turbo: self.turbo_active(),
            battery: self.battery().map(Battery::status),
        }
        .traced()
    }

    /// Braking is allowed whether or not the vehicle is running.
    pub fn brake(&mut self, delta: f64) -> VehicleEvent {
        if !delta.is_finite() {
            return invalid_amount(delta);
        }
        self.current_speed = self.speed_policy().brake(self.current_speed, delta);
        VehicleEvent::Braked {
            speed: self.current_speed,
        }
        .traced()
    }

    pub fn honk(&self) -> VehicleEvent {
        VehicleEvent::Honked.traced()
    }

    pub fn activate_turbo(&mut self) -> VehicleEvent {
        let running = self.running;
        match &mut self.kind {
            VehicleKind::SportsCar(turbo) => turbo.activate(running).traced(),
            _ => unsupported("activate_turbo"),
        }
    }

    /// Leaving top speed mode brings the speed back under the regular ceiling.
    pub fn deactivate_turbo(&mut self) -> VehicleEvent {
        let was_active = match &mut self.kind {
            VehicleKind::SportsCar(turbo) => turbo.deactivate(),
            _ => return unsupported("deactivate_turbo"),
        };
        if !was_active {
            return VehicleEvent::TurboInactive.traced();
        }
        self.current_speed = self.current_speed.min(self.max_speed);
        VehicleEvent::TurboDeactivated {
            speed: self.current_speed,
        }
        .traced()
    }

    pub fn charge(&mut self, minutes: f64) -> VehicleEvent {
        match &mut self.kind {
            VehicleKind::ElectricCar(battery) => battery.charge_for(minutes).traced(),
            _ => unsupported("charge"),
        }
    }

    pub fn describe(&self) -> String {
        format!("{} {} {} {}", self.year, self.color, self.make, self.model)
    }

    pub fn details(&self) -> String {
        let engine = match &self.kind {
            VehicleKind::ElectricCar(_) => {
                format!("Electric Motor: {}HP equivalent", self.engine.horsepower)
            }
            _ => self.engine.describe(),
        };
        let mut lines = vec![
            self.describe(),
            format!("Engine: {engine}"),
            format!("Doors: {}", self.doors),
            format!("Transmission: {}", self.transmission),
            format!("Fuel Type: {}", self.fuel_type),
            format!("Max Speed: {} km/h", self.max_speed),
            format!("Current Speed: {} km/h", self.current_speed),
        ];
        match &self.kind {
            VehicleKind::Car => {}
            VehicleKind::SportsCar(turbo) => lines.extend(turbo.details()),
            VehicleKind::ElectricCar(battery) => lines.extend(battery.details()),
        }
        lines.join("\n    ")
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// The highest speed reachable in the current mode.
    pub fn speed_ceiling(&self) -> f64 {
        self.speed_policy().ceiling
    }

    pub fn fuel_type(&self) -> FuelType {
        self.fuel_type
    }

    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn kind(&self) -> &VehicleKind {
        &self.kind
    }

    pub fn turbo(&self) -> Option<&Turbo> {
        match &self.kind {
            VehicleKind::SportsCar(turbo) => Some(turbo),
            _ => None,
        }
    }

    pub fn turbo_active(&self) -> bool {
        self.turbo().is_some_and(Turbo::is_active)
    }

    pub fn battery(&self) -> Option<&Battery> {
        match &self.kind {
            VehicleKind::ElectricCar(battery) => Some(battery),
            _ => None,
        }
    }

    /// Battery charge in percent, if this is an electric car.
    pub fn charge_level(&self) -> Option<f64> {
        self.battery().map(Battery::charge)
    }

    /// Estimated range in km, if this is an electric car.
    pub fn range(&self) -> Option<u32> {
        self.battery().map(Battery::range)
    }

    #[cfg(any(test, feature = "test_util"))]
    pub fn battery_mut(&mut self) -> Option<&mut Battery> {
        match &mut self.kind {
            VehicleKind::ElectricCar(battery) => Some(battery),
            _ => None,
        }
    }

    fn speed_policy(&self) -> SpeedPolicy {
        if self.turbo_active() {
            SpeedPolicy {
                multiplier: TURBO_MULTIPLIER,
                ceiling: self.max_speed * TURBO_CEILING_FACTOR,
            }
        } else {
            SpeedPolicy {
                multiplier: 1.,
                ceiling: self.max_speed,
            }
        }
    }
}

fn invalid_amount(amount: f64) -> VehicleEvent {
    VehicleEvent::InvalidAmount { amount }.traced()
}

fn unsupported(command: &str) -> VehicleEvent {
    VehicleEvent::Unsupported {
        command: command.to_string(),
    }
    .traced()
}
