use crate::simulation::engine::Engine;
use crate::simulation::vehicles::attributes::{Color, FuelType, Transmission};
use crate::simulation::vehicles::electric_car::{Battery, DEFAULT_CHARGING_SPEED};
use crate::simulation::vehicles::sports_car::Turbo;
use crate::simulation::vehicles::{Vehicle, VehicleKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Constructs fully initialized vehicles from primitive parameters. Parameters are not validated;
/// suspicious values are only logged.
pub struct CarFactory;

impl CarFactory {
    #[allow(clippy::too_many_arguments)]
    pub fn create_regular_car(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        color: Color,
        engine: Engine,
        doors: u32,
        transmission: Transmission,
        fuel_type: FuelType,
        max_speed: f64,
    ) -> Vehicle {
        CarSpec {
            make: make.into(),
            model: model.into(),
            year,
            color,
            engine,
            doors,
            transmission,
            fuel_type,
            max_speed,
        }
        .build(VehicleKind::Car)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_sports_car(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        color: Color,
        engine: Engine,
        doors: u32,
        transmission: Transmission,
        fuel_type: FuelType,
        max_speed: f64,
        turbo_charged: bool,
    ) -> Vehicle {
        SportsCarSpec {
            car: CarSpec {
                make: make.into(),
                model: model.into(),
                year,
                color,
                engine,
                doors,
                transmission,
                fuel_type,
                max_speed,
            },
            turbo_charged,
        }
        .build()
    }

    /// Electric cars always run on [FuelType::Electric] with a 300 HP electric motor. The charging
    /// speed defaults to 50 kW.
    #[allow(clippy::too_many_arguments)]
    pub fn create_electric_car(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        color: Color,
        doors: u32,
        transmission: Transmission,
        max_speed: f64,
        battery_capacity: f64,
        charging_speed: Option<f64>,
    ) -> Vehicle {
        ElectricCarSpec {
            make: make.into(),
            model: model.into(),
            year,
            color,
            doors,
            transmission,
            max_speed,
            battery_capacity,
            charging_speed: charging_speed.unwrap_or(DEFAULT_CHARGING_SPEED),
        }
        .build()
    }
}

/// Serializable description of a vehicle, as found in the fleet module of the config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VehicleSpec {
    Car(CarSpec),
    SportsCar(SportsCarSpec),
    ElectricCar(ElectricCarSpec),
}

impl VehicleSpec {
    pub fn build(self) -> Vehicle {
        match self {
            VehicleSpec::Car(spec) => spec.build(VehicleKind::Car),
            VehicleSpec::SportsCar(spec) => spec.build(),
            VehicleSpec::ElectricCar(spec) => spec.build(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarSpec {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Color,
    pub engine: Engine,
    pub doors: u32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub max_speed: f64,
}

impl CarSpec {
    fn build(self, kind: VehicleKind) -> Vehicle {
        warn_if_not_positive("max_speed", self.max_speed, &self.make, &self.model);
        Vehicle::new(
            self.make,
            self.model,
            self.year,
            self.color,
            self.engine,
            self.doors,
            self.transmission,
            self.fuel_type,
            self.max_speed,
            kind,
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SportsCarSpec {
    #[serde(flatten)]
    pub car: CarSpec,
    #[serde(default)]
    pub turbo_charged: bool,
}

impl SportsCarSpec {
    fn build(self) -> Vehicle {
        self.car
            .build(VehicleKind::SportsCar(Turbo::new(self.turbo_charged)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElectricCarSpec {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Color,
    pub doors: u32,
    pub transmission: Transmission,
    pub max_speed: f64,
    pub battery_capacity: f64,
    #[serde(default = "default_charging_speed")]
    pub charging_speed: f64,
}

fn default_charging_speed() -> f64 {
    DEFAULT_CHARGING_SPEED
}

impl ElectricCarSpec {
    fn build(self) -> Vehicle {
        warn_if_not_positive(
            "battery_capacity",
            self.battery_capacity,
            &self.make,
            &self.model,
        );
        let battery = Battery::new(self.battery_capacity, self.charging_speed);
        CarSpec {
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            engine: Engine::electric_motor(),
            doors: self.doors,
            transmission: self.transmission,
            fuel_type: FuelType::Electric,
            max_speed: self.max_speed,
        }
        .build(VehicleKind::ElectricCar(battery))
    }
}

fn warn_if_not_positive(field: &str, value: f64, make: &str, model: &str) {
    if value.is_nan() || value <= 0. {
        warn!("{make} {model} is built with non-positive {field} {value}.");
    }
}
