use crate::simulation::config::{
    Config, ConfigError, Fleet, Script, ScriptStep, WriteEvents, write_config,
};
use crate::simulation::engine::Engine;
use crate::simulation::events::{EventsManager, JsonEventsWriter, VehicleEvent};
use crate::simulation::logging;
use crate::simulation::units;
use crate::simulation::vehicles::VehicleId;
use crate::simulation::vehicles::attributes::{Color, FuelType, Transmission};
use crate::simulation::vehicles::factory::{
    CarSpec, ElectricCarSpec, SportsCarSpec, VehicleSpec,
};
use crate::simulation::vehicles::garage::{Command, Garage};
use derive_builder::Builder;
use derive_more::Debug;
use itertools::Itertools;
use std::fs;
use thiserror::Error;
use tracing::{info, warn};

pub const EVENTS_FILE_NAME: &str = "events.jsonl";

pub type OnEventFnBuilder = dyn FnOnce(&mut EventsManager);

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to prepare output: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is required")]
    MissingConfig,
}

/// What a run produced, in the order it was produced.
#[derive(Debug, Default, PartialEq)]
pub struct DemoReport {
    pub details: Vec<String>,
    pub events: Vec<(VehicleId, VehicleEvent)>,
    pub utilities: Vec<String>,
    pub fleet: Vec<String>,
}

/// Drives a garage through a script. This is the only place where the demo talks to the vehicles;
/// it does so exclusively through [Garage::execute] and the vehicle queries.
#[derive(Debug, Builder)]
#[builder(pattern = "owned", build_fn(skip))]
pub struct Controller {
    config: Config,
    #[builder(default)]
    #[debug(skip)]
    events_subscribers: Vec<Box<OnEventFnBuilder>>,
    garage: Garage,
}

impl ControllerBuilder {
    pub fn add_events_subscriber(mut self, subscriber: Box<OnEventFnBuilder>) -> Self {
        self.events_subscribers
            .get_or_insert_with(Vec::new)
            .push(subscriber);
        self
    }

    // Implementing a custom build function in order to fill the garage from the config if no
    // garage is provided.
    pub fn build(self) -> Result<Controller, ControllerError> {
        let config = self.config.ok_or(ControllerError::MissingConfig)?;

        let mut garage = self.garage.unwrap_or_else(|| {
            let mut garage = Garage::new();
            for spec in config.fleet().unwrap_or_else(default_fleet).vehicles {
                garage.add(spec.build());
            }
            garage
        });

        if config.output().write_events == WriteEvents::Json {
            let path = config.output().output_dir.join(EVENTS_FILE_NAME);
            JsonEventsWriter::new(&path)?.register(garage.events_mut());
        }

        Ok(Controller {
            config,
            events_subscribers: self.events_subscribers.unwrap_or_default(),
            garage,
        })
    }
}

impl Controller {
    pub fn garage(&self) -> &Garage {
        &self.garage
    }

    pub fn run(mut self) -> DemoReport {
        for subscriber in std::mem::take(&mut self.events_subscribers) {
            subscriber(self.garage.events_mut());
        }
        let mut report = DemoReport::default();

        info!("=========== Fleet ===========");
        for (_, vehicle) in self.garage.iter() {
            let details = vehicle.details();
            info!("{details}");
            report.details.push(details);
        }

        info!("=========== Script ===========");
        let script = self.config.script().unwrap_or_else(default_script);
        for ScriptStep { vehicle, command } in script.steps {
            match self.garage.execute(vehicle, command) {
                Some(event) => report.events.push((vehicle, event)),
                None => warn!("No vehicle with id {vehicle}. Skipping '{command}'."),
            }
        }

        info!("=========== Utilities ===========");
        report.utilities = utility_report(&self.garage, self.config.clock().year());
        for line in &report.utilities {
            info!("{line}");
        }

        info!("=========== Polymorphism ===========");
        report.fleet = self.garage.fleet_report();
        for line in &report.fleet {
            info!("{line}");
        }

        self.garage.finish();
        report
    }
}

/// Prepares the output directory and logging, then runs the demo described by `config`.
pub fn run(config: Config) -> Result<DemoReport, ControllerError> {
    let output_path = config.output().output_dir;
    fs::create_dir_all(&output_path)?;
    let _guards = logging::init_logging(&config);

    info!("Writing config to {:?}", output_path);
    write_config(&config, &output_path)?;

    let controller = ControllerBuilder::default().config(config).build()?;
    let report = controller.run();
    info!("Demo finished.");
    Ok(report)
}

/// Age, vintage status and depreciation of every vehicle, followed by a few unit conversions.
pub fn utility_report(garage: &Garage, current_year: i32) -> Vec<String> {
    let mut lines = Vec::new();
    for (_, vehicle) in garage.iter() {
        let name = vehicle.name();
        lines.push(format!(
            "{name} age: {}",
            units::format_age_at(vehicle.year, current_year)
        ));
        lines.push(format!(
            "{name} is vintage: {}",
            units::is_vintage_at(vehicle.year, current_year)
        ));
        lines.push(format!(
            "{name} depreciation from $100,000: ${}",
            units::depreciated_value_at(
                100_000.,
                vehicle.year,
                units::DEFAULT_DEPRECIATION_RATE,
                current_year
            )
        ));
    }
    lines.push(format!(
        "Convert 60 mph to km/h: {} km/h",
        units::mph_to_kmh(60.)
    ));
    lines.push(format!(
        "Convert 100 km to miles: {} miles",
        units::km_to_miles(100.)
    ));
    lines.push(format!(
        "Fuel efficiency (500 km / 40L): {} km/L",
        units::fuel_efficiency(500., 40.)
    ));
    lines
}

pub fn default_fleet() -> Fleet {
    Fleet {
        vehicles: vec![
            VehicleSpec::Car(CarSpec {
                make: "Toyota".to_string(),
                model: "Camry".to_string(),
                year: 2023,
                color: Color::Blue,
                engine: Engine::new("V6", 280., 6),
                doors: 4,
                transmission: Transmission::Automatic,
                fuel_type: FuelType::Gasoline,
                max_speed: 200.,
            }),
            VehicleSpec::SportsCar(SportsCarSpec {
                car: CarSpec {
                    make: "Ferrari".to_string(),
                    model: "F8 Tributo".to_string(),
                    year: 2024,
                    color: Color::Red,
                    engine: Engine::new("V8", 450., 8),
                    doors: 2,
                    transmission: Transmission::Automatic,
                    fuel_type: FuelType::Gasoline,
                    max_speed: 340.,
                },
                turbo_charged: true,
            }),
            VehicleSpec::ElectricCar(ElectricCarSpec {
                make: "Tesla".to_string(),
                model: "Model S".to_string(),
                year: 2024,
                color: Color::White,
                doors: 4,
                transmission: Transmission::Automatic,
                max_speed: 250.,
                battery_capacity: 100.,
                charging_speed: 150.,
            }),
        ],
    }
}

/// Drives each car of the default fleet once around the block.
pub fn default_script() -> Script {
    use Command::*;

    let regular = [Start, Accelerate(50.), Honk, Brake(20.), Stop];
    let sports = [
        Start,
        Accelerate(80.),
        ActivateTurbo,
        Accelerate(60.),
        Honk,
        DeactivateTurbo,
        Brake(50.),
        Stop,
    ];
    let electric = [
        Start,
        Accelerate(60.),
        Accelerate(40.),
        Brake(30.),
        Charge(30.),
        Stop,
    ];

    let steps = [regular.as_slice(), sports.as_slice(), electric.as_slice()]
        .into_iter()
        .enumerate()
        .flat_map(|(i, commands)| {
            commands.iter().map(move |&command| ScriptStep {
                vehicle: VehicleId(i),
                command,
            })
        })
        .collect_vec();
    Script { steps }
}
