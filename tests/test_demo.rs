use macros::integration_test;
use rust_car_sim::simulation::config::{CommandLineArgs, Config, Logging, WriteEvents};
use rust_car_sim::simulation::controller;
use rust_car_sim::simulation::controller::EVENTS_FILE_NAME;
use rust_car_sim::simulation::events::{BatteryStatus, VehicleEvent};
use rust_car_sim::simulation::logging::LOG_FILE_NAME;
use rust_car_sim::simulation::vehicles::VehicleId;
use std::fs;
use std::path::Path;

const CONFIG: &str = "tests/resources/demo/config.yml";

fn config_with_output(output_dir: &Path) -> Config {
    let mut args = CommandLineArgs::new_with_path(CONFIG);
    args.overrides.push((
        "output.output_dir".to_string(),
        output_dir.to_string_lossy().to_string(),
    ));
    Config::try_from(args).unwrap()
}

#[integration_test(rust_car_sim)]
fn parse_demo_config() {
    let config = Config::from_file(Path::new(CONFIG)).unwrap();

    let fleet = config.fleet().unwrap();
    assert_eq!(fleet.vehicles.len(), 3);
    assert_eq!(config.script().unwrap().steps.len(), 14);
    assert_eq!(config.clock().year(), 2024);

    let output = config.output();
    assert_eq!(output.logging, Logging::Info);
    assert_eq!(output.write_events, WriteEvents::Json);
}

#[integration_test(rust_car_sim)]
fn run_demo_config() {
    let dir = tempfile::tempdir().unwrap();
    let report = controller::run(config_with_output(dir.path())).unwrap();

    // the step for vehicle 5 is skipped
    assert_eq!(report.events.len(), 13);
    assert_eq!(
        report.events[1],
        (
            VehicleId(0),
            VehicleEvent::Accelerated {
                speed: 180.,
                turbo: false,
                battery: None
            }
        )
    );
    assert_eq!(report.events[3], (VehicleId(1), VehicleEvent::NotRunning));
    assert_eq!(
        report.events[7],
        (VehicleId(1), VehicleEvent::TurboDeactivated { speed: 150. })
    );
    assert_eq!(report.events[8], (VehicleId(2), VehicleEvent::FullyCharged));
    assert_eq!(
        report.events[10],
        (
            VehicleId(2),
            VehicleEvent::Accelerated {
                speed: 30.,
                turbo: false,
                battery: Some(BatteryStatus {
                    charge: 99.9,
                    range: 159
                })
            }
        )
    );
    assert!(matches!(
        report.events[12],
        (VehicleId(0), VehicleEvent::AlreadyStopped { .. })
    ));

    assert_eq!(report.utilities[0], "Volkswagen Golf age: 26 years old");
    assert_eq!(report.utilities[1], "Volkswagen Golf is vintage: true");
    assert_eq!(
        report.utilities[2],
        "Volkswagen Golf depreciation from $100,000: $10000"
    );
    assert_eq!(report.fleet[5], "- Fuel Type: Diesel");
}

#[integration_test(rust_car_sim)]
fn run_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    controller::run(config_with_output(dir.path())).unwrap();

    let events = fs::read_to_string(dir.path().join(EVENTS_FILE_NAME)).unwrap();
    let lines: Vec<serde_json::Value> = events
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0]["seq"], 0);
    assert_eq!(lines[0]["vehicle"], 0);
    assert_eq!(lines[0]["type"], "started");
    assert_eq!(lines[6]["type"], "accelerated");
    assert_eq!(lines[6]["turbo"], true);
    assert_eq!(lines[12]["seq"], 12);

    assert!(dir.path().join(LOG_FILE_NAME).exists());

    // the written config can be used to run again
    let written = Config::from_file(&dir.path().join("output_config.yml")).unwrap();
    assert_eq!(written.script(), Config::from_file(Path::new(CONFIG)).unwrap().script());
    assert_eq!(written.fleet().unwrap().vehicles.len(), 3);
}

#[integration_test(rust_car_sim)]
fn run_without_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config
        .apply_overrides(&[
            (
                "output.output_dir".to_string(),
                dir.path().to_string_lossy().to_string(),
            ),
            ("clock.current_year".to_string(), "2024".to_string()),
        ])
        .unwrap();

    let report = controller::run(config).unwrap();
    assert_eq!(report.events.len(), 19);
    assert!(report.events.iter().all(|(_, e)| !e.is_advisory()));
    assert!(!dir.path().join(EVENTS_FILE_NAME).exists());
    assert!(dir.path().join("output_config.yml").exists());
}
