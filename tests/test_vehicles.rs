use assert_approx_eq::assert_approx_eq;
use macros::integration_test;
use rust_car_sim::simulation::engine::Engine;
use rust_car_sim::simulation::events::VehicleEvent;
use rust_car_sim::simulation::vehicles::Vehicle;
use rust_car_sim::simulation::vehicles::attributes::{Color, FuelType, Transmission};
use rust_car_sim::simulation::vehicles::factory::CarFactory;
use rust_car_sim::simulation::vehicles::garage::Command;

fn camry() -> Vehicle {
    CarFactory::create_regular_car(
        "Toyota",
        "Camry",
        2023,
        Color::Blue,
        Engine::new("V6", 280., 6),
        4,
        Transmission::Automatic,
        FuelType::Gasoline,
        200.,
    )
}

fn ferrari(turbo_charged: bool) -> Vehicle {
    CarFactory::create_sports_car(
        "Ferrari",
        "F8 Tributo",
        2024,
        Color::Red,
        Engine::new("V8", 450., 8),
        2,
        Transmission::Automatic,
        FuelType::Gasoline,
        340.,
        turbo_charged,
    )
}

fn tesla() -> Vehicle {
    CarFactory::create_electric_car(
        "Tesla",
        "Model S",
        2024,
        Color::White,
        4,
        Transmission::Automatic,
        250.,
        100.,
        Some(150.),
    )
}

/// A fixed, messy sequence of commands that hits every guard at least once. Deltas include
/// negative and non-finite values.
fn command_sequence() -> Vec<Command> {
    use Command::*;
    let mut commands = vec![
        Accelerate(30.),
        Brake(10.),
        ActivateTurbo,
        Start,
        Accelerate(f64::NAN),
        Brake(-500.),
        Accelerate(-50.),
        Brake(f64::INFINITY),
        Charge(f64::NAN),
    ];
    for i in 0..60 {
        let delta = match i % 11 {
            5 => f64::NAN,
            7 => -(((i * 53) % 700) as f64),
            10 => f64::NEG_INFINITY,
            _ => ((i * 37) % 130) as f64,
        };
        commands.push(match i % 9 {
            0 | 1 | 2 => Accelerate(delta),
            3 => Brake(delta / 2.),
            4 => ActivateTurbo,
            5 => Accelerate(delta * 3.),
            6 => DeactivateTurbo,
            7 => Charge(delta / 10.),
            _ if i % 18 == 8 => Stop,
            _ => Start,
        });
    }
    commands
}

#[integration_test(rust_car_sim)]
fn car_speed_is_clamped() {
    let mut car = camry();
    car.start();
    car.accelerate(250.);
    assert_eq!(car.current_speed(), 200.);
    car.brake(250.);
    assert_eq!(car.current_speed(), 0.);
}

#[integration_test(rust_car_sim)]
fn sports_car_turbo() {
    let mut car = ferrari(true);
    car.start();
    assert_eq!(car.activate_turbo(), VehicleEvent::TurboActivated);
    car.accelerate(60.);
    assert_eq!(car.current_speed(), 90.);
    assert_approx_eq!(car.speed_ceiling(), 408.);

    car.accelerate(1000.);
    assert_approx_eq!(car.current_speed(), 408.);
    car.deactivate_turbo();
    assert_eq!(car.current_speed(), 340.);
}

#[integration_test(rust_car_sim)]
fn electric_car_battery() {
    let mut car = tesla();
    assert_eq!(car.charge_level(), Some(100.));
    car.start();
    car.accelerate(60.);
    assert_approx_eq!(car.charge_level().unwrap(), 99.9);

    car.battery_mut().unwrap().set_charge(10.);
    assert_eq!(
        car.charge(30.),
        VehicleEvent::Charged {
            minutes: 30.,
            charge: 85.
        }
    );
    car.charge(30.);
    assert_eq!(car.charge_level(), Some(100.));
    assert_eq!(car.charge(30.), VehicleEvent::FullyCharged);
}

#[integration_test(rust_car_sim)]
fn speed_stays_within_ceiling() {
    for mut vehicle in [camry(), ferrari(true), ferrari(false), tesla()] {
        for command in command_sequence() {
            command.apply(&mut vehicle);
            let speed = vehicle.current_speed();
            assert!(speed >= 0., "{command} left {} at {speed}", vehicle.name());
            assert!(
                speed <= vehicle.speed_ceiling() + 1e-9,
                "{command} left {} at {speed}",
                vehicle.name()
            );
        }
    }
}

#[integration_test(rust_car_sim)]
fn accelerate_when_stopped_changes_nothing() {
    for mut vehicle in [camry(), ferrari(true), tesla()] {
        let before = vehicle.clone();
        assert_eq!(vehicle.accelerate(50.), VehicleEvent::NotRunning);
        assert_eq!(vehicle, before);
    }
}

#[integration_test(rust_car_sim)]
fn charge_stays_within_bounds() {
    let mut car = tesla();
    car.start();
    for i in 0..2000 {
        if i % 500 == 499 {
            car.charge(((i % 7) * 5) as f64);
        } else if i % 300 == 150 {
            car.charge(f64::NAN);
            car.charge(-((i % 13) as f64) * 10.);
        } else {
            car.accelerate(1.);
        }
        let charge = car.charge_level().unwrap();
        assert!((0. ..=100.).contains(&charge));
    }
}

#[integration_test(rust_car_sim)]
fn low_battery_blocks_acceleration() {
    let mut car = tesla();
    car.start();
    car.battery_mut().unwrap().set_charge(5.);
    let before = car.clone();
    assert_eq!(car.accelerate(10.), VehicleEvent::LowBattery { charge: 5. });
    assert_eq!(car, before);
}

#[integration_test(rust_car_sim)]
fn depleted_battery_blocks_start() {
    let mut car = tesla();
    car.battery_mut().unwrap().set_charge(0.);
    assert_eq!(car.start(), VehicleEvent::BatteryDepleted);
    assert!(!car.is_running());
}

#[integration_test(rust_car_sim)]
fn turbo_only_with_hardware_while_running() {
    let mut car = ferrari(true);
    assert_eq!(car.activate_turbo(), VehicleEvent::NotRunning);
    assert!(!car.turbo_active());

    let mut car = ferrari(false);
    car.start();
    assert_eq!(car.activate_turbo(), VehicleEvent::NoTurbo);
    assert!(!car.turbo_active());

    for mut vehicle in [ferrari(true), ferrari(false)] {
        for command in command_sequence() {
            command.apply(&mut vehicle);
            if vehicle.turbo_active() {
                assert!(vehicle.turbo().unwrap().is_turbo_charged());
            }
        }
    }
}
