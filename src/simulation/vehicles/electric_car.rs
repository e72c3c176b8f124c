use crate::simulation::events::{BatteryStatus, VehicleEvent};

pub const FULL_CHARGE: f64 = 100.;
/// Acceleration is refused at or below this charge (percent).
pub const LOW_BATTERY_THRESHOLD: f64 = 5.;
/// Percentage points consumed by one acceleration.
pub const DRAIN_PER_ACCELERATION: f64 = 0.1;
pub const KM_PER_KWH: f64 = 4.;
/// kW
pub const DEFAULT_CHARGING_SPEED: f64 = 50.;

/// Battery of an electric car. `charge` is a percentage and stays within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Battery {
    /// kWh
    capacity: f64,
    charge: f64,
    /// kW
    charging_speed: f64,
}

impl Battery {
    pub fn new(capacity: f64, charging_speed: f64) -> Self {
        Battery {
            capacity,
            charge: FULL_CHARGE,
            charging_speed,
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn charging_speed(&self) -> f64 {
        self.charging_speed
    }

    pub fn is_depleted(&self) -> bool {
        self.charge <= 0.
    }

    pub fn is_low(&self) -> bool {
        self.charge <= LOW_BATTERY_THRESHOLD
    }

    /// Estimated range in km.
    pub fn range(&self) -> u32 {
        // negative or NaN values saturate to 0
        (self.capacity * self.charge / 100. * KM_PER_KWH).floor() as u32
    }

    pub fn status(&self) -> BatteryStatus {
        BatteryStatus {
            charge: self.charge,
            range: self.range(),
        }
    }

    pub(crate) fn drain(&mut self) {
        self.charge = (self.charge - DRAIN_PER_ACCELERATION).max(0.);
    }

    pub(crate) fn charge_for(&mut self, minutes: f64) -> VehicleEvent {
        if !minutes.is_finite() {
            return VehicleEvent::InvalidAmount { amount: minutes };
        }
        if self.charge >= FULL_CHARGE {
            return VehicleEvent::FullyCharged;
        }
        let added = (self.charging_speed / 60.) * minutes * (100. / self.capacity);
        // a zero capacity or charging speed yields NaN here
        if added.is_nan() {
            return VehicleEvent::InvalidAmount { amount: minutes };
        }
        self.charge = (self.charge + added).min(FULL_CHARGE).max(0.);
        VehicleEvent::Charged {
            minutes,
            charge: self.charge,
        }
    }

    #[cfg(any(test, feature = "test_util"))]
    pub fn set_charge(&mut self, charge: f64) {
        self.charge = charge.min(FULL_CHARGE).max(0.);
    }

    pub(crate) fn details(&self) -> Vec<String> {
        vec![
            format!("Battery Capacity: {} kWh", self.capacity),
            format!("Current Charge: {:.1}%", self.charge),
            format!("Estimated Range: {} km", self.range()),
            format!("Charging Speed: {} kW", self.charging_speed),
        ]
    }
}
