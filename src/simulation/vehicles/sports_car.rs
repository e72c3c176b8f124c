use crate::simulation::events::VehicleEvent;

/// Acceleration deltas are multiplied by this while top speed mode is active.
pub const TURBO_MULTIPLIER: f64 = 1.5;
/// The speed ceiling is `max_speed * TURBO_CEILING_FACTOR` while top speed mode is active.
pub const TURBO_CEILING_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Turbo {
    turbo_charged: bool,
    top_speed_mode: bool,
}

impl Turbo {
    pub fn new(turbo_charged: bool) -> Self {
        Turbo {
            turbo_charged,
            top_speed_mode: false,
        }
    }

    pub fn is_turbo_charged(&self) -> bool {
        self.turbo_charged
    }

    pub fn is_active(&self) -> bool {
        self.top_speed_mode
    }

    pub(crate) fn activate(&mut self, running: bool) -> VehicleEvent {
        if !self.turbo_charged {
            VehicleEvent::NoTurbo
        } else if !running {
            VehicleEvent::NotRunning
        } else {
            self.top_speed_mode = true;
            VehicleEvent::TurboActivated
        }
    }

    /// Returns whether top speed mode was active before.
    pub(crate) fn deactivate(&mut self) -> bool {
        std::mem::replace(&mut self.top_speed_mode, false)
    }

    pub(crate) fn details(&self) -> Vec<String> {
        vec![
            format!(
                "Turbo Charged: {}",
                if self.turbo_charged { "Yes" } else { "No" }
            ),
            format!(
                "Turbo Mode: {}",
                if self.top_speed_mode {
                    "Active"
                } else {
                    "Inactive"
                }
            ),
        ]
    }
}
