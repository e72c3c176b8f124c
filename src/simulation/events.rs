use crate::simulation::vehicles::VehicleId;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;
use std::{fs, io};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Started { engine_type: String },
    AlreadyRunning,
    Stopped { engine_type: String },
    AlreadyStopped,
}

impl Display for EngineEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineEvent::Started { engine_type } => write!(f, "{engine_type} engine started!"),
            EngineEvent::AlreadyRunning => write!(f, "Engine is already running!"),
            EngineEvent::Stopped { engine_type } => write!(f, "{engine_type} engine stopped."),
            EngineEvent::AlreadyStopped => write!(f, "Engine is already stopped!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryStatus {
    pub charge: f64,
    pub range: u32,
}

/// Outcome of a vehicle operation. Operations never fail: a guarded operation whose precondition
/// does not hold leaves the vehicle untouched and reports one of the advisory variants instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VehicleEvent {
    Started {
        vehicle: String,
        electric: bool,
        engine: EngineEvent,
    },
    Stopped {
        vehicle: String,
        engine: EngineEvent,
    },
    Accelerated {
        speed: f64,
        turbo: bool,
        battery: Option<BatteryStatus>,
    },
    Braked {
        speed: f64,
    },
    Honked,
    TurboActivated,
    TurboDeactivated {
        speed: f64,
    },
    Charged {
        minutes: f64,
        charge: f64,
    },
    AlreadyRunning {
        vehicle: String,
    },
    AlreadyStopped {
        vehicle: String,
    },
    NotRunning,
    NoTurbo,
    TurboInactive,
    LowBattery {
        charge: f64,
    },
    BatteryDepleted,
    FullyCharged,
    Unsupported {
        command: String,
    },
    /// Speed deltas and charging minutes must be finite.
    InvalidAmount {
        amount: f64,
    },
}

impl VehicleEvent {
    pub fn type_(&self) -> &'static str {
        match self {
            VehicleEvent::Started { .. } => "started",
            VehicleEvent::Stopped { .. } => "stopped",
            VehicleEvent::Accelerated { .. } => "accelerated",
            VehicleEvent::Braked { .. } => "braked",
            VehicleEvent::Honked => "honked",
            VehicleEvent::TurboActivated => "turbo_activated",
            VehicleEvent::TurboDeactivated { .. } => "turbo_deactivated",
            VehicleEvent::Charged { .. } => "charged",
            VehicleEvent::AlreadyRunning { .. } => "already_running",
            VehicleEvent::AlreadyStopped { .. } => "already_stopped",
            VehicleEvent::NotRunning => "not_running",
            VehicleEvent::NoTurbo => "no_turbo",
            VehicleEvent::TurboInactive => "turbo_inactive",
            VehicleEvent::LowBattery { .. } => "low_battery",
            VehicleEvent::BatteryDepleted => "battery_depleted",
            VehicleEvent::FullyCharged => "fully_charged",
            VehicleEvent::Unsupported { .. } => "unsupported",
            VehicleEvent::InvalidAmount { .. } => "invalid_amount",
        }
    }

    /// True if the operation was refused and the vehicle state is unchanged.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            VehicleEvent::AlreadyRunning { .. }
                | VehicleEvent::AlreadyStopped { .. }
                | VehicleEvent::NotRunning
                | VehicleEvent::NoTurbo
                | VehicleEvent::TurboInactive
                | VehicleEvent::LowBattery { .. }
                | VehicleEvent::BatteryDepleted
                | VehicleEvent::FullyCharged
                | VehicleEvent::Unsupported { .. }
                | VehicleEvent::InvalidAmount { .. }
        )
    }

    pub(crate) fn traced(self) -> Self {
        if self.is_advisory() {
            warn!(event = self.type_(), "{self}");
        } else {
            info!(event = self.type_(), "{self}");
        }
        self
    }
}

impl Display for VehicleEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleEvent::Started {
                vehicle,
                electric: true,
                ..
            } => write!(f, "{vehicle} is now ready to drive!"),
            VehicleEvent::Started { vehicle, .. } => write!(f, "{vehicle} is now running!"),
            VehicleEvent::Stopped { vehicle, .. } => write!(f, "{vehicle} has stopped."),
            VehicleEvent::Accelerated {
                speed,
                turbo,
                battery,
            } => {
                let mode = if *turbo { " (TURBO MODE)" } else { "" };
                write!(f, "Accelerating{mode}... Current speed: {speed} km/h")?;
                if let Some(b) = battery {
                    write!(f, " | Battery: {:.1}% | Range: {} km", b.charge, b.range)?;
                }
                Ok(())
            }
            VehicleEvent::Braked { speed } => {
                write!(f, "Braking... Current speed: {speed} km/h")
            }
            VehicleEvent::Honked => write!(f, "Beep beep!"),
            VehicleEvent::TurboActivated => {
                write!(f, "TURBO ACTIVATED! Maximum performance mode enabled!")
            }
            VehicleEvent::TurboDeactivated { .. } => {
                write!(f, "Turbo deactivated. Back to normal mode.")
            }
            VehicleEvent::Charged { minutes, charge } => write!(
                f,
                "Charged for {minutes} minutes. Battery charge: {charge:.1}%"
            ),
            VehicleEvent::AlreadyRunning { vehicle } => {
                write!(f, "{vehicle} is already running!")
            }
            VehicleEvent::AlreadyStopped { vehicle } => {
                write!(f, "{vehicle} is already stopped!")
            }
            VehicleEvent::NotRunning => write!(f, "Please start the car first!"),
            VehicleEvent::NoTurbo => write!(f, "This car doesn't have turbo!"),
            VehicleEvent::TurboInactive => write!(f, "Turbo is not active."),
            VehicleEvent::LowBattery { .. } => {
                write!(f, "Low battery! Please charge the vehicle.")
            }
            VehicleEvent::BatteryDepleted => {
                write!(f, "Battery depleted! Cannot start the vehicle.")
            }
            VehicleEvent::FullyCharged => write!(f, "Battery is already fully charged!"),
            VehicleEvent::Unsupported { command } => {
                write!(f, "This vehicle does not support '{command}'.")
            }
            VehicleEvent::InvalidAmount { amount } => {
                write!(f, "'{amount}' is not a valid amount. Nothing changed.")
            }
        }
    }
}

/// A published event together with the vehicle it happened to. `seq` increases by one per
/// published event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub seq: u64,
    pub vehicle: VehicleId,
    #[serde(flatten)]
    pub event: VehicleEvent,
}

type OnEventFn = dyn Fn(&EventRecord) + 'static;

/// The EventsManager holds call-backs for event processing. Subscribers either listen to a single
/// event type (keyed by [VehicleEvent::type_]) or to every event.
#[derive(Default)]
pub struct EventsManager {
    per_type: HashMap<&'static str, Vec<Rc<OnEventFn>>>,
    catch_all: Vec<Box<OnEventFn>>,
    finish: Vec<Box<dyn Fn() + 'static>>,
}

impl Debug for EventsManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EventsManager {{ per_type: {:?}, catch_all: {:?}, finish: {:?} }}",
            self.per_type.len(),
            self.catch_all.len(),
            self.finish.len()
        )
    }
}

impl EventsManager {
    pub fn new() -> Self {
        EventsManager {
            per_type: HashMap::new(),
            catch_all: Vec::new(),
            finish: Vec::new(),
        }
    }

    pub fn publish_event(&mut self, record: &EventRecord) {
        if let Some(list) = self.per_type.get(record.event.type_()).cloned() {
            for h in list {
                h(record);
            }
        }
        for h in &self.catch_all {
            h(record);
        }
    }

    pub fn finish(&mut self) {
        for f in self.finish.iter_mut() {
            f()
        }
    }

    /// Registers a callback for one event type, e.g. `"accelerated"`.
    pub fn on<F>(&mut self, type_: &'static str, f: F)
    where
        F: Fn(&EventRecord) + 'static,
    {
        self.per_type.entry(type_).or_default().push(Rc::new(f));
    }

    pub fn on_any<F>(&mut self, f: F)
    where
        F: Fn(&EventRecord) + 'static,
    {
        self.catch_all.push(Box::new(f));
    }

    pub fn on_finish<F>(&mut self, f: F)
    where
        F: Fn() + 'static,
    {
        self.finish.push(Box::new(f));
    }
}

/// Writes every published event as one JSON object per line.
pub struct JsonEventsWriter {
    writer: Rc<RefCell<BufWriter<File>>>,
}

impl JsonEventsWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        info!("Writing events to {:?}", path);
        Ok(JsonEventsWriter {
            writer: Rc::new(RefCell::new(BufWriter::new(file))),
        })
    }

    pub fn register(self, events: &mut EventsManager) {
        let writer = self.writer.clone();
        events.on_any(move |record| {
            let mut w = writer.borrow_mut();
            let result = serde_json::to_writer(&mut *w, record)
                .map_err(io::Error::from)
                .and_then(|_| writeln!(w));
            if let Err(e) = result {
                warn!("Failed to write event {}: {}", record.seq, e);
            }
        });

        let writer = self.writer;
        events.on_finish(move || {
            if let Err(e) = writer.borrow_mut().flush() {
                warn!("Failed to flush events file: {}", e);
            }
        });
    }
}
