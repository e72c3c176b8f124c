use crate::simulation::units;
use crate::simulation::vehicles::VehicleId;
use crate::simulation::vehicles::factory::VehicleSpec;
use crate::simulation::vehicles::garage::Command;
use ahash::HashMap;
use clap::{Parser, ValueEnum};
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Macro to register an override handler for a specific config key
#[macro_export]
macro_rules! register_override {
    ($key:literal, $func:expr) => {
        inventory::submit! {
            $crate::simulation::config::OverrideHandler {
                key: $key,
                apply: $func,
            }
        }
    };
}

pub struct OverrideHandler {
    pub key: &'static str,
    pub apply: fn(config: &mut Config, value: &str) -> Result<(), String>,
}

// Collect all OverrideHandler submitted from anywhere in the crate
inventory::collect!(OverrideHandler);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidOverride {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// YAML config. The built-in demo fleet is used if omitted.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    #[arg(long = "set", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,
}

impl CommandLineArgs {
    pub fn new_with_path(path: impl Into<PathBuf>) -> Self {
        CommandLineArgs {
            config: Some(path.into()),
            overrides: Vec::new(),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("invalid KEY=VALUE: no `=` found in `{}`", s)),
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Config {
    modules: RefCell<HashMap<String, Box<dyn ConfigModule>>>,
    #[serde(skip)]
    context: Option<PathBuf>,
}

impl TryFrom<CommandLineArgs> for Config {
    type Error = ConfigError;

    fn try_from(args: CommandLineArgs) -> Result<Self, Self::Error> {
        let mut config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(&args.overrides)?;
        Ok(config)
    }
}

impl Config {
    pub fn from_file(config_path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(config_path).map_err(|source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?;
        config.context = Some(config_path.to_path_buf());
        Ok(config)
    }

    /// Apply generic key-value overrides to the config, e.g. output.output_dir=path
    pub fn apply_overrides(&mut self, overrides: &[(String, String)]) -> Result<(), ConfigError> {
        if !overrides.is_empty() {
            info!("Applying overrides: {:?}", overrides);
        }

        for (key, value) in overrides {
            let key_str = key.as_str();

            if let Some(handler) = inventory::iter::<OverrideHandler>().find(|h| h.key == key_str) {
                (handler.apply)(self, value).map_err(|reason| ConfigError::InvalidOverride {
                    key: key.clone(),
                    value: value.clone(),
                    reason,
                })?;
            } else {
                warn!("No override handler found for key: {}", key);
            }
        }
        Ok(())
    }

    /// The path the config was loaded from, if any.
    pub fn context(&self) -> &Option<PathBuf> {
        &self.context
    }

    pub fn fleet(&self) -> Option<Fleet> {
        self.module::<Fleet>("fleet")
    }

    pub fn set_fleet(&mut self, fleet: Fleet) {
        self.set_module("fleet", fleet);
    }

    pub fn script(&self) -> Option<Script> {
        self.module::<Script>("script")
    }

    pub fn set_script(&mut self, script: Script) {
        self.set_module("script", script);
    }

    pub fn output(&self) -> Output {
        if let Some(output) = self.module::<Output>("output") {
            output
        } else {
            let default = Output::default();
            self.modules
                .borrow_mut()
                .insert("output".to_string(), Box::new(default.clone()));
            default
        }
    }

    pub fn set_output(&mut self, output: Output) {
        self.set_module("output", output);
    }

    pub fn clock(&self) -> Clock {
        self.module::<Clock>("clock").unwrap_or_default()
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.set_module("clock", clock);
    }

    fn set_module<T: ConfigModule + 'static>(&mut self, key: &str, module: T) {
        self.modules
            .get_mut()
            .insert(key.to_string(), Box::new(module));
    }

    fn module<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.modules
            .borrow()
            .get(key)
            .and_then(|boxed| boxed.as_ref().as_any().downcast_ref::<T>().cloned())
    }
}

pub fn write_config(config: &Config, output_path: &Path) -> Result<(), ConfigError> {
    let output_config = output_path.join("output_config.yml");
    let file = File::create(&output_config).map_err(|source| ConfigError::Io {
        path: output_config.clone(),
        source,
    })?;
    let writer = BufWriter::new(file);
    serde_yaml::to_writer(writer, config)?;
    Ok(())
}

/// The vehicles to put into the garage, in order. The first vehicle gets id 0.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Fleet {
    pub vehicles: Vec<VehicleSpec>,
}

/// Commands to run against the fleet, in order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScriptStep {
    pub vehicle: VehicleId,
    pub command: Command,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Output {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub write_events: WriteEvents,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            output_dir: PathBuf::from("./output"),
            logging: Logging::None,
            write_events: WriteEvents::None,
        }
    }
}

register_override!("output.output_dir", |config, value| {
    let mut output = config.output();
    output.output_dir = PathBuf::from(value);
    config.set_output(output);
    Ok(())
});

register_override!("output.logging", |config, value| {
    let mut output = config.output();
    output.logging = Logging::from_str(value, true)?;
    config.set_output(output);
    Ok(())
});

register_override!("output.write_events", |config, value| {
    let mut output = config.output();
    output.write_events = WriteEvents::from_str(value, true)?;
    config.set_output(output);
    Ok(())
});

/// Pins the year used for age dependent calculations. The system clock is used if unset.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct Clock {
    #[serde(default)]
    pub current_year: Option<i32>,
}

impl Clock {
    pub fn year(&self) -> i32 {
        self.current_year.unwrap_or_else(units::current_year)
    }
}

register_override!("clock.current_year", |config, value| {
    let year = value.parse::<i32>().map_err(|e| format!("{e}"))?;
    config.set_clock(Clock {
        current_year: Some(year),
    });
    Ok(())
});

/// Have this extra layer of log level enum, as tracing subscriber has no
/// off/none option by default. At least it can't be parsed
#[derive(PartialEq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Logging {
    #[default]
    None,
    Info,
}

#[derive(PartialEq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteEvents {
    #[default]
    None,
    Json,
}

#[typetag::serde(tag = "type")]
pub trait ConfigModule: Debug + DynClone {
    fn as_any(&self) -> &dyn Any;
}

#[typetag::serde]
impl ConfigModule for Fleet {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Script {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Output {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Clock {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// This is needed to allow cloning of the trait object and thus cloning of the Config.
dyn_clone::clone_trait_object!(ConfigModule);
