pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod logging;
pub mod units;
pub mod vehicles;
