use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("'{value}' is not a valid {kind}")]
pub struct ParseAttributeError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
    White,
    Black,
    Silver,
    Green,
}

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    Manual,
    Automatic,
    Cvt,
}

impl Display for FuelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        };
        f.write_str(label)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::White => "White",
            Color::Black => "Black",
            Color::Silver => "Silver",
            Color::Green => "Green",
        };
        f.write_str(label)
    }
}

impl Display for Transmission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
            Transmission::Cvt => "CVT",
        };
        f.write_str(label)
    }
}

// All three enums parse case-insensitively from their display label.
fn parse_value_enum<T: ValueEnum>(s: &str, kind: &'static str) -> Result<T, ParseAttributeError> {
    T::from_str(s, true).map_err(|_| ParseAttributeError {
        kind,
        value: s.to_string(),
    })
}

impl FromStr for FuelType {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value_enum(s, "fuel type")
    }
}

impl FromStr for Color {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value_enum(s, "color")
    }
}

impl FromStr for Transmission {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value_enum(s, "transmission")
    }
}
