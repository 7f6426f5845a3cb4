//! Length units and their scale to internal units.
//!
//! Stored lengths are always in feet. Display units only affect how bare
//! numbers typed by a user are interpreted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Feet per meter.
pub const FEET_PER_METER: f64 = 3.28083989501312;
/// Feet per centimeter.
pub const FEET_PER_CENTIMETER: f64 = 0.0328083989501312;
/// Feet per millimeter.
pub const FEET_PER_MILLIMETER: f64 = 0.00328083989501312;
/// Feet per inch.
pub const FEET_PER_INCH: f64 = 1.0 / 12.0;

/// A length unit understood by the expression evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Feet,
    Inches,
    Meters,
    Centimeters,
    Millimeters,
}

impl LengthUnit {
    /// Looks up a unit by its expression suffix (`m`, `cm`, `mm`, `ft`, `in`).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ft" => Some(LengthUnit::Feet),
            "in" => Some(LengthUnit::Inches),
            "m" => Some(LengthUnit::Meters),
            "cm" => Some(LengthUnit::Centimeters),
            "mm" => Some(LengthUnit::Millimeters),
            _ => None,
        }
    }

    /// Returns the expression suffix for this unit.
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Millimeters => "mm",
        }
    }

    /// Number of internal units (feet) in one of this unit.
    pub fn feet_per_unit(self) -> f64 {
        match self {
            LengthUnit::Feet => 1.0,
            LengthUnit::Inches => FEET_PER_INCH,
            LengthUnit::Meters => FEET_PER_METER,
            LengthUnit::Centimeters => FEET_PER_CENTIMETER,
            LengthUnit::Millimeters => FEET_PER_MILLIMETER,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}
