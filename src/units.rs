//! Wavelength unit handling
//!
//! Every law works on wavelengths in angstrom. Callers either hand over
//! [`Length`] quantities, whose unit travels with the type, or bare numbers
//! together with the unit they are assumed to be in. The bare path logs an
//! advisory once per process so that silently mis-scaled inputs do not go
//! unnoticed.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use uom::si::f64::Length;
use uom::si::length::{angstrom, micrometer, nanometer};

static MISSING_UNIT_ADVISORY: Once = Once::new();

/// Length units accepted for bare wavelength values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavelengthUnit {
    /// 1e-10 m, the unit every law computes in.
    #[default]
    Angstrom,
    /// 1e-9 m
    Nanometer,
    /// 1e-6 m
    Micrometer,
}

impl WavelengthUnit {
    /// Short symbol used in messages and CSV headers.
    pub fn symbol(&self) -> &'static str {
        match self {
            WavelengthUnit::Angstrom => "angstrom",
            WavelengthUnit::Nanometer => "nm",
            WavelengthUnit::Micrometer => "um",
        }
    }
}

impl fmt::Display for WavelengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for WavelengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "angstrom" | "aa" | "a" => Ok(WavelengthUnit::Angstrom),
            "nanometer" | "nm" => Ok(WavelengthUnit::Nanometer),
            "micrometer" | "micron" | "um" => Ok(WavelengthUnit::Micrometer),
            other => Err(format!("unknown wavelength unit: {other}")),
        }
    }
}

/// Tags a raw value with a unit.
pub fn quantity(raw: f64, unit: WavelengthUnit) -> Length {
    match unit {
        WavelengthUnit::Angstrom => Length::new::<angstrom>(raw),
        WavelengthUnit::Nanometer => Length::new::<nanometer>(raw),
        WavelengthUnit::Micrometer => Length::new::<micrometer>(raw),
    }
}

/// Magnitude of a length in angstrom.
#[inline]
pub fn in_angstrom(l: Length) -> f64 {
    l.get::<angstrom>()
}

/// Converts typed wavelengths to angstrom values.
pub fn to_angstrom(lamb: &[Length]) -> Vec<f64> {
    lamb.iter().map(|l| in_angstrom(*l)).collect()
}

/// Interprets bare values as `unit` and returns them in angstrom.
///
/// Emits a `warn` record the first time it is called in the process.
pub fn assume_unit(varname: &str, raw: &[f64], unit: WavelengthUnit) -> Vec<f64> {
    MISSING_UNIT_ADVISORY.call_once(|| {
        tracing::warn!(
            "variable {} does not have explicit units, assuming `{}`",
            varname,
            unit
        );
    });
    match unit {
        WavelengthUnit::Angstrom => raw.to_vec(),
        _ => raw.iter().map(|v| in_angstrom(quantity(*v, unit))).collect(),
    }
}

/// Wavelengths in angstrom for wavenumbers x in inverse micrometers.
pub fn angstrom_from_wavenumber(x: &[f64]) -> Vec<f64> {
    x.iter().map(|x| 1.0e4 / x).collect()
}
