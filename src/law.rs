//! Common interface of all extinction laws

use std::f64::consts::LN_10;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::error::{ExtinctionError, Result};
use crate::units::{self, WavelengthUnit};

/// Optical depth per magnitude of extinction: τ = 0.4·ln(10)·A.
pub const TAU_PER_MAG: f64 = 0.4 * LN_10;

/// What an evaluation returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// Extinction in magnitudes, A(λ) for the requested A(V).
    #[default]
    Alambda,
    /// Optical depth τ(λ).
    Tau,
}

/// Parameters of a single-law evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LawParams {
    /// Visual extinction A(V) in magnitudes
    pub av: f64,
    /// R(V); `None` selects the law's own default
    pub rv: Option<f64>,
    /// Magnitudes or optical depth
    pub output: Output,
}

impl Default for LawParams {
    fn default() -> Self {
        Self { av: 1.0, rv: None, output: Output::Alambda }
    }
}

impl LawParams {
    /// Default parameters with an explicit R(V).
    pub fn with_rv(rv: f64) -> Self { Self { rv: Some(rv), ..Self::default() } }
    /// Returns a copy with A(V) replaced.
    pub fn av(self, av: f64) -> Self { Self { av, ..self } }
    /// Returns a copy that evaluates optical depth.
    pub fn tau(self) -> Self { Self { output: Output::Tau, ..self } }
    /// Returns a copy with the given output mode.
    pub fn output(self, output: Output) -> Self { Self { output, ..self } }
}

/// An extinction curve evaluated on wavelengths.
///
/// Implementors provide [`function`](ExtinctionLaw::function) on angstrom
/// values; the unit-aware entry points are derived from it.
pub trait ExtinctionLaw: Send + Sync {
    /// Human-readable name of the law.
    fn name(&self) -> &str;

    /// R(V) carried by the law instance itself, if any.
    ///
    /// Mixtures use it to fill in component R(V) values that were not given.
    fn default_rv(&self) -> Option<f64> { None }

    /// Evaluates the law at wavelengths given in angstrom.
    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>>;

    /// Whether `params` lie in the validity domain of the law.
    fn is_valid(&self, _params: &LawParams) -> bool { true }

    /// Maps an [`Output::Alambda`] value to its [`Output::Tau`] counterpart.
    fn tau_from_alambda(&self, alambda: f64) -> f64 { TAU_PER_MAG * alambda }

    /// Evaluates the law on unit-carrying wavelengths.
    fn evaluate(&self, lamb: &[Length], params: &LawParams) -> Result<Vec<f64>> {
        self.function(&units::to_angstrom(lamb), params)
    }

    /// Evaluates the law on bare numbers assumed to be in angstrom.
    ///
    /// Logs a one-time advisory about the assumed unit.
    fn evaluate_raw(&self, lamb: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        self.evaluate_in(lamb, WavelengthUnit::Angstrom, params)
    }

    /// Evaluates the law on bare numbers assumed to be in `unit`.
    fn evaluate_in(
        &self,
        lamb: &[f64],
        unit: WavelengthUnit,
        params: &LawParams,
    ) -> Result<Vec<f64>> {
        self.function(&units::assume_unit("lamb", lamb, unit), params)
    }

    /// Evaluates the law at a single wavelength.
    fn evaluate_one(&self, lamb: Length, params: &LawParams) -> Result<f64> {
        let v = self.function(&[units::in_angstrom(lamb)], params)?;
        Ok(v[0])
    }
}

impl<L: ExtinctionLaw + ?Sized> ExtinctionLaw for Box<L> {
    fn name(&self) -> &str { (**self).name() }
    fn default_rv(&self) -> Option<f64> { (**self).default_rv() }
    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        (**self).function(lamb_aa, params)
    }
    fn is_valid(&self, params: &LawParams) -> bool { (**self).is_valid(params) }
    fn tau_from_alambda(&self, alambda: f64) -> f64 { (**self).tau_from_alambda(alambda) }
}

impl<L: ExtinctionLaw + ?Sized> ExtinctionLaw for Arc<L> {
    fn name(&self) -> &str { (**self).name() }
    fn default_rv(&self) -> Option<f64> { (**self).default_rv() }
    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        (**self).function(lamb_aa, params)
    }
    fn is_valid(&self, params: &LawParams) -> bool { (**self).is_valid(params) }
    fn tau_from_alambda(&self, alambda: f64) -> f64 { (**self).tau_from_alambda(alambda) }
}

/// Wavenumber in inverse micrometers for a wavelength in angstrom.
#[inline]
pub(crate) fn wavenumber(lamb_aa: f64) -> f64 { 1.0e4 / lamb_aa }

/// Picks `rv` or the fallback and checks it can be divided by.
pub(crate) fn resolve_rv(rv: Option<f64>, fallback: f64) -> Result<f64> {
    let rv = rv.unwrap_or(fallback);
    if !rv.is_finite() || rv <= 0.0 {
        return Err(ExtinctionError::InvalidParameter { name: "Rv", value: rv });
    }
    Ok(rv)
}

/// Rejects non-finite A(V) and non-physical wavelengths.
pub(crate) fn check_inputs(lamb_aa: &[f64], av: f64) -> Result<()> {
    if !av.is_finite() {
        return Err(ExtinctionError::InvalidParameter { name: "Av", value: av });
    }
    match lamb_aa.iter().find(|l| !l.is_finite() || **l <= 0.0) {
        Some(l) => Err(ExtinctionError::InvalidWavelength { value: *l }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tau_per_mag_is_inverse_of_1_086() {
        assert!((1.0 / TAU_PER_MAG - 1.0857362047581294).abs() < 1e-12);
    }

    #[test]
    fn rv_must_be_positive_and_finite() {
        assert_eq!(resolve_rv(None, 3.1), Ok(3.1));
        assert_eq!(resolve_rv(Some(2.0), 3.1), Ok(2.0));
        assert!(resolve_rv(Some(0.0), 3.1).is_err());
        assert!(resolve_rv(Some(f64::NAN), 3.1).is_err());
    }

    #[test]
    fn wavelengths_are_checked() {
        assert!(check_inputs(&[1000.0, 5500.0], 1.0).is_ok());
        assert_eq!(
            check_inputs(&[1000.0, -1.0], 1.0),
            Err(ExtinctionError::InvalidWavelength { value: -1.0 })
        );
        assert!(check_inputs(&[f64::INFINITY], 1.0).is_err());
        assert!(check_inputs(&[5500.0], f64::NAN).is_err());
    }

    #[test]
    fn shared_and_boxed_laws_delegate() {
        use crate::gordon::Gordon03SmcBar;

        let law = Gordon03SmcBar::with_rv(3.0);
        let shared: Arc<dyn ExtinctionLaw> = Arc::new(law);
        let boxed: Box<dyn ExtinctionLaw> = Box::new(law);
        let p = LawParams::default();
        let direct = law.function(&[1500.0, 5500.0], &p).unwrap();

        for wrapped in [&shared as &dyn ExtinctionLaw, &boxed as &dyn ExtinctionLaw] {
            assert_eq!(wrapped.name(), law.name());
            assert_eq!(wrapped.default_rv(), Some(3.0));
            assert_eq!(wrapped.function(&[1500.0, 5500.0], &p).unwrap(), direct);
            assert!(wrapped.is_valid(&p));
            assert_eq!(wrapped.tau_from_alambda(1.0), TAU_PER_MAG);
        }
    }
}
