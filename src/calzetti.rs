//! Calzetti et al. (2000, ApJ 533, 682) starburst attenuation

use serde::{Deserialize, Serialize};

use crate::error::{ExtinctionError, Result};
use crate::law::{check_inputs, resolve_rv, ExtinctionLaw, LawParams, Output};

/// Attenuation recipe for galaxies whose light is dominated by massive stars.
///
/// Strictly valid from 0.12 to 2.2 μm and extrapolated down to 0.0912 μm.
/// The colour excess to pair it with is the stellar one,
/// E(B−V)_stars = 0.44·E(B−V)_gas.
///
/// Unlike the other laws the returned value does not scale with A(V): the
/// law yields `0.4·k(λ)` in [`Output::Alambda`] mode and `10^(0.4·k(λ))` in
/// [`Output::Tau`] mode, where k(λ) = A(λ)/E(B−V).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Calzetti;

impl Calzetti {
    /// R(V) = 4.05 ± 0.80 from optical-IR observations of 4 starbursts.
    pub const DEFAULT_RV: f64 = 4.05;
    /// Blue end of the support, μm
    pub const MIN_UM: f64 = 0.0912;
    /// Red end of the support, μm
    pub const MAX_UM: f64 = 2.2;
    /// Boundary between the UV and optical fits, μm
    const SPLIT_UM: f64 = 0.630;

    /// Creates the law.
    pub fn new() -> Self { Self }

    /// k(λ) = A(λ)/E(B−V) at `lamb_um` micrometers.
    pub fn k(lamb_um: f64, rv: f64) -> Result<f64> {
        if !(Self::MIN_UM..=Self::MAX_UM).contains(&lamb_um) {
            return Err(ExtinctionError::OutOfRange {
                law: "Calzetti",
                wavelength_um: lamb_um,
                min: Self::MIN_UM,
                max: Self::MAX_UM,
            });
        }
        let x = 1.0 / lamb_um;
        let k = if lamb_um >= Self::SPLIT_UM {
            2.659 * (-1.857 + 1.040 * x) + rv
        } else {
            2.659 * (-2.156 + 1.509 * x - 0.198 * x * x + 0.011 * x * x * x) + rv
        };
        Ok(k)
    }
}

impl ExtinctionLaw for Calzetti {
    fn name(&self) -> &str { "Calzetti" }

    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        check_inputs(lamb_aa, params.av)?;
        let rv = resolve_rv(params.rv, Self::DEFAULT_RV)?;
        lamb_aa
            .iter()
            .map(|l| {
                let k = Self::k(l / 1.0e4, rv)?;
                Ok(match params.output {
                    Output::Alambda => 0.4 * k,
                    Output::Tau => 10f64.powf(0.4 * k),
                })
            })
            .collect()
    }

    fn tau_from_alambda(&self, alambda: f64) -> f64 { 10f64.powf(alambda) }
}
