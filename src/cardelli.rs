//! Cardelli, Clayton & Mathis (1989, ApJ 345, 245)

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::law::{
    check_inputs, resolve_rv, wavenumber, ExtinctionLaw, LawParams, Output, TAU_PER_MAG,
};

/// The CCM89 R(V)-dependent Milky Way curve, A(λ)/A(V) = a(x) + b(x)/R(V).
///
/// Defined on 0.3 ≤ x ≤ 10 μm⁻¹; zero outside.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Cardelli;

impl Cardelli {
    /// R(V) used when the caller gives none.
    pub const DEFAULT_RV: f64 = 3.1;

    /// Creates the law.
    pub fn new() -> Self { Self }

    /// The (a, b) coefficients at wavenumber `x` in μm⁻¹.
    pub fn coefficients(x: f64) -> (f64, f64) {
        if !(0.3..=10.0).contains(&x) {
            (0.0, 0.0)
        } else if x < 1.1 {
            // infrared, Eq 2
            let p = x.powf(1.61);
            (0.574 * p, -0.527 * p)
        } else if x < 3.3 {
            // optical / NIR, Eq 3
            let y = x - 1.82;
            let a = 1.0 + y * (0.17699 + y * (-0.50447 + y * (-0.02427 + y * (0.72085
                + y * (0.01979 + y * (-0.77530 + y * 0.32999))))));
            let b = y * (1.41338 + y * (2.28305 + y * (1.07233 + y * (-5.38434
                + y * (-0.62251 + y * (5.30260 + y * -2.09002))))));
            (a, b)
        } else if x < 8.0 {
            // UV, Eq 4
            let mut a = 1.752 - 0.316 * x - 0.104 / ((x - 4.67).powi(2) + 0.341);
            let mut b = -3.090 + 1.825 * x + 1.206 / ((x - 4.62).powi(2) + 0.263);
            if x >= 5.9 {
                let d = x - 5.9;
                a += -0.04473 * d * d - 0.009779 * d * d * d;
                b += 0.21300 * d * d + 0.120700 * d * d * d;
            }
            (a, b)
        } else {
            // far UV, Eq 5
            let d = x - 8.0;
            let a = -1.073 - 0.628 * d + 0.137 * d * d - 0.070 * d * d * d;
            let b = 13.670 + 4.257 * d + 0.420 * d * d + 0.374 * d * d * d;
            (a, b)
        }
    }
}

impl ExtinctionLaw for Cardelli {
    fn name(&self) -> &str { "Cardelli" }

    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        check_inputs(lamb_aa, params.av)?;
        let rv = resolve_rv(params.rv, Self::DEFAULT_RV)?;
        let scale = match params.output {
            Output::Alambda => params.av,
            Output::Tau => TAU_PER_MAG * params.av,
        };
        Ok(lamb_aa
            .iter()
            .map(|l| {
                let (a, b) = Self::coefficients(wavenumber(*l));
                (a + b / rv) * scale
            })
            .collect())
    }
}
