//! Fitzpatrick (1999, PASP 111, 63)
//!
//! R(V)-dependent Milky Way curve that treats optical/NIR extinction as
//! measured from broad and medium band photometry. The UV follows the
//! Fitzpatrick & Massa parametrisation; the optical/NIR part is a cubic
//! spline through R(V)-dependent anchors, tied to the UV curve at
//! 2700 Å and 2600 Å.

use serde::{Deserialize, Serialize};

use crate::error::{ExtinctionError, Result};
use crate::law::{
    check_inputs, resolve_rv, wavenumber, ExtinctionLaw, LawParams, Output, TAU_PER_MAG,
};
use crate::spline::CubicSpline;

/// Wavenumber (μm⁻¹) where the UV parametrisation takes over.
pub const XCUT_UV: f64 = 10000.0 / 2700.0;

/// UV knots appended to the optical/NIR anchors.
pub(crate) const X_SPLINE_UV: [f64; 2] = [10000.0 / 2700.0, 10000.0 / 2600.0];

/// Lorentzian-like bump profile x²/((x²−x0²)² + γ²x²).
#[inline]
pub(crate) fn drude(x: f64, x0: f64, gamma: f64) -> f64 {
    let x2 = x * x;
    x2 / ((x2 - x0 * x0).powi(2) + gamma * gamma * x2)
}

/// Far-UV curvature, non-zero for x ≥ 5.9 μm⁻¹.
#[inline]
pub(crate) fn fuv_curvature(x: f64) -> f64 {
    if x < 5.9 {
        return 0.0;
    }
    let d = x - 5.9;
    0.5392 * d * d + 0.05644 * d * d * d
}

/// FM shape constants for a given R(V).
#[derive(Clone, Copy, Debug, PartialEq)]
struct UvShape {
    c1: f64,
    c2: f64,
    c3: f64,
    c4: f64,
    x0: f64,
    gamma: f64,
}

impl UvShape {
    fn for_rv(rv: f64) -> Self {
        let c2 = -0.824 + 4.717 / rv;
        Self { c1: 2.030 - 3.007 * c2, c2, c3: 3.23, c4: 0.41, x0: 4.596, gamma: 0.99 }
    }

    /// A(λ)/E(B−V) − R(V) without the far-UV term.
    fn continuum_and_bump(&self, x: f64) -> f64 {
        self.c1 + self.c2 * x + self.c3 * drude(x, self.x0, self.gamma)
    }
}

/// Fitzpatrick (1999) extinction law.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Fitzpatrick99;

impl Fitzpatrick99 {
    /// R(V) used when the caller gives none.
    pub const DEFAULT_RV: f64 = 3.1;

    /// Creates the law.
    pub fn new() -> Self { Self }

    /// Optical/NIR anchors (x in μm⁻¹, A(λ)/E(B−V)) for a given R(V).
    pub fn optical_anchors(rv: f64) -> ([f64; 7], [f64; 7]) {
        let xs = [
            0.0,
            10000.0 / 26500.0,
            10000.0 / 12200.0,
            10000.0 / 6000.0,
            10000.0 / 5470.0,
            10000.0 / 4670.0,
            10000.0 / 4110.0,
        ];
        let ys = [
            0.0,
            0.26469 * rv / 3.1,
            0.82925 * rv / 3.1,
            -4.22809e-01 + 1.00270 * rv + 2.13572e-04 * rv * rv,
            -5.13540e-02 + 1.00216 * rv - 7.35778e-05 * rv * rv,
            7.00127e-01 + 1.00184 * rv - 3.32598e-05 * rv * rv,
            1.19456 + rv * (1.01707 + rv * (-5.46959e-03 + rv * (7.97809e-04 + rv * -4.45636e-05))),
        ];
        (xs, ys)
    }

    fn optical_spline(shape: &UvShape, rv: f64) -> Result<CubicSpline> {
        let (xo, yo) = Self::optical_anchors(rv);
        let mut xs = xo.to_vec();
        let mut ys = yo.to_vec();
        for x in X_SPLINE_UV {
            xs.push(x);
            ys.push(shape.continuum_and_bump(x) + rv);
        }
        CubicSpline::not_a_knot(xs, ys)
            .ok_or(ExtinctionError::DegenerateSpline { law: "Fitzpatrick99", rv })
    }

    /// A(λ)/A(V) at wavenumber `x` (μm⁻¹) for every x, reusing the spline.
    fn k_over_rv(shape: &UvShape, spline: &CubicSpline, rv: f64, x: f64) -> f64 {
        let k = if x >= XCUT_UV {
            shape.continuum_and_bump(x) + shape.c4 * fuv_curvature(x) + rv
        } else {
            spline.evaluate(x)
        };
        k / rv
    }
}

impl ExtinctionLaw for Fitzpatrick99 {
    fn name(&self) -> &str { "Fitzpatrick99" }

    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        check_inputs(lamb_aa, params.av)?;
        let rv = resolve_rv(params.rv, Self::DEFAULT_RV)?;
        let shape = UvShape::for_rv(rv);
        let spline = Self::optical_spline(&shape, rv)?;
        let scale = match params.output {
            Output::Alambda => params.av,
            Output::Tau => params.av * TAU_PER_MAG,
        };
        Ok(lamb_aa
            .iter()
            .map(|l| Self::k_over_rv(&shape, &spline, rv, wavenumber(*l)) * scale)
            .collect())
    }
}
