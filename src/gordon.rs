//! Gordon et al. (2003, ApJ 594, 279) SMC Bar average curve

use serde::{Deserialize, Serialize};

use crate::error::{ExtinctionError, Result};
use crate::fitzpatrick::{drude, fuv_curvature, XCUT_UV, X_SPLINE_UV};
use crate::law::{
    check_inputs, resolve_rv, wavenumber, ExtinctionLaw, LawParams, Output, TAU_PER_MAG,
};
use crate::spline::CubicSpline;

const NAME: &str = "Gordon et al. 2003 SMCBar";

/// Optical/NIR anchor wavelengths, μm
const ANCHOR_UM: [f64; 8] = [2.198, 1.65, 1.25, 0.81, 0.65, 0.55, 0.44, 0.37];

/// A(λ)/A(V) at the anchors, x = 0 first. The K and J values are adjusted
/// from the published 0.016 and 0.131 so the spline stays smooth and
/// non-negative.
const ANCHOR_K: [f64; 9] = [0.0, 0.11, 0.169, 0.25, 0.567, 0.801, 1.00, 1.374, 1.672];

/// The bumpless SMC Bar curve.
///
/// R(V) plays no role in the paper (the average is 2.74 ± 0.13); it is kept
/// as a parameter so its uncertainty can be explored. The instance stores
/// the value used when a call does not give one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gordon03SmcBar {
    rv: f64,
}

impl Default for Gordon03SmcBar {
    fn default() -> Self { Self { rv: Self::DEFAULT_RV } }
}

impl Gordon03SmcBar {
    /// Average SMC Bar R(V).
    pub const DEFAULT_RV: f64 = 2.74;

    /// The law with R(V) = 2.74.
    pub fn new() -> Self { Self::default() }

    /// The law with another stored R(V).
    pub fn with_rv(rv: f64) -> Self { Self { rv } }

    /// Stored R(V).
    pub fn rv(&self) -> f64 { self.rv }

    fn uv(rv: f64, x: f64) -> f64 {
        let (c1, c2, c3) = (-4.959 / rv, 2.264 / rv, 0.389 / rv);
        1.0 + c1 + c2 * x + c3 * drude(x, 4.6, 1.0)
    }

    fn optical_spline(rv: f64) -> Result<CubicSpline> {
        let mut xs = Vec::with_capacity(ANCHOR_K.len() + X_SPLINE_UV.len());
        xs.push(0.0);
        xs.extend(ANCHOR_UM.iter().map(|l| 1.0 / l));
        xs.extend(X_SPLINE_UV);
        let mut ys = ANCHOR_K.to_vec();
        ys.extend(X_SPLINE_UV.iter().map(|x| Self::uv(rv, *x)));
        CubicSpline::not_a_knot(xs, ys).ok_or(ExtinctionError::DegenerateSpline { law: NAME, rv })
    }
}

impl ExtinctionLaw for Gordon03SmcBar {
    fn name(&self) -> &str { NAME }

    fn default_rv(&self) -> Option<f64> { Some(self.rv) }

    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        check_inputs(lamb_aa, params.av)?;
        let rv = resolve_rv(params.rv, self.rv)?;
        let c4 = 0.461 / rv;
        let spline = Self::optical_spline(rv)?;
        let scale = match params.output {
            Output::Alambda => params.av,
            Output::Tau => params.av * TAU_PER_MAG,
        };
        Ok(lamb_aa
            .iter()
            .map(|l| {
                let x = wavenumber(*l);
                let k = if x >= XCUT_UV {
                    Self::uv(rv, x) + c4 * fuv_curvature(x)
                } else {
                    spline.evaluate(x)
                };
                k * scale
            })
            .collect())
    }
}
