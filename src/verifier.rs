//! Numeric self-checks of a law over a wavelength grid

use crate::law::{ExtinctionLaw, LawParams, Output};
use anyhow::{anyhow, Result};

/// Verification report for a law evaluated on a grid
#[derive(Debug)]
pub struct Report {
    /// Law that was checked
    pub law: String,
    /// Number of grid points
    pub points: usize,
    /// Whether every value in both output modes is finite
    pub finite_ok: bool,
    /// Largest relative deviation between τ and the τ implied by A(λ)
    pub rel_err_tau: f64,
    /// Wavelength (Å) and value of the largest A(λ)
    pub peak: Option<(f64, f64)>,
}

/// Evaluate `law` in both output modes on `lamb_aa` and check that the
/// values are finite and tied by the law's A(λ) → τ relation.
pub fn verify_law<L: ExtinctionLaw + ?Sized>(
    law: &L,
    lamb_aa: &[f64],
    params: &LawParams,
) -> Result<Report> {
    if lamb_aa.is_empty() {
        return Err(anyhow!("{}: empty wavelength grid", law.name()));
    }
    let mag = law.function(lamb_aa, &params.output(Output::Alambda))?;
    let tau = law.function(lamb_aa, &params.output(Output::Tau))?;
    if mag.len() != lamb_aa.len() || tau.len() != lamb_aa.len() {
        return Err(anyhow!(
            "{}: {} wavelengths gave {} / {} values",
            law.name(),
            lamb_aa.len(),
            mag.len(),
            tau.len()
        ));
    }

    let finite_ok = mag.iter().chain(&tau).all(|v| v.is_finite());

    let mut rel_err_tau = 0.0_f64;
    for (a, t) in mag.iter().zip(&tau) {
        let expected = law.tau_from_alambda(*a);
        let rel = if expected.abs() > 0.0 {
            (t - expected).abs() / expected.abs()
        } else {
            t.abs()
        };
        rel_err_tau = rel_err_tau.max(rel);
    }

    let peak = lamb_aa
        .iter()
        .zip(&mag)
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<(f64, f64)>, (l, v)| match best {
            Some((_, bv)) if bv >= *v => best,
            _ => Some((*l, *v)),
        });

    Ok(Report { law: law.name().to_string(), points: lamb_aa.len(), finite_ok, rel_err_tau, peak })
}
