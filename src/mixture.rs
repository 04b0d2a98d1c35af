//! Two-component mixtures of extinction laws
//!
//! A mixture blends a "bump" law A with a "bumpless" law B,
//!
//! ```text
//! f_A · A(λ; R(V)_A) + (1 − f_A) · B(λ; R(V)_B)
//! ```
//!
//! where the effective R(V) of the blend satisfies
//! `1/R(V) = f_A/R(V)_A + (1 − f_A)/R(V)_B`. Any two of the three values fix
//! the third.

use std::ops::Add;

use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::calzetti::Calzetti;
use crate::cardelli::Cardelli;
use crate::error::{ExtinctionError, Result};
use crate::fitzpatrick::Fitzpatrick99;
use crate::gordon::Gordon03SmcBar;
use crate::law::{check_inputs, ExtinctionLaw, LawParams, Output};
use crate::units;

/// Valid R(V) interval for mixture components and the blend.
pub const RV_RANGE: std::ops::RangeInclusive<f64> = 2.0..=6.0;

fn finite(relation: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExtinctionError::NonFinite { relation, value })
    }
}

/// R(V)_A = 1 / (1/(R(V)·f_A) − (1 − f_A)/(f_A·R(V)_B))
pub fn get_rv_a(rv: f64, f_a: f64, rv_b: f64) -> Result<f64> {
    finite("R(V)_A", 1.0 / (1.0 / (rv * f_a) - (1.0 - f_a) / (f_a * rv_b)))
}

/// R(V) = 1 / (f_A/R(V)_A + (1 − f_A)/R(V)_B)
pub fn get_rv(rv_a: f64, f_a: f64, rv_b: f64) -> Result<f64> {
    finite("R(V)", 1.0 / (f_a / rv_a + (1.0 - f_a) / rv_b))
}

/// R(V)_B = (1 − f_A) / (1/R(V) − f_A/R(V)_A)
pub fn get_rv_b(rv: f64, rv_a: f64, f_a: f64) -> Result<f64> {
    finite("R(V)_B", (1.0 - f_a) / (1.0 / rv - f_a / rv_a))
}

/// Parameters of a mixture evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixtureParams {
    /// A(V), applied to both components
    pub av: f64,
    /// Effective R(V) of the blend
    pub rv: Option<f64>,
    /// R(V) of the bump component A
    pub rv_a: Option<f64>,
    /// R(V) of the bumpless component B
    pub rv_b: Option<f64>,
    /// Weight of component A; `None` selects the mixture's own f_A
    pub f_a: Option<f64>,
    /// Magnitudes or optical depth, shared by both components
    pub output: Output,
}

impl Default for MixtureParams {
    fn default() -> Self {
        Self { av: 1.0, rv: None, rv_a: None, rv_b: None, f_a: None, output: Output::Alambda }
    }
}

impl MixtureParams {
    /// Default parameters with an effective R(V).
    pub fn with_rv(rv: f64) -> Self { Self { rv: Some(rv), ..Self::default() } }
    /// Returns a copy with the mixing fraction replaced.
    pub fn f_a(self, f_a: f64) -> Self { Self { f_a: Some(f_a), ..self } }
    /// Returns a copy with R(V)_A set.
    pub fn rv_a(self, rv_a: f64) -> Self { Self { rv_a: Some(rv_a), ..self } }
    /// Returns a copy with R(V)_B set.
    pub fn rv_b(self, rv_b: f64) -> Self { Self { rv_b: Some(rv_b), ..self } }
    /// Returns a copy with A(V) replaced.
    pub fn av(self, av: f64) -> Self { Self { av, ..self } }
    /// Returns a copy that evaluates optical depth.
    pub fn tau(self) -> Self { Self { output: Output::Tau, ..self } }
}

/// The three R(V) values and the mixing fraction after resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResolvedRv {
    /// Effective R(V)
    pub rv: f64,
    /// Component A
    pub rv_a: f64,
    /// Component B
    pub rv_b: f64,
    /// Weight of component A
    pub f_a: f64,
}

/// Blend of two extinction laws.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MixtureLaw<A, B> {
    a: A,
    b: B,
    f_a: f64,
    name: String,
}

impl<A: ExtinctionLaw, B: ExtinctionLaw> MixtureLaw<A, B> {
    /// Mixture of `a` (bump) and `b` (bumpless) with f_A = 0.5.
    pub fn new(a: A, b: B) -> Self {
        let name = format!("({}, {})", a.name(), b.name());
        Self { a, b, f_a: 0.5, name }
    }

    /// Same as [`new`](Self::new) with an explicit name.
    pub fn with_name(a: A, b: B, name: impl Into<String>) -> Self {
        Self { a, b, f_a: 0.5, name: name.into() }
    }

    /// Returns the mixture with another default f_A.
    ///
    /// Used whenever [`MixtureParams::f_a`] is `None`, and always when the
    /// mixture is evaluated through [`ExtinctionLaw`].
    pub fn with_f_a(self, f_a: f64) -> Self { Self { f_a, ..self } }

    /// Component A.
    pub fn a(&self) -> &A { &self.a }
    /// Component B.
    pub fn b(&self) -> &B { &self.b }
    /// Default mixing fraction.
    pub fn default_f_a(&self) -> f64 { self.f_a }

    /// R(V)_A for an effective R(V); `rv_b` falls back to B's own R(V).
    pub fn rv_a(&self, rv: f64, f_a: f64, rv_b: Option<f64>) -> Result<f64> {
        let rv_b = rv_b
            .or_else(|| self.b.default_rv())
            .ok_or(ExtinctionError::InsufficientRv { known: 1 })?;
        get_rv_a(rv, f_a, rv_b)
    }

    /// Effective R(V); missing component values fall back to the laws' own.
    pub fn rv(&self, rv_a: Option<f64>, f_a: f64, rv_b: Option<f64>) -> Result<f64> {
        let rv_a = rv_a.or_else(|| self.a.default_rv());
        let rv_b = rv_b.or_else(|| self.b.default_rv());
        match (rv_a, rv_b) {
            (Some(rv_a), Some(rv_b)) => get_rv(rv_a, f_a, rv_b),
            (a, b) => {
                let known = a.is_some() as usize + b.is_some() as usize;
                Err(ExtinctionError::InsufficientRv { known })
            }
        }
    }

    /// R(V)_B for an effective R(V); `rv_a` falls back to A's own R(V).
    pub fn rv_b(&self, rv: f64, rv_a: Option<f64>, f_a: f64) -> Result<f64> {
        let rv_a = rv_a
            .or_else(|| self.a.default_rv())
            .ok_or(ExtinctionError::InsufficientRv { known: 1 })?;
        get_rv_b(rv, rv_a, f_a)
    }

    /// Fills in whichever of R(V), R(V)_A and R(V)_B is missing.
    ///
    /// Component values not given in `params` come from the laws' own R(V)
    /// first, and a missing f_A from the mixture's default. When all three
    /// R(V) are known they are used as given.
    pub fn resolve(&self, params: &MixtureParams) -> Result<ResolvedRv> {
        let f_a = params.f_a.unwrap_or(self.f_a);
        if !f_a.is_finite() {
            return Err(ExtinctionError::InvalidParameter { name: "f_A", value: f_a });
        }
        let rv_a = params.rv_a.or_else(|| self.a.default_rv());
        let rv_b = params.rv_b.or_else(|| self.b.default_rv());

        let resolved = match (params.rv, rv_a, rv_b) {
            (Some(rv), Some(rv_a), Some(rv_b)) => ResolvedRv { rv, rv_a, rv_b, f_a },
            (Some(rv), None, Some(rv_b)) => {
                ResolvedRv { rv, rv_a: get_rv_a(rv, f_a, rv_b)?, rv_b, f_a }
            }
            (Some(rv), Some(rv_a), None) => {
                ResolvedRv { rv, rv_a, rv_b: get_rv_b(rv, rv_a, f_a)?, f_a }
            }
            (None, Some(rv_a), Some(rv_b)) => {
                ResolvedRv { rv: get_rv(rv_a, f_a, rv_b)?, rv_a, rv_b, f_a }
            }
            (rv, rv_a, rv_b) => {
                let known = [rv, rv_a, rv_b].iter().filter(|v| v.is_some()).count();
                return Err(ExtinctionError::InsufficientRv { known });
            }
        };
        tracing::debug!(
            mixture = %self.name,
            rv = resolved.rv,
            rv_a = resolved.rv_a,
            rv_b = resolved.rv_b,
            f_a,
            "resolved mixture R(V)"
        );
        Ok(resolved)
    }

    /// Evaluates the blend at wavelengths in angstrom.
    pub fn function_mixture(&self, lamb_aa: &[f64], params: &MixtureParams) -> Result<Vec<f64>> {
        check_inputs(lamb_aa, params.av)?;
        let r = self.resolve(params)?;
        let (va, vb) = (
            self.a.function(lamb_aa, &component(params, r.rv_a))?,
            self.b.function(lamb_aa, &component(params, r.rv_b))?,
        );
        Ok(va.iter().zip(&vb).map(|(a, b)| r.f_a * a + (1.0 - r.f_a) * b).collect())
    }

    /// Evaluates the blend on unit-carrying wavelengths.
    pub fn evaluate_mixture(&self, lamb: &[Length], params: &MixtureParams) -> Result<Vec<f64>> {
        self.function_mixture(&units::to_angstrom(lamb), params)
    }

    /// True when f_A is a fraction and all three R(V) lie in [2, 6].
    ///
    /// Each component is also asked for its own validity at the R(V) it is
    /// evaluated with, so the inner values of a nested mixture are checked
    /// too. Parameter sets whose R(V) cannot be resolved are invalid.
    pub fn is_valid_mixture(&self, params: &MixtureParams) -> bool {
        match self.resolve(params) {
            Ok(r) => {
                (0.0..=1.0).contains(&r.f_a)
                    && RV_RANGE.contains(&r.rv)
                    && RV_RANGE.contains(&r.rv_a)
                    && RV_RANGE.contains(&r.rv_b)
                    && self.a.is_valid(&component(params, r.rv_a))
                    && self.b.is_valid(&component(params, r.rv_b))
            }
            Err(_) => false,
        }
    }

    fn params_from(&self, params: &LawParams) -> MixtureParams {
        MixtureParams { av: params.av, rv: params.rv, output: params.output, ..Default::default() }
    }
}

fn component(params: &MixtureParams, rv: f64) -> LawParams {
    LawParams { av: params.av, rv: Some(rv), output: params.output }
}

impl<A: ExtinctionLaw, B: ExtinctionLaw> ExtinctionLaw for MixtureLaw<A, B> {
    fn name(&self) -> &str { &self.name }

    /// Effective R(V) implied by the components' own values, if both have one.
    fn default_rv(&self) -> Option<f64> {
        self.rv(None, self.f_a, None).ok()
    }

    /// `params.rv` is the effective R(V); f_A is the mixture's default.
    fn function(&self, lamb_aa: &[f64], params: &LawParams) -> Result<Vec<f64>> {
        self.function_mixture(lamb_aa, &self.params_from(params))
    }

    fn is_valid(&self, params: &LawParams) -> bool {
        self.is_valid_mixture(&self.params_from(params))
    }
}

macro_rules! impl_law_add {
    ($($law:ty),* $(,)?) => {
        $(
            impl<R: ExtinctionLaw> Add<R> for $law {
                type Output = MixtureLaw<$law, R>;

                fn add(self, rhs: R) -> Self::Output {
                    MixtureLaw::new(self, rhs)
                }
            }
        )*
    };
}

impl_law_add!(Cardelli, Calzetti, Fitzpatrick99, Gordon03SmcBar);

impl<A: ExtinctionLaw, B: ExtinctionLaw, R: ExtinctionLaw> Add<R> for MixtureLaw<A, B> {
    type Output = MixtureLaw<MixtureLaw<A, B>, R>;

    fn add(self, rhs: R) -> Self::Output {
        MixtureLaw::new(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn f99_smc() -> MixtureLaw<Fitzpatrick99, Gordon03SmcBar> {
        Fitzpatrick99::new() + Gordon03SmcBar::new()
    }

    #[test]
    fn name_is_composed_from_components() {
        assert_eq!(f99_smc().name(), "(Fitzpatrick99, Gordon et al. 2003 SMCBar)");
        let named = MixtureLaw::with_name(Cardelli, Gordon03SmcBar::new(), "bumpy");
        assert_eq!(named.name(), "bumpy");
    }

    #[test]
    fn rv_b_comes_from_the_component() {
        let r = f99_smc().resolve(&MixtureParams::with_rv(3.1)).unwrap();
        assert_eq!(r.rv_b, 2.74);
        assert_relative_eq!(get_rv(r.rv_a, 0.5, r.rv_b).unwrap(), 3.1, max_relative = 1e-12);
    }

    #[test]
    fn needs_two_rv_values() {
        let m = Cardelli + Fitzpatrick99;
        let err = m.function_mixture(&[5500.0], &MixtureParams::with_rv(3.1)).unwrap_err();
        assert_eq!(err, ExtinctionError::InsufficientRv { known: 1 });
        let err = m.function_mixture(&[5500.0], &MixtureParams::default()).unwrap_err();
        assert_eq!(err, ExtinctionError::InsufficientRv { known: 0 });
        assert!(!m.is_valid_mixture(&MixtureParams::with_rv(3.1)));
    }

    #[test]
    fn degenerate_relations_are_reported() {
        assert!(matches!(
            get_rv_a(3.1, 0.0, 3.1),
            Err(ExtinctionError::NonFinite { relation: "R(V)_A", .. })
        ));
        assert!(matches!(get_rv_b(3.1, 3.1, 1.0), Err(ExtinctionError::NonFinite { .. })));
        assert!(matches!(get_rv(3.1, 0.5, -3.1), Err(ExtinctionError::NonFinite { .. })));
    }

    #[test]
    fn validity_window() {
        let m = Cardelli + Fitzpatrick99;
        let ok = MixtureParams::with_rv(3.1).rv_a(3.1).rv_b(3.1).f_a(0.5);
        assert!(m.is_valid_mixture(&ok));
        assert!(!m.is_valid_mixture(&ok.f_a(1.2)));
        assert!(!m.is_valid_mixture(&ok.f_a(-0.1)));
        assert!(!m.is_valid_mixture(&ok.rv_a(6.5)));
        assert!(!m.is_valid_mixture(&MixtureParams::with_rv(3.1).rv_b(1.5)));
    }

    #[test]
    fn matching_output_modes_keep_the_tau_relation() {
        let m = f99_smc();
        let lamb = [1250.0, 2175.0, 4400.0, 9000.0];
        let p = MixtureParams::with_rv(3.1).f_a(0.3);
        let mag = m.function_mixture(&lamb, &p).unwrap();
        let tau = m.function_mixture(&lamb, &p.tau()).unwrap();
        for (a, t) in mag.iter().zip(&tau) {
            assert_relative_eq!(m.tau_from_alambda(*a), *t, max_relative = 1e-12);
        }
    }

    #[test]
    fn mixture_is_a_law_and_nests() {
        assert_eq!(f99_smc().default_rv(), None);
        let smc = Gordon03SmcBar::with_rv(3.5) + Gordon03SmcBar::new();
        let expected = 1.0 / (0.5 / 3.5 + 0.5 / 2.74);
        assert_relative_eq!(smc.default_rv().unwrap(), expected, max_relative = 1e-12);

        let nested = f99_smc() + Gordon03SmcBar::new();
        let v = nested.function(&[1500.0, 5500.0], &LawParams::with_rv(2.9)).unwrap();
        assert!(v.iter().all(|x| x.is_finite()));
        assert!(nested.is_valid(&LawParams::with_rv(2.9)));
    }

    #[test]
    fn boxed_components() {
        let a: Box<dyn ExtinctionLaw> = Box::new(Cardelli);
        let b: Box<dyn ExtinctionLaw> = Box::new(Gordon03SmcBar::new());
        let m = MixtureLaw::new(a, b);
        let v = m.function_mixture(&[5500.0], &MixtureParams::with_rv(3.0)).unwrap();
        assert!(v[0].is_finite());
    }

    #[test]
    fn stored_f_a_drives_both_evaluation_paths() {
        let m = f99_smc().with_f_a(0.9);
        assert_eq!(m.default_f_a(), 0.9);
        let lamb = [1250.0, 2175.0, 5500.0];

        let as_law = m.function(&lamb, &LawParams::with_rv(3.1)).unwrap();
        let as_mix = m.function_mixture(&lamb, &MixtureParams::with_rv(3.1)).unwrap();
        assert_eq!(as_law, as_mix);
        assert_eq!(m.resolve(&MixtureParams::with_rv(3.1)).unwrap().f_a, 0.9);

        for rv in [2.3, 3.1, 4.5] {
            assert_eq!(
                m.is_valid(&LawParams::with_rv(rv)),
                m.is_valid_mixture(&MixtureParams::with_rv(rv)),
                "rv = {rv}"
            );
        }

        let explicit = m.function_mixture(&lamb, &MixtureParams::with_rv(3.1).f_a(0.5)).unwrap();
        let halfway = f99_smc().function(&lamb, &LawParams::with_rv(3.1)).unwrap();
        assert_eq!(explicit, halfway);
    }

    #[test]
    fn component_rv_helpers_fall_back_to_the_laws() {
        let m = f99_smc();
        assert_eq!(m.rv_a(3.1, 0.5, None).unwrap(), get_rv_a(3.1, 0.5, 2.74).unwrap());
        assert_eq!(m.rv_a(3.1, 0.5, Some(3.0)).unwrap(), get_rv_a(3.1, 0.5, 3.0).unwrap());
        assert_eq!(m.rv(Some(3.1), 0.3, None).unwrap(), get_rv(3.1, 0.3, 2.74).unwrap());
        assert_eq!(m.rv(None, 0.3, None), Err(ExtinctionError::InsufficientRv { known: 1 }));
        assert_eq!(m.rv_b(3.1, Some(3.5), 0.5).unwrap(), get_rv_b(3.1, 3.5, 0.5).unwrap());
        assert_eq!(m.rv_b(3.1, None, 0.5), Err(ExtinctionError::InsufficientRv { known: 1 }));

        let ccm_f99 = Cardelli + Fitzpatrick99;
        assert_eq!(ccm_f99.rv_b(3.1, None, 0.5), Err(ExtinctionError::InsufficientRv { known: 1 }));
        assert_eq!(ccm_f99.rv(None, 0.5, None), Err(ExtinctionError::InsufficientRv { known: 0 }));
    }

    #[test]
    fn components_are_reachable() {
        let m = Gordon03SmcBar::with_rv(3.5) + Gordon03SmcBar::new();
        assert_eq!(m.a().rv(), 3.5);
        assert_eq!(m.b().rv(), 2.74);
        assert_eq!(m.default_f_a(), 0.5);
    }

    #[test]
    fn nested_validity_checks_the_inner_blend() {
        let nested = f99_smc() + Gordon03SmcBar::new();
        // outer R(V)_A = 2.1 is fine, but the inner blend then needs R(V)_A ~ 1.7
        let rv = get_rv(2.1, 0.5, 2.74).unwrap();
        let outer = nested.resolve(&MixtureParams::with_rv(rv)).unwrap();
        assert_relative_eq!(outer.rv_a, 2.1, max_relative = 1e-12);
        assert!(RV_RANGE.contains(&outer.rv) && RV_RANGE.contains(&outer.rv_b));

        let inner_rv_a = f99_smc().rv_a(outer.rv_a, 0.5, None).unwrap();
        assert!(inner_rv_a < 2.0, "inner R(V)_A = {inner_rv_a}");
        assert!(!nested.is_valid(&LawParams::with_rv(rv)));
        assert!(!nested.is_valid_mixture(&MixtureParams::with_rv(rv)));
    }
}
