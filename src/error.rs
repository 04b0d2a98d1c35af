//! Error taxonomy shared by every law and the mixture combinator

use thiserror::Error;

/// Errors raised while evaluating an extinction law.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtinctionError {
    /// A mixture needs at least two of {R(V), R(V)_A, R(V)_B}.
    #[error("must provide at least 2 R(V) values (got {known} of R(V), R(V)_A, R(V)_B)")]
    InsufficientRv {
        /// How many of the three values were resolvable.
        known: usize,
    },

    /// An R(V) back-solving relation produced NaN or an infinity.
    #[error("{relation} is not finite (got {value}); check R(V) and f_A")]
    NonFinite {
        /// Relation that failed, e.g. `"R(V)_A"`.
        relation: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A scalar parameter is outside the domain the formulas accept.
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter {
        /// Parameter name (`"Rv"`, `"Av"`, `"f_A"`).
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Wavelengths must be finite and strictly positive.
    #[error("wavelength must be finite and > 0 (got {value} angstrom)")]
    InvalidWavelength {
        /// Offending wavelength, in angstrom.
        value: f64,
    },

    /// The optical/NIR spline could not be built from the anchors.
    #[error("{law}: optical/NIR spline is singular for R(V) = {rv}")]
    DegenerateSpline {
        /// Name of the law.
        law: &'static str,
        /// R(V) the anchors were derived from.
        rv: f64,
    },

    /// The law is not defined at this wavelength.
    #[error("{law}: wavelength {wavelength_um} um is outside the valid range [{min}, {max}] um")]
    OutOfRange {
        /// Name of the law.
        law: &'static str,
        /// Offending wavelength in micrometers.
        wavelength_um: f64,
        /// Lower bound of the support (um).
        min: f64,
        /// Upper bound of the support (um).
        max: f64,
    },
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ExtinctionError>;
