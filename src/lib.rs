#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]
//! Library entry for dustext.
//!
//! Interstellar dust extinction laws evaluated on wavelength grids, and
//! two-component mixtures of them.
//!
//! # Modules
//! - [`law`]: the [`ExtinctionLaw`] interface and evaluation parameters
//! - [`cardelli`], [`calzetti`], [`fitzpatrick`], [`gordon`]: concrete laws
//! - [`mixture`]: blends of two laws with R(V) back-solving
//! - [`units`]: wavelength unit handling
//! - [`verifier`]: numeric self-checks
//! - [`plot`]: visualization (optional in binaries)
//!
//! ```no_run
//! use dustext::{ExtinctionLaw, Fitzpatrick99, Gordon03SmcBar, LawParams, MixtureParams};
//! use dustext::units::{quantity, WavelengthUnit};
//!
//! let lamb = [quantity(2175.0, WavelengthUnit::Angstrom)];
//! let _a = Fitzpatrick99::new().evaluate(&lamb, &LawParams::with_rv(3.1))?;
//! let mix = Fitzpatrick99::new() + Gordon03SmcBar::new();
//! let _b = mix.evaluate_mixture(&lamb, &MixtureParams::with_rv(3.1).f_a(0.75))?;
//! # Ok::<(), dustext::ExtinctionError>(())
//! ```

/// Error taxonomy
pub mod error;

/// Wavelength units and normalisation to angstrom
pub mod units;

/// Not-a-knot cubic spline used by the optical/NIR branches
pub mod spline;

/// The common law interface
pub mod law;

/// Cardelli, Clayton & Mathis (1989)
pub mod cardelli;

/// Calzetti et al. (2000)
pub mod calzetti;

/// Fitzpatrick (1999)
pub mod fitzpatrick;

/// Gordon et al. (2003) SMC Bar
pub mod gordon;

/// Mixtures of two laws
pub mod mixture;

/// Verification tools for law properties and numerical consistency
pub mod verifier;

/// Visualization utilities for generating charts
pub mod plot;

pub use calzetti::Calzetti;
pub use cardelli::Cardelli;
pub use error::{ExtinctionError, Result};
pub use fitzpatrick::Fitzpatrick99;
pub use gordon::Gordon03SmcBar;
pub use law::{ExtinctionLaw, LawParams, Output, TAU_PER_MAG};
pub use mixture::{get_rv, get_rv_a, get_rv_b, MixtureLaw, MixtureParams};
