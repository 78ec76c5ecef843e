//! Tolerance defaults that are not part of `GeomCfg` (internal).
//!
//! Policy
//! - Positional tolerance travels explicitly (`GeomCfg`, cleanse sensitivity).
//!   The constants here only shape predicates whose scale does not depend on
//!   pattern coordinates.

/// Sine threshold for "parallel" unit directions in collinear joins.
pub(crate) const ANGLE_EPS: f64 = 1e-7;
/// Snap window for the fractional part of a star's `d` parameter.
pub(crate) const FRAC_SNAP: f64 = 0.01;
/// Upper bound on whole-sequence cleanse rounds. Passes reach their own
/// fixed points, so rounds only repeat on cross-pass interactions.
pub(crate) const MAX_ROUNDS: usize = 16;
/// Max-abs slack when testing a placement for identity.
pub(crate) const IDENTITY_EPS: f64 = 1e-9;
