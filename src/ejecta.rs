//! Ejecta mass and velocity fitting formulae calibrated on numerical-relativity
//! merger simulations.
//!
//! Masses are in solar masses, velocities in units of c.

use serde::{Deserialize, Serialize};

use crate::samples::BinaryProperties;

/// Dynamical ejecta of one merger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ejecta {
    /// Ejecta mass [Msun]
    pub mej: f64,
    /// Mass-averaged ejecta velocity [c]
    pub vej: f64,
}

// ---------------------------------------------------------------------------
// Binary neutron star fit (Dietrich & Ujevic 2017)
// ---------------------------------------------------------------------------

pub fn diuj2017_mej(m1: f64, mb1: f64, c1: f64, m2: f64, mb2: f64, c2: f64) -> f64 {
    let a = -1.35695;
    let b = 6.11252;
    let c = -49.43355;
    let d = 16.1144;
    let n = -2.5484;

    let tmp1 = mb1 * (m2 / m1).powf(1.0 / 3.0) * (1.0 - 2.0 * c1) / c1
        + mb2 * (m1 / m2).powf(1.0 / 3.0) * (1.0 - 2.0 * c2) / c2;
    let tmp2 = mb1 * (m2 / m1).powf(n) + mb2 * (m1 / m2).powf(n);
    let tmp3 = mb1 * (1.0 - m1 / mb1) + mb2 * (1.0 - m2 / mb2);

    (a * tmp1 + b * tmp2 + c * tmp3 + d).max(0.0) / 1000.0
}

fn velocity_mass_term(m1: f64, c1: f64, m2: f64, c2: f64, k: f64) -> f64 {
    (m1 / m2) * (1.0 + k * c1) + (m2 / m1) * (1.0 + k * c2)
}

/// Velocity in the orbital plane.
pub fn diuj2017_vrho(m1: f64, c1: f64, m2: f64, c2: f64) -> f64 {
    -0.219479 * velocity_mass_term(m1, c1, m2, c2, -2.67385) + 0.444836
}

/// Velocity orthogonal to the orbital plane.
pub fn diuj2017_vz(m1: f64, c1: f64, m2: f64, c2: f64) -> f64 {
    -0.315585 * velocity_mass_term(m1, c1, m2, c2, -1.00757) + 0.63808
}

pub fn diuj2017_vej(m1: f64, c1: f64, m2: f64, c2: f64) -> f64 {
    diuj2017_vrho(m1, c1, m2, c2).hypot(diuj2017_vz(m1, c1, m2, c2))
}

pub fn diuj2017(b: &BinaryProperties) -> Ejecta {
    Ejecta {
        mej: diuj2017_mej(b.m1, b.mb1, b.c1, b.m2, b.mb2, b.c2),
        vej: diuj2017_vej(b.m1, b.c1, b.m2, b.c2),
    }
}

// ---------------------------------------------------------------------------
// Black hole - neutron star fit (Kawaguchi et al. 2016)
// ---------------------------------------------------------------------------

/// Prograde ISCO radius in units of G M_BH / c^2 for dimensionless spin `chi`.
pub fn r_isco(chi: f64) -> f64 {
    let chi = chi.clamp(-1.0, 1.0);
    let z1 = 1.0
        + (1.0 - chi * chi).cbrt() * ((1.0 + chi).cbrt() + (1.0 - chi).cbrt());
    let z2 = (3.0 * chi * chi + z1 * z1).sqrt();
    3.0 + z2 - chi.signum() * ((3.0 - z1) * (3.0 + z1 + 2.0 * z2)).sqrt()
}

/// `q = M_BH / M_NS`.
pub fn kaky2016_mej(q: f64, chi: f64, c_ns: f64, mb_ns: f64, m_ns: f64) -> f64 {
    let a = 4.464e-2;
    let b = 2.269e-3;
    let c = 2.431;
    let d = -0.4159;
    let n1 = 0.2497;
    let n2 = 1.352;

    let tmp1 = a * q.powf(n1) * (1.0 - 2.0 * c_ns) / c_ns;
    let tmp2 = -b * q.powf(n2) * r_isco(chi);
    let tmp3 = c * (1.0 - m_ns / mb_ns);

    mb_ns * (tmp1 + tmp2 + tmp3 + d).max(0.0)
}

pub fn kaky2016_vej(q: f64) -> f64 {
    1.533e-2 * q + 1.907e-1
}

/// Treats the heavier body as the black hole and the lighter as the neutron star.
pub fn kaky2016(b: &BinaryProperties) -> Ejecta {
    let q = b.m1 / b.m2;
    Ejecta {
        mej: kaky2016_mej(q, b.chi_eff, b.c2, b.mb2, b.m2),
        vej: kaky2016_vej(q),
    }
}
