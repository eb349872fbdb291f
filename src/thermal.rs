use crate::common::{Band, C_CGS, PARSEC_CGS, SIGMA_SB};

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

const H_CGS: f64 = 6.62607015e-27;
const K_B_CGS: f64 = 1.380649e-16;

/// AB magnitude zero point for F_nu in erg/s/cm^2/Hz.
const AB_ZP: f64 = 48.6;

/// Ten parsecs in cm, the reference distance of absolute magnitudes.
const TEN_PC_CGS: f64 = 10.0 * PARSEC_CGS;

// ---------------------------------------------------------------------------
// Blackbody photometry
// ---------------------------------------------------------------------------

/// Planck specific intensity B_nu(T) in erg/s/cm^2/Hz/sr.
///
/// Uses the Wien limit when hν/kT is large to avoid overflow.
pub fn planck_nu(nu: f64, temp: f64) -> f64 {
    let x = H_CGS * nu / (K_B_CGS * temp);
    let prefactor = 2.0 * H_CGS * nu.powi(3) / (C_CGS * C_CGS);
    if x > 500.0 {
        return prefactor * (-x).exp();
    }
    prefactor / x.exp_m1()
}

/// Absolute AB magnitude of a spherical blackbody photosphere.
pub fn blackbody_abs_mag(band: Band, temp: f64, radius: f64) -> f64 {
    let nu = C_CGS / (band.wavelength_angstrom() * 1e-8);
    let f_nu = std::f64::consts::PI * planck_nu(nu, temp) * (radius / TEN_PC_CGS).powi(2);
    if f_nu <= 0.0 || !f_nu.is_finite() {
        return f64::NAN;
    }
    -2.5 * f_nu.log10() - AB_ZP
}

/// Effective temperature and radius of a photosphere emitting `lbol`.
///
/// Below `t_floor` the temperature is held at the floor and the radius
/// recedes to conserve luminosity.
pub fn photosphere(lbol: f64, radius: f64, t_floor: f64) -> (f64, f64) {
    let area = 4.0 * std::f64::consts::PI * radius * radius;
    let temp = (lbol / (area * SIGMA_SB)).powf(0.25);
    if temp >= t_floor {
        return (temp, radius);
    }
    let r_floor = (lbol / (4.0 * std::f64::consts::PI * SIGMA_SB * t_floor.powi(4))).sqrt();
    (t_floor, r_floor)
}

/// Absolute AB magnitudes in every band, NaN when there is no emission.
pub fn band_magnitudes(lbol: f64, radius: f64, t_floor: f64) -> [f64; 9] {
    let mut mags = [f64::NAN; 9];
    if !(lbol > 0.0 && radius > 0.0) || !lbol.is_finite() {
        return mags;
    }
    let (temp, r_ph) = photosphere(lbol, radius, t_floor);
    for band in Band::ALL {
        mags[band.index()] = blackbody_abs_mag(band, temp, r_ph);
    }
    mags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_conserves_luminosity() {
        let lbol = 1e40;
        let (temp, r) = photosphere(lbol, 1e16, 2500.0);
        assert_eq!(temp, 2500.0);
        let l_back = 4.0 * std::f64::consts::PI * r * r * SIGMA_SB * temp.powi(4);
        assert!((l_back / lbol - 1.0).abs() < 1e-10);
    }

    #[test]
    fn hotter_is_bluer() {
        let hot = band_magnitudes(1e42, 5e14, 1000.0);
        let g_minus_k_hot = hot[Band::G.index()] - hot[Band::K.index()];
        let cool = band_magnitudes(1e40, 5e14, 1000.0);
        let g_minus_k_cool = cool[Band::G.index()] - cool[Band::K.index()];
        assert!(g_minus_k_hot < g_minus_k_cool);
    }

    #[test]
    fn no_emission_gives_nan() {
        assert!(band_magnitudes(0.0, 1e15, 2500.0).iter().all(|m| m.is_nan()));
    }
}
