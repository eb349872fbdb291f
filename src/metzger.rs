use crate::common::{linspace, C_CGS, MSUN_CGS, SECS_PER_DAY};
use crate::config::ModelParameters;
use crate::ejecta::Ejecta;
use crate::model::Lightcurve;

const N_SHELLS: usize = 100;
/// Start of the energy integration [days]
const T_START_DAY: f64 = 1e-3;
const N_PRE_STEPS: usize = 40;
/// Fastest shell velocity [c]
const V_CAP: f64 = 0.9;

// ---------------------------------------------------------------------------
// Heating
// ---------------------------------------------------------------------------

/// Thermalisation efficiency of the radioactive heating.
fn thermalisation(t_day: f64) -> f64 {
    let eth_factor = 0.34 * t_day.powf(0.74);
    0.36 * ((-0.56 * t_day).exp()
        + if eth_factor > 1e-10 {
            (1.0 + eth_factor).ln() / eth_factor
        } else {
            1.0
        })
}

/// 0.5 - atan(x)/pi, without cancellation for large x.
fn arctan_tail(x: f64) -> f64 {
    if x > 0.0 {
        (1.0 / x).atan() / std::f64::consts::PI
    } else {
        0.5 - x.atan() / std::f64::consts::PI
    }
}

/// r-process plus free-neutron heating [erg/g/s] and the opacity at `t_sec`.
fn heating_and_opacity(t_sec: f64, xn0: f64, kappa_r: f64) -> (f64, f64) {
    let t_day = t_sec / SECS_PER_DAY;
    let xn = xn0 * (-t_sec / 900.0).exp();
    let eps_neutron = 3.2e14 * xn;
    let time_term = arctan_tail((t_sec - 1.3) / 0.11).max(1e-30);
    let eps_rp = 2e18 * thermalisation(t_day) * time_term.powf(1.3);

    let xr = 1.0 - xn0;
    let kappa = 0.4 * (xn0 - xn) + kappa_r * xr;
    (eps_rp + eps_neutron, kappa)
}

// ---------------------------------------------------------------------------
// Shell structure
// ---------------------------------------------------------------------------

struct Shells {
    /// Shell velocities [cm/s]
    v: Vec<f64>,
    /// Shell masses [g]
    m: Vec<f64>,
    /// Mass at and outside each shell [g]
    m_ext: Vec<f64>,
}

impl Shells {
    fn new(ejecta: &Ejecta, beta: f64) -> Option<Self> {
        if !(ejecta.mej > 0.0 && ejecta.vej > 0.0) || !ejecta.mej.is_finite() {
            return None;
        }
        let v0 = if beta > 1.0 {
            ejecta.vej * (beta - 1.0) / beta
        } else {
            0.5 * ejecta.vej
        };
        let vmax = (3.0 * v0).min(V_CAP);
        if vmax <= v0 {
            return None;
        }

        let edges: Vec<f64> = linspace(v0.ln(), vmax.ln(), N_SHELLS + 1)
            .into_iter()
            .map(f64::exp)
            .collect();
        let above = |v: f64| (v / v0).powf(-beta);
        let raw: Vec<f64> = edges.windows(2).map(|w| above(w[0]) - above(w[1])).collect();
        let total: f64 = raw.iter().sum();
        let mej = ejecta.mej * MSUN_CGS;

        let m: Vec<f64> = raw.iter().map(|dm| mej * dm / total).collect();
        let v: Vec<f64> = edges
            .windows(2)
            .map(|w| (w[0] * w[1]).sqrt() * C_CGS)
            .collect();
        let mut m_ext = vec![0.0; N_SHELLS];
        let mut acc = 0.0;
        for i in (0..N_SHELLS).rev() {
            acc += m[i];
            m_ext[i] = acc;
        }
        Some(Self { v, m, m_ext })
    }

    /// Radius of the outermost optically thick shell, or of the innermost
    /// shell when everything is transparent.
    fn photosphere_radius(&self, kappa: f64, t_sec: f64) -> f64 {
        (0..N_SHELLS)
            .rev()
            .find(|&i| {
                let r = self.v[i] * t_sec;
                kappa * self.m_ext[i] / (4.0 * std::f64::consts::PI * r * r) >= 1.0
            })
            .map_or(self.v[0] * t_sec, |i| self.v[i] * t_sec)
    }
}

// ---------------------------------------------------------------------------
// Lightcurve
// ---------------------------------------------------------------------------

/// Multi-shell kilonova evaluated at `times` [days].
pub fn metzger_lightcurve(ejecta: &Ejecta, params: &ModelParameters, times: &[f64]) -> Lightcurve {
    let Some(shells) = Shells::new(ejecta, params.beta) else {
        return Lightcurve::dark(times);
    };
    let Some(&first) = times.first() else {
        return Lightcurve::dark(times);
    };

    let xn0 = (1.0 - 2.0 * params.ye).max(0.0);
    let t_start = T_START_DAY.min(first);

    // log-spaced ramp up to the first requested time, then the requested times
    let mut steps: Vec<f64> = if first > t_start {
        linspace(t_start.ln(), first.ln(), N_PRE_STEPS)
            .into_iter()
            .map(f64::exp)
            .collect()
    } else {
        vec![first]
    };
    steps.pop();
    let n_pre = steps.len();
    steps.extend_from_slice(times);

    let t0_sec = steps[0] * SECS_PER_DAY;
    let (heat0, _) = heating_and_opacity(t0_sec, xn0, params.kappa_r);
    let mut energy: Vec<f64> = shells.m.iter().map(|m| m * heat0 * t0_sec).collect();

    let mut lbol = Vec::with_capacity(times.len());
    let mut radii = Vec::with_capacity(times.len());
    let mut t_prev = t0_sec;

    for (k, &t_day) in steps.iter().enumerate() {
        let t_sec = t_day * SECS_PER_DAY;
        let dt = t_sec - t_prev;
        let (heat, kappa) = heating_and_opacity(t_sec, xn0, params.kappa_r);

        let mut l_total = 0.0;
        for i in 0..N_SHELLS {
            let v = shells.v[i];
            let t_rad = 3.0 * kappa * shells.m_ext[i]
                / (4.0 * std::f64::consts::PI * C_CGS * v * t_sec)
                + v * t_sec / C_CGS;
            if dt > 0.0 {
                energy[i] = (energy[i] + shells.m[i] * heat * dt)
                    / (1.0 + dt / t_sec + dt / t_rad);
            }
            l_total += energy[i] / t_rad;
        }

        if k >= n_pre {
            lbol.push(l_total);
            radii.push(shells.photosphere_radius(kappa, t_sec));
        }
        t_prev = t_sec;
    }

    Lightcurve::from_luminosity(times, lbol, &radii, params.t_floor)
}
