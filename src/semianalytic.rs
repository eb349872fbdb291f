//! Semi-analytic kilonova of a wedge-shaped, homologously expanding ejecta.
//!
//! Mass is spread uniformly in velocity. At each time the layer outside the
//! diffusion front radiates its radioactive heating; with `flgbct` set, the
//! energy stored in material that the receding front uncovers is released
//! as well.

use crate::common::{C_CGS, MSUN_CGS, SECS_PER_DAY};
use crate::config::ModelParameters;
use crate::ejecta::Ejecta;
use crate::model::Lightcurve;

const BISECTION_STEPS: usize = 60;

/// Ejecta geometry in CGS units.
#[derive(Debug, Clone, Copy)]
struct Wedge {
    vlo: f64,
    vhi: f64,
    /// Mass per unit velocity [g / (cm/s)]
    dmdv: f64,
    /// Solid angle covered by the ejecta [sr]
    omega: f64,
    kappa: f64,
}

impl Wedge {
    fn new(ejecta: &Ejecta, params: &ModelParameters) -> Option<Self> {
        if !(ejecta.mej > 0.0 && ejecta.vej > 0.0) || !ejecta.mej.is_finite() {
            return None;
        }
        let (mut vlo, mut vhi) = (params.vmin, 2.0 * ejecta.vej - params.vmin);
        if vhi <= vlo {
            vlo = 0.5 * ejecta.vej;
            vhi = 1.5 * ejecta.vej;
        }
        let vlo = vlo * C_CGS;
        let vhi = vhi * C_CGS;
        let omega = 4.0 * params.ph * params.th.sin();
        if omega <= 0.0 || params.kappa <= 0.0 {
            return None;
        }
        Some(Self {
            vlo,
            vhi,
            dmdv: ejecta.mej * MSUN_CGS / (vhi - vlo),
            omega,
            kappa: params.kappa,
        })
    }

    /// Optical depth from velocity coordinate `v` to the outer edge.
    fn tau(&self, v: f64, t_sec: f64) -> f64 {
        self.kappa * self.dmdv * (1.0 / v - 1.0 / self.vhi) / (self.omega * t_sec * t_sec)
    }

    /// Innermost velocity whose photons diffuse out within `t_sec`.
    fn diffusion_front(&self, t_sec: f64) -> f64 {
        let excess = |v: f64| self.tau(v, t_sec) * (self.vhi - v) - C_CGS;
        if excess(self.vlo) <= 0.0 {
            return self.vlo;
        }
        let (mut lo, mut hi) = (self.vlo, self.vhi);
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if excess(mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        hi
    }

    /// Velocity where the optical depth reaches unity, floored at `vlo`.
    fn photosphere_velocity(&self, t_sec: f64) -> f64 {
        let v = 1.0 / (1.0 / self.vhi + self.omega * t_sec * t_sec / (self.kappa * self.dmdv));
        v.max(self.vlo)
    }
}

/// Radioactive heating rate per gram [erg/g/s].
pub fn heating_rate(t_day: f64, params: &ModelParameters) -> f64 {
    params.eps * params.eth * t_day.powf(-params.alp)
}

/// Lightcurve of the wedge model evaluated at `times` [days].
pub fn semianalytic_lightcurve(
    ejecta: &Ejecta,
    params: &ModelParameters,
    times: &[f64],
) -> Lightcurve {
    let Some(wedge) = Wedge::new(ejecta, params) else {
        return Lightcurve::dark(times);
    };
    let n = times.len();

    let diffusing_mass: Vec<f64> = times
        .iter()
        .map(|&t| wedge.dmdv * (wedge.vhi - wedge.diffusion_front(t * SECS_PER_DAY)))
        .collect();

    let mut lbol = Vec::with_capacity(n);
    let mut radii = Vec::with_capacity(n);
    for i in 0..n {
        let t_day = times[i];
        let t_sec = t_day * SECS_PER_DAY;
        let heat = heating_rate(t_day, params);
        let mut l = heat * diffusing_mass[i];

        if params.flgbct && n > 1 {
            let (a, b) = (i.saturating_sub(1), (i + 1).min(n - 1));
            let dm_dt = (diffusing_mass[b] - diffusing_mass[a])
                / ((times[b] - times[a]) * SECS_PER_DAY);
            // heating accumulated since t=0, diluted by adiabatic expansion
            let e_int = if params.alp < 2.0 {
                heat * t_sec / (2.0 - params.alp)
            } else {
                heat * t_sec
            };
            l += dm_dt.max(0.0) * e_int;
        }

        lbol.push(l);
        radii.push(wedge.photosphere_velocity(t_sec) * t_sec);
    }

    Lightcurve::from_luminosity(times, lbol, &radii, params.t_floor)
}
