#![allow(dead_code)]
//! Synthetic posterior samples and event photometry for tests.
//!
//! Masses scatter around a GW170817-like chirp mass.

const CHIRP_MASS: f64 = 1.188;

/// Simple xorshift64 PRNG for reproducible tests without extra dependencies.
struct Rng64 {
    state: u64,
}

impl Rng64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform [0, 1)
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / ((1u64 << 53) as f64)
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.uniform()
    }
}

fn component_masses(rng: &mut Rng64) -> (f64, f64) {
    let q: f64 = rng.range(0.75, 1.0);
    let m1 = CHIRP_MASS * (1.0 + q).powf(0.2) * q.powf(-0.6);
    (m1, q * m1)
}

/// Posterior table with `m1 m2 lambda1 lambda2 chi_eff` columns.
///
/// When `shuffle_order` is set, every other row lists the lighter body first.
pub fn posterior_components(n: usize, seed: u64, shuffle_order: bool) -> String {
    let mut rng = Rng64::new(seed);
    let mut out = String::from("m1 m2 lambda1 lambda2 chi_eff\n");
    for i in 0..n {
        let (m1, m2) = component_masses(&mut rng);
        let lambda1 = rng.range(150.0, 500.0);
        let lambda2 = lambda1 * (m1 / m2).powi(6);
        let chi = rng.range(-0.02, 0.05);
        if shuffle_order && i % 2 == 1 {
            out.push_str(&format!("{m2:.6} {m1:.6} {lambda2:.4} {lambda1:.4} {chi:.5}\n"));
        } else {
            out.push_str(&format!("{m1:.6} {m2:.6} {lambda1:.4} {lambda2:.4} {chi:.5}\n"));
        }
    }
    out
}

/// Posterior table with `mc q lambdat dlambdat` columns.
pub fn posterior_tilde(n: usize, seed: u64) -> String {
    let mut rng = Rng64::new(seed);
    let mut out = String::from("# mc q lambdat dlambdat\n");
    for _ in 0..n {
        let q = rng.range(0.75, 1.0);
        let lambdat = rng.range(200.0, 600.0);
        let dlambdat = rng.range(-20.0, 20.0);
        out.push_str(&format!("{CHIRP_MASS:.4} {q:.5} {lambdat:.3} {dlambdat:.3}\n"));
    }
    out
}

/// A handful of AT2017gfo-like detections plus one upper limit, in apparent
/// magnitudes with MJD and ISO timestamps mixed.
pub fn event_photometry() -> String {
    [
        "# time filter mag mag_err",
        "57983.00 g 17.40 0.05",
        "57984.00 g 18.60 0.08",
        "57983.00 i 17.10 0.04",
        "2017-08-19T12:00:00 i 17.60 0.05",
        "57986.00 i 18.40 0.07",
        "57983.50 K 17.80 0.10",
        "57990.00 g 21.00 inf",
    ]
    .join("\n")
}
