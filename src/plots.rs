//! Diagnostic figures, written as SVG.
//!
//! Magnitude axes are drawn bright-side-up by plotting `-mag` and printing
//! the negated tick values.

use std::path::Path;

use plotters::prelude::*;

use crate::common::{distance_modulus, linspace, Band};
use crate::envelope::{Envelope, ResampledModel};
use crate::error::{Error, Result};
use crate::event::EventPhotometry;
use crate::model::ModelTable;
use crate::stats::histogram_density;

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const FONT: &str = "sans-serif";

fn plot_error(path: &Path, e: Box<dyn std::error::Error>) -> Error {
    Error::Plot(format!("{}: {e}", path.display()))
}

fn check_distance(distance_mpc: f64) -> Result<()> {
    if distance_mpc.is_finite() && distance_mpc > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDistance(distance_mpc))
    }
}

/// Rainbow colour map on [0, 1], blue to red.
pub fn rainbow(x: f64) -> RGBColor {
    let x = x.clamp(0.0, 1.0);
    let r = (2.0 * x - 0.5).abs().min(1.0);
    let g = (std::f64::consts::PI * x).sin();
    let b = (std::f64::consts::FRAC_PI_2 * x).cos();
    RGBColor((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

pub fn spread_colors(n: usize) -> Vec<RGBColor> {
    linspace(0.0, 1.0, n).into_iter().map(rainbow).collect()
}

fn neg_label(v: &f64) -> String {
    format!("{:.0}", -v)
}

fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return None;
    }
    if lo == hi {
        return Some((lo - 0.5, hi + 0.5));
    }
    Some((lo, hi))
}

fn padded(range: (f64, f64), frac: f64) -> (f64, f64) {
    let pad = (range.1 - range.0) * frac;
    (range.0 - pad, range.1 + pad)
}

/// Closed outline of the region between `lower` and `upper`.
fn band_polygon(
    times: &[f64],
    lower: &[f64],
    upper: &[f64],
    map: impl Fn(f64) -> f64,
) -> Vec<(f64, f64)> {
    let mut pts: Vec<(f64, f64)> = times
        .iter()
        .zip(upper)
        .filter(|(_, v)| v.is_finite())
        .map(|(&t, &v)| (t, map(v)))
        .collect();
    let lower_pts: Vec<(f64, f64)> = times
        .iter()
        .zip(lower)
        .filter(|(_, v)| v.is_finite())
        .map(|(&t, &v)| (t, map(v)))
        .collect();
    pts.extend(lower_pts.into_iter().rev());
    pts
}

fn windowed(times: &[f64], env: &Envelope, t_max: f64) -> (Vec<f64>, Envelope) {
    let n = times.iter().take_while(|&&t| t <= t_max).count();
    (
        times[..n].to_vec(),
        Envelope {
            min: env.min[..n].to_vec(),
            median: env.median[..n].to_vec(),
            max: env.max[..n].to_vec(),
        },
    )
}

// ---------------------------------------------------------------------------
// All lightcurves
// ---------------------------------------------------------------------------

/// Every accepted sample's lightcurve in all bands.
pub fn plot_all_lightcurves(path: &Path, models: &[ResampledModel]) -> Result<()> {
    draw_all_lightcurves(path, models).map_err(|e| plot_error(path, e))
}

fn draw_all_lightcurves(path: &Path, models: &[ResampledModel]) -> DrawResult<()> {
    let colors = spread_colors(Band::ALL.len());
    let (t_lo, t_hi) = models
        .first()
        .and_then(|m| finite_range(m.times.iter().copied()))
        .unwrap_or((0.0, 50.0));
    let (y_lo, y_hi) = finite_range(
        models
            .iter()
            .flat_map(|m| m.mags.iter().flat_map(|a| a.iter().map(|v| -v))),
    )
    .map(|r| padded(r, 0.05))
    .unwrap_or((10.0, 18.0));

    let root = SVGBackend::new(path, (1000, 750)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(t_lo..t_hi, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("Time [days]")
        .y_desc("Absolute AB Magnitude")
        .y_label_formatter(&neg_label)
        .label_style((FONT, 16))
        .draw()?;

    for (ii, model) in models.iter().enumerate() {
        for jj in 0..model.n_accepted() {
            for (band, &color) in Band::ALL.iter().zip(&colors) {
                let row = model.band(*band).row(jj);
                let series = chart.draw_series(LineSeries::new(
                    model.times.iter().zip(row.iter()).map(|(&t, &m)| (t, -m)),
                    color.mix(0.2),
                ))?;
                if ii == 0 && jj == 0 {
                    series
                        .label(band.name())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                }
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Peak i-band magnitude
// ---------------------------------------------------------------------------

/// Peak time vs apparent peak i-band magnitude, coloured by log10 ejecta mass.
pub fn plot_peak_i(path: &Path, tables: &[ModelTable], distance_mpc: f64) -> Result<()> {
    check_distance(distance_mpc)?;
    draw_peak_i(path, tables, distance_mpc).map_err(|e| plot_error(path, e))
}

fn draw_peak_i(path: &Path, tables: &[ModelTable], distance_mpc: f64) -> DrawResult<()> {
    let offset = distance_modulus(distance_mpc).floor();
    let points: Vec<(f64, f64, f64)> = tables
        .iter()
        .flat_map(|t| t.rows.iter())
        .filter_map(|row| {
            let peak = row.peak(Band::I)?;
            let log_mej = row.ejecta.mej.log10();
            (peak.t.is_finite() && peak.mag.is_finite() && log_mej.is_finite())
                .then_some((peak.t, peak.mag + offset, log_mej))
        })
        .collect();

    let (x_lo, x_hi) = finite_range(points.iter().map(|p| p.0))
        .map(|r| padded(r, 0.05))
        .unwrap_or((0.0, 14.0));
    let (y_lo, y_hi) = finite_range(points.iter().map(|p| -p.1))
        .map(|r| padded(r, 0.05))
        .unwrap_or((-25.0, -15.0));
    let (c_lo, c_hi) = finite_range(points.iter().map(|p| p.2)).unwrap_or((-3.0, -1.0));
    let color_of = |v: f64| rainbow((v - c_lo) / (c_hi - c_lo));

    let root = SVGBackend::new(path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(860);

    let mut chart = ChartBuilder::on(&left)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("Peak time [days]")
        .y_desc("Peak i-band magnitude")
        .y_label_formatter(&|v| format!("{:.1}", -v))
        .label_style((FONT, 16))
        .draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|&(t, m, c)| Circle::new((t, -m), 4, color_of(c).filled())),
    )?;

    let mut bar = ChartBuilder::on(&right)
        .margin_top(15)
        .margin_bottom(60)
        .margin_right(10)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, c_lo..c_hi)?;
    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc("log10 Mej [Msun]")
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;
    let steps = linspace(c_lo, c_hi, 101);
    bar.draw_series(steps.windows(2).map(|w| {
        Rectangle::new(
            [(0.0, w[0]), (1.0, w[1])],
            color_of(0.5 * (w[0] + w[1])).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-band panels
// ---------------------------------------------------------------------------

const PANEL_T_MAX: f64 = 14.0;
const PANEL_MAG_BRIGHT: f64 = -18.0;
const PANEL_MAG_FAINT: f64 = -10.0;

/// Median and min-max envelope per model in each band, with the event's
/// photometry overlaid when given.
pub fn plot_mag_panels(
    path: &Path,
    models: &[ResampledModel],
    event: Option<&EventPhotometry>,
    distance_mpc: f64,
) -> Result<()> {
    check_distance(distance_mpc)?;
    draw_mag_panels(path, models, event, distance_mpc).map_err(|e| plot_error(path, e))
}

fn draw_mag_panels(
    path: &Path,
    models: &[ResampledModel],
    event: Option<&EventPhotometry>,
    distance_mpc: f64,
) -> DrawResult<()> {
    let model_colors = spread_colors(models.len());
    let offset = distance_modulus(distance_mpc).floor();
    let (y_lo, y_hi) = (-PANEL_MAG_FAINT, -PANEL_MAG_BRIGHT);
    let clip = |m: f64| (-m).clamp(y_lo, y_hi);

    let root = SVGBackend::new(path, (1000, 2400)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((Band::PANELS.len(), 1));
    let last = Band::PANELS.len() - 1;

    for (idx, (area, band)) in panels.iter().zip(Band::PANELS).enumerate() {
        let mut chart = ChartBuilder::on(area)
            .margin(8)
            .x_label_area_size(if idx == last { 50 } else { 20 })
            .y_label_area_size(70)
            .right_y_label_area_size(60)
            .build_cartesian_2d(0.0..PANEL_T_MAX, y_lo..y_hi)?
            .set_secondary_coord(0.0..PANEL_T_MAX, (y_lo - offset)..(y_hi - offset));

        let mut mesh = chart.configure_mesh();
        mesh.y_desc(band.name())
            .y_labels(5)
            .y_label_formatter(&neg_label)
            .axis_desc_style((FONT, 28))
            .label_style((FONT, 18));
        if idx == last {
            mesh.x_desc("Time [days]");
        }
        mesh.draw()?;
        chart
            .configure_secondary_axes()
            .y_labels(5)
            .y_label_formatter(&neg_label)
            .label_style((FONT, 18))
            .draw()?;

        if let Some(points) = event.and_then(|e| e.band(band.name())) {
            let visible: Vec<_> = points
                .into_iter()
                .filter(|p| (0.0..=PANEL_T_MAX).contains(&p.t))
                .collect();
            chart.draw_series(visible.iter().filter(|p| !p.is_upper_limit()).map(|p| {
                ErrorBar::new_vertical(
                    p.t,
                    clip(p.mag + p.mag_err),
                    clip(p.mag),
                    clip(p.mag - p.mag_err),
                    BLACK.filled(),
                    6,
                )
            }))?;
            chart.draw_series(
                visible
                    .iter()
                    .filter(|p| !p.is_upper_limit())
                    .map(|p| Circle::new((p.t, clip(p.mag)), 4, BLACK.filled())),
            )?;
            chart.draw_series(
                visible
                    .iter()
                    .filter(|p| p.is_upper_limit())
                    .map(|p| TriangleMarker::new((p.t, clip(p.mag)), 6, BLACK.filled())),
            )?;
        }

        for (model, &color) in models.iter().zip(&model_colors) {
            if model.n_accepted() == 0 {
                continue;
            }
            let (times, env) = windowed(&model.times, &model.band_envelope(band), PANEL_T_MAX);
            chart.draw_series(std::iter::once(Polygon::new(
                band_polygon(&times, &env.min, &env.max, clip),
                color.mix(0.2).filled(),
            )))?;
            let series = chart.draw_series(DashedLineSeries::new(
                times.iter().zip(&env.median).map(|(&t, &m)| (t, clip(m))),
                8,
                5,
                color.stroke_width(2),
            ))?;
            if idx == 0 {
                series.label(model.model.legend()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }

        if idx == 0 && !models.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .label_font((FONT, 20))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// Envelope of the `b1 - b2` colour for each model.
pub fn plot_color(path: &Path, models: &[ResampledModel], b1: Band, b2: Band) -> Result<()> {
    draw_color(path, models, b1, b2).map_err(|e| plot_error(path, e))
}

fn draw_color(path: &Path, models: &[ResampledModel], b1: Band, b2: Band) -> DrawResult<()> {
    let colors = spread_colors(models.len());
    let envelopes: Vec<(Vec<f64>, Envelope)> = models
        .iter()
        .map(|m| windowed(&m.times, &m.color_envelope(b1, b2), PANEL_T_MAX))
        .collect();
    let (y_lo, y_hi) = finite_range(
        envelopes
            .iter()
            .flat_map(|(_, e)| e.min.iter().chain(&e.max).map(|v| -v)),
    )
    .map(|r| padded(r, 0.05))
    .unwrap_or((-1.0, 1.0));

    let root = SVGBackend::new(path, (1000, 750)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..PANEL_T_MAX, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("Time [days]")
        .y_desc(format!("Absolute AB Magnitude [{b1}-{b2}]"))
        .y_label_formatter(&|v| format!("{:.1}", -v))
        .label_style((FONT, 16))
        .draw()?;

    for ((model, (times, env)), &color) in models.iter().zip(&envelopes).zip(&colors) {
        if model.n_accepted() == 0 {
            continue;
        }
        chart.draw_series(std::iter::once(Polygon::new(
            band_polygon(times, &env.min, &env.max, |v| -v),
            color.mix(0.2).filled(),
        )))?;
        chart
            .draw_series(LineSeries::new(
                times.iter().zip(&env.median).map(|(&t, &m)| (t, -m)),
                color.stroke_width(2),
            ))?
            .label(model.model.legend())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Bolometric luminosity
// ---------------------------------------------------------------------------

pub fn plot_lbol(path: &Path, models: &[ResampledModel]) -> Result<()> {
    draw_lbol(path, models).map_err(|e| plot_error(path, e))
}

fn draw_lbol(path: &Path, models: &[ResampledModel]) -> DrawResult<()> {
    let colors = spread_colors(models.len());
    let envelopes: Vec<Envelope> = models.iter().map(|m| m.lbol_envelope()).collect();
    let (t_lo, t_hi) = models
        .first()
        .and_then(|m| finite_range(m.times.iter().copied().filter(|&t| t > 0.0)))
        .unwrap_or((0.1, 50.0));
    let (l_lo, l_hi) = finite_range(
        envelopes
            .iter()
            .flat_map(|e| e.min.iter().chain(&e.max).copied())
            .filter(|&l| l > 0.0),
    )
    .unwrap_or((1e38, 1e42));
    let positive = |l: f64| if l > 0.0 { l } else { l_lo };

    let root = SVGBackend::new(path, (1000, 750)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d((t_lo..t_hi).log_scale(), (l_lo..l_hi).log_scale())?;
    chart
        .configure_mesh()
        .x_desc("Time [days]")
        .y_desc("Bolometric Luminosity [erg/s]")
        .y_label_formatter(&|v| format!("{v:.0e}"))
        .label_style((FONT, 16))
        .draw()?;

    for ((model, env), &color) in models.iter().zip(&envelopes).zip(&colors) {
        if model.n_accepted() == 0 {
            continue;
        }
        chart.draw_series(std::iter::once(Polygon::new(
            band_polygon(&model.times, &env.min, &env.max, positive),
            color.mix(0.2).filled(),
        )))?;
        chart
            .draw_series(LineSeries::new(
                model
                    .times
                    .iter()
                    .zip(&env.median)
                    .map(|(&t, &l)| (t, positive(l))),
                color.stroke_width(2),
            ))?
            .label(model.model.legend())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parameter distributions
// ---------------------------------------------------------------------------

/// One density curve of a distribution plot.
pub struct DensityCurve {
    pub label: Option<String>,
    pub color: RGBColor,
    pub samples: Vec<f64>,
    pub dashed: bool,
}

/// Axis ranges and labels of a distribution plot.
pub struct DensityAxes<'a> {
    pub x_desc: &'a str,
    pub bounds: (f64, f64),
    pub y_range: (f64, f64),
}

const HIST_EDGES: usize = 25;

/// Histogram densities on a logarithmic y axis.
pub fn plot_densities(path: &Path, curves: &[DensityCurve], axes: &DensityAxes<'_>) -> Result<()> {
    draw_densities(path, curves, axes).map_err(|e| plot_error(path, e))
}

fn draw_densities(path: &Path, curves: &[DensityCurve], axes: &DensityAxes<'_>) -> DrawResult<()> {
    let (x_lo, x_hi) = axes.bounds;
    let (y_lo, y_hi) = axes.y_range;

    let root = SVGBackend::new(path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(55)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, (y_lo..y_hi).log_scale())?;
    chart
        .configure_mesh()
        .x_desc(axes.x_desc)
        .y_desc("Probability Density Function")
        .axis_desc_style((FONT, 24))
        .label_style((FONT, 20))
        .draw()?;

    for curve in curves {
        let (centers, density) = histogram_density(&curve.samples, HIST_EDGES, Some(axes.bounds));
        let pts: Vec<(f64, f64)> = centers
            .into_iter()
            .zip(density)
            .map(|(x, d)| (x, d.clamp(y_lo, y_hi)))
            .collect();
        let color = curve.color;
        let series = if curve.dashed {
            chart.draw_series(DashedLineSeries::new(pts, 10, 6, color.stroke_width(3)))?
        } else {
            chart.draw_series(LineSeries::new(pts, color.stroke_width(3)))?
        };
        if let Some(label) = &curve.label {
            series
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 22))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rainbow_ends() {
        let blue_end = rainbow(0.0);
        let red_end = rainbow(1.0);
        assert!(blue_end.2 > blue_end.0, "start should be blue-ish: {blue_end:?}");
        assert!(red_end.0 > red_end.2, "end should be red-ish: {red_end:?}");
    }

    #[test]
    fn polygon_closes_over_both_edges() {
        let t = [0.0, 1.0, 2.0];
        let pts = band_polygon(&t, &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], |v| v);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], (0.0, 4.0));
        assert_eq!(pts[5], (0.0, 1.0));
    }
}
