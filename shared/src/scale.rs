use crate::record::Metric;

pub type Rgb = (u8, u8, u8);

/// Neutral fill for countries with no record in the selected year.
pub const NO_DATA_FILL: &str = "#ccc";

/// Map fill hues, darkest to brightest.
const MAP_RANGE: [Rgb; 4] = [(0, 0, 128), (0, 0, 255), (0, 128, 128), (0, 255, 255)];

const EMISSIONS_DOMAIN: [f64; 4] = [0.0, 2.5e5, 1.0e6, 5.0e6];
const PER_CAPITA_DOMAIN: [f64; 4] = [0.0, 0.5, 2.0, 10.0];

pub fn rgb_css(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color.0, color.1, color.2)
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let t = t.clamp(0.0, 1.0);
    let value = a as f64 + (b as f64 - a as f64) * t;
    value.round().clamp(0.0, 255.0) as u8
}

/// Piecewise-linear color scale over fixed (value, color) stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<(f64, Rgb)>,
}

impl ColorScale {
    pub fn new(stops: Vec<(f64, Rgb)>) -> Self {
        debug_assert!(stops.windows(2).all(|w| w[0].0 <= w[1].0));
        Self { stops }
    }

    /// The choropleth scale for a metric: the metric picks the domain, the
    /// hue range is shared.
    pub fn for_metric(metric: Metric) -> Self {
        let domain = match metric {
            Metric::Emissions => EMISSIONS_DOMAIN,
            Metric::EmissionsPerCapita => PER_CAPITA_DOMAIN,
        };
        Self::new(domain.into_iter().zip(MAP_RANGE).collect())
    }

    /// Interpolate the color for a value, clamped to the outer stops.
    pub fn color(&self, value: f64) -> Rgb {
        let Some(&(first_pos, first_color)) = self.stops.first() else {
            return (0, 0, 0);
        };
        if value <= first_pos {
            return first_color;
        }
        for window in self.stops.windows(2) {
            let (left_pos, left_color) = window[0];
            let (right_pos, right_color) = window[1];
            if value <= right_pos {
                let span = (right_pos - left_pos).max(f64::EPSILON);
                let t = (value - left_pos) / span;
                return (
                    lerp_u8(left_color.0, right_color.0, t),
                    lerp_u8(left_color.1, right_color.1, t),
                    lerp_u8(left_color.2, right_color.2, t),
                );
            }
        }
        self.stops.last().map(|&(_, c)| c).unwrap_or((0, 0, 0))
    }

    pub fn css(&self, value: f64) -> String {
        rgb_css(self.color(value))
    }
}

/// Two-point linear scale mapping a data domain onto a pixel range.
/// The range may be inverted (canvas y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() < f64::EPSILON {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Round tick positions covering the domain, stepped by 1/2/5 × 10^k so
    /// roughly `count` ticks land on axis-friendly values.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        let span = hi - lo;
        if span <= 0.0 || count == 0 {
            return vec![lo];
        }

        let raw_step = span / count as f64;
        let magnitude = 10f64.powf(raw_step.log10().floor());
        let residual = raw_step / magnitude;
        let step = if residual >= 5.0 {
            10.0 * magnitude
        } else if residual >= 2.0 {
            5.0 * magnitude
        } else if residual >= 1.0 {
            2.0 * magnitude
        } else {
            magnitude
        };

        let start = (lo / step).ceil();
        let end = (hi / step).floor();
        (start as i64..=end as i64)
            .map(|i| i as f64 * step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_scales_hit_their_stops_exactly() {
        let emissions = ColorScale::for_metric(Metric::Emissions);
        assert_eq!(emissions.color(0.0), (0, 0, 128));
        assert_eq!(emissions.color(2.5e5), (0, 0, 255));
        assert_eq!(emissions.color(1.0e6), (0, 128, 128));
        assert_eq!(emissions.color(5.0e6), (0, 255, 255));

        let per_capita = ColorScale::for_metric(Metric::EmissionsPerCapita);
        assert_eq!(per_capita.color(0.5), (0, 0, 255));
        assert_eq!(per_capita.color(10.0), (0, 255, 255));
    }

    #[test]
    fn values_between_stops_interpolate_linearly() {
        let scale = ColorScale::for_metric(Metric::EmissionsPerCapita);
        assert_eq!(scale.color(0.25), (0, 0, 192));
    }

    #[test]
    fn values_beyond_the_domain_clamp_to_outer_stops() {
        let scale = ColorScale::for_metric(Metric::Emissions);
        assert_eq!(scale.color(-10.0), (0, 0, 128));
        assert_eq!(scale.color(9.9e9), (0, 255, 255));
    }

    #[test]
    fn metric_switch_changes_the_domain_not_the_hues() {
        let a = ColorScale::for_metric(Metric::Emissions);
        let b = ColorScale::for_metric(Metric::EmissionsPerCapita);
        assert_ne!(a, b);
        assert_eq!(a.color(0.0), b.color(0.0));
        assert_eq!(a.color(5.0e6), b.color(10.0));
    }

    #[test]
    fn rgb_css_formats_for_canvas_fill() {
        assert_eq!(rgb_css((0, 128, 128)), "rgb(0, 128, 128)");
    }

    #[test]
    fn linear_scale_maps_and_inverts_ranges() {
        let scale = LinearScale::new((0.0, 100.0), (300.0, 0.0));
        assert!((scale.map(0.0) - 300.0).abs() < 1e-9);
        assert!((scale.map(100.0) - 0.0).abs() < 1e-9);
        assert!((scale.map(50.0) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let scale = LinearScale::new((5.0, 5.0), (0.0, 100.0));
        assert_eq!(scale.map(5.0), 0.0);
    }

    #[test]
    fn ticks_land_on_round_values_inside_the_domain() {
        let scale = LinearScale::new((0.0, 97.0), (0.0, 1.0));
        let ticks = scale.ticks(5);
        assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn ticks_handle_inverted_pixel_ranges() {
        let scale = LinearScale::new((2000.0, 2014.0), (400.0, 40.0));
        let ticks = scale.ticks(7);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|t| (2000.0..=2014.0).contains(t)));
    }
}
