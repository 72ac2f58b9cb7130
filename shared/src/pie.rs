use std::f64::consts::TAU;

use crate::record::{EmissionRecord, Metric};

/// Fixed ordinal palette for continents, assigned in order of first
/// appearance in the year's rows and cycled if the data ever grows past it.
pub const CONTINENT_PALETTE: [&str; 5] = ["#FE0505", "#FE1C05", "#FE5C05", "#FE8505", "#FE9C05"];

/// One pie arc. Angles are measured clockwise from 12 o'clock in `0..=TAU`,
/// the convention the canvas renderer converts from when drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice<'a> {
    pub record: &'a EmissionRecord,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice<'_> {
    pub fn angle_span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Arc span as a share of the full circle, formatted to two decimals.
    pub fn percentage_label(&self) -> String {
        format!("{:.2}%", 100.0 * self.angle_span() / TAU)
    }
}

/// Lay out one arc per record, angle proportional to `emissions` only — the
/// dashboard's metric switch deliberately does not reach the pie.
///
/// Ordering is stable: continents lexically, then ascending emissions within
/// a continent. Rows with no emissions value are absent, so a year that is
/// missing a whole continent simply omits it.
pub fn pie_layout<'a>(rows: &[&'a EmissionRecord]) -> Vec<PieSlice<'a>> {
    let mut included: Vec<(&EmissionRecord, f64)> = rows
        .iter()
        .filter_map(|r| r.value(Metric::Emissions).map(|v| (*r, v)))
        .collect();
    included.sort_by(|(a, av), (b, bv)| {
        a.continent
            .cmp(&b.continent)
            .then_with(|| av.total_cmp(bv))
    });

    let total: f64 = included.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut slices = Vec::with_capacity(included.len());
    let mut angle = 0.0;
    for (record, value) in included {
        let span = value / total * TAU;
        slices.push(PieSlice {
            record,
            start_angle: angle,
            end_angle: angle + span,
        });
        angle += span;
    }

    // Absorb accumulated floating error so the last arc closes the circle.
    if let Some(last) = slices.last_mut() {
        last.end_angle = TAU;
    }
    slices
}

/// Continent → color assignments for a year's rows, keyed by order of first
/// appearance in source order, before layout sorting.
pub fn continent_colors(rows: &[&EmissionRecord]) -> Vec<(String, &'static str)> {
    let mut assignments: Vec<(String, &'static str)> = Vec::new();
    for row in rows {
        if !assignments.iter().any(|(c, _)| c == &row.continent) {
            let color = CONTINENT_PALETTE[assignments.len() % CONTINENT_PALETTE.len()];
            assignments.push((row.continent.clone(), color));
        }
    }
    assignments
}

pub fn color_for_continent<'a>(
    assignments: &'a [(String, &'static str)],
    continent: &str,
) -> &'a str {
    assignments
        .iter()
        .find(|(c, _)| c == continent)
        .map(|(_, color)| *color)
        .unwrap_or(CONTINENT_PALETTE[0])
}
