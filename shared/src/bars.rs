use crate::record::{Dataset, Metric};
use crate::scale::LinearScale;

/// Fill for the bar matching the currently selected year.
pub const CURRENT_YEAR_FILL: &str = "#008000";
/// Fill for every other bar.
pub const OTHER_YEAR_FILL: &str = "#808000";

const PADDING_TOP: f64 = 30.0;
const PADDING_RIGHT: f64 = 30.0;
const PADDING_BOTTOM: f64 = 30.0;
const PADDING_LEFT: f64 = 110.0;
const BAR_GAP: f64 = 1.0;

/// Drawing area for the bar chart in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub width: f64,
    pub height: f64,
}

/// One bar's geometry, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub year: i32,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Full bar-chart layout for one (country, metric) pair. The geometry is
/// cached by the renderer: a year change only swaps bar fills, it never
/// rebuilds this.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartLayout {
    pub bars: Vec<Bar>,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub title: String,
    pub axis_label: String,
}

pub fn bar_fill(bar_year: i32, current_year: i32) -> &'static str {
    if bar_year == current_year {
        CURRENT_YEAR_FILL
    } else {
        OTHER_YEAR_FILL
    }
}

/// Lay out one bar per year of the selected country's series, ascending.
///
/// The x domain spans the whole dataset's year extent so a short series sits
/// at its true position on the axis; the y domain tops out at the series'
/// own maximum for the metric. An empty `country` yields an empty chart with
/// a title prompting for a selection.
pub fn bar_layout(
    dataset: &Dataset,
    metric: Metric,
    country: &str,
    area: ChartArea,
) -> BarChartLayout {
    let series = if country.is_empty() {
        Vec::new()
    } else {
        dataset.country_series(country)
    };

    let (year_min, year_max) = dataset.year_extent();
    let x_scale = LinearScale::new(
        (year_min as f64, year_max as f64),
        (PADDING_LEFT, area.width - PADDING_RIGHT),
    );
    let max_value = series
        .iter()
        .filter_map(|r| r.value(metric))
        .fold(0.0f64, f64::max);
    let y_scale = LinearScale::new(
        (0.0, max_value),
        (area.height - PADDING_BOTTOM, PADDING_TOP),
    );

    // One year's width on the x axis, shared by every bar.
    let bar_width = x_scale.map(year_min as f64 + 1.0) - x_scale.map(year_min as f64);

    let baseline = area.height - PADDING_BOTTOM;
    let bars = series
        .iter()
        .filter_map(|record| {
            let value = record.value(metric)?;
            let year = record.year;
            let top = y_scale.map(value);
            Some(Bar {
                year,
                value,
                // Center the bar on its year tick.
                x: (x_scale.map(year as f64) + x_scale.map(year as f64 - 1.0)) / 2.0,
                y: top,
                width: (bar_width - BAR_GAP).max(1.0),
                height: baseline - top,
            })
        })
        .collect();

    let title = if country.is_empty() {
        "Click a country on the map to see its annual trend".to_string()
    } else {
        format!("Carbon dioxide emissions, {country}")
    };
    let axis_label = match metric {
        Metric::Emissions => "CO2 emissions, thousand metric tons".to_string(),
        Metric::EmissionsPerCapita => "CO2 emissions, metric tons per capita".to_string(),
    };

    BarChartLayout {
        bars,
        x_scale,
        y_scale,
        title,
        axis_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EmissionRecord;

    fn record(country: &str, year: i32, emissions: Option<f64>) -> EmissionRecord {
        EmissionRecord {
            continent: "Europe".into(),
            country: country.into(),
            country_code: "250".into(),
            emissions,
            emissions_per_capita: emissions.map(|v| v / 100.0),
            region: String::new(),
            year,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            record("France", 2012, Some(300.0)),
            record("France", 2010, Some(100.0)),
            record("France", 2011, Some(200.0)),
            record("Spain", 2000, Some(50.0)),
            record("Spain", 2014, Some(75.0)),
        ])
    }

    const AREA: ChartArea = ChartArea {
        width: 800.0,
        height: 300.0,
    };

    #[test]
    fn one_bar_per_year_sorted_ascending() {
        let layout = bar_layout(&dataset(), Metric::Emissions, "France", AREA);
        let years: Vec<i32> = layout.bars.iter().map(|b| b.year).collect();
        assert_eq!(years, vec![2010, 2011, 2012]);
    }

    #[test]
    fn empty_selection_is_an_empty_chart_with_prompt_title() {
        let layout = bar_layout(&dataset(), Metric::Emissions, "", AREA);
        assert!(layout.bars.is_empty());
        assert!(layout.title.contains("Click a country"));
    }

    #[test]
    fn selected_country_appears_in_the_title() {
        let layout = bar_layout(&dataset(), Metric::Emissions, "France", AREA);
        assert!(layout.title.contains("France"));
    }

    #[test]
    fn y_scale_tops_out_at_the_series_maximum() {
        let layout = bar_layout(&dataset(), Metric::Emissions, "France", AREA);
        assert_eq!(layout.y_scale.domain(), (0.0, 300.0));

        // The tallest bar reaches the top padding line.
        let tallest = layout
            .bars
            .iter()
            .max_by(|a, b| a.height.total_cmp(&b.height))
            .expect("bars");
        assert_eq!(tallest.year, 2012);
        assert!((tallest.y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn x_domain_spans_the_whole_dataset_extent() {
        let layout = bar_layout(&dataset(), Metric::Emissions, "France", AREA);
        assert_eq!(layout.x_scale.domain(), (2000.0, 2014.0));
    }

    #[test]
    fn years_without_a_value_get_no_bar() {
        let dataset = Dataset::new(vec![
            record("France", 2010, Some(100.0)),
            record("France", 2011, None),
            record("France", 2012, Some(300.0)),
        ]);
        let layout = bar_layout(&dataset, Metric::Emissions, "France", AREA);
        let years: Vec<i32> = layout.bars.iter().map(|b| b.year).collect();
        assert_eq!(years, vec![2010, 2012]);
    }

    #[test]
    fn axis_label_follows_the_metric() {
        let emissions = bar_layout(&dataset(), Metric::Emissions, "France", AREA);
        let per_capita = bar_layout(&dataset(), Metric::EmissionsPerCapita, "France", AREA);
        assert!(emissions.axis_label.contains("thousand metric tons"));
        assert!(per_capita.axis_label.contains("per capita"));
    }

    #[test]
    fn bar_fill_distinguishes_the_current_year() {
        assert_eq!(bar_fill(2010, 2010), CURRENT_YEAR_FILL);
        assert_eq!(bar_fill(2011, 2010), OTHER_YEAR_FILL);
    }

    #[test]
    fn layout_is_deterministic_for_equal_inputs() {
        let a = bar_layout(&dataset(), Metric::Emissions, "France", AREA);
        let b = bar_layout(&dataset(), Metric::Emissions, "France", AREA);
        assert_eq!(a, b);
    }
}
