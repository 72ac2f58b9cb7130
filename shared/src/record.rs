use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DataError;

/// The emissions quantity currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Emissions,
    EmissionsPerCapita,
}

impl Metric {
    /// Display label, e.g. for tooltips and table headers.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Emissions => "Emissions",
            Metric::EmissionsPerCapita => "Emissions Per Capita",
        }
    }

    /// Units suffix appended to formatted values.
    pub fn units(self) -> &'static str {
        match self {
            Metric::Emissions => "thousand metric tons",
            Metric::EmissionsPerCapita => "metric tons per capita",
        }
    }

    /// Value attribute used by the metric radio group.
    pub fn as_input_value(self) -> &'static str {
        match self {
            Metric::Emissions => "emissions",
            Metric::EmissionsPerCapita => "emissionsPerCapita",
        }
    }

    pub fn from_input_value(value: &str) -> Option<Self> {
        match value {
            "emissions" => Some(Metric::Emissions),
            "emissionsPerCapita" => Some(Metric::EmissionsPerCapita),
            _ => None,
        }
    }
}

/// One row of the emissions dataset: a single (country, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    #[serde(rename = "Continent")]
    pub continent: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Country Code")]
    pub country_code: String,
    #[serde(rename = "Emissions", default, deserialize_with = "blank_as_missing")]
    pub emissions: Option<f64>,
    #[serde(
        rename = "Emissions Per Capita",
        default,
        deserialize_with = "blank_as_missing"
    )]
    pub emissions_per_capita: Option<f64>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Year")]
    pub year: i32,
}

impl EmissionRecord {
    /// The record's value for a metric, or `None` when the source had no
    /// observation. A stored zero also counts as "no data": the upstream
    /// dataset uses it interchangeably with a blank cell.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let raw = match metric {
            Metric::Emissions => self.emissions,
            Metric::EmissionsPerCapita => self.emissions_per_capita,
        };
        raw.filter(|v| *v > 0.0)
    }
}

/// Numeric cells arrive as numbers (JSON) or strings (CSV); a blank or
/// whitespace-only string means the observation is missing.
fn blank_as_missing<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(v)) => Ok(Some(v)),
        Some(Raw::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
    }
}

/// The full emissions dataset, immutable after construction.
///
/// Holds at most one record per (country, year); later duplicates from the
/// source are dropped and counted so the loader can warn about them.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<EmissionRecord>,
    by_code_year: HashMap<(String, i32), usize>,
    year_min: i32,
    year_max: i32,
    duplicates_dropped: usize,
}

impl Dataset {
    pub fn new(rows: Vec<EmissionRecord>) -> Self {
        let mut records = Vec::with_capacity(rows.len());
        let mut seen: HashSet<(String, i32)> = HashSet::with_capacity(rows.len());
        let mut duplicates_dropped = 0usize;

        for row in rows {
            if seen.insert((row.country.clone(), row.year)) {
                records.push(row);
            } else {
                duplicates_dropped += 1;
            }
        }

        let mut by_code_year = HashMap::with_capacity(records.len());
        let mut year_min = i32::MAX;
        let mut year_max = i32::MIN;
        for (idx, record) in records.iter().enumerate() {
            by_code_year
                .entry((record.country_code.clone(), record.year))
                .or_insert(idx);
            year_min = year_min.min(record.year);
            year_max = year_max.max(record.year);
        }

        if records.is_empty() {
            year_min = 0;
            year_max = 0;
        }

        Self {
            records,
            by_code_year,
            year_min,
            year_max,
            duplicates_dropped,
        }
    }

    /// Decode the tabular dataset from CSV bytes.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<EmissionRecord>, _>>()?;
        if rows.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        Ok(Self::new(rows))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[EmissionRecord] {
        &self.records
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Inclusive (min, max) year range across all records.
    pub fn year_extent(&self) -> (i32, i32) {
        (self.year_min, self.year_max)
    }

    /// The record for a boundary code in a given year, if observed.
    pub fn record_for(&self, country_code: &str, year: i32) -> Option<&EmissionRecord> {
        self.by_code_year
            .get(&(country_code.to_string(), year))
            .map(|&idx| &self.records[idx])
    }

    /// Country display name for a boundary code, from any year's record.
    pub fn country_name(&self, country_code: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.country_code == country_code)
            .map(|r| r.country.as_str())
    }

    /// All records observed in a year, in source order.
    pub fn records_for_year(&self, year: i32) -> Vec<&EmissionRecord> {
        self.records.iter().filter(|r| r.year == year).collect()
    }

    /// A country's full time series, sorted by ascending year.
    pub fn country_series(&self, country: &str) -> Vec<&EmissionRecord> {
        let mut series: Vec<&EmissionRecord> = self
            .records
            .iter()
            .filter(|r| r.country == country)
            .collect();
        series.sort_by_key(|r| r.year);
        series
    }
}

/// Decode the dataset's JSON form (used by the data table). Accepts either a
/// bare array of rows or an object wrapping them under `data`.
pub fn parse_json_rows(text: &str) -> Result<Vec<EmissionRecord>, DataError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Body {
        Rows(Vec<EmissionRecord>),
        Wrapped { data: Vec<EmissionRecord> },
    }

    let rows = match serde_json::from_str::<Body>(text)? {
        Body::Rows(rows) => rows,
        Body::Wrapped { data } => data,
    };
    if rows.is_empty() {
        return Err(DataError::EmptyDataset);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, code: &str, year: i32, emissions: Option<f64>) -> EmissionRecord {
        EmissionRecord {
            continent: "Europe".into(),
            country: country.into(),
            country_code: code.into(),
            emissions,
            emissions_per_capita: emissions.map(|v| v / 1000.0),
            region: "Western Europe".into(),
            year,
        }
    }

    const CSV: &str = "\
Continent,Country,Country Code,Emissions,Emissions Per Capita,Region,Year
Asia,Afghanistan,004,2675.0,0.29,Southern Asia,2010
Asia,Afghanistan,004,3100.0,0.33,Southern Asia,2011
Europe,France,250,361273.0,5.56,Western Europe,2010
Europe,France,250,,,Western Europe,2011
";

    #[test]
    fn csv_rows_decode_with_numeric_coercion() {
        let dataset = Dataset::from_csv(CSV.as_bytes()).expect("csv should decode");
        assert_eq!(dataset.len(), 4);
        let afg = dataset.record_for("004", 2010).expect("record");
        assert_eq!(afg.country, "Afghanistan");
        assert_eq!(afg.emissions, Some(2675.0));
        assert_eq!(afg.year, 2010);
    }

    #[test]
    fn blank_numeric_cells_decode_as_missing() {
        let dataset = Dataset::from_csv(CSV.as_bytes()).expect("csv should decode");
        let fra = dataset.record_for("250", 2011).expect("record");
        assert_eq!(fra.emissions, None);
        assert_eq!(fra.value(Metric::Emissions), None);
    }

    #[test]
    fn zero_values_count_as_no_data() {
        let r = record("France", "250", 2010, Some(0.0));
        assert_eq!(r.value(Metric::Emissions), None);
    }

    #[test]
    fn malformed_numeric_cell_is_a_decode_error() {
        let bad = "\
Continent,Country,Country Code,Emissions,Emissions Per Capita,Region,Year
Asia,Afghanistan,004,not-a-number,0.29,Southern Asia,2010
";
        assert!(Dataset::from_csv(bad.as_bytes()).is_err());
    }

    #[test]
    fn empty_csv_is_an_error() {
        let header_only = "Continent,Country,Country Code,Emissions,Emissions Per Capita,Region,Year\n";
        assert!(matches!(
            Dataset::from_csv(header_only.as_bytes()),
            Err(DataError::EmptyDataset)
        ));
    }

    #[test]
    fn duplicate_country_year_rows_keep_first_occurrence() {
        let rows = vec![
            record("France", "250", 2010, Some(100.0)),
            record("France", "250", 2010, Some(999.0)),
            record("France", "250", 2011, Some(200.0)),
        ];
        let dataset = Dataset::new(rows);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.duplicates_dropped(), 1);
        assert_eq!(
            dataset.record_for("250", 2010).and_then(|r| r.emissions),
            Some(100.0)
        );
    }

    #[test]
    fn year_extent_spans_all_records() {
        let rows = vec![
            record("France", "250", 2005, Some(1.0)),
            record("France", "250", 2012, Some(1.0)),
            record("Spain", "724", 2008, Some(1.0)),
        ];
        assert_eq!(Dataset::new(rows).year_extent(), (2005, 2012));
    }

    #[test]
    fn country_series_is_sorted_ascending_by_year() {
        let rows = vec![
            record("France", "250", 2012, Some(3.0)),
            record("France", "250", 2005, Some(1.0)),
            record("Spain", "724", 2008, Some(9.0)),
            record("France", "250", 2008, Some(2.0)),
        ];
        let dataset = Dataset::new(rows);
        let years: Vec<i32> = dataset
            .country_series("France")
            .iter()
            .map(|r| r.year)
            .collect();
        assert_eq!(years, vec![2005, 2008, 2012]);
    }

    #[test]
    fn unknown_country_has_empty_series() {
        let dataset = Dataset::new(vec![record("France", "250", 2010, Some(1.0))]);
        assert!(dataset.country_series("Atlantis").is_empty());
    }

    #[test]
    fn json_rows_decode_from_bare_array_and_wrapped_object() {
        let bare = r#"[
            {"Continent":"Asia","Country":"Afghanistan","Country Code":"004",
             "Emissions":2675.0,"Emissions Per Capita":0.29,
             "Region":"Southern Asia","Year":2010}
        ]"#;
        let wrapped = format!(r#"{{"data":{bare}}}"#);

        let a = parse_json_rows(bare).expect("bare array");
        let b = parse_json_rows(&wrapped).expect("wrapped object");
        assert_eq!(a, b);
        assert_eq!(a[0].country_code, "004");
    }

    #[test]
    fn json_numeric_cells_accept_string_form() {
        let rows = parse_json_rows(
            r#"[{"Continent":"Asia","Country":"Afghanistan","Country Code":"004",
                 "Emissions":"2675.0","Emissions Per Capita":"",
                 "Region":"Southern Asia","Year":2010}]"#,
        )
        .expect("rows");
        assert_eq!(rows[0].emissions, Some(2675.0));
        assert_eq!(rows[0].emissions_per_capita, None);
    }

    #[test]
    fn metric_radio_values_round_trip() {
        for metric in [Metric::Emissions, Metric::EmissionsPerCapita] {
            assert_eq!(Metric::from_input_value(metric.as_input_value()), Some(metric));
        }
        assert_eq!(Metric::from_input_value("population"), None);
    }
}
