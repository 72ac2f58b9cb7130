use crate::record::EmissionRecord;

pub const PAGE_SIZE: usize = 10;

/// Table columns in display order. `Country` is the grouping column: it is
/// not rendered as a cell, it appears as synthetic group header rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    Country,
    CountryCode,
    Continent,
    Region,
    Year,
    EmissionsPerCapita,
    Emissions,
}

impl TableColumn {
    /// Columns rendered as cells, left to right.
    pub const VISIBLE: [TableColumn; 6] = [
        TableColumn::CountryCode,
        TableColumn::Continent,
        TableColumn::Region,
        TableColumn::Year,
        TableColumn::EmissionsPerCapita,
        TableColumn::Emissions,
    ];

    pub fn header(self) -> &'static str {
        match self {
            TableColumn::Country => "Country",
            TableColumn::CountryCode => "Country Code",
            TableColumn::Continent => "Continent",
            TableColumn::Region => "Region",
            TableColumn::Year => "Year",
            TableColumn::EmissionsPerCapita => "Emissions Per Capita",
            TableColumn::Emissions => "Emissions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Either a data row or a synthetic group header inserted where the grouping
/// column's value changes between adjacent rows of the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum TableItem<'a> {
    GroupHeader(&'a str),
    Row(&'a EmissionRecord),
}

/// Client-side table state: full row set, current sort, current page.
#[derive(Debug, Clone)]
pub struct TableModel {
    rows: Vec<EmissionRecord>,
    sort_column: TableColumn,
    direction: SortDirection,
    page: usize,
}

impl TableModel {
    /// Default order: the grouping column, ascending (ties broken by year so
    /// the sort is reproducible).
    pub fn new(rows: Vec<EmissionRecord>) -> Self {
        let mut model = Self {
            rows,
            sort_column: TableColumn::Country,
            direction: SortDirection::Ascending,
            page: 0,
        };
        model.apply_sort();
        model
    }

    pub fn sort_column(&self) -> TableColumn {
        self.sort_column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sort by a column, toggling direction on a repeated column. Resets to
    /// the first page since row order changed.
    pub fn sort_by(&mut self, column: TableColumn) {
        if self.sort_column == column {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.sort_column = column;
            self.direction = SortDirection::Ascending;
        }
        self.page = 0;
        self.apply_sort();
    }

    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(PAGE_SIZE).max(1)
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn page_rows(&self) -> &[EmissionRecord] {
        let start = (self.page * PAGE_SIZE).min(self.rows.len());
        let end = (start + PAGE_SIZE).min(self.rows.len());
        &self.rows[start..end]
    }

    /// The current page with group headers interleaved. Each page starts its
    /// own grouping run, so a group spanning a page break repeats its header
    /// at the top of the next page.
    pub fn page_items(&self) -> Vec<TableItem<'_>> {
        let rows = self.page_rows();
        let mut items = Vec::with_capacity(rows.len() + 4);
        let mut last_group: Option<&str> = None;
        for row in rows {
            if last_group != Some(row.country.as_str()) {
                items.push(TableItem::GroupHeader(&row.country));
                last_group = Some(&row.country);
            }
            items.push(TableItem::Row(row));
        }
        items
    }

    fn apply_sort(&mut self) {
        let column = self.sort_column;
        self.rows.sort_by(|a, b| {
            let ordering = match column {
                TableColumn::Country => a.country.cmp(&b.country),
                TableColumn::CountryCode => a.country_code.cmp(&b.country_code),
                TableColumn::Continent => a.continent.cmp(&b.continent),
                TableColumn::Region => a.region.cmp(&b.region),
                TableColumn::Year => a.year.cmp(&b.year),
                TableColumn::EmissionsPerCapita => {
                    cmp_missing_first(a.emissions_per_capita, b.emissions_per_capita)
                }
                TableColumn::Emissions => cmp_missing_first(a.emissions, b.emissions),
            };
            let ordering = ordering.then_with(|| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}

/// Missing values sort before any observed value.
fn cmp_missing_first(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    match (a, b) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, year: i32, emissions: Option<f64>) -> EmissionRecord {
        EmissionRecord {
            continent: "Europe".into(),
            country: country.into(),
            country_code: "000".into(),
            emissions,
            emissions_per_capita: emissions.map(|v| v / 10.0),
            region: "Somewhere".into(),
            year,
        }
    }

    fn group_runs(items: &[TableItem<'_>]) -> Vec<(String, usize)> {
        let mut runs = Vec::new();
        for item in items {
            match item {
                TableItem::GroupHeader(name) => runs.push((name.to_string(), 0)),
                TableItem::Row(_) => {
                    let last = runs.last_mut().expect("row before any group header");
                    last.1 += 1;
                }
            }
        }
        runs
    }

    #[test]
    fn group_header_precedes_each_run_and_nowhere_else() {
        let model = TableModel::new(vec![
            record("France", 2010, Some(1.0)),
            record("Spain", 2010, Some(2.0)),
            record("France", 2011, Some(3.0)),
            record("Spain", 2011, Some(4.0)),
        ]);
        // Default sort groups by country, so each country is one run.
        let items = model.page_items();
        let runs = group_runs(&items);
        assert_eq!(
            runs,
            vec![("France".to_string(), 2), ("Spain".to_string(), 2)]
        );
    }

    #[test]
    fn interleaved_sort_order_yields_one_header_per_value_change() {
        let mut model = TableModel::new(vec![
            record("France", 2010, Some(1.0)),
            record("Spain", 2010, Some(2.0)),
            record("France", 2011, Some(3.0)),
            record("Spain", 2011, Some(4.0)),
        ]);
        model.sort_by(TableColumn::Year);
        // Year asc with country tiebreak: F10, S10, F11, S11 → four headers.
        let runs = group_runs(&model.page_items());
        assert_eq!(runs.len(), 4);
        assert!(runs.iter().all(|(_, rows)| *rows == 1));
    }

    #[test]
    fn sorting_the_same_column_toggles_direction() {
        let mut model = TableModel::new(vec![
            record("France", 2010, Some(1.0)),
            record("Spain", 2010, Some(2.0)),
        ]);
        assert_eq!(model.direction(), SortDirection::Ascending);
        model.sort_by(TableColumn::Country);
        assert_eq!(model.direction(), SortDirection::Descending);
        let first = match model.page_items()[0] {
            TableItem::GroupHeader(name) => name.to_string(),
            _ => panic!("expected a group header first"),
        };
        assert_eq!(first, "Spain");
    }

    #[test]
    fn sorting_a_new_column_resets_to_ascending_and_first_page() {
        let rows: Vec<EmissionRecord> = (0..25)
            .map(|i| record("France", 2000 + i, Some(i as f64)))
            .collect();
        let mut model = TableModel::new(rows);
        model.next_page();
        assert_eq!(model.page(), 1);
        model.sort_by(TableColumn::Emissions);
        assert_eq!(model.page(), 0);
        assert_eq!(model.direction(), SortDirection::Ascending);
    }

    #[test]
    fn missing_values_sort_before_observed_ones() {
        let mut model = TableModel::new(vec![
            record("France", 2010, Some(5.0)),
            record("Spain", 2010, None),
        ]);
        model.sort_by(TableColumn::Emissions);
        let first_row = model
            .page_items()
            .into_iter()
            .find_map(|item| match item {
                TableItem::Row(r) => Some(r.country.clone()),
                _ => None,
            })
            .expect("rows");
        assert_eq!(first_row, "Spain");
    }

    #[test]
    fn pagination_clamps_at_both_ends() {
        let rows: Vec<EmissionRecord> = (0..25)
            .map(|i| record("France", 2000 + i, Some(1.0)))
            .collect();
        let mut model = TableModel::new(rows);
        assert_eq!(model.page_count(), 3);

        model.prev_page();
        assert_eq!(model.page(), 0);
        model.next_page();
        model.next_page();
        model.next_page();
        assert_eq!(model.page(), 2);
        assert_eq!(model.page_rows().len(), 5);
    }

    #[test]
    fn group_spanning_a_page_break_repeats_its_header() {
        let mut rows: Vec<EmissionRecord> = (0..12)
            .map(|i| record("France", 2000 + i, Some(1.0)))
            .collect();
        rows.push(record("Spain", 2000, Some(1.0)));
        let mut model = TableModel::new(rows);

        let page0 = group_runs(&model.page_items());
        model.next_page();
        let page1 = group_runs(&model.page_items());

        assert_eq!(page0, vec![("France".to_string(), 10)]);
        assert_eq!(
            page1,
            vec![("France".to_string(), 2), ("Spain".to_string(), 1)]
        );
    }

    #[test]
    fn empty_table_has_one_page_and_no_items() {
        let model = TableModel::new(Vec::new());
        assert_eq!(model.page_count(), 1);
        assert!(model.page_items().is_empty());
    }
}
