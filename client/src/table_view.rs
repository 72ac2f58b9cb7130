use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use carbondash_shared::EmissionRecord;
use carbondash_shared::table::{SortDirection, TableColumn, TableItem, TableModel};

use crate::data;
use crate::tooltip::format_value;

fn cell_text(record: &EmissionRecord, column: TableColumn) -> String {
    match column {
        TableColumn::Country => record.country.clone(),
        TableColumn::CountryCode => record.country_code.clone(),
        TableColumn::Continent => record.continent.clone(),
        TableColumn::Region => record.region.clone(),
        TableColumn::Year => record.year.to_string(),
        TableColumn::EmissionsPerCapita => record
            .emissions_per_capita
            .map(format_value)
            .unwrap_or_default(),
        TableColumn::Emissions => record.emissions.map(format_value).unwrap_or_default(),
    }
}

/// Sortable, grouped, paginated listing of every record. Loads its own copy
/// of the data and keeps its own state, so it works even while (or after) the
/// chart startup fails.
#[component]
pub fn DataTable() -> impl IntoView {
    let model = RwSignal::new(None::<TableModel>);
    let load_error = RwSignal::new(None::<String>);

    spawn_local(async move {
        match data::fetch_table_rows().await {
            Ok(rows) => model.set(Some(TableModel::new(rows))),
            Err(message) => {
                web_sys::console::warn_1(&format!("table load failed: {message}").into());
                load_error.set(Some(message));
            }
        }
    });

    let header_cell = move |column: TableColumn| {
        let indicator = move || {
            model.with(|m| {
                m.as_ref()
                    .filter(|m| m.sort_column() == column)
                    .map(|m| match m.direction() {
                        SortDirection::Ascending => " \u{25B2}",
                        SortDirection::Descending => " \u{25BC}",
                    })
                    .unwrap_or("")
            })
        };
        view! {
            <th
                on:click=move |_| {
                    model.update(|m| {
                        if let Some(m) = m.as_mut() {
                            m.sort_by(column);
                        }
                    })
                }
                style="cursor: pointer; text-align: left; padding: 6px 10px; \
                       border-bottom: 2px solid #999; user-select: none; white-space: nowrap;"
            >
                {column.header()}
                {indicator}
            </th>
        }
    };

    let body_rows = move || {
        model.with(|m| {
            m.as_ref().map(|m| {
                m.page_items()
                    .into_iter()
                    .map(|item| match item {
                        TableItem::GroupHeader(name) => view! {
                            <tr>
                                <th
                                    colspan="6"
                                    style="text-align: left; padding: 6px 10px; \
                                           background: #eef2f6; border-bottom: 1px solid #ccc;"
                                >
                                    {name.to_string()}
                                </th>
                            </tr>
                        }
                        .into_any(),
                        TableItem::Row(record) => view! {
                            <tr>
                                {TableColumn::VISIBLE
                                    .into_iter()
                                    .map(|column| view! {
                                        <td style="padding: 4px 10px; border-bottom: 1px solid #e4e4e4;">
                                            {cell_text(record, column)}
                                        </td>
                                    })
                                    .collect_view()}
                            </tr>
                        }
                        .into_any(),
                    })
                    .collect_view()
            })
        })
    };

    let page_label = move || {
        model.with(|m| {
            m.as_ref()
                .map(|m| format!("Page {} of {} ({} rows)", m.page() + 1, m.page_count(), m.len()))
                .unwrap_or_default()
        })
    };

    view! {
        <div style="margin-top: 32px;">
            <h2 style="font-size: 1.2rem;">"All emissions data"</h2>

            {move || {
                load_error
                    .get()
                    .map(|message| view! {
                        <p style="color: #b00020;">{format!("Could not load the table: {message}")}</p>
                    })
            }}

            {move || {
                model.with(|m| m.is_none() && load_error.with(|e| e.is_none())).then(|| view! {
                    <p style="color: #666;">"Loading table…"</p>
                })
            }}

            <table style="width: 100%; border-collapse: collapse; font-size: 0.85rem;">
                <thead>
                    <tr>
                        {TableColumn::VISIBLE.into_iter().map(header_cell).collect_view()}
                    </tr>
                </thead>
                <tbody>{body_rows}</tbody>
            </table>

            <div style="display: flex; align-items: center; gap: 12px; margin-top: 8px;">
                <button on:click=move |_| {
                    model.update(|m| {
                        if let Some(m) = m.as_mut() {
                            m.prev_page();
                        }
                    })
                }>
                    "Previous"
                </button>
                <span style="color: #555;">{page_label}</span>
                <button on:click=move |_| {
                    model.update(|m| {
                        if let Some(m) = m.as_mut() {
                            m.next_page();
                        }
                    })
                }>
                    "Next"
                </button>
            </div>
        </div>
    }
}
