use leptos::prelude::*;
use wasm_bindgen::JsCast;

use carbondash_shared::Metric;

use crate::app::{CurrentMetric, CurrentYear, YearExtent};

/// Year slider (bounds tied to the dataset's year extent) and metric radio
/// group — the only selection-state writers besides map clicks.
#[component]
pub fn Controls() -> impl IntoView {
    let CurrentYear(current_year) = expect_context();
    let CurrentMetric(current_metric) = expect_context();
    let YearExtent(year_extent) = expect_context();

    let on_year_input = move |e: web_sys::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        if let Ok(year) = input.value().parse::<i32>() {
            current_year.set(year);
        }
    };

    let on_metric_change = move |e: web_sys::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        if let Some(metric) = Metric::from_input_value(&input.value()) {
            current_metric.set(metric);
        }
    };

    let metric_radio = move |metric: Metric| {
        view! {
            <label style="margin-right: 12px; cursor: pointer;">
                <input
                    type="radio"
                    name="data-type"
                    value=metric.as_input_value()
                    prop:checked=move || current_metric.get() == metric
                    on:change=on_metric_change
                />
                " "
                {metric.label()}
            </label>
        }
    };

    view! {
        <div style="display: flex; align-items: center; gap: 16px; flex-wrap: wrap; margin: 12px 0;">
            <label style="display: flex; align-items: center; gap: 8px; flex: 1 1 320px;">
                <span>"Year: "</span>
                <span id="year-val" style="min-width: 3em; font-variant-numeric: tabular-nums;">
                    {move || current_year.get()}
                </span>
                <input
                    type="range"
                    id="year"
                    style="flex: 1;"
                    min=move || year_extent.get().0.to_string()
                    max=move || year_extent.get().1.to_string()
                    prop:value=move || current_year.get().to_string()
                    on:input=on_year_input
                />
            </label>
            <div>
                {metric_radio(Metric::Emissions)}
                {metric_radio(Metric::EmissionsPerCapita)}
            </div>
        </div>
    }
}
