use leptos::prelude::*;

use carbondash_shared::Metric;

use crate::app::ActiveTooltip;

/// What the tooltip shows for the shape under the pointer. Built fresh on
/// every pointer move — the controller itself keeps no state beyond the
/// signal holding the current (or no) tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipData {
    pub country: String,
    pub value_line: String,
    pub year: i32,
    /// Only arcs carry a percentage-of-total line.
    pub percentage: Option<String>,
    /// Pointer position in viewport coordinates.
    pub x: f64,
    pub y: f64,
}

/// Tooltip content for a record-backed shape (country, arc, or bar).
pub fn record_tooltip(
    country: &str,
    value: Option<f64>,
    metric: Metric,
    year: i32,
    percentage: Option<String>,
    x: f64,
    y: f64,
) -> TooltipData {
    let value_text = match value {
        Some(v) => format!("{} {}", format_value(v), metric.units()),
        None => "Data Not Available".to_string(),
    };
    TooltipData {
        country: country.to_string(),
        value_line: format!("{}: {value_text}", metric.label()),
        year,
        percentage,
        x,
        y,
    }
}

/// Locale-style number formatting: thousands separators on the integer part,
/// up to two decimals with trailing zeros trimmed.
pub fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let mut out: String = grouped.chars().rev().collect();

    let frac = frac_part.trim_end_matches('0');
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Floating tooltip following the pointer, hidden when no shape is hovered.
#[component]
pub fn Tooltip() -> impl IntoView {
    let ActiveTooltip(tooltip) = expect_context();

    view! {
        <div
            style:display=move || if tooltip.get().is_some() { "block" } else { "none" }
            style:left=move || {
                tooltip.get().map(|t| format!("{}px", t.x)).unwrap_or_default()
            }
            style:top=move || {
                tooltip.get().map(|t| format!("{}px", t.y - 12.0)).unwrap_or_default()
            }
            style="position: fixed; transform: translate(-50%, -100%); z-index: 50; \
                   background: rgba(20, 22, 30, 0.92); color: #eee; padding: 6px 10px; \
                   border-radius: 4px; font-size: 0.78rem; line-height: 1.35; \
                   pointer-events: none; white-space: nowrap;"
        >
            {move || {
                tooltip.get().map(|data| {
                    view! {
                        <p style="margin: 0;">{format!("Country: {}", data.country)}</p>
                        <p style="margin: 0;">{data.value_line.clone()}</p>
                        <p style="margin: 0;">{format!("Year: {}", data.year)}</p>
                        {data
                            .percentage
                            .map(|p| view! {
                                <p style="margin: 0;">{format!("Percentage of total: {p}")}</p>
                            })}
                    }
                })
            }}
        </div>
    }
}
