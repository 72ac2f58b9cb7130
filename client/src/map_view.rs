use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use carbondash_shared::{ColorScale, Dataset, GeoFeature, Mercator, NO_DATA_FILL, point_in_rings};

use crate::app::{
    ActiveTooltip, CurrentMetric, CurrentYear, DatasetStore, SelectedCountry, WorldStore,
};
use crate::render_loop::RenderScheduler;
use crate::surface::{CanvasSurface, container_width};
use crate::tooltip::record_tooltip;

const FALLBACK_WIDTH: f64 = 960.0;
/// The map is 4/5ths as tall as it is wide.
const MAP_ASPECT: f64 = 0.8;
const BORDER_STROKE: &str = "#ffffff";
const SELECTED_STROKE: &str = "#222222";

/// A country polygon projected into canvas coordinates, with the display
/// name resolved once from the dataset (the boundary file itself only
/// carries ids).
struct CountryShape {
    code: Option<String>,
    name: Option<String>,
    rings: Vec<Vec<(f64, f64)>>,
}

struct ShapeCache {
    width: f64,
    shapes: Vec<CountryShape>,
}

fn ensure_shapes(
    cache: &Rc<RefCell<Option<ShapeCache>>>,
    width: f64,
    height: f64,
    world: StoredValue<Vec<GeoFeature>>,
    dataset: StoredValue<Dataset>,
) {
    let stale = cache
        .borrow()
        .as_ref()
        .map(|c| (c.width - width).abs() > 0.5)
        .unwrap_or(true);
    if !stale {
        return;
    }

    let projection = Mercator::fit(width, height);
    let shapes = world.with_value(|features| {
        features
            .iter()
            .map(|feature| CountryShape {
                code: feature.id.clone(),
                name: feature.id.as_deref().and_then(|code| {
                    dataset.with_value(|d| d.country_name(code).map(str::to_string))
                }),
                rings: projection.project_rings(feature),
            })
            .collect()
    });
    *cache.borrow_mut() = Some(ShapeCache { width, shapes });
}

fn trace_rings(ctx: &web_sys::CanvasRenderingContext2d, rings: &[Vec<(f64, f64)>]) {
    ctx.begin_path();
    for ring in rings {
        let mut points = ring.iter();
        if let Some(&(x, y)) = points.next() {
            ctx.move_to(x, y);
        }
        for &(x, y) in points {
            ctx.line_to(x, y);
        }
        ctx.close_path();
    }
}

/// Choropleth world map. Fill encodes the selected metric for the selected
/// year; clicking a country toggles the exclusive selection that drives the
/// bar chart.
#[component]
pub fn MapView() -> impl IntoView {
    let DatasetStore(dataset) = expect_context();
    let WorldStore(world) = expect_context();
    let CurrentYear(current_year) = expect_context();
    let CurrentMetric(current_metric) = expect_context();
    let SelectedCountry(selected_country) = expect_context();
    let ActiveTooltip(tooltip) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let surface = CanvasSurface::new();
    let shapes: Rc<RefCell<Option<ShapeCache>>> = Rc::new(RefCell::new(None));

    let shapes_render = shapes.clone();
    let scheduler = Rc::new(RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &web_sys::HtmlCanvasElement = &canvas;
        let width = container_width(canvas, FALLBACK_WIDTH);
        let height = width * MAP_ASPECT;
        let Some(ctx) = surface.context(canvas, width, height) else {
            return;
        };

        ensure_shapes(&shapes_render, width, height, world, dataset);

        let year = current_year.get_untracked();
        let metric = current_metric.get_untracked();
        let selected = selected_country.get_untracked();
        let scale = ColorScale::for_metric(metric);

        ctx.clear_rect(0.0, 0.0, width, height);

        let cache = shapes_render.borrow();
        let Some(cache) = cache.as_ref() else {
            return;
        };

        for shape in &cache.shapes {
            let value = dataset.with_value(|d| {
                shape
                    .code
                    .as_deref()
                    .and_then(|code| d.record_for(code, year))
                    .and_then(|r| r.value(metric))
            });
            let fill = match value {
                Some(v) => scale.css(v),
                None => NO_DATA_FILL.to_string(),
            };

            trace_rings(&ctx, &shape.rings);
            ctx.set_fill_style_str(&fill);
            ctx.fill();
            ctx.set_stroke_style_str(BORDER_STROKE);
            ctx.set_line_width(0.5);
            ctx.stroke();
        }

        // Selection outline on top so neighbors don't overdraw it.
        if let Some(selected) = selected.as_deref() {
            for shape in &cache.shapes {
                if shape.name.as_deref() == Some(selected) {
                    trace_rings(&ctx, &shape.rings);
                    ctx.set_stroke_style_str(SELECTED_STROKE);
                    ctx.set_line_width(2.0);
                    ctx.stroke();
                }
            }
        }

        ctx.set_fill_style_str("#222222");
        ctx.set_font("24px sans-serif");
        ctx.set_text_align("center");
        ctx.fill_text(&format!("Carbon dioxide emissions, {year}"), width / 2.0, 28.0)
            .ok();
    }));

    // Repaint whenever the shared selection state changes; the scheduler
    // coalesces slider-drag bursts into one paint per frame.
    let sched_state = scheduler.clone();
    Effect::new(move || {
        current_year.track();
        current_metric.track();
        selected_country.track();
        sched_state.mark_dirty();
    });

    // First paint once the canvas is actually mounted.
    let sched_mount = scheduler.clone();
    Effect::new(move || {
        if canvas_ref.get().is_some() {
            sched_mount.mark_dirty();
        }
    });

    let hit_name = {
        let shapes = shapes.clone();
        move |x: f64, y: f64| -> Option<(Option<String>, Option<String>)> {
            let guard = shapes.borrow();
            guard.as_ref().and_then(|cache| {
                cache
                    .shapes
                    .iter()
                    .find(|s| point_in_rings(x, y, &s.rings))
                    .map(|s| (s.code.clone(), s.name.clone()))
            })
        }
    };

    let hit_for_move = hit_name.clone();
    let on_pointer_move = move |e: web_sys::PointerEvent| {
        let hit = hit_for_move(e.offset_x() as f64, e.offset_y() as f64);
        let Some((code, name)) = hit else {
            tooltip.set(None);
            return;
        };

        let year = current_year.get_untracked();
        let metric = current_metric.get_untracked();
        let (country, value) = dataset.with_value(|d| {
            let record = code.as_deref().and_then(|c| d.record_for(c, year));
            (
                record
                    .map(|r| r.country.clone())
                    .or(name)
                    .unwrap_or_else(|| "Unknown".to_string()),
                record.and_then(|r| r.value(metric)),
            )
        });
        tooltip.set(Some(record_tooltip(
            &country,
            value,
            metric,
            year,
            None,
            e.client_x() as f64,
            e.client_y() as f64,
        )));
    };

    let on_pointer_leave = move |_: web_sys::PointerEvent| tooltip.set(None);

    let hit_for_click = hit_name.clone();
    let on_click = move |e: web_sys::MouseEvent| {
        let hit = hit_for_click(e.offset_x() as f64, e.offset_y() as f64);
        let Some((code, fallback_name)) = hit else {
            return;
        };
        let year = current_year.get_untracked();
        let name = dataset
            .with_value(|d| {
                code.as_deref()
                    .and_then(|c| d.record_for(c, year))
                    .map(|r| r.country.clone())
            })
            .or(fallback_name);
        let Some(name) = name else {
            return;
        };
        // Exclusive toggle: clicking the active country deselects it,
        // clicking another moves the selection.
        selected_country.update(|sel| {
            if sel.as_deref() == Some(name.as_str()) {
                *sel = None;
            } else {
                *sel = Some(name);
            }
        });
    };

    view! {
        <canvas
            node_ref=canvas_ref
            on:pointermove=on_pointer_move
            on:pointerleave=on_pointer_leave
            on:click=on_click
            style="display: block; width: 100%; cursor: pointer;"
        />
    }
}
