use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;

use carbondash_shared::bars::{BarChartLayout, ChartArea, bar_fill, bar_layout};

use crate::app::{ActiveTooltip, CurrentMetric, CurrentYear, DatasetStore, SelectedCountry};
use crate::render_loop::RenderScheduler;
use crate::surface::{CanvasSurface, container_width};
use crate::tooltip::record_tooltip;

const FALLBACK_WIDTH: f64 = 500.0;
const BAR_HEIGHT: f64 = 300.0;
const AXIS_STROKE: &str = "#444444";
const TEXT_FILL: &str = "#222222";

struct LayoutCache {
    width: f64,
    layout: BarChartLayout,
}

fn draw_axes(ctx: &web_sys::CanvasRenderingContext2d, layout: &BarChartLayout) {
    let (x0, x1) = layout.x_scale.range();
    let (baseline, top) = layout.y_scale.range();

    ctx.set_stroke_style_str(AXIS_STROKE);
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(x0, baseline);
    ctx.line_to(x1, baseline);
    ctx.move_to(x0, baseline);
    ctx.line_to(x0, top);
    ctx.stroke();

    ctx.set_fill_style_str(AXIS_STROKE);
    ctx.set_font("10px sans-serif");

    // Year ticks, stepped so labels don't collide.
    let (year_lo, year_hi) = layout.x_scale.domain();
    let step = (((year_hi - year_lo) / 10.0).ceil() as i32).max(1);
    ctx.set_text_align("center");
    let mut year = year_lo as i32;
    while year <= year_hi as i32 {
        let x = layout.x_scale.map(year as f64);
        ctx.begin_path();
        ctx.move_to(x, baseline);
        ctx.line_to(x, baseline + 5.0);
        ctx.stroke();
        ctx.fill_text(&year.to_string(), x, baseline + 15.0).ok();
        year += step;
    }

    ctx.set_text_align("right");
    for tick in layout.y_scale.ticks(5) {
        let y = layout.y_scale.map(tick);
        ctx.begin_path();
        ctx.move_to(x0 - 5.0, y);
        ctx.line_to(x0, y);
        ctx.stroke();
        ctx.fill_text(&crate::tooltip::format_value(tick), x0 - 8.0, y + 3.0)
            .ok();
    }
}

fn draw_bars(ctx: &web_sys::CanvasRenderingContext2d, layout: &BarChartLayout, year: i32) {
    for bar in &layout.bars {
        ctx.set_fill_style_str(bar_fill(bar.year, year));
        ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);
    }
}

fn draw_chrome(
    ctx: &web_sys::CanvasRenderingContext2d,
    layout: &BarChartLayout,
    width: f64,
    height: f64,
) {
    ctx.set_fill_style_str(TEXT_FILL);
    ctx.set_font("14px sans-serif");
    ctx.set_text_align("center");
    ctx.fill_text(&layout.title, width / 2.0, 20.0).ok();

    // Metric label rotated along the y axis.
    ctx.save();
    ctx.translate(14.0, height / 2.0).ok();
    ctx.rotate(-std::f64::consts::FRAC_PI_2).ok();
    ctx.set_font("11px sans-serif");
    ctx.fill_text(&layout.axis_label, 0.0, 0.0).ok();
    ctx.restore();
}

/// Annual series for the map-selected country. Year changes only swap bar
/// fills over the cached geometry; metric and selection changes rebuild the
/// whole layout.
#[component]
pub fn BarView() -> impl IntoView {
    let DatasetStore(dataset) = expect_context();
    let CurrentYear(current_year) = expect_context();
    let CurrentMetric(current_metric) = expect_context();
    let SelectedCountry(selected_country) = expect_context();
    let ActiveTooltip(tooltip) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let surface = CanvasSurface::new();
    let cache: Rc<RefCell<Option<LayoutCache>>> = Rc::new(RefCell::new(None));
    let layout_dirty = Rc::new(Cell::new(true));

    let cache_render = cache.clone();
    let dirty_render = layout_dirty.clone();
    let scheduler = Rc::new(RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &web_sys::HtmlCanvasElement = &canvas;
        let width = container_width(canvas, FALLBACK_WIDTH);
        let height = BAR_HEIGHT;
        let Some(ctx) = surface.context(canvas, width, height) else {
            return;
        };

        let year = current_year.get_untracked();

        let rebuild = dirty_render.take()
            || cache_render
                .borrow()
                .as_ref()
                .map(|c| (c.width - width).abs() > 0.5)
                .unwrap_or(true);

        if rebuild {
            let metric = current_metric.get_untracked();
            let country = selected_country.get_untracked().unwrap_or_default();
            let layout = dataset.with_value(|d| {
                bar_layout(d, metric, &country, ChartArea { width, height })
            });

            ctx.clear_rect(0.0, 0.0, width, height);
            draw_chrome(&ctx, &layout, width, height);
            draw_axes(&ctx, &layout);
            draw_bars(&ctx, &layout, year);

            *cache_render.borrow_mut() = Some(LayoutCache { width, layout });
        } else if let Some(cached) = cache_render.borrow().as_ref() {
            // Geometry unchanged, only the current-year highlight moved.
            draw_bars(&ctx, &cached.layout, year);
        }
    }));

    // Selection or metric changes invalidate the cached geometry...
    let sched_layout = scheduler.clone();
    let dirty_layout = layout_dirty.clone();
    Effect::new(move || {
        selected_country.track();
        current_metric.track();
        dirty_layout.set(true);
        sched_layout.mark_dirty();
    });

    // ...a year change only needs a repaint over it.
    let sched_year = scheduler.clone();
    Effect::new(move || {
        current_year.track();
        sched_year.mark_dirty();
    });

    let sched_mount = scheduler.clone();
    Effect::new(move || {
        if canvas_ref.get().is_some() {
            sched_mount.mark_dirty();
        }
    });

    let cache_hover = cache.clone();
    let on_pointer_move = move |e: web_sys::PointerEvent| {
        let (px, py) = (e.offset_x() as f64, e.offset_y() as f64);
        let guard = cache_hover.borrow();
        let hit = guard.as_ref().and_then(|c| {
            c.layout
                .bars
                .iter()
                .find(|b| px >= b.x && px <= b.x + b.width && py >= b.y && py <= b.y + b.height)
                .map(|b| (b.year, b.value))
        });
        drop(guard);

        match hit {
            Some((bar_year, value)) => {
                let metric = current_metric.get_untracked();
                let country = selected_country.get_untracked().unwrap_or_default();
                tooltip.set(Some(record_tooltip(
                    &country,
                    Some(value),
                    metric,
                    bar_year,
                    None,
                    e.client_x() as f64,
                    e.client_y() as f64,
                )));
            }
            None => tooltip.set(None),
        }
    };

    let on_pointer_leave = move |_: web_sys::PointerEvent| tooltip.set(None);

    view! {
        <canvas
            node_ref=canvas_ref
            on:pointermove=on_pointer_move
            on:pointerleave=on_pointer_leave
            style="display: block; width: 100%; height: 300px;"
        />
    }
}
