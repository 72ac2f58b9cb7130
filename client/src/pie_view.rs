use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::rc::Rc;

use leptos::prelude::*;

use carbondash_shared::EmissionRecord;
use carbondash_shared::pie::{color_for_continent, continent_colors, pie_layout};

use crate::app::{ActiveTooltip, CurrentMetric, CurrentYear, DatasetStore};
use crate::render_loop::RenderScheduler;
use crate::surface::{CanvasSurface, container_width};
use crate::tooltip::record_tooltip;

const FALLBACK_WIDTH: f64 = 500.0;
const PIE_HEIGHT: f64 = 300.0;
const ARC_STROKE: &str = "#dff1ff";
const ARC_STROKE_WIDTH: f64 = 0.25;

/// One drawn arc, kept for pointer hit testing. Layout angles run clockwise
/// from 12 o'clock; the hit test works in the same convention.
struct ArcShape {
    record: EmissionRecord,
    start_angle: f64,
    end_angle: f64,
    percentage: String,
}

struct ArcCache {
    year: i32,
    cx: f64,
    cy: f64,
    radius: f64,
    arcs: Vec<ArcShape>,
}

/// Pie of the selected year's emissions, one arc per country, grouped by
/// continent hue. Arc angles always encode raw emissions; the metric switch
/// only changes what the tooltip reports.
#[component]
pub fn PieView() -> impl IntoView {
    let DatasetStore(dataset) = expect_context();
    let CurrentYear(current_year) = expect_context();
    let CurrentMetric(current_metric) = expect_context();
    let ActiveTooltip(tooltip) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let surface = CanvasSurface::new();
    let arcs: Rc<RefCell<Option<ArcCache>>> = Rc::new(RefCell::new(None));

    let arcs_render = arcs.clone();
    let scheduler = Rc::new(RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &web_sys::HtmlCanvasElement = &canvas;
        let width = container_width(canvas, FALLBACK_WIDTH);
        let height = PIE_HEIGHT;
        let Some(ctx) = surface.context(canvas, width, height) else {
            return;
        };

        let year = current_year.get_untracked();
        let cx = width / 2.0;
        let cy = height / 2.0 + 10.0;
        let radius = height / 2.0 - 50.0;

        ctx.clear_rect(0.0, 0.0, width, height);

        let mut cache = ArcCache {
            year,
            cx,
            cy,
            radius,
            arcs: Vec::new(),
        };

        dataset.with_value(|d| {
            let rows = d.records_for_year(year);
            let colors = continent_colors(&rows);

            ctx.set_line_width(ARC_STROKE_WIDTH);
            ctx.set_stroke_style_str(ARC_STROKE);
            for slice in pie_layout(&rows) {
                ctx.begin_path();
                ctx.move_to(cx, cy);
                // Canvas arcs start at 3 o'clock; shift so 0 is 12 o'clock.
                ctx.arc(
                    cx,
                    cy,
                    radius,
                    slice.start_angle - FRAC_PI_2,
                    slice.end_angle - FRAC_PI_2,
                )
                .ok();
                ctx.close_path();
                ctx.set_fill_style_str(color_for_continent(&colors, &slice.record.continent));
                ctx.fill();
                ctx.stroke();

                cache.arcs.push(ArcShape {
                    record: slice.record.clone(),
                    start_angle: slice.start_angle,
                    end_angle: slice.end_angle,
                    percentage: slice.percentage_label(),
                });
            }
        });

        ctx.set_fill_style_str("#222222");
        ctx.set_font("14px sans-serif");
        ctx.set_text_align("center");
        ctx.fill_text(
            &format!("Total emissions by continent and region, {year}"),
            cx,
            20.0,
        )
        .ok();

        *arcs_render.borrow_mut() = Some(cache);
    }));

    let sched_state = scheduler.clone();
    Effect::new(move || {
        current_year.track();
        sched_state.mark_dirty();
    });

    let sched_mount = scheduler.clone();
    Effect::new(move || {
        if canvas_ref.get().is_some() {
            sched_mount.mark_dirty();
        }
    });

    let arcs_hover = arcs.clone();
    let on_pointer_move = move |e: web_sys::PointerEvent| {
        let (px, py) = (e.offset_x() as f64, e.offset_y() as f64);
        let guard = arcs_hover.borrow();
        let Some(cache) = guard.as_ref() else {
            tooltip.set(None);
            return;
        };

        let dx = px - cache.cx;
        let dy = py - cache.cy;
        if (dx * dx + dy * dy).sqrt() > cache.radius {
            tooltip.set(None);
            return;
        }
        // Pointer angle in the layout convention: clockwise from 12 o'clock.
        let angle = (dx.atan2(-dy) + TAU) % TAU;

        let hit = cache
            .arcs
            .iter()
            .find(|arc| angle >= arc.start_angle && angle < arc.end_angle);
        match hit {
            Some(arc) => {
                let metric = current_metric.get_untracked();
                tooltip.set(Some(record_tooltip(
                    &arc.record.country,
                    arc.record.value(metric),
                    metric,
                    cache.year,
                    Some(arc.percentage.clone()),
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
