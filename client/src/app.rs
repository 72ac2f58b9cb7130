use leptos::prelude::*;

use carbondash_shared::{Dataset, GeoFeature, Metric};

use crate::bar_view::BarView;
use crate::controls::Controls;
use crate::data;
use crate::map_view::MapView;
use crate::pie_view::PieView;
use crate::table_view::DataTable;
use crate::tooltip::{Tooltip, TooltipData};

/// Newtype wrappers give each piece of selection state a distinct type for
/// Leptos context. (Several are signals of the same inner type — without
/// wrappers, `provide_context` would overwrite one with another.)
#[derive(Clone, Copy)]
pub(crate) struct CurrentYear(pub RwSignal<i32>);
#[derive(Clone, Copy)]
pub(crate) struct CurrentMetric(pub RwSignal<Metric>);
#[derive(Clone, Copy)]
pub(crate) struct SelectedCountry(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct YearExtent(pub RwSignal<(i32, i32)>);
#[derive(Clone, Copy)]
pub(crate) struct ActiveTooltip(pub RwSignal<Option<TooltipData>>);

/// Immutable stores for the startup data, set exactly once on load.
#[derive(Clone, Copy)]
pub(crate) struct DatasetStore(pub StoredValue<Dataset>);
#[derive(Clone, Copy)]
pub(crate) struct WorldStore(pub StoredValue<Vec<GeoFeature>>);

#[derive(Clone, PartialEq)]
pub(crate) enum LoadPhase {
    Loading,
    Ready,
    Failed(String),
}

#[component]
pub fn App() -> impl IntoView {
    let current_year = RwSignal::new(0i32);
    let current_metric = RwSignal::new(Metric::Emissions);
    let selected_country = RwSignal::new(None::<String>);
    let year_extent = RwSignal::new((0i32, 0i32));
    let tooltip = RwSignal::new(None::<TooltipData>);
    let load_phase = RwSignal::new(LoadPhase::Loading);
    let dataset_store = StoredValue::new(Dataset::default());
    let world_store = StoredValue::new(Vec::<GeoFeature>::new());

    provide_context(CurrentYear(current_year));
    provide_context(CurrentMetric(current_metric));
    provide_context(SelectedCountry(selected_country));
    provide_context(YearExtent(year_extent));
    provide_context(ActiveTooltip(tooltip));
    provide_context(DatasetStore(dataset_store));
    provide_context(WorldStore(world_store));

    data::load_dashboard(data::LoadTargets {
        phase: load_phase,
        dataset: dataset_store,
        world: world_store,
        current_year,
        year_extent,
    });

    view! {
        <div style="max-width: 1100px; margin: 0 auto; padding: 16px; font-family: sans-serif; color: #222;">
            <h1 style="text-align: center; font-size: 1.6rem;">"Carbon Dioxide Emissions Dashboard"</h1>

            {move || match load_phase.get() {
                LoadPhase::Loading => view! {
                    <p style="text-align: center; color: #666;">"Loading emissions data…"</p>
                }
                .into_any(),
                LoadPhase::Failed(message) => view! {
                    <p style="text-align: center; color: #b00020;">
                        {format!("Could not load the dashboard: {message}")}
                    </p>
                }
                .into_any(),
                LoadPhase::Ready => view! {
                    <Controls />
                    <div class="chart-container" style="width: 100%;">
                        <MapView />
                        <div style="display: flex; gap: 16px; flex-wrap: wrap;">
                            <div style="flex: 1 1 45%; min-width: 320px;">
                                <PieView />
                            </div>
                            <div style="flex: 1 1 45%; min-width: 320px;">
                                <BarView />
                            </div>
                        </div>
                    </div>
                }
                .into_any(),
            }}

            <Tooltip />
            <DataTable />
        </div>
    }
}
