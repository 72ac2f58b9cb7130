use futures::future::try_join;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use carbondash_shared::{Dataset, EmissionRecord, GeoFeature, parse_json_rows, parse_world};

use crate::app::LoadPhase;

/// The two startup data sources, plus the JSON form the table fetches.
const DATASET_URL: &str = "/data/all_data.csv";
const WORLD_URL: &str = "/data/world-countries.geo.json";
const TABLE_URL: &str = "/data/all_data.json";

async fn fetch_text(url: &str) -> Result<String, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }
    resp.text().await.map_err(|e| format!("read error: {e}"))
}

/// Fetch and decode the tabular dataset.
pub async fn fetch_dataset() -> Result<Dataset, String> {
    let text = fetch_text(DATASET_URL).await?;
    let dataset =
        Dataset::from_csv(text.as_bytes()).map_err(|e| format!("dataset decode error: {e}"))?;
    if dataset.duplicates_dropped() > 0 {
        web_sys::console::warn_1(
            &format!(
                "dropped {} duplicate (country, year) rows from {DATASET_URL}",
                dataset.duplicates_dropped()
            )
            .into(),
        );
    }
    Ok(dataset)
}

/// Fetch and decode the country boundary file.
pub async fn fetch_world() -> Result<Vec<GeoFeature>, String> {
    let text = fetch_text(WORLD_URL).await?;
    parse_world(&text).map_err(|e| format!("boundary decode error: {e}"))
}

/// Fetch the dataset's JSON form for the data table.
pub async fn fetch_table_rows() -> Result<Vec<EmissionRecord>, String> {
    let text = fetch_text(TABLE_URL).await?;
    parse_json_rows(&text).map_err(|e| format!("table decode error: {e}"))
}

pub struct LoadTargets {
    pub phase: RwSignal<LoadPhase>,
    pub dataset: StoredValue<Dataset>,
    pub world: StoredValue<Vec<GeoFeature>>,
    pub current_year: RwSignal<i32>,
    pub year_extent: RwSignal<(i32, i32)>,
}

/// Fetch boundaries and records concurrently and join before any rendering.
/// Either failure fails startup — no partial dashboard, no retry.
pub fn load_dashboard(targets: LoadTargets) {
    spawn_local(async move {
        match try_join(fetch_dataset(), fetch_world()).await {
            Ok((dataset, world)) => {
                let extent = dataset.year_extent();
                targets.dataset.set_value(dataset);
                targets.world.set_value(world);
                targets.year_extent.set(extent);
                targets.current_year.set(extent.0);
                targets.phase.set(LoadPhase::Ready);
            }
            Err(message) => {
                web_sys::console::warn_1(&format!("dashboard startup failed: {message}").into());
                targets.phase.set(LoadPhase::Failed(message));
            }
        }
    });
}
