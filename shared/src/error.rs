use thiserror::Error;

/// Decode failures for the two startup data sources. Any of these aborts
/// dashboard initialization; there is no partial-load recovery.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("csv decode error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dataset contains no rows")]
    EmptyDataset,
    #[error("boundary file contains no usable features")]
    EmptyWorld,
}
