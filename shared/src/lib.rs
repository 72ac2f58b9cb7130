pub mod bars;
pub mod error;
pub mod geometry;
pub mod pie;
pub mod record;
pub mod scale;
pub mod table;

pub use error::DataError;
pub use geometry::{GeoFeature, Mercator, parse_world, point_in_rings};
pub use record::{Dataset, EmissionRecord, Metric, parse_json_rows};
pub use scale::{ColorScale, LinearScale, NO_DATA_FILL};
