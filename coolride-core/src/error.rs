use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No nearby points found for snapping")]
    NoPointsFound,
    #[error("Failed to load road network: {0}")]
    GraphLoadFailure(String),
    #[error("No route between nodes {from} and {to}")]
    RouteUnreachable { from: NodeId, to: NodeId },
    #[error("Edge {0} already carries a cool cost")]
    AlreadyAnnotated(usize),
    #[error("Weather feed unavailable: {0}")]
    WeatherFeedUnavailable(String),
    #[error("Sample cache error: {0}")]
    CacheError(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Fatal errors leave no partial route payload behind.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::WeatherFeedUnavailable(_) | Error::CacheError(_)
        )
    }
}
