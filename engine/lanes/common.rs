#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Map cannot be compiled: {0}")]
    InvalidMap(track::Report),
    #[error("Map has no nodes")]
    EmptyMap,
    #[error("No weight for edge {0}-{1}")]
    MissingEdgeWeight(String, String),
    #[error("Movement {0}-{1}-{2} is too long for a lane weight")]
    WeightOverflow(String, String, String),
    #[error("Map is made of {0} disconnected pieces")]
    UnsupportedTopology(usize),
    #[error("Start edge {0}-{1} is not in the map")]
    UnknownStartEdge(String, String),
    #[error("Track error: {0}")]
    TrackError(#[from] track::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::Error),
}
