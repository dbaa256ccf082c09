#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Expected a {expected} payload, found {found}")]
    WrongPayloadType { expected: String, found: String },
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("No edge between {0} and {1}")]
    UnknownEdge(String, String),
    #[error("Node name already in use: {0}")]
    NameInUse(String),
}
