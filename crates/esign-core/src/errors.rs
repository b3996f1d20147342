#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration field: {0}")]
    MissingField(&'static str),
    #[error("invalid timeout value: {0}")]
    InvalidTimeout(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("unknown envelope: {0}")]
    UnknownEnvelope(String),
    #[error("cannot read signature state: {0}")]
    Read(#[source] std::io::Error),
    #[error("cannot write signature state: {0}")]
    Write(#[source] std::io::Error),
    #[error("invalid signature state JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}
