use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("subject lap has no telemetry samples")]
    EmptyLap,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read config at {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
