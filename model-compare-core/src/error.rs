use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Metric '{metric}' failed: {source}")]
    MetricFailed {
        metric: String,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Attribute an error to the metric whose pipeline raised it.
    pub fn for_metric(metric: impl Into<String>, source: CoreError) -> Self {
        CoreError::MetricFailed {
            metric: metric.into(),
            source: Box::new(source),
        }
    }

    /// The underlying error, with any metric attribution stripped.
    pub fn root(&self) -> &CoreError {
        match self {
            CoreError::MetricFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        CoreError::Configuration(err.to_string())
    }
}
