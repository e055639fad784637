pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum LiveError {
    /// Bad options, or the capture source/detector could not be opened.
    /// The scheduler stays idle.
    #[error("invalid live configuration: {reason}")]
    InvalidConfig {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("scheduler is already running")]
    AlreadyRunning,
}

impl LiveError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        LiveError::InvalidConfig {
            reason: reason.into(),
            source: None,
        }
    }
}
