/// Per-entry failures collected by [`crate::RetargetEngine::apply`].
///
/// None of these abort a pass; the entry is skipped and the rest proceed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RetargetError {
    #[error("driver `{driver}`: target bone `{bone}` not in skeleton")]
    UnboundBone { driver: String, bone: String },
    #[error("driver `{driver}`: helper bone `{bone}` not in skeleton")]
    UnboundHelper { driver: String, bone: String },
}

impl RetargetError {
    pub fn driver(&self) -> &str {
        match self {
            RetargetError::UnboundBone { driver, .. } | RetargetError::UnboundHelper { driver, .. } => {
                driver
            }
        }
    }
}
