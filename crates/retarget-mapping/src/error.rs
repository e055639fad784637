/// Errors returned while parsing a mapping document.
#[derive(thiserror::Error, Debug)]
pub enum MappingError {
    #[error("mapping is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mapping root must be an object keyed by driver name")]
    NotAnObject,
    #[error("entry `{driver}` must be an object")]
    EntryNotAnObject { driver: String },
    #[error("entry `{driver}` is malformed: {source}")]
    InvalidEntry {
        driver: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("entry `{driver}` has neither `target_bone` nor `other_bone`")]
    MissingBoneReference { driver: String },
    #[error("entry `{driver}` has invalid transfer parameters: {reason}")]
    InvalidTransfer { driver: String, reason: String },
}
