//! JSON file helpers for mapping documents.

use crate::{MappingDocument, MappingError};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum MappingIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MappingDocument {
    /// Load a mapping file from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MappingIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::parse(&raw)?)
    }

    /// Write this mapping to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MappingIoError> {
        let json = self.to_json_pretty()?;
        fs::write(path, json)?;
        Ok(())
    }
}
