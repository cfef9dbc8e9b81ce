use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AbigenError>;

/// Various error types
#[derive(Debug, Error)]
pub enum AbigenError {
    /// Filesystem IO error
    #[error(transparent)]
    Io(#[from] AbigenIoError),
    /// The artifact is not valid JSON
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    /// The artifact is valid JSON but its ABI has an invalid shape
    #[error("malformed ABI in \"{}\": {source}", .path.display())]
    MalformedArtifact { path: PathBuf, source: serde_json::Error },
    /// Two overloads of the same name format to the same signature string
    #[error("contract `{contract}` declares `{signature}` more than once")]
    SignatureCollision { contract: String, signature: String },
    /// A declaration of the generated module has the name of an imported type
    #[error("`{name}` in contract `{contract}` has the name of an imported type, please rename it")]
    ShadowedImport { contract: String, name: String },
    #[error("can't derive a contract name from \"{0}\", please rename the file")]
    InvalidContractName(String),
    #[error("multiple artifacts would generate \"{}\"", .0.display())]
    DuplicateOutput(PathBuf),
    #[error("generated file \"{}\" is missing or out of date", .path.display())]
    Inconsistent { path: PathBuf },
    /// General purpose message
    #[error("{0}")]
    Message(String),
}

impl AbigenError {
    pub(crate) fn io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        AbigenIoError::new(err, path).into()
    }

    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        AbigenError::Message(msg.into())
    }
}

#[derive(Debug, Error)]
#[error("\"{}\": {io}", self.path.display())]
pub struct AbigenIoError {
    io: io::Error,
    path: PathBuf,
}

impl AbigenIoError {
    pub fn new(io: io::Error, path: impl Into<PathBuf>) -> Self {
        Self { io, path: path.into() }
    }

    /// The path the failed operation was performed on
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl From<AbigenIoError> for io::Error {
    fn from(err: AbigenIoError) -> Self {
        err.io
    }
}
