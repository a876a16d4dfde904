use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Malformed node {node}: {path}: {reason}")]
    MalformedRecord {
        node: String,
        path: String,
        reason: String,
    },

    #[error("Invalid address on node {node}: {path}: {address:?}")]
    InvalidAddress {
        node: String,
        path: String,
        address: String,
    },
}

impl RegistryError {
    /// Identifier of the node the error belongs to, if any.
    pub fn node(&self) -> Option<&str> {
        match self {
            Self::Document(_) => None,
            Self::MalformedRecord { node, .. } | Self::InvalidAddress { node, .. } => Some(node),
        }
    }
}
