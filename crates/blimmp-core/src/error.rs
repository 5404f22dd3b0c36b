use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Which source a module lookup failed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Nodes,
    Adjacency,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Nodes => f.write_str("nodes"),
            SourceKind::Adjacency => f.write_str("adjacency"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Module ID must be exactly 6 characters (e.g. M00001), got {input:?}")]
    InvalidModuleId { input: String },

    #[error("Module {module_id} not found in {kind} data")]
    ModuleNotFound { module_id: String, kind: SourceKind },

    #[error("Unexpected node data format for module {module_id}: {message}")]
    UnexpectedNodeShape { module_id: String, message: String },

    #[error("Unexpected adjacency data format for module {module_id}: {message}")]
    UnexpectedAdjacencyShape { module_id: String, message: String },

    #[error("Failed to parse uploaded JSON: {message}")]
    MalformedOverride { message: String },

    #[error("Failed to read {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for lookups that should surface as a plain "not found" message and draw nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ModuleNotFound { .. })
    }
}
