use std::path::PathBuf;

/// Unified error type for methodref.
#[derive(Debug, thiserror::Error)]
pub enum MethodRefError {
    #[error("Parse error in {}:{line}:{column}: {detail}", .path.display())]
    Parse {
        path: PathBuf,
        /// 1-based line of the first offending node.
        line: usize,
        /// 1-based column of the first offending node.
        column: usize,
        detail: String,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(String),

    #[error("Duplicate symbol {key} in {}", .path.display())]
    DuplicateSymbol { path: PathBuf, key: String },

    #[error("Language error: {0}")]
    Language(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MethodRefError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The file path this error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Parse { path, .. }
            | Self::Io { path, .. }
            | Self::DuplicateSymbol { path, .. } => Some(path.as_path()),
            Self::Walk(_) | Self::Language(_) | Self::Config(_) => None,
        }
    }
}
