use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/* A problem with one declaration; collected, reported, then fatal as a group */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationError {
    pub path: PathBuf,
    pub message: String,
}

impl DeclarationError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no Rust package found in {}", .0.display())]
    NoPackage(PathBuf),

    #[error("at most one package can be processed at the same time ({} is a workspace)", .0.display())]
    MultiplePackages(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk package sources: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("package {package} has errors ({} declaration error(s))", .errors.len())]
    DeclarationErrors {
        package: String,
        errors: Vec<DeclarationError>,
    },
}
