//! Error types for the fb-app service layer.

use std::path::PathBuf;

/// Unified error for CLI and other frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: fb_project::ProjectError,
    },

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: fb_project::ProjectError,
    },

    #[error("Mechanism compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fb-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<fb_project::ProjectError> for AppError {
    fn from(err: fb_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<fb_geometry::GeometryError> for AppError {
    fn from(err: fb_geometry::GeometryError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<fb_sim::SimError> for AppError {
    fn from(err: fb_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}
