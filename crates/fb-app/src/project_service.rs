//! Project loading and saving.

use std::path::Path;

use fb_project::Project;

use crate::error::{AppError, AppResult};

/// Load and validate a project. `.json` files are read as JSON, others as YAML.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let project = fb_project::load(path).map_err(|source| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), name = %project.name, "project loaded");
    Ok(project)
}

/// Validate and save a project as YAML.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    fb_project::save_yaml(path, project).map_err(|source| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    fb_project::validate_project(project).map_err(|e| AppError::Project(e.to_string()))
}
