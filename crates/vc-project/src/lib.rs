//! vc-project: project files, calibration files and the cached project façade.

pub mod calibration_io;
pub mod facade;
pub mod migrate;
pub mod schema;
pub mod validate;

pub use calibration_io::{
    calibration_fingerprint, load_calibration, load_calibration_csv, load_calibration_json,
    load_calibration_yaml, parse_calibration_csv, save_calibration_yaml,
};
pub use facade::Project;
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_project_file};

use vc_core::VcError;
use vc_engine::EngineError;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Calibration error: {what}")]
    Calibration { what: String },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ProjectError> for VcError {
    fn from(err: ProjectError) -> Self {
        VcError::Other(err.to_string())
    }
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<ProjectFile> {
    let content = std::fs::read_to_string(path)?;
    let mut project: ProjectFile = serde_yaml::from_str(&content)?;
    project = migrate_to_latest(project)?;
    validate_project_file(&project)?;
    Ok(project)
}

pub fn save_yaml(path: &std::path::Path, project: &ProjectFile) -> ProjectResult<()> {
    validate_project_file(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<ProjectFile> {
    let content = std::fs::read_to_string(path)?;
    let mut project: ProjectFile = serde_json::from_str(&content)?;
    project = migrate_to_latest(project)?;
    validate_project_file(&project)?;
    Ok(project)
}

pub fn save_json(path: &std::path::Path, project: &ProjectFile) -> ProjectResult<()> {
    validate_project_file(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}
