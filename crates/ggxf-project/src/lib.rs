//! ggxf-project: GGXF YAML/JSON documents with inline grid data.
//!
//! Reading a file parses and validates the document; [`build_model`] turns
//! it into a configured [`ggxf_model::Model`].

pub mod build;
pub mod schema;
pub mod validate;

use std::path::Path;

use ggxf_model::{ConfigError, ModelError, StructuralError};
use ggxf_time::TimeError;

pub use build::{ErrorSinkMode, LoadOptions, LoadedModel, build_model};
pub use schema::*;
pub use validate::{ValidationError, validate_document};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    #[error("Unsupported file type: {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for ProjectError {
    fn from(err: ConfigError) -> Self {
        ProjectError::Model(err.into())
    }
}

impl From<StructuralError> for ProjectError {
    fn from(err: StructuralError) -> Self {
        ProjectError::Model(err.into())
    }
}

pub fn parse_yaml_str(text: &str) -> ProjectResult<GgxfDocument> {
    let document: GgxfDocument = serde_yaml::from_str(text)?;
    validate_document(&document)?;
    Ok(document)
}

pub fn parse_json_str(text: &str) -> ProjectResult<GgxfDocument> {
    let document: GgxfDocument = serde_json::from_str(text)?;
    validate_document(&document)?;
    Ok(document)
}

pub fn load_yaml(path: &Path) -> ProjectResult<GgxfDocument> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml_str(&content)
}

pub fn load_json(path: &Path) -> ProjectResult<GgxfDocument> {
    let content = std::fs::read_to_string(path)?;
    parse_json_str(&content)
}

/// Load by file extension.
pub fn load_document(path: &Path) -> ProjectResult<GgxfDocument> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => Err(ProjectError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Load a document and build its model in one step.
pub fn open_model(path: &Path, options: &LoadOptions) -> ProjectResult<LoadedModel> {
    let document = load_document(path)?;
    build_model(&document, options)
}
