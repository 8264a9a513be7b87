//! Render orchestration error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors reported by the render manager.
///
/// All of these are configuration errors: the frame cannot proceed for the
/// node or viewport that produced them. Policy skips (disabled viewports,
/// empty buckets, geometries vetoed by overrides) are never errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No material is set for geometry '{geometry}'")]
    MissingMaterial { geometry: String },
    #[error("Failed to create pipeline context of type {context}")]
    ContextCreationFailed { context: &'static str },
    #[error("Material '{material}' has no technique named '{technique}'")]
    TechniqueNotFound { material: String, technique: String },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type RenderResult<T> = Result<T, RenderError>;
