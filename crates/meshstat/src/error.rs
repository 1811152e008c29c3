//! Error type for the analysis facade.

use meshstat_curvature::CurvatureError;
use meshstat_stats::StatsError;
use meshstat_topo::{Scope, TopoError};
use thiserror::Error;

/// Errors returned by [`Analyzer`](crate::Analyzer) and report collection.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Entity lookup or scope resolution failed.
    #[error(transparent)]
    Topo(#[from] TopoError),

    /// Angle table, curvature or roughness failed.
    #[error(transparent)]
    Curvature(#[from] CurvatureError),

    /// A metric table could not be summarised.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Coarseness of a region whose triangles have no area.
    #[error("zero area in {0:?}, coarseness undefined")]
    ZeroArea(Scope),

    /// Settings out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file is not valid TOML for the schema.
    #[error("settings TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Report could not be encoded.
    #[error("report JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
