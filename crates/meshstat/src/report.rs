//! Whole-model statistics report.

use meshstat_curvature::CurvatureError;
use meshstat_stats::{StatsError, Summary};
use meshstat_topo::MeshKernel;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::counts::{self, EntityListing, EntityRanges, NativeRanges};
use crate::{Analyzer, MetricsError, Query, Result};

/// Which sections a report contains.
///
/// An all-false selection is widened to every summary section by
/// [`ReportOptions::resolved`]; the per-entity listings are only ever
/// included on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Vertex, triangle and entity-set counts.
    pub native_ranges: bool,
    /// Entity-set counts per dimension.
    pub entity_ranges: bool,
    /// Surfaces per volume.
    pub surfaces_per_volume: bool,
    /// Triangles per surface.
    pub triangles_per_surface: bool,
    /// Triangles per vertex.
    pub triangles_per_vertex: bool,
    /// Triangle aspect ratio.
    pub aspect_ratio: bool,
    /// Triangle area.
    pub area: bool,
    /// Surface coarseness.
    pub coarseness: bool,
    /// Local roughness and its area-weighted average.
    pub roughness: bool,
    /// Per-volume surface counts.
    pub spv_data: bool,
    /// Per-surface triangle counts.
    pub tps_data: bool,
}

impl ReportOptions {
    /// Every summary section, no listings.
    pub fn all() -> Self {
        Self {
            native_ranges: true,
            entity_ranges: true,
            surfaces_per_volume: true,
            triangles_per_surface: true,
            triangles_per_vertex: true,
            aspect_ratio: true,
            area: true,
            coarseness: true,
            roughness: true,
            spv_data: false,
            tps_data: false,
        }
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The selection to run: `self`, or [`all`](Self::all) when empty.
    pub fn resolved(self) -> Self {
        if self.is_empty() {
            Self::all()
        } else {
            self
        }
    }
}

/// Area-weighted roughness plus the spread of local values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoughnessReport {
    /// `Σ R(v)·A(v)/3 / Σ A(v)/3` over the scope.
    pub weighted_average: f64,
    /// Summary of per-vertex roughness.
    pub local: Summary,
}

/// Collected statistics. Sections that were not requested, or whose
/// dataset was empty, are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelReport {
    /// Raw entity counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_ranges: Option<NativeRanges>,
    /// Entity sets per dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_ranges: Option<EntityRanges>,
    /// Surfaces per volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surfaces_per_volume: Option<Summary>,
    /// Triangles per surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triangles_per_surface: Option<Summary>,
    /// Triangles per vertex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triangles_per_vertex: Option<Summary>,
    /// Triangle aspect ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<Summary>,
    /// Triangle area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Summary>,
    /// Surface coarseness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coarseness: Option<Summary>,
    /// Roughness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<RoughnessReport>,
    /// Volume global id → surface count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spv_data: Option<Vec<EntityListing>>,
    /// Surface global id → triangle count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tps_data: Option<Vec<EntityListing>>,
}

impl ModelReport {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Turn an empty-dataset failure into a skipped section.
fn optional<T>(section: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(MetricsError::Stats(StatsError::EmptyDataset))
        | Err(MetricsError::Curvature(CurvatureError::EmptyScope)) => {
            warn!(section, "no data in scope, section skipped");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn listing_summary(rows: &[EntityListing]) -> Result<Summary> {
    Ok(Summary::from_counts(rows.iter().map(|row| row.count))?)
}

/// Gather the sections selected by `options` for the query's scope.
///
/// Counts and listings cover the surfaces and volumes in scope; shape,
/// area and roughness cover the scope's triangles.
pub fn collect_report<K: MeshKernel + ?Sized>(
    analyzer: &mut Analyzer<'_, K>,
    query: &Query,
    options: ReportOptions,
) -> Result<ModelReport> {
    let options = options.resolved();
    let kernel = analyzer.kernel();
    let mut report = ModelReport::default();

    if options.native_ranges {
        report.native_ranges = Some(counts::native_ranges(kernel));
    }
    if options.entity_ranges {
        report.entity_ranges = Some(counts::entity_ranges(kernel));
    }

    if options.surfaces_per_volume || options.spv_data {
        let rows = analyzer.surfaces_per_volume(query)?;
        if options.surfaces_per_volume {
            report.surfaces_per_volume = optional("surfaces_per_volume", listing_summary(&rows))?;
        }
        if options.spv_data {
            report.spv_data = Some(rows);
        }
    }
    if options.triangles_per_surface || options.tps_data {
        let rows = analyzer.triangles_per_surface(query)?;
        if options.triangles_per_surface {
            report.triangles_per_surface =
                optional("triangles_per_surface", listing_summary(&rows))?;
        }
        if options.tps_data {
            report.tps_data = Some(rows);
        }
    }

    if options.triangles_per_vertex {
        let table = analyzer.triangles_per_vertex(query)?;
        report.triangles_per_vertex =
            optional("triangles_per_vertex", table.summary().map_err(Into::into))?;
    }
    if options.aspect_ratio {
        let values = analyzer.aspect_ratios(query)?;
        report.aspect_ratio =
            optional("aspect_ratio", Summary::from_values(&values).map_err(Into::into))?;
    }
    if options.area {
        let values = analyzer.triangle_areas(query)?;
        report.area = optional("area", Summary::from_values(&values).map_err(Into::into))?;
    }
    if options.coarseness {
        let values: Vec<f64> = analyzer
            .surface_metrics(query)?
            .iter()
            .map(|row| row.coarseness)
            .collect();
        report.coarseness =
            optional("coarseness", Summary::from_values(&values).map_err(Into::into))?;
    }
    if options.roughness {
        report.roughness = optional("roughness", roughness_report(analyzer, query))?;
    }

    debug!(?options, "collected report");
    Ok(report)
}

fn roughness_report<K: MeshKernel + ?Sized>(
    analyzer: &mut Analyzer<'_, K>,
    query: &Query,
) -> Result<RoughnessReport> {
    let run = analyzer.roughness_analysis(query)?;
    let local: Vec<f64> = run.roughness.field().values().collect();
    Ok(RoughnessReport {
        weighted_average: run.weighted_average()?,
        local: Summary::from_values(&local)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_widens() {
        let opts = ReportOptions::default().resolved();
        assert_eq!(opts, ReportOptions::all());
        assert!(!opts.spv_data && !opts.tps_data);
    }

    #[test]
    fn test_listing_only_selection_kept() {
        let opts = ReportOptions {
            tps_data: true,
            ..Default::default()
        };
        assert_eq!(opts.resolved(), opts);
    }
}
