//! Memoizing entry point for every metric.

use std::collections::HashMap;
use std::rc::Rc;

use meshstat_curvature::{AngleTable, RoughnessAnalysis};
use meshstat_stats::FrequencyTable;
use meshstat_topo::{resolve_scope, EntitySetId, MeshKernel, Scope, TriangleId};
use tracing::debug;

use crate::counts::{self, EntityListing};
use crate::{
    AnalysisSettings, MetricsError, Query, Result, SurfaceMetrics, TriangleMetrics,
    VertexMetrics, VolumeMetrics,
};

/// Intermediate result kinds held by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Angle table (triangle shapes).
    AngleTable,
    /// Curvature and roughness maps.
    Roughness,
}

#[derive(Debug, Clone)]
enum Cached {
    AngleTable(Rc<AngleTable>),
    Roughness(Rc<RoughnessAnalysis>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    settings: AnalysisSettings,
    value: Cached,
}

/// Computes metrics over a borrowed kernel.
///
/// Angle tables and roughness runs are cached per resolved scope. An
/// entry is reused only when the query's settings equal the ones it was
/// built with; otherwise it is rebuilt and replaced. The kernel is
/// assumed immutable while the analyzer lives; call [`invalidate`] or
/// [`clear`] if it is not.
///
/// [`invalidate`]: Analyzer::invalidate
/// [`clear`]: Analyzer::clear
pub struct Analyzer<'k, K: MeshKernel + ?Sized> {
    kernel: &'k K,
    cache: HashMap<(Scope, MetricKind), CacheEntry>,
}

impl<'k, K: MeshKernel + ?Sized> Analyzer<'k, K> {
    /// Analyzer over `kernel` with an empty cache.
    pub fn new(kernel: &'k K) -> Self {
        Self {
            kernel,
            cache: HashMap::new(),
        }
    }

    /// The analysed kernel.
    pub fn kernel(&self) -> &'k K {
        self.kernel
    }

    // =========================================================================
    // Scope and cache
    // =========================================================================

    /// Validate the query's settings and apply its scope policy.
    pub fn resolve(&self, query: &Query) -> Result<Scope> {
        let settings = query.settings();
        settings.validate()?;
        Ok(resolve_scope(self.kernel, query.scope(), settings.scope_policy)?)
    }

    /// Triangles in the query's resolved scope.
    pub fn triangles(&self, query: &Query) -> Result<Vec<TriangleId>> {
        let scope = self.resolve(query)?;
        Ok(self.kernel.triangles_in(&scope)?)
    }

    /// True when a result for `scope` and `kind` is cached.
    pub fn is_cached(&self, scope: Scope, kind: MetricKind) -> bool {
        self.cache.contains_key(&(scope, kind))
    }

    /// Drop every cached result for `scope`.
    pub fn invalidate(&mut self, scope: Scope) {
        self.cache.retain(|(s, _), _| *s != scope);
    }

    /// Drop every cached result.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn lookup(
        &self,
        scope: Scope,
        kind: MetricKind,
        settings: &AnalysisSettings,
    ) -> Option<&Cached> {
        let entry = self.cache.get(&(scope, kind))?;
        if entry.settings == *settings {
            debug!(?scope, ?kind, "cache hit");
            Some(&entry.value)
        } else {
            debug!(?scope, ?kind, "cached with other settings, rebuilding");
            None
        }
    }

    fn store(
        &mut self,
        scope: Scope,
        kind: MetricKind,
        settings: AnalysisSettings,
        value: Cached,
    ) {
        self.cache.insert((scope, kind), CacheEntry { settings, value });
    }

    // =========================================================================
    // Cached building blocks
    // =========================================================================

    /// Angle table of the query's scope.
    pub fn angle_table(&mut self, query: &Query) -> Result<Rc<AngleTable>> {
        let scope = self.resolve(query)?;
        let settings = *query.settings();
        let cached = self.lookup(scope, MetricKind::AngleTable, &settings);
        if let Some(Cached::AngleTable(table)) = cached {
            return Ok(Rc::clone(table));
        }
        let tris = self.kernel.triangles_in(&scope)?;
        let table = Rc::new(AngleTable::build(self.kernel, &tris, &settings.tolerance)?);
        self.store(
            scope,
            MetricKind::AngleTable,
            settings,
            Cached::AngleTable(Rc::clone(&table)),
        );
        Ok(table)
    }

    /// Curvature and roughness of the query's scope.
    pub fn roughness_analysis(&mut self, query: &Query) -> Result<Rc<RoughnessAnalysis>> {
        let scope = self.resolve(query)?;
        let settings = *query.settings();
        let cached = self.lookup(scope, MetricKind::Roughness, &settings);
        if let Some(Cached::Roughness(run)) = cached {
            return Ok(Rc::clone(run));
        }
        let table = self.angle_table(query)?;
        let run = Rc::new(RoughnessAnalysis::from_table(
            self.kernel,
            table,
            settings.boundary_policy,
            &settings.tolerance,
        )?);
        self.store(
            scope,
            MetricKind::Roughness,
            settings,
            Cached::Roughness(Rc::clone(&run)),
        );
        Ok(run)
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    /// Area-weighted roughness of the query's scope.
    pub fn roughness(&mut self, query: &Query) -> Result<f64> {
        Ok(self.roughness_analysis(query)?.weighted_average()?)
    }

    /// Area of every triangle in scope.
    pub fn triangle_areas(&mut self, query: &Query) -> Result<Vec<f64>> {
        let table = self.angle_table(query)?;
        Ok(table
            .triangles()
            .iter()
            .filter_map(|&t| table.shape(t))
            .map(|s| s.area)
            .collect())
    }

    /// Aspect ratio of every triangle in scope.
    pub fn aspect_ratios(&mut self, query: &Query) -> Result<Vec<f64>> {
        let table = self.angle_table(query)?;
        Ok(table
            .triangles()
            .iter()
            .filter_map(|&t| table.shape(t))
            .map(|s| s.aspect_ratio)
            .collect())
    }

    /// Triangle count divided by total area over the whole scope.
    pub fn coarseness(&mut self, query: &Query) -> Result<f64> {
        let scope = self.resolve(query)?;
        let table = self.angle_table(query)?;
        coarseness_of(scope, table.triangle_count(), table.total_area())
    }

    /// One row per triangle in scope.
    pub fn triangle_metrics(&mut self, query: &Query) -> Result<Vec<TriangleMetrics>> {
        let run = self.roughness_analysis(query)?;
        let mut rows = Vec::with_capacity(run.table.triangle_count());
        for &triangle in run.table.triangles() {
            let (Some(shape), Some(roughness)) = (
                run.table.shape(triangle),
                run.roughness.triangle_average(triangle),
            ) else {
                continue;
            };
            rows.push(TriangleMetrics {
                triangle,
                area: shape.area,
                aspect_ratio: shape.aspect_ratio,
                roughness,
            });
        }
        Ok(rows)
    }

    /// One row per vertex in scope.
    pub fn vertex_metrics(&mut self, query: &Query) -> Result<Vec<VertexMetrics>> {
        let run = self.roughness_analysis(query)?;
        run.table
            .vertices()
            .iter()
            .map(|&vertex| -> Result<VertexMetrics> {
                Ok(VertexMetrics {
                    vertex,
                    triangles: run.table.valence(vertex),
                    curvature: run.curvature.get(vertex)?,
                    roughness: run.roughness.local(vertex)?,
                })
            })
            .collect()
    }

    /// One row per surface in scope. Each surface's angle table is
    /// cached under its own scope.
    pub fn surface_metrics(&mut self, query: &Query) -> Result<Vec<SurfaceMetrics>> {
        let scope = self.resolve(query)?;
        let mut rows = Vec::new();
        for surface in counts::surfaces_in(self.kernel, scope)? {
            let (triangles, area, coarseness) = self.set_size(query, surface)?;
            rows.push(SurfaceMetrics {
                surface,
                global_id: self.kernel.global_id(surface)?,
                triangles,
                area,
                coarseness,
            });
        }
        Ok(rows)
    }

    /// One row per volume touching the scope.
    pub fn volume_metrics(&mut self, query: &Query) -> Result<Vec<VolumeMetrics>> {
        let scope = self.resolve(query)?;
        let mut rows = Vec::new();
        for volume in counts::volumes_in(self.kernel, scope)? {
            let (triangles, area, coarseness) = self.set_size(query, volume)?;
            rows.push(VolumeMetrics {
                volume,
                global_id: self.kernel.global_id(volume)?,
                surfaces: self.kernel.children(volume)?.len(),
                triangles,
                area,
                coarseness,
            });
        }
        Ok(rows)
    }

    /// Child surface count of every volume touching the scope.
    pub fn surfaces_per_volume(&self, query: &Query) -> Result<Vec<EntityListing>> {
        counts::surfaces_per_volume(self.kernel, self.resolve(query)?)
    }

    /// Triangle count of every surface in scope.
    pub fn triangles_per_surface(&self, query: &Query) -> Result<Vec<EntityListing>> {
        counts::triangles_per_surface(self.kernel, self.resolve(query)?)
    }

    /// How many vertices in scope have each in-scope triangle count.
    pub fn triangles_per_vertex(&self, query: &Query) -> Result<FrequencyTable> {
        counts::triangles_per_vertex(self.kernel, self.resolve(query)?)
    }

    fn set_size(&mut self, query: &Query, set: EntitySetId) -> Result<(usize, f64, f64)> {
        let scope = Scope::Set(set);
        let table = self.angle_table(&query.with_scope(scope))?;
        let (triangles, area) = (table.triangle_count(), table.total_area());
        Ok((triangles, area, coarseness_of(scope, triangles, area)?))
    }
}

fn coarseness_of(scope: Scope, triangles: usize, area: f64) -> Result<f64> {
    if !(area > 0.0) {
        return Err(MetricsError::ZeroArea(scope));
    }
    Ok(triangles as f64 / area)
}
