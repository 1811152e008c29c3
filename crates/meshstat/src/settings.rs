//! Analysis settings and the per-call query value.

use meshstat_curvature::BoundaryPolicy;
use meshstat_math::Tolerance;
use meshstat_topo::{EntitySetId, Scope, ScopePolicy};
use serde::{Deserialize, Serialize};

use crate::{MetricsError, Result};

/// Knobs shared by every metric.
///
/// Missing keys in a settings file fall back to [`Default`]:
///
/// ```toml
/// scope_policy = "fallback_to_model"
/// boundary_policy = "skip"
///
/// [tolerance]
/// linear = 1e-8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// What to do with a scope that is neither a surface nor a volume.
    pub scope_policy: ScopePolicy,
    /// How single-triangle edges enter the roughness weights.
    pub boundary_policy: BoundaryPolicy,
    /// Degeneracy and weight tolerances.
    pub tolerance: Tolerance,
}

impl AnalysisSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_valid() {
            return Err(MetricsError::InvalidSettings(
                "tolerances must be finite and positive".into(),
            ));
        }
        if self.tolerance.angular >= 1.0 {
            return Err(MetricsError::InvalidSettings(
                "angular tolerance must be below 1 radian".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML settings document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// An immutable request: which region to analyse, and how.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Query {
    scope: Scope,
    settings: AnalysisSettings,
}

impl Query {
    /// Query over `scope` with `settings`.
    pub fn new(scope: Scope, settings: AnalysisSettings) -> Self {
        Self { scope, settings }
    }

    /// Whole model, default settings.
    pub fn model() -> Self {
        Self::default()
    }

    /// One surface or volume set, default settings.
    pub fn set(set: EntitySetId) -> Self {
        Self::new(Scope::Set(set), AnalysisSettings::default())
    }

    /// Same settings, different scope.
    pub fn with_scope(self, scope: Scope) -> Self {
        Self { scope, ..self }
    }

    /// Same scope, different settings.
    pub fn with_settings(self, settings: AnalysisSettings) -> Self {
        Self { settings, ..self }
    }

    /// Requested scope, before policy is applied.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Settings.
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        let s = AnalysisSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.scope_policy, ScopePolicy::Strict);
        assert_eq!(s.boundary_policy, BoundaryPolicy::HalfWeight);
        assert_eq!(s.tolerance, Tolerance::DEFAULT);
    }

    #[test]
    fn test_from_toml_partial() {
        let s = AnalysisSettings::from_toml(
            r#"
            scope_policy = "fallback_to_model"
            boundary_policy = "skip"

            [tolerance]
            linear = 1e-8
            "#,
        )
        .unwrap();
        assert_eq!(s.scope_policy, ScopePolicy::FallbackToModel);
        assert_eq!(s.boundary_policy, BoundaryPolicy::Skip);
        assert_eq!(s.tolerance.linear, 1e-8);
        assert_eq!(s.tolerance.weight, Tolerance::DEFAULT.weight);
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(AnalysisSettings::from_toml("").unwrap(), AnalysisSettings::default());
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        let err = AnalysisSettings::from_toml("[tolerance]\nlinear = -1.0\n").unwrap_err();
        assert!(matches!(err, MetricsError::InvalidSettings(_)));
        let err = AnalysisSettings::from_toml("boundary_policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, MetricsError::Toml(_)));
    }

    #[test]
    fn test_query_builders() {
        let q = Query::model();
        assert_eq!(q.scope(), Scope::Model);
        let skip = AnalysisSettings {
            boundary_policy: BoundaryPolicy::Skip,
            ..Default::default()
        };
        let q2 = q.with_settings(skip);
        assert_eq!(q2.settings().boundary_policy, BoundaryPolicy::Skip);
        assert_eq!(q.settings().boundary_policy, BoundaryPolicy::HalfWeight);
    }
}
